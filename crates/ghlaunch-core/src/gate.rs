//! Cancellable countdown before headless analysis starts.
//!
//! The gate blocks on an [`InputWatcher`] for a fixed timeout. Any input
//! before the deadline cancels; silence lets the run proceed. Watchers must
//! block on the OS (poll(2), `WaitForSingleObject`) rather than spin.

use std::time::Duration;

use crate::errors::Result;

/// Something that can block until the user produces input.
pub trait InputWatcher {
    /// Block for at most `timeout`. `Ok(true)` as soon as input arrives,
    /// `Ok(false)` once the timeout elapses without any.
    ///
    /// Fails with [`crate::errors::LaunchError::InputUnavailable`] when the
    /// source is closed or invalid and can never produce input.
    fn wait_for_activity(&mut self, timeout: Duration) -> Result<bool>;
}

pub fn countdown_prompt(timeout: Duration) -> String {
    format!("Analysis will start in {} seconds. Press any key to cancel...", timeout.as_secs())
}

/// Emit the countdown prompt through `notify`, then wait on `watcher`.
///
/// Returns `true` if the user cancelled.
pub fn await_cancellation<W, F>(watcher: &mut W, timeout: Duration, notify: F) -> Result<bool>
where
    W: InputWatcher + ?Sized,
    F: FnOnce(&str),
{
    notify(&countdown_prompt(timeout));
    let cancelled = watcher.wait_for_activity(timeout)?;
    tracing::debug!(cancelled, timeout_secs = timeout.as_secs(), "countdown finished");
    Ok(cancelled)
}

#[cfg(unix)]
pub use unix::PollWatcher;

#[cfg(unix)]
pub type StdinWatcher = PollWatcher<std::io::Stdin>;

/// Watcher over the process's standard input.
#[cfg(unix)]
pub fn stdin_watcher() -> StdinWatcher {
    PollWatcher::new(std::io::stdin())
}

#[cfg(windows)]
pub use windows::ConsoleWatcher;

#[cfg(windows)]
pub type StdinWatcher = ConsoleWatcher;

#[cfg(windows)]
pub fn stdin_watcher() -> StdinWatcher {
    ConsoleWatcher
}

#[cfg(unix)]
mod unix {
    use std::io::{self, Read};
    use std::os::fd::AsRawFd;
    use std::time::{Duration, Instant};

    use super::InputWatcher;
    use crate::errors::{LaunchError, Result};

    /// poll(2) on a readable descriptor. Pending input is drained once it arrives.
    pub struct PollWatcher<R> {
        source: R,
    }

    impl<R: AsRawFd + Read> PollWatcher<R> {
        pub fn new(source: R) -> Self {
            Self { source }
        }

        fn consume(&mut self) -> Result<bool> {
            let mut buf = [0u8; 1024];
            match self.source.read(&mut buf) {
                Ok(0) => Err(LaunchError::InputUnavailable("end of input".into())),
                Ok(_) => Ok(true),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => Ok(true),
                Err(e) => Err(e.into()),
            }
        }
    }

    impl<R: AsRawFd + Read> InputWatcher for PollWatcher<R> {
        fn wait_for_activity(&mut self, timeout: Duration) -> Result<bool> {
            // None: too far out to represent, wait in c_int::MAX slices forever.
            let deadline = Instant::now().checked_add(timeout);
            loop {
                let remaining = match deadline {
                    Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                    None => timeout,
                };
                let millis = libc::c_int::try_from(remaining.as_millis()).unwrap_or(libc::c_int::MAX);
                let mut fds = libc::pollfd {
                    fd: self.source.as_raw_fd(),
                    events: libc::POLLIN,
                    revents: 0,
                };
                // SAFETY: `fds` is a single valid pollfd that outlives the call.
                let rc = unsafe { libc::poll(&mut fds, 1, millis) };
                if rc < 0 {
                    let err = io::Error::last_os_error();
                    if err.kind() == io::ErrorKind::Interrupted {
                        continue;
                    }
                    return Err(err.into());
                }
                if rc == 0 {
                    if deadline.is_none() {
                        continue;
                    }
                    return Ok(false);
                }
                if fds.revents & (libc::POLLNVAL | libc::POLLERR) != 0 {
                    return Err(LaunchError::InputUnavailable("input descriptor is invalid".into()));
                }
                // POLLIN or POLLHUP: either data or end of input, read tells them apart.
                return self.consume();
            }
        }
    }
}

#[cfg(windows)]
mod windows {
    use std::time::{Duration, Instant};

    use windows_sys::Win32::Foundation::{HANDLE, INVALID_HANDLE_VALUE, WAIT_OBJECT_0, WAIT_TIMEOUT};
    use windows_sys::Win32::System::Console::{
        FlushConsoleInputBuffer, GetConsoleMode, GetStdHandle, ReadConsoleInputW, INPUT_RECORD,
        KEY_EVENT, STD_INPUT_HANDLE,
    };
    use windows_sys::Win32::System::Threading::WaitForSingleObject;

    use super::InputWatcher;
    use crate::errors::{LaunchError, Result};

    /// Waits on the console input handle. Only key presses cancel; key
    /// releases, focus, mouse and resize events are discarded.
    pub struct ConsoleWatcher;

    impl InputWatcher for ConsoleWatcher {
        fn wait_for_activity(&mut self, timeout: Duration) -> Result<bool> {
            // SAFETY: plain Win32 calls on the process's own standard input handle.
            let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
            if handle == INVALID_HANDLE_VALUE || handle == 0 {
                return Err(LaunchError::InputUnavailable("no standard input handle".into()));
            }
            let mut mode = 0u32;
            // SAFETY: `mode` is a valid out pointer for the duration of the call.
            if unsafe { GetConsoleMode(handle, &mut mode) } == 0 {
                return Err(LaunchError::InputUnavailable("standard input is not a console".into()));
            }

            let deadline = Instant::now().checked_add(timeout);
            loop {
                let remaining = match deadline {
                    Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                    None => timeout,
                };
                // u32::MAX is INFINITE
                let millis = u32::try_from(remaining.as_millis()).unwrap_or(u32::MAX - 1).min(u32::MAX - 1);
                // SAFETY: `handle` is the console input handle checked above.
                match unsafe { WaitForSingleObject(handle, millis) } {
                    WAIT_OBJECT_0 => {
                        if drain_key_press(handle)? {
                            // SAFETY: as above.
                            unsafe { FlushConsoleInputBuffer(handle) };
                            return Ok(true);
                        }
                    }
                    WAIT_TIMEOUT if deadline.is_none() => {}
                    WAIT_TIMEOUT => return Ok(false),
                    _ => return Err(LaunchError::Io(std::io::Error::last_os_error())),
                }
            }
        }
    }

    /// Read the pending console events. True if one of them is a key press.
    fn drain_key_press(handle: HANDLE) -> Result<bool> {
        // SAFETY: INPUT_RECORD is plain old data; all-zero is a valid value.
        let mut records: [INPUT_RECORD; 16] = unsafe { std::mem::zeroed() };
        let mut read = 0u32;
        // SAFETY: the buffer holds `records.len()` records and `read` is a valid out pointer.
        let ok = unsafe { ReadConsoleInputW(handle, records.as_mut_ptr(), records.len() as u32, &mut read) };
        if ok == 0 {
            return Err(LaunchError::Io(std::io::Error::last_os_error()));
        }
        Ok(contains_key_press(&records[..read as usize]))
    }

    pub(super) fn contains_key_press(records: &[INPUT_RECORD]) -> bool {
        records.iter().any(|record| {
            // SAFETY: `KeyEvent` is the active union member when EventType is KEY_EVENT.
            record.EventType as u32 == KEY_EVENT as u32 && unsafe { record.Event.KeyEvent.bKeyDown } != 0
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use windows_sys::Win32::System::Console::{FOCUS_EVENT, MOUSE_EVENT};

        fn key(down: bool) -> INPUT_RECORD {
            // SAFETY: all-zero INPUT_RECORD is valid.
            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            record.EventType = KEY_EVENT as u16;
            // SAFETY: writes the KeyEvent member selected by EventType.
            unsafe { record.Event.KeyEvent.bKeyDown = i32::from(down) };
            record
        }

        fn other(event_type: u32) -> INPUT_RECORD {
            // SAFETY: all-zero INPUT_RECORD is valid.
            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            record.EventType = event_type as u16;
            record
        }

        #[test]
        fn test_key_release_does_not_cancel() {
            assert!(!contains_key_press(&[key(false)]));
        }

        #[test]
        fn test_focus_and_mouse_events_do_not_cancel() {
            assert!(!contains_key_press(&[other(FOCUS_EVENT as u32), other(MOUSE_EVENT as u32)]));
        }

        #[test]
        fn test_key_press_cancels_among_other_events() {
            assert!(contains_key_press(&[key(false), other(FOCUS_EVENT as u32), key(true)]));
        }
    }
}
