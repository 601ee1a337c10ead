//! Colored status lines for the user. Diagnostics go through `tracing` instead.

use colored::Colorize;

pub fn info(msg: &str) {
    println!("{}", msg.green());
}

pub fn detail(msg: &str) {
    println!("{}", msg.blue());
}

pub fn warn(msg: &str) {
    println!("{}", msg.red());
}

pub fn error(msg: &str) {
    eprintln!("{}", msg.red().bold());
}
