//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the episode title as a heading.
pub fn print_title(title: &str) {
    println!();
    println!("{}", style(title).bold());
}

/// Print the selected format.
pub fn print_format(name: &str) {
    println!("{} {}", style("Format:").bold(), name);
}
