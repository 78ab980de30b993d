use colored::{ColoredString, Colorize};
use strata::{Operation, Patch, PatchOperation, SystemTimeExt};

/// Enables colour only when stdout can show it.
pub fn configure_color() {
    let supported = supports_color::on(supports_color::Stream::Stdout).is_some();
    colored::control::set_override(supported);
}

/// Prints one line per operation. `long` adds size, mode and mtime (in
/// milliseconds since the epoch) for operations that carry an entry.
pub fn print_patch(patch: &Patch, long: bool) {
    for operation in patch {
        println!("{}", format_operation(operation, long));
    }
}

fn format_operation(operation: &PatchOperation, long: bool) -> ColoredString {
    let line = plain_line(operation, long);
    match operation.operation() {
        Operation::Create | Operation::Mkdir => line.green(),
        Operation::Update => line.yellow(),
        Operation::Unlink | Operation::Rmdir => line.red(),
    }
}

fn plain_line(operation: &PatchOperation, long: bool) -> String {
    match operation.entry() {
        Some(entry) if long => format!(
            "{operation} {} {:o} {}",
            entry.size(),
            entry.mode(),
            entry.mtime().unix_millis()
        ),
        _ => operation.to_string(),
    }
}
