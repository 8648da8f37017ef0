use colored::Colorize;
use graphkit::Error;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

/// Print a planned addition
pub fn added(item: &str) {
    println!("  {} {}", "+".green().bold(), item.green());
}

/// Print a planned removal
pub fn removed(item: &str) {
    println!("  {} {}", "-".red().bold(), item.red());
}

/// Print an API error with its category and advice
pub fn api_error(err: &Error) {
    error(&err.to_string());
    let category = err.category();
    eprintln!("  {}", category.description().dimmed());
    eprintln!("  {}", category.advice().dimmed());
    if err.is_retryable() {
        eprintln!("  {}", "This error is usually transient.".dimmed());
    }
}

/// Mask a secret for display, keeping a short prefix
pub fn mask(value: &str) -> String {
    let len = value.chars().count();
    if len <= 6 {
        "*".repeat(len)
    } else {
        format!("{}…", value.chars().take(6).collect::<String>())
    }
}
