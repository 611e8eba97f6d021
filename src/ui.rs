use colored::Colorize;

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

/// Short display name for a spec type (`converge::specs::file::FileSpec` -> `FileSpec`)
pub fn short_type(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_type() {
        assert_eq!(short_type("converge::specs::file::FileSpec"), "FileSpec");
        assert_eq!(short_type("reconcile::mode::RemoveSpec"), "RemoveSpec");
        assert_eq!(short_type("Plain"), "Plain");
        assert_eq!(short_type("alloc::boxed::Box<dyn reconcile::spec::Specification>"), "Box");
    }
}
