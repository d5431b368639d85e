//! Output formatting utilities

use console::{style, Style};

/// Width of the `#` rules framing the queue header and report
pub const RULE_WIDTH: usize = 80;

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("[ERROR]").red().bold(), message);
}

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    println!("{} {}", style("!").yellow().bold(), message);
}

/// A full-width `#` rule
pub fn rule() -> String {
    "#".repeat(RULE_WIDTH)
}

/// A `### `-prefixed line inside a framed block
pub fn framed(text: &str) -> String {
    format!("### {}", text)
}

/// Create a styled key-value line
pub fn key_value(key: &str, value: &str) -> String {
    format!("    {}: {}", style(key).dim(), value)
}

/// Style for job titles
pub fn title_style() -> Style {
    Style::new().bold()
}

/// Style for paths
pub fn path_style() -> Style {
    Style::new().cyan()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_width() {
        assert_eq!(rule().len(), RULE_WIDTH);
        assert!(rule().chars().all(|c| c == '#'));
    }

    #[test]
    fn test_framed() {
        assert_eq!(framed("Done:       3"), "### Done:       3");
    }
}
