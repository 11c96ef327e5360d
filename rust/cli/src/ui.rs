//! Small helpers for consistent terminal messages.

use std::io::Write;

pub fn write_error(err: &mut dyn Write, msg: &str) -> std::io::Result<()> {
    writeln!(err, "Error: {}", msg)
}

/// Underline a heading, e.g. for round summaries.
pub fn heading(out: &mut dyn Write, title: &str) -> std::io::Result<()> {
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", "-".repeat(title.chars().count()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_is_underlined_to_its_width() {
        let mut out = Vec::new();
        heading(&mut out, "Round 2").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "Round 2\n-------\n");
    }
}
