//! Line-oriented input for the interactive `play` command.

use std::io::BufRead;

/// Reads one line, trimmed. `None` on EOF or a read error.
///
/// ```rust
/// use std::io::Cursor;
/// # use loba_cli::io_utils::read_stdin_line;
///
/// let mut input = Cursor::new("  m 1 2 3 \n");
/// assert_eq!(read_stdin_line(&mut input).as_deref(), Some("m 1 2 3"));
/// assert_eq!(read_stdin_line(&mut input), None);
/// ```
pub fn read_stdin_line(stdin: &mut dyn BufRead) -> Option<String> {
    let mut line = String::new();
    match stdin.read_line(&mut line) {
        Ok(0) => None, // EOF
        Ok(_) => Some(line.trim().to_string()),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn blank_lines_come_back_empty() {
        let mut input = Cursor::new("\n\nd\n");
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some(""));
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some(""));
        assert_eq!(read_stdin_line(&mut input).as_deref(), Some("d"));
        assert_eq!(read_stdin_line(&mut input), None);
    }
}
