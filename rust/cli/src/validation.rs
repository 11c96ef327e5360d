//! Parsing of the commands a human player types during `loba play`.
//!
//! Card positions are 1-based and refer to the hand as it is displayed;
//! meld positions are 1-based table indices. The play command turns them
//! into card ids before calling the engine.

/// A parsed turn command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `d`: draw from the deck
    Draw,
    /// `p [i j ..]`: take the discard top into a meld with these cards
    /// (the current selection when empty)
    PickUp(Vec<usize>),
    /// `m [i j k ..]`: meld these cards (the current selection when empty)
    Meld(Vec<usize>),
    /// `l M [i ..]`: lay cards off onto table meld `M`
    LayOff { meld: usize, cards: Vec<usize> },
    /// `x i`: discard one card
    Discard(usize),
    /// `s i [j ..]`: toggle cards in the selection
    Select(Vec<usize>),
    /// `o`: toggle automatic hand sorting
    Sort,
    /// `h` / `?`: show help
    Help,
}

/// Result type for parsing one line of user input.
#[derive(Debug, PartialEq)]
pub enum ParseResult {
    Command(Command),
    /// User entered quit command (q or quit)
    Quit,
    /// Invalid input with error message
    Invalid(String),
}

pub const HELP: &str = "\
Commands (card and meld numbers are 1-based):
  d              draw from the deck
  p [i j ..]     pick up the discard top into a meld with hand cards i j ..
  m [i j k ..]   meld hand cards (three or more)
  l M [i ..]     lay hand cards off onto table meld M
  x i            discard hand card i and end the turn
  s i [j ..]     toggle cards in the selection; p, m and l without cards use it
  o              toggle automatic hand sorting
  h              show this help
  q              quit";

/// Parse one input line.
///
/// # Example
///
/// ```rust
/// # use loba_cli::validation::{parse_command, Command, ParseResult};
///
/// assert_eq!(parse_command("D"), ParseResult::Command(Command::Draw));
/// assert_eq!(
///     parse_command("l 2 5"),
///     ParseResult::Command(Command::LayOff { meld: 2, cards: vec![5] })
/// );
/// assert_eq!(parse_command("quit"), ParseResult::Quit);
/// assert!(matches!(parse_command("x"), ParseResult::Invalid(_)));
/// ```
pub fn parse_command(input: &str) -> ParseResult {
    let input = input.trim().to_lowercase();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some((&head, rest)) = parts.split_first() else {
        return ParseResult::Invalid("Empty input (h for help)".to_string());
    };

    if head == "q" || head == "quit" {
        return ParseResult::Quit;
    }

    let positions = match parse_positions(rest) {
        Ok(p) => p,
        Err(msg) => return ParseResult::Invalid(msg),
    };

    let command = match head {
        "d" | "draw" => {
            if !positions.is_empty() {
                return ParseResult::Invalid("Draw takes no arguments".to_string());
            }
            Command::Draw
        }
        "p" | "pickup" => Command::PickUp(positions),
        "m" | "meld" => Command::Meld(positions),
        "l" | "layoff" => {
            let Some((&meld, cards)) = positions.split_first() else {
                return ParseResult::Invalid(
                    "Lay-off requires a meld number (e.g., 'l 1 4')".to_string(),
                );
            };
            Command::LayOff {
                meld,
                cards: cards.to_vec(),
            }
        }
        "x" | "discard" => match positions.as_slice() {
            [card] => Command::Discard(*card),
            _ => {
                return ParseResult::Invalid(
                    "Discard requires exactly one card (e.g., 'x 3')".to_string(),
                );
            }
        },
        "s" | "select" => {
            if positions.is_empty() {
                return ParseResult::Invalid(
                    "Select requires at least one card (e.g., 's 2')".to_string(),
                );
            }
            Command::Select(positions)
        }
        "o" | "sort" => Command::Sort,
        "h" | "help" | "?" => Command::Help,
        _ => {
            return ParseResult::Invalid(format!(
                "Unrecognized command '{}'. Valid commands: d, p, m, l, x, s, o, h, q",
                head
            ));
        }
    };
    ParseResult::Command(command)
}

fn parse_positions(args: &[&str]) -> Result<Vec<usize>, String> {
    args.iter()
        .map(|a| match a.parse::<usize>() {
            Ok(0) => Err("Positions start at 1".to_string()),
            Ok(n) => Ok(n),
            Err(_) => Err(format!("'{}' is not a card number", a)),
        })
        .collect()
}

/// Map 1-based positions onto `items`, rejecting out-of-range numbers.
pub fn resolve_positions<T: Copy>(positions: &[usize], items: &[T]) -> Result<Vec<T>, String> {
    positions
        .iter()
        .map(|&p| {
            p.checked_sub(1)
                .and_then(|i| items.get(i))
                .copied()
                .ok_or_else(|| format!("No card at position {} (hand has {})", p, items.len()))
        })
        .collect()
}
