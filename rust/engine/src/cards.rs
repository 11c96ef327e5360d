use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

/// Number of physical cards in a Loba supply: two 52-card decks plus four jokers.
pub const DECK_SIZE: usize = 108;

/// Number of jokers in the supply.
pub const JOKER_COUNT: usize = 4;

/// One of the four playing suits, plus the sentinel suit carried by jokers.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    /// Hearts (♥)
    Hearts,
    /// Diamonds (♦)
    Diamonds,
    /// Clubs (♣)
    Clubs,
    /// Spades (♠)
    Spades,
    /// Sentinel suit, only valid together with [`Rank::Joker`]
    Joker,
}

impl Suit {
    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
            Suit::Spades => "♠",
            Suit::Joker => "",
        }
    }

    fn display_order(self) -> u8 {
        self as u8
    }
}

impl FromStr for Suit {
    type Err = GameError;

    /// Accepts full names (`hearts`), the legacy `diams` spelling and
    /// single letters (`H`, `D`, `C`, `S`, `K` for the joker sentinel).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hearts" | "h" | "♥" => Ok(Suit::Hearts),
            "diamonds" | "diams" | "d" | "♦" => Ok(Suit::Diamonds),
            "clubs" | "c" | "♣" => Ok(Suit::Clubs),
            "spades" | "s" | "♠" => Ok(Suit::Spades),
            "joker" | "k" => Ok(Suit::Joker),
            other => Err(GameError::UnknownSuit(other.to_string())),
        }
    }
}

/// Card rank. Numeric values are the Ace-low interpretation (A = 1 .. K = 13);
/// the Joker has no natural value.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace = 1,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    Joker,
}

impl Rank {
    /// Ace-low value (1..=13), `None` for the joker.
    pub fn value(self) -> Option<u8> {
        match self {
            Rank::Joker => None,
            r => Some(r as u8),
        }
    }

    /// Inverse of [`Rank::value`]. Accepts 14 as a high Ace.
    pub fn from_value(v: u8) -> Option<Rank> {
        let rank = match v {
            1 | 14 => Rank::Ace,
            2 => Rank::Two,
            3 => Rank::Three,
            4 => Rank::Four,
            5 => Rank::Five,
            6 => Rank::Six,
            7 => Rank::Seven,
            8 => Rank::Eight,
            9 => Rank::Nine,
            10 => Rank::Ten,
            11 => Rank::Jack,
            12 => Rank::Queen,
            13 => Rank::King,
            _ => return None,
        };
        Some(rank)
    }

    pub fn is_joker(self) -> bool {
        self == Rank::Joker
    }

    pub fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::Joker => "Joker",
        }
    }
}

impl FromStr for Rank {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim().to_ascii_uppercase();
        match t.as_str() {
            "A" | "1" => Ok(Rank::Ace),
            "J" => Ok(Rank::Jack),
            "Q" => Ok(Rank::Queen),
            "K" => Ok(Rank::King),
            "JOKER" | "JK" => Ok(Rank::Joker),
            _ => t
                .parse::<u8>()
                .ok()
                .filter(|v| (2..=10).contains(v))
                .and_then(Rank::from_value)
                .ok_or(GameError::UnknownRank(s.trim().to_string())),
        }
    }
}

/// Stable identity of one physical card, assigned when the supply is built.
/// Two 7♥ from the double deck share a face but never an id.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u8);

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The visible value of a card (rank + suit) without identity.
///
/// Used wherever a card is named rather than held: the debug draw override,
/// scenario layouts and text input. Construction enforces that the joker
/// rank and the joker suit only ever appear together.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CardFace {
    pub rank: Rank,
    pub suit: Suit,
}

impl CardFace {
    pub fn new(rank: Rank, suit: Suit) -> Result<Self, GameError> {
        if rank.is_joker() != (suit == Suit::Joker) {
            return Err(GameError::InvalidCardFace {
                rank: rank.label().to_string(),
                suit: format!("{:?}", suit).to_lowercase(),
            });
        }
        Ok(Self { rank, suit })
    }

    pub fn joker() -> Self {
        Self {
            rank: Rank::Joker,
            suit: Suit::Joker,
        }
    }

    /// Parse separate rank and suit strings, e.g. `("10", "hearts")`.
    pub fn parse(rank: &str, suit: &str) -> Result<Self, GameError> {
        let r: Rank = rank.parse()?;
        let s: Suit = suit.parse()?;
        Self::new(r, s)
    }
}

impl FromStr for CardFace {
    type Err = GameError;

    /// Compact notation: rank followed by a suit letter (`7H`, `10d`, `QS`)
    /// or `JK` / `Joker` for a joker.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        if t.eq_ignore_ascii_case("jk") || t.eq_ignore_ascii_case("joker") {
            return Ok(CardFace::joker());
        }
        let Some(last) = t.chars().last() else {
            return Err(GameError::UnknownRank(String::new()));
        };
        let split = t.len() - last.len_utf8();
        CardFace::parse(&t[..split], &t[split..])
    }
}

impl fmt::Display for CardFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rank.is_joker() {
            write!(f, "🃏")
        } else {
            write!(f, "{}{}", self.rank.label(), self.suit.symbol())
        }
    }
}

/// One physical card. Equality is identity (the id is unique within a game);
/// use [`Card::same_face`] when only rank and suit matter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub fn face(&self) -> CardFace {
        CardFace {
            rank: self.rank,
            suit: self.suit,
        }
    }

    pub fn same_face(&self, other: &Card) -> bool {
        self.rank == other.rank && self.suit == other.suit
    }

    pub fn is_joker(&self) -> bool {
        self.rank.is_joker()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.face().fmt(f)
    }
}

pub fn all_suits() -> [Suit; 4] {
    [Suit::Hearts, Suit::Diamonds, Suit::Clubs, Suit::Spades]
}

pub fn all_ranks() -> [Rank; 13] {
    [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ]
}

/// Build the unshuffled 108-card supply in a fixed order: two passes of
/// suit-major, rank-minor standard cards, then the four jokers. Ids are
/// assigned sequentially in that order.
pub fn full_deck() -> Vec<Card> {
    let mut v = Vec::with_capacity(DECK_SIZE);
    let mut next = 0u8;
    for _ in 0..2 {
        for &suit in &all_suits() {
            for &rank in &all_ranks() {
                v.push(Card {
                    id: CardId(next),
                    rank,
                    suit,
                });
                next += 1;
            }
        }
    }
    for _ in 0..JOKER_COUNT {
        v.push(Card {
            id: CardId(next),
            rank: Rank::Joker,
            suit: Suit::Joker,
        });
        next += 1;
    }
    v
}

/// Display projection of a hand: rank order A..K then Joker, ties by suit
/// (hearts, diamonds, clubs, spades). Does not touch the underlying hand.
pub fn sort_for_display(cards: &[Card]) -> Vec<Card> {
    let mut sorted = cards.to_vec();
    sorted.sort_by_key(|c| (c.rank, c.suit.display_order(), c.id));
    sorted
}
