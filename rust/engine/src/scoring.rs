use crate::cards::{Card, Rank};

/// Penalty points for a single card: Ace, face cards and the Joker are worth
/// 10, numeral cards their number.
pub fn card_points(rank: Rank) -> u32 {
    match rank {
        Rank::Ace | Rank::Jack | Rank::Queen | Rank::King | Rank::Joker => 10,
        r => r.value().map(u32::from).unwrap_or(0),
    }
}

/// Sum of [`card_points`] over a set of cards.
pub fn score_of(cards: &[Card]) -> u32 {
    cards.iter().map(|c| card_points(c.rank)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::full_deck;

    #[test]
    fn card_values() {
        assert_eq!(card_points(Rank::Ace), 10);
        assert_eq!(card_points(Rank::King), 10);
        assert_eq!(card_points(Rank::Joker), 10);
        assert_eq!(card_points(Rank::Ten), 10);
        assert_eq!(card_points(Rank::Seven), 7);
        assert_eq!(card_points(Rank::Two), 2);
    }

    #[test]
    fn whole_supply_scores_as_expected() {
        // per suit: A + 2..=10 + J,Q,K = 10 + 54 + 30 = 94; 8 suits + 4 jokers
        assert_eq!(score_of(&full_deck()), 94 * 8 + 40);
        assert_eq!(score_of(&[]), 0);
    }
}
