//! Meld evaluation: triplets ("piernas"), runs ("escaleras"), canonical run
//! ordering and exhaustive meld discovery in a hand.
//!
//! Everything here is pure and insensitive to input order.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::cards::{Card, CardId, Rank, Suit};

const ACE_HIGH: u8 = 14;

/// The two meld shapes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeldKind {
    /// Three cards of one rank in three distinct suits, no joker.
    Triplet,
    /// Three or more cards of one suit in sequence, at most one joker.
    Run,
}

/// A meld placed on the table. Owned by the table, not by any player.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Meld {
    pub kind: MeldKind,
    pub cards: Vec<Card>,
}

impl Meld {
    /// Classify `cards` and build a table meld; runs are stored in canonical
    /// order. Returns `None` when the cards form neither shape.
    pub fn from_cards(cards: &[Card]) -> Option<Meld> {
        classify(cards).map(|kind| Meld {
            kind,
            cards: match kind {
                MeldKind::Run => canonical_run_order(cards),
                MeldKind::Triplet => cards.to_vec(),
            },
        })
    }

    pub fn has_joker(&self) -> bool {
        self.cards.iter().any(Card::is_joker)
    }

    /// The suit of a run (first non-joker card).
    pub fn suit(&self) -> Option<Suit> {
        self.cards.iter().find(|c| !c.is_joker()).map(|c| c.suit)
    }

    /// The rank of a triplet (first non-joker card).
    pub fn rank(&self) -> Option<Rank> {
        self.cards.iter().find(|c| !c.is_joker()).map(|c| c.rank)
    }
}

/// Triplet check first, then run, mirroring the order the engine uses when
/// naming a newly formed meld.
pub fn classify(cards: &[Card]) -> Option<MeldKind> {
    if is_triplet(cards) {
        Some(MeldKind::Triplet)
    } else if is_run(cards) {
        Some(MeldKind::Run)
    } else {
        None
    }
}

/// Exactly three non-joker cards of one rank in three different suits.
///
/// A fourth matching card is never part of a direct meld; it can only be
/// laid off onto an existing triplet.
pub fn is_triplet(cards: &[Card]) -> bool {
    if cards.len() != 3 || cards.iter().any(Card::is_joker) {
        return false;
    }
    let rank = cards[0].rank;
    if !cards.iter().all(|c| c.rank == rank) {
        return false;
    }
    let suits: HashSet<Suit> = cards.iter().map(|c| c.suit).collect();
    suits.len() == 3
}

/// Three or more cards of a single suit forming a contiguous sequence, with
/// at most one joker filling a single gap or extending one end.
///
/// The Ace is tried both low (1) and high (14). King–Ace–Two wraparound is
/// never valid.
pub fn is_run(cards: &[Card]) -> bool {
    if cards.len() < 3 {
        return false;
    }
    let jokers = cards.iter().filter(|c| c.is_joker()).count();
    if jokers > 1 {
        return false;
    }
    let naturals: Vec<&Card> = cards.iter().filter(|c| !c.is_joker()).collect();
    let Some(first) = naturals.first() else {
        return false;
    };
    if !naturals.iter().all(|c| c.suit == first.suit) {
        return false;
    }
    let low = natural_values(&naturals);
    let distinct: HashSet<u8> = low.iter().copied().collect();
    if distinct.len() != low.len() {
        return false;
    }

    if low.contains(&1) {
        let high = ace_high(&low);
        let wraps = high.contains(&2) && high.contains(&13) && high.contains(&ACE_HIGH);
        if !wraps && span_fits(&high, cards.len()) {
            return true;
        }
    }
    span_fits(&low, cards.len())
}

/// Order a valid run by rank, resolving the Ace and placing the joker.
///
/// The Ace interpretation with the smaller span wins (ties go to Ace-low).
/// A joker fills the internal gap if there is one; otherwise it extends the
/// high end, or the low end when the high end is already an Ace.
///
/// Input that is not a valid run is returned sorted by Ace-low rank with any
/// jokers last.
pub fn canonical_run_order(cards: &[Card]) -> Vec<Card> {
    let mut naturals: Vec<Card> = cards.iter().copied().filter(|c| !c.is_joker()).collect();
    let mut jokers: Vec<Card> = cards.iter().copied().filter(Card::is_joker).collect();

    if !is_run(cards) {
        naturals.sort_by_key(|c| c.rank);
        naturals.extend(jokers);
        return naturals;
    }

    let use_high = uses_ace_high(&naturals);
    let value_of = |c: &Card| interpreted_value(c, use_high);
    naturals.sort_by_key(value_of);

    let (Some(min), Some(max)) = (
        naturals.first().map(value_of),
        naturals.last().map(value_of),
    ) else {
        return jokers;
    };

    let (mut lo, mut hi) = (min, max);
    let contiguous = usize::from(max - min + 1) == naturals.len();
    if !jokers.is_empty() && contiguous {
        if hi < ACE_HIGH {
            hi += 1;
        } else {
            lo -= 1;
        }
    }

    let mut ordered = Vec::with_capacity(cards.len());
    let mut next = naturals.into_iter().peekable();
    for v in lo..=hi {
        match next.peek() {
            Some(c) if value_of(c) == v => {
                if let Some(c) = next.next() {
                    ordered.push(c);
                }
            }
            _ => {
                if let Some(j) = jokers.pop() {
                    ordered.push(j);
                }
            }
        }
    }
    ordered
}

/// The rank a joker currently stands in for inside a run, when it fills an
/// internal gap. `None` when the run has no joker or the joker sits at an end.
///
/// Uses the same gap detection for every case, so `A, 2, [joker], 4`
/// resolves to 3 like any other gap.
pub fn joker_stand_in(run: &[Card]) -> Option<Rank> {
    if !run.iter().any(Card::is_joker) {
        return None;
    }
    let naturals: Vec<Card> = run.iter().copied().filter(|c| !c.is_joker()).collect();
    let use_high = uses_ace_high(&naturals);
    let mut values: Vec<u8> = naturals
        .iter()
        .map(|c| interpreted_value(c, use_high))
        .collect();
    values.sort_unstable();
    values
        .windows(2)
        .find(|w| w[1] - w[0] == 2)
        .and_then(|w| Rank::from_value(w[0] + 1))
}

/// All melds discoverable in `hand`, maximal only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundMelds {
    pub triplets: Vec<Vec<Card>>,
    pub runs: Vec<Vec<Card>>,
}

impl FoundMelds {
    pub fn is_empty(&self) -> bool {
        self.triplets.is_empty() && self.runs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.triplets.len() + self.runs.len()
    }

    /// Triplets first, then runs, each in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Vec<Card>> {
        self.triplets.iter().chain(self.runs.iter())
    }

    pub fn first(&self) -> Option<&Vec<Card>> {
        self.iter().next()
    }
}

/// Enumerate every combination of three or more cards in `hand` and keep the
/// valid triplets and runs, dropping any meld that is a strict subset of
/// another discovered meld of the same kind.
///
/// This is exponential in the hand size on purpose: the maximality guarantee
/// needs the full subset space. Hands stay small (9 dealt, rarely above 13),
/// so the cost is bounded in practice; see the 13-card performance test.
/// Discovery order is by combination size, then lexicographic by hand index.
pub fn find_all_melds(hand: &[Card]) -> FoundMelds {
    let mut triplets = Vec::new();
    let mut runs = Vec::new();
    for size in 3..=hand.len() {
        for_each_combination(hand.len(), size, |idx| {
            let combo: Vec<Card> = idx.iter().map(|&i| hand[i]).collect();
            match classify(&combo) {
                Some(MeldKind::Triplet) => triplets.push(combo),
                Some(MeldKind::Run) => runs.push(combo),
                None => {}
            }
        });
    }
    FoundMelds {
        triplets: keep_maximal(triplets),
        runs: keep_maximal(runs),
    }
}

fn keep_maximal(melds: Vec<Vec<Card>>) -> Vec<Vec<Card>> {
    let sets: Vec<HashSet<CardId>> = melds
        .iter()
        .map(|m| m.iter().map(|c| c.id).collect())
        .collect();
    melds
        .into_iter()
        .enumerate()
        .filter(|(i, _)| {
            !sets
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && other.len() > sets[*i].len() && sets[*i].is_subset(other))
        })
        .map(|(_, m)| m)
        .collect()
}

/// Visit every `k`-combination of `0..n` in lexicographic order.
fn for_each_combination(n: usize, k: usize, mut visit: impl FnMut(&[usize])) {
    if k == 0 || k > n {
        return;
    }
    let mut idx: Vec<usize> = (0..k).collect();
    loop {
        visit(&idx);
        // rightmost index that can still advance
        let Some(pos) = (0..k).rev().find(|&i| idx[i] < n - k + i) else {
            return;
        };
        idx[pos] += 1;
        for i in pos + 1..k {
            idx[i] = idx[i - 1] + 1;
        }
    }
}

fn natural_values(naturals: &[&Card]) -> Vec<u8> {
    let mut v: Vec<u8> = naturals.iter().filter_map(|c| c.rank.value()).collect();
    v.sort_unstable();
    v
}

fn ace_high(values: &[u8]) -> Vec<u8> {
    let mut v: Vec<u8> = values
        .iter()
        .map(|&x| if x == 1 { ACE_HIGH } else { x })
        .collect();
    v.sort_unstable();
    v
}

fn span_fits(sorted: &[u8], total_cards: usize) -> bool {
    match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => usize::from(max - min + 1) <= total_cards,
        _ => true,
    }
}

fn span(sorted: &[u8]) -> u8 {
    match (sorted.first(), sorted.last()) {
        (Some(&min), Some(&max)) => max - min,
        _ => 0,
    }
}

/// Whether the compact interpretation of these naturals treats the Ace as 14.
fn uses_ace_high(naturals: &[Card]) -> bool {
    let refs: Vec<&Card> = naturals.iter().collect();
    let low = natural_values(&refs);
    if !low.contains(&1) {
        return false;
    }
    span(&ace_high(&low)) < span(&low)
}

fn interpreted_value(card: &Card, ace_high: bool) -> u8 {
    match card.rank {
        Rank::Ace if ace_high => ACE_HIGH,
        r => r.value().unwrap_or(0),
    }
}
