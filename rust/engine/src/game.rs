use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::{full_deck, Card, CardFace, CardId, DECK_SIZE};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::logger::{ActionRecord, RoundSummary};
use crate::melds::Meld;
use crate::player::{Player, PlayerId, HAND_SIZE, MAX_PLAYERS, MIN_PLAYERS};

/// Where the current turn stands.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TurnPhase {
    /// The current player must draw (deck or discard pick-up)
    Draw,
    /// The current player may meld, lay off, and must finally discard
    Play,
    /// Someone emptied their hand; waiting for a new round
    RoundOver,
    /// A threshold was reached; terminal
    GameOver,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnPhase::Draw => "draw",
            TurnPhase::Play => "play",
            TurnPhase::RoundOver => "round-over",
            TurnPhase::GameOver => "game-over",
        };
        f.write_str(s)
    }
}

/// How the game ends.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    /// Ends when any player's penalty score reaches `max_score`
    Points,
    /// Ends when a round winner reaches `max_rounds` wins
    Rounds,
}

impl std::str::FromStr for GameMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "points" | "puntos" => Ok(GameMode::Points),
            "rounds" | "loba" => Ok(GameMode::Rounds),
            other => Err(format!("unknown game mode: {}", other)),
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    pub max_score: u32,
    pub max_rounds: u32,
    /// Rebuild the deck from the discard pile (all but the top card) when a
    /// draw finds it empty. Off by default: an empty deck rejects the draw.
    #[serde(default)]
    pub reshuffle_discard: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_score: 100,
            max_rounds: 5,
            reshuffle_discard: false,
        }
    }
}

/// Construction options for [`GameState::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOptions {
    pub mode: GameMode,
    pub settings: GameSettings,
    /// Deck seed; `None` draws a random one
    pub seed: Option<u64>,
    /// The first `human_players` seats are human, the rest AI
    pub human_players: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            mode: GameMode::Rounds,
            settings: GameSettings::default(),
            seed: None,
            human_players: 1,
        }
    }
}

/// Faces to lay out on a table, for tests and debugging tools.
///
/// Each face consumes the first unused physical card of that face; the rest
/// of the supply becomes the (shuffled) deck with `deck_top[0]` drawn first.
#[derive(Debug, Clone, Default)]
pub struct TableLayout {
    pub hands: Vec<Vec<CardFace>>,
    pub discard: Vec<CardFace>,
    pub melds: Vec<Vec<CardFace>>,
    pub deck_top: Vec<CardFace>,
}

/// Aggregate root of one game. Every physical card is always in exactly one
/// of: a hand, the deck, the discard pile, or a table meld.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Deck,
    pub(crate) discard_pile: Vec<Card>,
    pub(crate) melds: Vec<Meld>,
    pub(crate) current_player: PlayerId,
    pub(crate) phase: TurnPhase,
    pub(crate) selected: Vec<CardId>,
    pub(crate) mode: GameMode,
    pub(crate) settings: GameSettings,
    pub(crate) forced_next_card: Option<CardFace>,
    pub(crate) just_drawn: Option<CardId>,
    pub(crate) seed: u64,
    pub(crate) round: u32,
    pub(crate) history: Vec<ActionRecord>,
    pub(crate) last_round: Option<RoundSummary>,
}

/// Start a game with default options (rounds mode, seat 0 human).
pub fn start_game(num_players: usize) -> Result<GameState, GameError> {
    GameState::new(num_players, GameOptions::default())
}

impl GameState {
    /// Shuffle a fresh supply, deal nine cards to each player and seed the
    /// discard pile with one card.
    ///
    /// # Errors
    ///
    /// [`GameError::InvalidPlayerCount`] unless `2 <= num_players <= 5`.
    ///
    /// # Examples
    ///
    /// ```
    /// use loba_engine::game::{GameOptions, GameState, TurnPhase};
    ///
    /// let options = GameOptions { seed: Some(7), ..GameOptions::default() };
    /// let state = GameState::new(2, options).unwrap();
    /// assert_eq!(state.phase(), TurnPhase::Draw);
    /// assert_eq!(state.deck_remaining(), 108 - 2 * 9 - 1);
    /// ```
    pub fn new(num_players: usize, options: GameOptions) -> Result<Self, GameError> {
        validate_player_count(num_players)?;
        let seed = options.seed.unwrap_or_else(rand::random);
        let players = (0..num_players)
            .map(|i| Player::new(i, i >= options.human_players))
            .collect();
        let mut state = Self::empty(players, options, seed);
        state.deal_round()?;
        tracing::info!(players = num_players, seed, mode = ?state.mode, "game started");
        Ok(state)
    }

    /// Build a state from an explicit card layout. Seat 0 is current and the
    /// phase is `draw`.
    pub fn from_layout(layout: TableLayout, options: GameOptions) -> Result<Self, GameError> {
        validate_player_count(layout.hands.len())?;
        let seed = options.seed.unwrap_or_else(rand::random);
        let players = (0..layout.hands.len())
            .map(|i| Player::new(i, i >= options.human_players))
            .collect();
        let mut state = Self::empty(players, options, seed);

        let mut pool = full_deck();
        let mut take = |face: &CardFace| -> Result<Card, GameError> {
            let idx = pool
                .iter()
                .position(|c| c.face() == *face)
                .ok_or(GameError::CardUnavailable(*face))?;
            Ok(pool.remove(idx))
        };

        for (seat, faces) in layout.hands.iter().enumerate() {
            for face in faces {
                let card = take(face)?;
                state.players[seat].give_card(card);
            }
        }
        for face in &layout.discard {
            let card = take(face)?;
            state.discard_pile.push(card);
        }
        for faces in &layout.melds {
            let cards = faces.iter().map(&mut take).collect::<Result<Vec<_>, _>>()?;
            let meld = Meld::from_cards(&cards).ok_or(GameError::NotAMeld)?;
            state.melds.push(meld);
        }
        let top = layout
            .deck_top
            .iter()
            .map(&mut take)
            .collect::<Result<Vec<_>, _>>()?;

        state.deck.refill(pool);
        for card in top.into_iter().rev() {
            state.deck.push_top(card);
        }
        state.round = 1;
        Ok(state)
    }

    fn empty(players: Vec<Player>, options: GameOptions, seed: u64) -> Self {
        Self {
            players,
            deck: Deck::new_with_seed(seed),
            discard_pile: Vec::new(),
            melds: Vec::new(),
            current_player: 0,
            phase: TurnPhase::Draw,
            selected: Vec::new(),
            mode: options.mode,
            settings: options.settings,
            forced_next_card: None,
            just_drawn: None,
            seed,
            round: 0,
            history: Vec::new(),
            last_round: None,
        }
    }

    /// Reset for the next round: rebuild and reshuffle the supply, re-deal,
    /// reseed the discard pile and clear the table. Scores, rounds won and the
    /// current player carry over.
    ///
    /// # Errors
    ///
    /// [`GameError::GameOver`] once the game has ended.
    pub fn start_new_round(&mut self) -> Result<(), GameError> {
        if self.phase == TurnPhase::GameOver {
            return Err(GameError::GameOver);
        }
        self.deal_round()?;
        tracing::info!(round = self.round, "new round dealt");
        Ok(())
    }

    fn deal_round(&mut self) -> Result<(), GameError> {
        self.deck.shuffle();
        for p in &mut self.players {
            p.take_hand();
        }
        self.discard_pile.clear();
        self.melds.clear();
        for _ in 0..HAND_SIZE {
            for p in &mut self.players {
                let c = self.deck.draw().ok_or(GameError::DeckEmpty)?;
                p.give_card(c);
            }
        }
        let seed_card = self.deck.draw().ok_or(GameError::DeckEmpty)?;
        self.discard_pile.push(seed_card);
        self.selected.clear();
        self.just_drawn = None;
        self.history.clear();
        self.phase = TurnPhase::Draw;
        self.round += 1;
        Ok(())
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(id)
    }
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.players
    }
    pub fn current_player_id(&self) -> PlayerId {
        self.current_player
    }
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player]
    }
    pub(crate) fn current_player_mut(&mut self) -> &mut Player {
        &mut self.players[self.current_player]
    }
    pub fn deck(&self) -> &Deck {
        &self.deck
    }
    pub fn deck_remaining(&self) -> usize {
        self.deck.remaining()
    }
    pub fn discard_pile(&self) -> &[Card] {
        &self.discard_pile
    }
    pub fn discard_top(&self) -> Option<Card> {
        self.discard_pile.last().copied()
    }
    pub fn melds(&self) -> &[Meld] {
        &self.melds
    }
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }
    pub fn mode(&self) -> GameMode {
        self.mode
    }
    pub fn settings(&self) -> GameSettings {
        self.settings
    }
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// 1-based round number.
    pub fn round(&self) -> u32 {
        self.round
    }
    /// The card drawn from the deck this turn, for highlighting.
    pub fn just_drawn(&self) -> Option<CardId> {
        self.just_drawn
    }
    pub fn forced_next_card(&self) -> Option<CardFace> {
        self.forced_next_card
    }
    /// Committed actions of the current round, oldest first.
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }
    pub fn last_round(&self) -> Option<&RoundSummary> {
        self.last_round.as_ref()
    }
    pub fn is_game_over(&self) -> bool {
        self.phase == TurnPhase::GameOver
    }

    /// Debug override: the next deck draw takes this face if the deck holds
    /// one. Rank and suit strings are validated (the joker rank and the joker
    /// suit must come together); invalid input leaves the state untouched.
    pub fn set_forced_next_card(&mut self, rank: &str, suit: &str) -> Result<CardFace, GameError> {
        let face = CardFace::parse(rank, suit).inspect_err(|e| {
            tracing::warn!(rank, suit, reason = %e, "debug override rejected");
        })?;
        self.forced_next_card = Some(face);
        tracing::debug!(card = %face, "debug override set");
        Ok(face)
    }

    /// Selected card ids, in selection order.
    pub fn selection(&self) -> &[CardId] {
        &self.selected
    }

    /// The selected cards resolved against the current player's hand.
    pub fn selected_cards(&self) -> Vec<Card> {
        let p = self.current_player();
        self.selected.iter().filter_map(|&id| p.card(id)).collect()
    }

    pub fn select_card(&mut self, id: CardId) -> Result<(), GameError> {
        if !self.current_player().holds(id) {
            return Err(GameError::CardNotInHand(id));
        }
        if !self.selected.contains(&id) {
            self.selected.push(id);
        }
        Ok(())
    }

    pub fn deselect_card(&mut self, id: CardId) {
        self.selected.retain(|&s| s != id);
    }

    /// Flip the selection state of a hand card. Returns whether it is now selected.
    pub fn toggle_card(&mut self, id: CardId) -> Result<bool, GameError> {
        if self.selected.contains(&id) {
            self.deselect_card(id);
            Ok(false)
        } else {
            self.select_card(id)?;
            Ok(true)
        }
    }

    /// Replace the selection. All ids must be distinct cards in the current
    /// player's hand; on error the previous selection is kept.
    pub fn set_selection(&mut self, ids: Vec<CardId>) -> Result<(), GameError> {
        let mut seen = HashSet::with_capacity(ids.len());
        for &id in &ids {
            if !self.current_player().holds(id) {
                return Err(GameError::CardNotInHand(id));
            }
            if !seen.insert(id) {
                return Err(GameError::DuplicateSelection(id));
            }
        }
        self.selected = ids;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Check that hands, deck, discard pile and melds together hold exactly
    /// the 108 cards of the canonical supply.
    pub fn verify_conservation(&self) -> Result<(), GameError> {
        let canonical = full_deck();
        let mut seen: HashSet<CardId> = HashSet::with_capacity(DECK_SIZE);
        let all = self
            .players
            .iter()
            .flat_map(|p| p.hand().iter())
            .chain(self.deck.cards())
            .chain(self.discard_pile.iter())
            .chain(self.melds.iter().flat_map(|m| m.cards.iter()));
        for card in all {
            let Some(original) = canonical.get(usize::from(card.id.0)) else {
                return Err(GameError::Conservation(format!("unknown card id {}", card.id)));
            };
            if !original.same_face(card) {
                return Err(GameError::Conservation(format!(
                    "card {} changed face to {}",
                    card.id, card
                )));
            }
            if !seen.insert(card.id) {
                return Err(GameError::Conservation(format!(
                    "card {} ({}) appears twice",
                    card.id, card
                )));
            }
        }
        if seen.len() != DECK_SIZE {
            return Err(GameError::Conservation(format!(
                "{} of {} cards accounted for",
                seen.len(),
                DECK_SIZE
            )));
        }
        Ok(())
    }
}

fn validate_player_count(n: usize) -> Result<(), GameError> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
        Ok(())
    } else {
        Err(GameError::InvalidPlayerCount(n))
    }
}
