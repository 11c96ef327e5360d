//! # loba-engine: Loba Rummy Rules Engine
//!
//! A deterministic rules engine for Loba, a draw-and-meld rummy variant
//! played by 2 to 5 players with two 52-card decks plus four jokers.
//! Provides card modeling, meld evaluation, the turn state machine and
//! round history records, with reproducible RNG for replay and testing.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, CardId, Card) and supply construction
//! - [`deck`] - Deterministic deck shuffling with ChaCha20 RNG
//! - [`melds`] - Triplet/run validation, canonical run order and meld discovery
//! - [`scoring`] - Penalty points of a hand
//! - [`game`] - Game state, setup and round reset
//! - [`engine`] - The action engine: draw, meld, lay-off and discard
//! - [`rules`] - Meld and lay-off legality checks
//! - [`player`] - Player state and turn actions
//! - [`logger`] - Action history and RoundRecord serialization
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use loba_engine::game::{GameOptions, GameState, TurnPhase};
//!
//! let mut state = GameState::new(2, GameOptions { seed: Some(42), ..GameOptions::default() }).unwrap();
//! state.draw_from_deck().unwrap();
//! assert_eq!(state.phase(), TurnPhase::Play);
//!
//! // Discard the card just drawn and pass the turn
//! let drawn = state.just_drawn().unwrap();
//! state.select_card(drawn).unwrap();
//! state.discard_card().unwrap();
//! assert_eq!(state.current_player_id(), 1);
//! ```
//!
//! ## Meld Evaluation
//!
//! ```rust
//! use loba_engine::cards::{full_deck, Rank, Suit};
//! use loba_engine::melds::{is_run, is_triplet};
//!
//! let deck = full_deck();
//! let pick = |r, s| *deck.iter().find(|c| c.rank == r && c.suit == s).unwrap();
//!
//! assert!(is_run(&[pick(Rank::Nine, Suit::Hearts), pick(Rank::Ten, Suit::Hearts), pick(Rank::Jack, Suit::Hearts)]));
//! assert!(!is_run(&[pick(Rank::King, Suit::Hearts), pick(Rank::Ace, Suit::Hearts), pick(Rank::Two, Suit::Hearts)]));
//! assert!(is_triplet(&[pick(Rank::Seven, Suit::Hearts), pick(Rank::Seven, Suit::Diamonds), pick(Rank::Seven, Suit::Clubs)]));
//! ```
//!
//! ## Rejected Actions
//!
//! Illegal moves return `Err` and leave the state untouched, so the action
//! API can be called speculatively:
//!
//! ```rust
//! use loba_engine::errors::GameError;
//! use loba_engine::game::start_game;
//!
//! let mut state = start_game(2).unwrap();
//! let before = state.current_player().hand().len();
//! assert!(matches!(state.discard_card(), Err(GameError::WrongPhase { .. })));
//! assert_eq!(state.current_player().hand().len(), before);
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod logger;
pub mod melds;
pub mod player;
pub mod rules;
pub mod scoring;
