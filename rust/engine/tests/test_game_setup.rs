use loba_engine::errors::GameError;
use loba_engine::game::{start_game, GameMode, GameOptions, GameSettings, GameState, TurnPhase};
use loba_engine::player::HAND_SIZE;

fn seeded(n: usize, seed: u64) -> GameState {
    GameState::new(
        n,
        GameOptions {
            seed: Some(seed),
            ..GameOptions::default()
        },
    )
    .expect("game")
}

#[test]
fn two_player_game_starts_with_89_deck_cards() {
    let gs = seeded(2, 1);
    assert_eq!(gs.players().len(), 2);
    assert!(gs.players().iter().all(|p| p.hand().len() == HAND_SIZE));
    assert_eq!(gs.discard_pile().len(), 1);
    assert_eq!(gs.deck_remaining(), 89);
    assert!(gs.melds().is_empty());
    assert_eq!(gs.phase(), TurnPhase::Draw);
    assert_eq!(gs.current_player_id(), 0);
    gs.verify_conservation().expect("conservation");
}

#[test]
fn draw_in_play_phase_is_a_noop() {
    let mut gs = seeded(2, 2);
    gs.draw_from_deck().expect("first draw");
    let hand = gs.current_player().hand().len();
    let deck = gs.deck_remaining();
    let err = gs.draw_from_deck().unwrap_err();
    assert_eq!(
        err,
        GameError::WrongPhase {
            expected: TurnPhase::Draw,
            actual: TurnPhase::Play
        }
    );
    assert!(err.is_illegal_move());
    assert_eq!(gs.current_player().hand().len(), hand);
    assert_eq!(gs.deck_remaining(), deck);
}

#[test]
fn invalid_player_counts_are_structural_failures() {
    for n in [0, 1, 6, 10] {
        let err = start_game(n).unwrap_err();
        assert_eq!(err, GameError::InvalidPlayerCount(n));
        assert!(!err.is_illegal_move());
    }
}

#[test]
fn game_options_carry_mode_and_thresholds() {
    let gs = GameState::new(
        3,
        GameOptions {
            mode: GameMode::Points,
            settings: GameSettings {
                max_score: 50,
                max_rounds: 2,
                reshuffle_discard: true,
            },
            seed: Some(3),
            human_players: 0,
        },
    )
    .expect("game");
    assert_eq!(gs.mode(), GameMode::Points);
    assert_eq!(gs.settings().max_score, 50);
    assert!(gs.players().iter().all(|p| p.is_ai()));
    assert_eq!(gs.seed(), 3);
}

#[test]
fn mode_names_parse() {
    assert_eq!("points".parse::<GameMode>(), Ok(GameMode::Points));
    assert_eq!("Loba".parse::<GameMode>(), Ok(GameMode::Rounds));
    assert!("poker".parse::<GameMode>().is_err());
}

#[test]
fn seeded_games_replay_identically_across_rounds() {
    let mut a = seeded(2, 77);
    let mut b = seeded(2, 77);
    for _ in 0..3 {
        assert_eq!(a.players()[1].hand(), b.players()[1].hand());
        assert_eq!(a.discard_top(), b.discard_top());
        a.start_new_round().expect("round");
        b.start_new_round().expect("round");
    }
    assert_eq!(a.round(), 4);
}
