use loba_engine::cards::{CardFace, CardId};
use loba_engine::engine::TurnEvent;
use loba_engine::errors::GameError;
use loba_engine::game::{GameMode, GameOptions, GameSettings, GameState, TableLayout, TurnPhase};
use loba_engine::melds::MeldKind;
use loba_engine::player::TurnAction;

fn f(s: &str) -> CardFace {
    s.parse().expect("face")
}

fn faces(list: &[&str]) -> Vec<CardFace> {
    list.iter().map(|s| f(s)).collect()
}

fn table(hands: &[&[&str]], discard: &[&str], melds: &[&[&str]]) -> TableLayout {
    TableLayout {
        hands: hands.iter().map(|h| faces(h)).collect(),
        discard: faces(discard),
        melds: melds.iter().map(|m| faces(m)).collect(),
        deck_top: Vec::new(),
    }
}

fn options(mode: GameMode, max_score: u32, max_rounds: u32) -> GameOptions {
    GameOptions {
        mode,
        settings: GameSettings {
            max_score,
            max_rounds,
            reshuffle_discard: false,
        },
        seed: Some(9),
        human_players: 1,
    }
}

/// Ids of the current player's cards with these faces, in order.
fn pick(gs: &GameState, list: &[&str]) -> Vec<CardId> {
    let mut used: Vec<CardId> = Vec::new();
    for s in list {
        let card = gs
            .current_player()
            .hand()
            .iter()
            .find(|c| c.face() == f(s) && !used.contains(&c.id))
            .expect("card in hand");
        used.push(card.id);
    }
    used
}

/// Put the current player into the play phase with a known draw on top.
fn draw_known(gs: &mut GameState) -> CardId {
    gs.draw_from_deck().expect("draw");
    gs.just_drawn().expect("just drawn")
}

/// Draw and immediately discard the drawn card until the deck runs out.
fn cycle_until_deck_empty(gs: &mut GameState) {
    while gs.deck_remaining() > 0 {
        let drawn = draw_known(gs);
        gs.select_card(drawn).unwrap();
        gs.discard_card().unwrap();
    }
}

#[test]
fn turns_pass_round_robin() {
    let layout = table(&[&["9C"], &["KD"], &["2S"]], &["2H"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    for expected in [1, 2, 0, 1] {
        let drawn = draw_known(&mut gs);
        gs.select_card(drawn).unwrap();
        let out = gs.discard_card().unwrap();
        assert!(out.round_end.is_none());
        assert_eq!(gs.current_player_id(), expected);
        assert_eq!(gs.phase(), TurnPhase::Draw);
        assert!(gs.just_drawn().is_none());
    }
}

#[test]
fn melding_keeps_the_play_phase() {
    let layout = table(&[&["9C", "9D", "9H", "4S"], &["KD", "7S", "JK"]], &["2H"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["9C", "9D", "9H"])).unwrap();
    let melded = gs.meld_selected_cards().unwrap();
    assert!(melded.round_end.is_none());
    assert_eq!(melded.event, TurnEvent::Melded { player: 0, meld_index: 0 });
    assert_eq!(gs.phase(), TurnPhase::Play);
    assert_eq!(gs.melds()[0].kind, MeldKind::Triplet);
    assert_eq!(gs.current_player().hand().len(), 2);
    assert!(gs.selection().is_empty());
}

#[test]
fn melding_needs_three_cards() {
    let layout = table(&[&["9C", "9D"], &["KD"]], &["2H"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["9C", "9D"])).unwrap();
    assert!(matches!(
        gs.meld_selected_cards(),
        Err(GameError::SelectionSize { actual: 2, .. })
    ));
    assert!(gs.melds().is_empty());
    assert_eq!(gs.selection().len(), 2);
}

#[test]
fn last_discard_triggers_round_over_with_exact_penalties() {
    let layout = TableLayout {
        deck_top: faces(&["4S"]),
        ..table(&[&["5C", "6C", "7C"], &["KD", "7S", "JK"]], &["2H"], &[])
    };
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["5C", "6C", "7C"])).unwrap();
    gs.meld_selected_cards().unwrap();
    gs.set_selection(pick(&gs, &["4S"])).unwrap();
    let out = gs.discard_card().unwrap();

    let summary = out.round_end.expect("round ended");
    assert_eq!(summary.winner, 0);
    assert_eq!(summary.penalties, vec![(1, 10 + 7 + 10)]);
    assert!(!summary.game_over);
    assert_eq!(gs.phase(), TurnPhase::RoundOver);
    assert_eq!(gs.players()[0].rounds_won(), 1);
    assert_eq!(gs.players()[0].score(), 0);
    assert_eq!(gs.players()[1].score(), 27);
    // losers keep their cards until the next deal
    assert_eq!(gs.players()[1].hand().len(), 3);
    assert_eq!(gs.current_player_id(), 0);
    assert_eq!(gs.last_round(), Some(&summary));
    gs.verify_conservation().unwrap();

    gs.start_new_round().unwrap();
    assert_eq!(gs.phase(), TurnPhase::Draw);
    assert_eq!(gs.players()[1].score(), 27);
    assert_eq!(gs.players()[0].rounds_won(), 1);
    assert!(gs.melds().is_empty());
    assert_eq!(gs.discard_pile().len(), 1);
}

#[test]
fn reaching_rounds_threshold_is_game_over() {
    let layout = TableLayout {
        deck_top: faces(&["4S"]),
        ..table(&[&["5C", "6C", "7C"], &["KD"]], &["2H"], &[])
    };
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 1)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["5C", "6C", "7C"])).unwrap();
    gs.meld_selected_cards().unwrap();
    gs.set_selection(pick(&gs, &["4S"])).unwrap();
    let summary = gs.discard_card().unwrap().round_end.unwrap();
    assert!(summary.game_over);
    assert_eq!(gs.phase(), TurnPhase::GameOver);
    assert_eq!(gs.start_new_round(), Err(GameError::GameOver));
    assert_eq!(gs.draw_from_deck().unwrap_err(), GameError::GameOver);
}

#[test]
fn reaching_points_threshold_is_game_over() {
    let layout = TableLayout {
        deck_top: faces(&["4S"]),
        ..table(&[&["5C", "6C", "7C"], &["KD", "QD"], &["2S"]], &["2H"], &[])
    };
    let mut gs = GameState::from_layout(layout, options(GameMode::Points, 20, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["5C", "6C", "7C"])).unwrap();
    gs.meld_selected_cards().unwrap();
    gs.set_selection(pick(&gs, &["4S"])).unwrap();
    let summary = gs.discard_card().unwrap().round_end.unwrap();
    assert_eq!(summary.penalties, vec![(1, 20), (2, 2)]);
    assert_eq!(summary.scores, vec![0, 20, 2]);
    assert!(summary.game_over);
    assert_eq!(gs.phase(), TurnPhase::GameOver);
}

#[test]
fn sopo_sends_card_to_discard_without_changing_phase() {
    let layout = table(
        &[&["7H", "2C", "9S"], &["KD"]],
        &["3D"],
        &[&["7H", "7D", "7C"]],
    );
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    let hand_before = gs.current_player().hand().len();
    let sevens = pick(&gs, &["7H"]);
    gs.set_selection(sevens.clone()).unwrap();
    let out = gs.lay_off_cards(0).unwrap();

    assert_eq!(
        out.event,
        TurnEvent::Sopo {
            player: 0,
            card: sevens[0]
        }
    );
    assert_eq!(gs.melds()[0].cards.len(), 3);
    assert_eq!(gs.discard_top().map(|c| c.id), Some(sevens[0]));
    assert_eq!(gs.current_player().hand().len(), hand_before - 1);
    assert_eq!(gs.phase(), TurnPhase::Play);
    assert_eq!(gs.current_player_id(), 0);
    assert!(gs.selection().is_empty());
    gs.verify_conservation().unwrap();
}

#[test]
fn sopo_requires_a_suit_already_present() {
    let layout = table(&[&["7S", "2C"], &["KD"]], &["3D"], &[&["7H", "7D", "7C"]]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["7S"])).unwrap();
    assert!(matches!(
        gs.lay_off_cards(0),
        Err(GameError::IllegalLayOff(_))
    ));
    assert_eq!(gs.discard_pile().len(), 1);
}

#[test]
fn run_lay_off_extends_and_reorders() {
    let layout = table(&[&["4S", "8S", "KD"], &["KC"]], &["3D"], &[&["5S", "6S", "7S"]]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["8S", "4S"])).unwrap();
    let out = gs.lay_off_cards(0).unwrap();
    assert_eq!(out.event, TurnEvent::LaidOff { player: 0, meld_index: 0 });
    let shown: Vec<String> = gs.melds()[0].cards.iter().map(|c| c.to_string()).collect();
    assert_eq!(shown, vec!["4♠", "5♠", "6♠", "7♠", "8♠"]);
}

#[test]
fn joker_in_the_middle_cannot_be_displaced() {
    let layout = table(&[&["6S", "8S", "KD"], &["KC"]], &["3D"], &[&["5S", "JK", "7S"]]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["6S"])).unwrap();
    assert_eq!(gs.lay_off_cards(0), Err(GameError::JokerDisplacement(f("6S"))));
    assert_eq!(gs.melds()[0].cards.len(), 3);
    assert!(gs.current_player().holds(pick(&gs, &["6S"])[0]));

    // extending the end is still fine, but only one card at a time
    gs.set_selection(pick(&gs, &["8S"])).unwrap();
    gs.lay_off_cards(0).unwrap();
    assert_eq!(gs.melds()[0].cards.len(), 4);
}

#[test]
fn discard_pickup_must_form_a_meld() {
    let layout = table(&[&["8H", "9H", "2C"], &["KC"]], &["10H"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();

    gs.set_selection(pick(&gs, &["2C", "9H"])).unwrap();
    assert_eq!(gs.draw_from_discard(), Err(GameError::NotAMeld));
    assert_eq!(gs.discard_pile().len(), 1);
    assert_eq!(gs.phase(), TurnPhase::Draw);

    gs.set_selection(pick(&gs, &["9H", "8H"])).unwrap();
    let out = gs.draw_from_discard().unwrap();
    assert_eq!(
        out.event,
        TurnEvent::PickedUpDiscard {
            player: 0,
            meld_index: 0
        }
    );
    assert!(gs.discard_pile().is_empty());
    assert_eq!(gs.melds()[0].kind, MeldKind::Run);
    assert_eq!(gs.current_player().hand().len(), 1);
    assert_eq!(gs.phase(), TurnPhase::Play);
    assert!(gs.selection().is_empty());
    assert!(gs.just_drawn().is_none());
    assert_eq!(gs.draw_from_discard(), Err(GameError::WrongPhase {
        expected: TurnPhase::Draw,
        actual: TurnPhase::Play
    }));
}

#[test]
fn discard_pickup_on_an_empty_pile_is_rejected() {
    let layout = table(&[&["8H", "9H"], &["KC"]], &[], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    gs.set_selection(pick(&gs, &["9H", "8H"])).unwrap();
    assert_eq!(gs.draw_from_discard(), Err(GameError::DiscardPileEmpty));
}

#[test]
fn empty_deck_rejects_the_draw() {
    let layout = table(&[&["8H"], &["KC"]], &["2D"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    cycle_until_deck_empty(&mut gs);
    let hand = gs.current_player().hand().len();
    assert_eq!(gs.draw_from_deck(), Err(GameError::DeckEmpty));
    assert_eq!(gs.current_player().hand().len(), hand);
    assert_eq!(gs.phase(), TurnPhase::Draw);
    gs.verify_conservation().unwrap();
}

#[test]
fn empty_deck_reshuffles_discards_when_enabled() {
    let layout = table(&[&["8H"], &["KC"]], &["2D"], &[]);
    let mut opts = options(GameMode::Rounds, 100, 5);
    opts.settings.reshuffle_discard = true;
    let mut gs = GameState::from_layout(layout, opts).unwrap();
    cycle_until_deck_empty(&mut gs);
    let pile = gs.discard_pile().len();
    let top = gs.discard_top();
    gs.draw_from_deck().unwrap();
    assert_eq!(gs.discard_pile().len(), 1);
    assert_eq!(gs.discard_top(), top);
    assert_eq!(gs.deck_remaining(), pile - 2);
    gs.verify_conservation().unwrap();
}

#[test]
fn discard_needs_exactly_one_card() {
    let layout = table(&[&["8H", "9H"], &["KC"]], &["2D"], &[]);
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    draw_known(&mut gs);
    gs.set_selection(pick(&gs, &["8H", "9H"])).unwrap();
    assert_eq!(
        gs.discard_card(),
        Err(GameError::SelectionSize {
            expected: "exactly 1",
            actual: 2
        })
    );
    gs.clear_selection();
    assert!(gs.discard_card().is_err());
    assert_eq!(gs.current_player().hand().len(), 3);
}

#[test]
fn apply_action_drives_a_full_turn() {
    let layout = TableLayout {
        deck_top: faces(&["7C"]),
        ..table(&[&["5C", "6C", "KD", "2S"], &["KC"]], &["2D"], &[])
    };
    let mut gs = GameState::from_layout(layout, options(GameMode::Rounds, 100, 5)).unwrap();
    gs.apply_action(&TurnAction::DrawFromDeck).unwrap();
    let run = pick(&gs, &["5C", "6C", "7C"]);
    gs.apply_action(&TurnAction::Meld { cards: run }).unwrap();
    let kd = pick(&gs, &["KD"])[0];
    let out = gs.apply_action(&TurnAction::Discard { card: kd }).unwrap();
    assert_eq!(out.event, TurnEvent::Discarded { player: 0, card: kd });
    assert_eq!(gs.current_player_id(), 1);
    assert_eq!(gs.phase(), TurnPhase::Draw);
    assert_eq!(gs.history().len(), 3);
    gs.verify_conservation().unwrap();
}
