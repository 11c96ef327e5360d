use loba_cli::run;

fn run_cli(args: &[&str]) -> (i32, String, String) {
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(args, &mut out, &mut err);
    (
        code,
        String::from_utf8_lossy(&out).into_owned(),
        String::from_utf8_lossy(&err).into_owned(),
    )
}

#[test]
fn help_goes_to_stdout_with_exit_zero() {
    let (code, stdout, stderr) = run_cli(&["loba", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("play"));
    assert!(stdout.contains("sim"));
    assert!(stderr.is_empty());
}

#[test]
fn unknown_command_prints_usage_and_exits_two() {
    let (code, stdout, stderr) = run_cli(&["loba", "shuffle"]);
    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("Usage: loba <command> [options]"));
    for c in ["play", "sim", "eval", "deal", "cfg"] {
        assert!(stderr.contains(&format!("  {}\n", c)), "missing {}", c);
    }
}

#[test]
fn deal_is_reproducible_by_seed() {
    let (code, first, _) = run_cli(&["loba", "deal", "--seed", "99", "--players", "4"]);
    assert_eq!(code, 0);
    let (_, second, _) = run_cli(&["loba", "deal", "--seed", "99", "--players", "4"]);
    assert_eq!(first, second);
    assert!(first.contains("Hand P4: "));
    assert!(first.contains(&format!("Deck: {} cards", 108 - 4 * 9 - 1)));
}

#[test]
fn deal_rejects_a_sixth_player() {
    let (code, stdout, stderr) = run_cli(&["loba", "deal", "--players", "6"]);
    assert_eq!(code, 2);
    assert!(stdout.is_empty());
    assert!(stderr.contains("2 to 5 players"));
}

#[test]
fn eval_reports_both_strategies() {
    let (code, stdout, stderr) = run_cli(&[
        "loba", "eval", "--ai-a", "heuristic", "--ai-b", "random", "--games", "2", "--seed",
        "4",
    ]);
    assert_eq!(code, 0, "stderr: {}", stderr);
    assert!(stdout.contains("eval: heuristic vs random games=2 seed=4"));
    assert!(stdout.contains("Games: 2"));
    assert!(stdout.lines().any(|l| l.starts_with("heuristic: wins ")));
    assert!(stdout.lines().any(|l| l.starts_with("random: wins ")));
}

#[test]
fn eval_rejects_unknown_strategy() {
    let (code, _, stderr) = run_cli(&[
        "loba", "eval", "--ai-a", "heuristic", "--ai-b", "oracle", "--games", "1",
    ]);
    assert_eq!(code, 2);
    assert!(stderr.contains("unknown strategy 'oracle'"));
}

#[test]
fn sim_requires_at_least_one_game() {
    let (code, _, stderr) = run_cli(&["loba", "sim", "--games", "0"]);
    assert_eq!(code, 2);
    assert!(stderr.contains("games must be >= 1"));
}
