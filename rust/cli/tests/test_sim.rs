use loba_cli::run;
use loba_engine::logger::RoundRecord;
use std::fs;

#[test]
fn sim_writes_one_jsonl_line_per_round() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history").join("rounds.jsonl");
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(
        [
            "loba",
            "sim",
            "--games",
            "2",
            "--players",
            "3",
            "--seed",
            "1",
            "--output",
            path.to_string_lossy().as_ref(),
        ],
        &mut out,
        &mut err,
    );
    assert_eq!(code, 0, "stderr: {}", String::from_utf8_lossy(&err));

    let stdout = String::from_utf8_lossy(&out);
    assert!(stdout.contains("sim: games=2 players=3"));
    assert!(stdout.contains("Games played: 2"));
    assert!(stdout.contains("P3 wins: "));

    let contents = fs::read_to_string(&path).unwrap();
    let records: Vec<RoundRecord> = contents
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert!(!records.is_empty());

    let mut ids: Vec<&str> = records.iter().map(|r| r.round_id.as_str()).collect();
    ids.dedup();
    assert_eq!(ids.len(), records.len(), "round ids must be unique");
    for rec in &records {
        assert!(rec.ts.is_some());
        let meta = rec.meta.as_ref().unwrap();
        let abandoned = meta["abandoned"].as_bool().unwrap();
        assert_eq!(rec.summary.is_none(), abandoned);
        assert!(!rec.actions.is_empty());
    }
}

#[test]
fn seeded_simulations_agree() {
    let summary = |seed: &str| {
        let mut out: Vec<u8> = Vec::new();
        let mut err: Vec<u8> = Vec::new();
        let code = run(
            ["loba", "sim", "--games", "2", "--seed", seed],
            &mut out,
            &mut err,
        );
        assert_eq!(code, 0);
        String::from_utf8(out).unwrap()
    };
    assert_eq!(summary("21"), summary("21"));
}

#[test]
fn unwritable_output_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as the history file.
    let mut out: Vec<u8> = Vec::new();
    let mut err: Vec<u8> = Vec::new();
    let code = run(
        [
            "loba",
            "sim",
            "--games",
            "1",
            "--output",
            dir.path().to_string_lossy().as_ref(),
        ],
        &mut out,
        &mut err,
    );
    assert_eq!(code, 2);
    assert!(String::from_utf8_lossy(&err).contains("Failed to open output file"));
}
