use super::common::{run, s, write_cache, write_image};
use phashdupe::cache::{CacheEntry, FingerprintStore};
use phashdupe::error::ExitCode;
use phashdupe::fingerprint::Fingerprint;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_write_persists_only_new_entries() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let cached = dir.path().join("cached.png").display().to_string();
    let fresh = dir.path().join("fresh.png");
    write_image(&fresh, 2);
    write_cache(&db, &[format!("{cached}|1|00000000000000ff")]);

    let run = run(&["-i", "-s", s(&db), "-w", &cached, s(&fresh)]);
    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout.lines().count(), 1);

    let content = fs::read_to_string(&db).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], format!("{cached}|1|00000000000000ff"));
    assert!(lines[1].starts_with(&format!("{}|1|", fresh.display())));
}

#[test]
fn test_without_write_store_is_read_only() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 1);

    let run = run(&["-i", "-s", s(&db), s(&a), s(&b)]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert!(!db.exists());
}

#[test]
fn test_second_run_appends_nothing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 3);

    let first = run(&["-i", "-s", s(&db), "-w", s(&a), s(&b)]);
    let after_first = fs::read_to_string(&db).unwrap();
    let second = run(&["-i", "-s", s(&db), "-w", s(&a), s(&b)]);

    assert_eq!(first.stdout, second.stdout);
    assert_eq!(fs::read_to_string(&db).unwrap(), after_first);
    assert_eq!(after_first.lines().count(), 2);
}

#[test]
fn test_cached_fingerprint_is_trusted_over_file_content() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 1);
    write_cache(&db, &[format!("{}|1|0000000000000001", a.display())]);

    let run = run(&["-i", "-s", s(&db), s(&a), s(&b)]);

    // a is taken from the cache, so the pair is not at distance zero
    let line = run.stdout.lines().next().unwrap().to_string();
    assert!(!line.starts_with("0 - "));
}

#[test]
fn test_multi_block_entries_use_length_penalty() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let short = dir.path().join("short.mp4").display().to_string();
    let long = dir.path().join("long.mp4").display().to_string();
    write_cache(
        &db,
        &[
            format!("{short}|2|00000000000000ff 0000000000000000"),
            format!("{long}|3|00000000000000ff 0000000000000001 ffffffffffffffff"),
        ],
    );

    let run = run(&["-v", "-s", s(&db), &short, &long]);

    // One differing bit in the paired blocks plus 64 for the extra block
    assert_eq!(run.stdout, format!("65 - {short} - {long}\n"));
}

#[test]
fn test_store_round_trip_through_library() {
    let dir = tempdir().unwrap();
    let store = FingerprintStore::new(dir.path().join("fp.db"));
    let entries = vec![
        CacheEntry::new(dir.path().join("x.mkv"), Fingerprint::new(vec![1, 2, 3]).unwrap()),
        CacheEntry::new(dir.path().join("y.png"), Fingerprint::single(0xdead_beef)),
    ];

    assert_eq!(store.append(&entries).unwrap(), 2);
    let loaded = store.load().unwrap();

    assert_eq!(loaded.len(), 2);
    for entry in &entries {
        assert_eq!(loaded[entry.path.as_os_str()], entry.fingerprint);
    }
}
