use super::common::{run_with, s, write_image};
use phashdupe::config::Config;
use phashdupe::duplicates::FinderError;
use phashdupe::signal::ShutdownHandler;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_interrupt_before_hashing_aborts_run() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 1);

    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let run = run_with(
        &["-i", "-s", s(&db), "-w", "-j", "2", s(&a), s(&b)],
        "",
        &Config::default(),
        Some(handler.get_flag()),
    );

    let err = run.result.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<FinderError>(),
        Some(FinderError::Interrupted)
    ));
    assert!(run.stdout.is_empty());
    assert!(!db.exists());
}

#[test]
fn test_interrupt_is_harmless_when_everything_is_cached() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png").display().to_string();
    let b = dir.path().join("b.png").display().to_string();
    fs::write(
        &db,
        format!("{a}|1|0000000000000001\n{b}|1|0000000000000001\n"),
    )
    .unwrap();

    let handler = ShutdownHandler::new();
    handler.request_shutdown();

    let run = run_with(
        &["-i", "-s", s(&db), &a, &b],
        "",
        &Config::default(),
        Some(handler.get_flag()),
    );

    assert!(run.result.is_ok());
    assert_eq!(run.stdout, format!("0 - {a} - {b}\n"));
}
