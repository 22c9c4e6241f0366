use super::common::{run, run_with, s, write_cache, write_image};
use phashdupe::config::Config;
use phashdupe::error::ExitCode;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_identical_images_reported_at_distance_zero() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 1);

    let run = run(&["-i", s(&a), s(&b)]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("0 - {} - {}\n", a.display(), b.display()));
}

#[test]
fn test_generate_then_compare_uses_cache_only() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    write_image(&a, 1);
    write_image(&b, 1);

    let generate = run(&["-i", "-g", "-s", s(&db), s(&a), s(&b)]);
    assert_eq!(generate.result.unwrap(), ExitCode::Success);
    assert!(generate.stdout.is_empty());

    let cached = fs::read_to_string(&db).unwrap();
    let lines: Vec<&str> = cached.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(&format!("{}|1|", a.display())));
    assert!(lines[1].starts_with(&format!("{}|1|", b.display())));

    // The images are gone, so any result must come from the cache
    fs::remove_file(&a).unwrap();
    fs::remove_file(&b).unwrap();

    let compare = run(&["-i", "-s", s(&db), "-w", s(&a), s(&b)]);
    assert_eq!(compare.result.unwrap(), ExitCode::Success);
    assert_eq!(compare.stdout, format!("0 - {} - {}\n", a.display(), b.display()));
    assert_eq!(fs::read_to_string(&db).unwrap(), cached);
}

fn three_entry_cache(dir: &std::path::Path) -> (std::path::PathBuf, [String; 3]) {
    let db = dir.join("fp.db");
    let paths = [
        dir.join("a.png").display().to_string(),
        dir.join("b.png").display().to_string(),
        dir.join("c.png").display().to_string(),
    ];
    write_cache(
        &db,
        &[
            format!("{}|1|000000000000000f", paths[0]),
            format!("{}|1|0000000000000008", paths[1]),
            format!("{}|1|00000000ffffffff", paths[2]),
        ],
    );
    (db, paths)
}

#[test]
fn test_threshold_filters_pairs() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    let run = run(&["-i", "-d", "5", "-s", s(&db), &a, &b, &c]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("3 - {a} - {b}\n"));
}

#[test]
fn test_no_threshold_reports_every_pair_grouped() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    let run = run(&["-i", "-s", s(&db), &a, &b, &c]);

    assert_eq!(
        run.stdout,
        format!("3 - {a} - {b}\n28 - {a} - {c}\n31 - {b} - {c}\n")
    );
}

#[test]
fn test_threshold_zero_keeps_only_exact_matches() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    let run = run(&["-i", "-d", "0", "-s", s(&db), &a, &b, &c]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert!(run.stdout.is_empty());
}

#[test]
fn test_groups_follow_path_order_not_input_order() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    // c is first in the input, so both of its pairs are grouped under c
    let run = run(&["-i", "-s", s(&db), &c, &b, &a]);

    assert_eq!(
        run.stdout,
        format!("3 - {b} - {a}\n28 - {c} - {a}\n31 - {c} - {b}\n")
    );
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    let run = run(&["-i", "--format", "json", "-d", "30", "-s", s(&db), &a, &b, &c]);

    let value: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
    let groups = value.as_array().unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0]["path"], a.as_str());
    assert_eq!(groups[0]["matches"][0]["distance"], 3);
    assert_eq!(groups[0]["matches"][0]["path"], b.as_str());
    assert_eq!(groups[0]["matches"][1]["distance"], 28);
    assert_eq!(groups[0]["matches"][1]["path"], c.as_str());
}

#[test]
fn test_repeated_inputs_are_compared_once() {
    let dir = tempdir().unwrap();
    let (db, [a, b, _]) = three_entry_cache(dir.path());

    let run = run(&["-i", "-s", s(&db), &a, &b, &a, &b]);

    assert_eq!(run.stdout, format!("3 - {a} - {b}\n"));
}

#[test]
fn test_unreadable_file_is_skipped() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    let broken = dir.path().join("broken.png");
    write_image(&a, 1);
    write_image(&b, 1);
    fs::write(&broken, b"not an image").unwrap();

    let run = run(&["-i", s(&a), s(&broken), s(&b)]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("0 - {} - {}\n", a.display(), b.display()));
}

#[test]
fn test_paths_from_stdin() {
    let dir = tempdir().unwrap();
    let (db, [a, b, _]) = three_entry_cache(dir.path());

    let stdin = format!("  {a}  \n\n\t\n{b}\n");
    let run = run_with(&["-i", "-s", s(&db)], &stdin, &Config::default(), None);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("3 - {a} - {b}\n"));
}

#[test]
fn test_stdin_read_when_directories_are_empty() {
    let dir = tempdir().unwrap();
    let (db, [a, b, _]) = three_entry_cache(dir.path());
    let empty = dir.path().join("empty");
    fs::create_dir(&empty).unwrap();

    let stdin = format!("{a}\n{b}\n");
    let run = run_with(
        &["-i", "-s", s(&db), "-r", s(&empty)],
        &stdin,
        &Config::default(),
        None,
    );

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("3 - {a} - {b}\n"));
}

#[test]
fn test_stdin_ignored_when_files_given() {
    let dir = tempdir().unwrap();
    let (db, [a, b, c]) = three_entry_cache(dir.path());

    let stdin = format!("{c}\n");
    let run = run_with(&["-i", "-s", s(&db), &a, &b], &stdin, &Config::default(), None);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert_eq!(run.stdout, format!("3 - {a} - {b}\n"));
}

#[test]
fn test_differently_spelled_paths_are_distinct() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("fp.db");
    let root = dir.path().display().to_string();
    write_cache(
        &db,
        &[
            format!("{root}/x/./a.png|1|000000000000000f"),
            format!("{root}/x/b.png|1|0000000000000008"),
        ],
    );

    // Only the exact spelling of b.png is cached and neither file exists
    let a = format!("{root}/x/a.png");
    let b_doubled = format!("{root}/x//b.png");
    let b = format!("{root}/x/b.png");
    let run = run(&["-i", "-s", s(&db), &a, &b_doubled, &b]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert!(run.stdout.is_empty());
}

#[test]
fn test_no_input_files_is_an_error() {
    let run = run(&["-i"]);
    let err = run.result.unwrap_err();
    assert!(err.to_string().contains("No input files specified"));
    assert!(run.stdout.is_empty());
}

#[test]
fn test_single_file_reports_nothing() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.png");
    write_image(&a, 1);

    let run = run(&["-i", s(&a)]);

    assert_eq!(run.result.unwrap(), ExitCode::Success);
    assert!(run.stdout.is_empty());
}

#[test]
fn test_many_workers_same_report_as_one() {
    let dir = tempdir().unwrap();
    let mut paths = Vec::new();
    for i in 0..6 {
        let path = dir.path().join(format!("img{i}.png"));
        write_image(&path, i % 3);
        paths.push(path.display().to_string());
    }
    let files: Vec<&str> = paths.iter().map(String::as_str).collect();

    let mut sequential_args = vec!["-i", "-j", "1"];
    sequential_args.extend(&files);
    let mut parallel_args = vec!["-i", "-j", "4"];
    parallel_args.extend(&files);

    let sequential = run(&sequential_args);
    let parallel = run(&parallel_args);

    assert!(!sequential.stdout.is_empty());
    assert_eq!(sequential.stdout, parallel.stdout);
}
