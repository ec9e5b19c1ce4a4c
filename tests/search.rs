//! End-to-end coverage of the CLI → engine → pipeline path: a real
//! directory tree on disk, searched through the public `ngrip` API with
//! no UI involved.

mod common;

use clap::Parser;
use common::TestEnv;
use ngrip::cli::Cli;
use ngrip::engine::Engine;
use ngrip::store::{Entry, StoreStatus};

fn run(env: &TestEnv, args: &[&str]) -> Engine {
    let mut full = vec!["ngrip"];
    full.extend_from_slice(args);
    let cli = Cli::parse_from(full);
    let config = env.config_with_extensions(&[".c", ".h"]);
    let mut engine = Engine::start(&cli, &config).expect("engine starts");
    engine.shutdown().expect("pipeline joins");
    engine
}

#[test]
fn literal_case_sensitive_search_finds_only_exact_case() {
    let env = TestEnv::new();
    env.write("a.c", "int main() {\n  return FOO;\n}\n");
    env.write("b.c", "int foo() {\n  return foo;\n}\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["FOO", &path]);

    assert_eq!(engine.active().store.match_count(), 1);
    let entries = engine.active().store.read_all();
    assert!(entries.iter().any(|e| matches!(e, Entry::MatchLine { .. })));
}

#[test]
fn case_insensitive_search_matches_regardless_of_case() {
    let env = TestEnv::new();
    env.write("a.c", "FOO\nfoo\nFoO\nbar\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["-i", "foo", &path]);

    assert_eq!(engine.active().store.match_count(), 3);
}

#[test]
fn regex_mode_compiles_and_applies_the_pattern() {
    let env = TestEnv::new();
    env.write("a.c", "value = 1\nvalue = 22\nvalue = x\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["-e", r"value = [0-9]+", &path]);

    assert_eq!(engine.active().store.match_count(), 2);
}

#[test]
fn extension_filter_only_scans_matching_files() {
    let env = TestEnv::new();
    env.write("a.c", "needle\n");
    env.write("b.txt", "needle\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["needle", &path]);

    assert_eq!(engine.active().store.match_count(), 1);
}

#[test]
fn only_extension_flag_replaces_the_configured_list() {
    let env = TestEnv::new();
    env.write("a.c", "needle\n");
    env.write("b.py", "needle\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["-o", ".py", "needle", &path]);

    assert_eq!(engine.active().store.match_count(), 1);
}

#[test]
fn multiple_files_each_get_their_own_header_before_their_matches() {
    let env = TestEnv::new();
    env.write("a.c", "hello\nworld\n");
    env.write("b.c", "hello again\n");
    env.write("sub/c.c", "hello once more\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["hello", &path]);

    let entries = engine.active().store.read_all();
    assert_eq!(entries.iter().filter(|e| e.is_header()).count(), 3);
    assert_eq!(engine.active().store.match_count(), 3);

    // Every match line is preceded by a header (no orphan matches).
    for (i, entry) in entries.iter().enumerate() {
        if matches!(entry, Entry::MatchLine { .. }) {
            assert!(engine.active().store.find_containing_file(i).is_some());
        }
    }
}

#[test]
fn large_file_spanning_the_mmap_split_point_is_scanned_completely() {
    let env = TestEnv::new();
    let mut contents = String::new();
    for i in 0..50_000 {
        contents.push_str(&format!("line number {i}\n"));
    }
    // One needle placed right around the middle, one at the very end —
    // exercises both scan-worker halves.
    contents.push_str("MIDDLE_NEEDLE\n");
    for i in 0..50_000 {
        contents.push_str(&format!("line number {i}\n"));
    }
    contents.push_str("FINAL_NEEDLE\n");
    env.write("big.c", &contents);

    let path = env.path().to_str().unwrap().to_string();
    let mid = run(&env, &["MIDDLE_NEEDLE", &path]);
    assert_eq!(mid.active().store.match_count(), 1);

    let end = run(&env, &["FINAL_NEEDLE", &path]);
    assert_eq!(end.active().store.match_count(), 1);
}

#[test]
fn excluded_directory_is_never_scanned() {
    let env = TestEnv::new();
    env.write("a.c", "needle\n");
    env.write("vendor/b.c", "needle\n");

    let path = env.path().to_str().unwrap().to_string();
    let vendor = env.path().join("vendor").to_str().unwrap().to_string();
    let engine = run(&env, &["-x", &vendor, "needle", &path]);

    assert_eq!(engine.active().store.match_count(), 1);
}

#[test]
fn raw_mode_scans_files_outside_the_extension_list() {
    let env = TestEnv::new();
    env.write("a.bin", "needle\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["-r", "needle", &path]);

    assert_eq!(engine.active().store.match_count(), 1);
}

#[test]
fn subsearch_narrows_the_parent_results_and_is_reversible() {
    let env = TestEnv::new();
    env.write("a.c", "hello world\nhello there\nhello world again\n");

    let path = env.path().to_str().unwrap().to_string();
    let mut engine = run(&env, &["hello", &path]);
    assert_eq!(engine.active().store.match_count(), 3);

    engine.subsearch("world").unwrap();
    assert_eq!(engine.active().store.match_count(), 2);
    assert_eq!(engine.contexts.depth(), 2);

    assert!(engine.pop_context());
    assert_eq!(engine.active().store.match_count(), 3);
    assert!(engine.contexts.is_root());
}

#[test]
fn store_is_marked_done_once_the_walk_completes() {
    let env = TestEnv::new();
    env.write("a.c", "nothing matches here\n");

    let path = env.path().to_str().unwrap().to_string();
    let engine = run(&env, &["needle", &path]);

    assert_eq!(engine.active().store.status(), StoreStatus::Done);
    assert_eq!(engine.active().store.match_count(), 0);
}
