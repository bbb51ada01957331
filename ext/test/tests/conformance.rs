//! Conformance tests that run YAML fixtures against segmatch
//!
//! Run with: cargo test -p segmatch-test --test conformance --features segmatch-test/fixtures

#![cfg(feature = "fixtures")]

use segmatch_test::fixture::Fixture;
use std::fs;
use std::path::{Path, PathBuf};

/// The `fixtures/` directory at the workspace root.
fn fixtures_dir() -> PathBuf {
    // ext/test -> ext -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .expect("Could not find workspace root")
        .join("fixtures")
}

/// Load and run all fixtures in a directory.
fn run_fixtures_in_dir(dir: &Path) {
    assert!(dir.exists(), "Fixtures directory does not exist: {}", dir.display());

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("dir entry").path())
        .filter(|path| path.extension().is_some_and(|e| e == "yaml" || e == "yml"))
        .collect();
    paths.sort();
    assert!(!paths.is_empty(), "No fixtures in {}", dir.display());

    for path in paths {
        println!("Running fixture: {}", path.display());

        let yaml = fs::read_to_string(&path).expect("read yaml");
        let fixtures = Fixture::from_yaml_multi(&yaml).unwrap_or_else(|e| {
            panic!("Failed to parse {}: {}", path.display(), e);
        });

        for fixture in fixtures {
            println!("  Running: {}", fixture.name);
            fixture.run_and_assert();
        }
    }
}

#[test]
fn test_templates() {
    run_fixtures_in_dir(&fixtures_dir().join("01_templates"));
}

#[test]
fn test_filters() {
    run_fixtures_in_dir(&fixtures_dir().join("02_filters"));
}

#[test]
fn test_specs() {
    run_fixtures_in_dir(&fixtures_dir().join("03_specs"));
}

#[test]
fn test_errors() {
    run_fixtures_in_dir(&fixtures_dir().join("04_errors"));
}
