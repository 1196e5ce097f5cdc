//! Tests for bundle assembly

use std::fs;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;
use crate::css;

fn write_files(dir: &TempDir, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, content)| {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            path
        })
        .collect()
}

#[test]
fn test_missing_inputs_are_reported_together() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_files(&dir, &[("a.css", "a{}"), ("c.css", "c{}"), ("d.css", "d{}")]);
    paths.insert(1, dir.path().join("b.css"));
    paths.push(dir.path().join("e.css"));

    let err = check_inputs(&paths).unwrap_err();
    assert_eq!(
        err.paths,
        vec![dir.path().join("b.css"), dir.path().join("e.css")]
    );
    let message = err.to_string();
    assert!(message.starts_with("missing 2 input file(s): "));
    assert!(message.contains("b.css"));
    assert!(message.contains("e.css"));
}

#[test]
fn test_missing_inputs_abort_before_transforming() {
    let dir = TempDir::new().unwrap();
    let mut paths = write_files(&dir, &[("a.css", "a{}")]);
    paths.push(dir.path().join("gone.css"));

    let calls = std::cell::Cell::new(0);
    let result = assemble(
        &paths,
        |text| {
            calls.set(calls.get() + 1);
            text.to_owned()
        },
        true,
    );

    assert!(matches!(result, Err(BundleError::MissingInputs(_))));
    assert_eq!(calls.get(), 0);
}

#[test]
fn test_duplicate_missing_paths_are_listed_once() {
    let dir = TempDir::new().unwrap();
    let gone = dir.path().join("gone.css");
    let err = check_inputs(&[gone.clone(), gone.clone()]).unwrap_err();
    assert_eq!(err.paths, vec![gone]);
}

#[test]
fn test_directories_count_as_missing() {
    let dir = TempDir::new().unwrap();
    let err = check_inputs(&[dir.path()]).unwrap_err();
    assert_eq!(err.paths, vec![dir.path().to_path_buf()]);
}

#[test]
fn test_merge_keeps_first_seen_order() {
    let first = MissingInputError {
        paths: vec![PathBuf::from("b"), PathBuf::from("a")],
    };
    let second = MissingInputError {
        paths: vec![PathBuf::from("a"), PathBuf::from("c")],
    };
    let merged = MissingInputError::merge([first, second]).unwrap();
    assert_eq!(
        merged.paths,
        vec![PathBuf::from("b"), PathBuf::from("a"), PathBuf::from("c")]
    );
    assert_eq!(MissingInputError::merge(Vec::new()), None);
}

#[test]
fn test_load_sources_keeps_order_and_names() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(&dir, &[("z.css", "z{}"), ("a.css", "a{}")]);
    let sources = load_sources(&paths).unwrap();

    let summary: Vec<_> = sources
        .iter()
        .map(|source| (source.position, source.name.as_str(), source.content.as_str()))
        .collect();
    assert_eq!(summary, vec![(0, "z.css", "z{}"), (1, "a.css", "a{}")]);
}

#[test]
fn test_minified_bundle_has_no_markers() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(
        &dir,
        &[
            ("reset.css", "* { margin: 0; }\n"),
            ("layout.css", "/* grid */\n.grid { display: grid; }\n"),
        ],
    );

    let bundle = assemble(&paths, css::minify, true).unwrap();
    let rendered = bundle.render();

    assert_eq!(rendered, "*{margin:0}\n\n.grid{display:grid}\n");
    assert!(!rendered.contains("====="));
    assert_eq!(bundle.results[1].original_len, 36);
    assert_eq!(bundle.results[1].transformed_len(), 20);
    assert_eq!(bundle.results[1].original_lines, 2);
    assert_eq!(bundle.results[1].transformed_lines(), 1);
}

#[test]
fn test_annotated_bundle_marks_every_file_in_order() {
    let dir = TempDir::new().unwrap();
    let paths = write_files(
        &dir,
        &[
            ("variables.css", ":root { --x: 1; }\n"),
            ("reset.css", "* { margin: 0; }"),
        ],
    );

    let bundle = assemble(&paths, css::minify, false).unwrap();
    let rendered = bundle.render();

    insta::assert_snapshot!(rendered, @r"
    /* ===== variables.css ===== */
    :root { --x: 1; }

    /* ===== reset.css ===== */
    * { margin: 0; }
    ");

    let markers: Vec<_> = rendered
        .lines()
        .filter(|line| line.starts_with("/* ====="))
        .collect();
    assert_eq!(
        markers,
        vec!["/* ===== variables.css ===== */", "/* ===== reset.css ===== */"]
    );
}

#[test]
fn test_empty_minified_files_do_not_add_separators() {
    let results = vec![
        TransformResult {
            name: "a.css".to_owned(),
            original_len: 3,
            original_lines: 1,
            text: "a{}\n".to_owned(),
        },
        TransformResult {
            name: "empty.css".to_owned(),
            original_len: 12,
            original_lines: 1,
            text: String::new(),
        },
        TransformResult {
            name: "b.css".to_owned(),
            original_len: 3,
            original_lines: 1,
            text: "b{}\n".to_owned(),
        },
    ];
    let bundle = Bundle::new(results, JoinPolicy::Minified);
    assert_eq!(bundle.render(), "a{}\n\nb{}\n");
    assert_eq!(bundle.original_len(), 18);

    assert_eq!(Bundle::new(Vec::new(), JoinPolicy::Minified).render(), "");
}
