//! File-backed patch primitive tests.

use camino::Utf8PathBuf;
use fs_err as fs;
use multiapp_edit::{
    EditError, ValidationError, insert_at, regex_replace_all, splice_lines,
};
use multiapp_types::ops::{InsertPosition, ReplaceRule};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const CONSOLE: &str = "#!/usr/bin/env php\n<?php\n\nrequire __DIR__.'/../app/autoload.php';\n\n$kernel = new AppKernel($env, $debug);\n$application = new Application($kernel);\n$application->run($input);\n";

fn scratch() -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).expect("utf8");
    (td, root)
}

fn lines(v: &[&str]) -> Vec<String> {
    v.iter().map(|s| s.to_string()).collect()
}

#[test]
fn insert_before_kernel_line() {
    let (_td, root) = scratch();
    let file = root.join("console");
    fs::write(&file, CONSOLE).unwrap();

    let edit = insert_at(
        &file,
        "$kernel = new AppKernel($env, $debug);",
        InsertPosition::Before,
        &lines(&["", "require_once __DIR__.'/../apps/front/FrontKernel.php';"]),
    )
    .unwrap();

    assert!(edit.changed());
    assert!(edit.anchor_missing.is_none());
    let written = fs::read_to_string(&file).unwrap();
    assert!(written.contains(
        "\n\nrequire_once __DIR__.'/../apps/front/FrontKernel.php';\n$kernel = new AppKernel($env, $debug);\n"
    ));
    assert_eq!(written, edit.after);
}

#[test]
fn insert_with_missing_anchor_leaves_file_byte_identical() {
    let (_td, root) = scratch();
    let file = root.join("console");
    fs::write(&file, CONSOLE).unwrap();
    let before = fs::read(&file).unwrap();

    let edit = insert_at(&file, "no such line", InsertPosition::After, &lines(&["x"])).unwrap();

    assert!(!edit.changed());
    assert_eq!(edit.anchor_missing.as_deref(), Some("no such line"));
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[test]
fn patching_a_missing_file_is_an_error() {
    let (_td, root) = scratch();
    let missing = root.join("apps/front/AppKernel.php");

    let err = insert_at(&missing, "x", InsertPosition::Before, &[]).unwrap_err();
    assert!(matches!(err, EditError::MissingTarget { ref path } if path == &missing));

    let err = splice_lines(&missing, 0, 0, &[]).unwrap_err();
    assert!(matches!(err, EditError::MissingTarget { .. }));

    let err = regex_replace_all(&[missing.clone()], &[ReplaceRule::new("a", "b")]).unwrap_err();
    assert!(matches!(err, EditError::MissingTarget { .. }));
}

#[test]
fn splice_out_of_bounds_does_not_write() {
    let (_td, root) = scratch();
    let file = root.join("config.yml");
    fs::write(&file, "imports:\n    - { resource: parameters.yml }\n").unwrap();

    let err = splice_lines(&file, 2, 4, &[]).unwrap_err();
    assert!(matches!(
        err,
        EditError::Validation(ValidationError::SpliceOutOfBounds { lines: 3, .. })
    ));
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "imports:\n    - { resource: parameters.yml }\n"
    );
}

#[test]
fn splice_leading_lines_is_content_idempotent() {
    let (_td, root) = scratch();
    let file = root.join("config.yml");
    fs::write(&file, "a\nb\nc\nd\n").unwrap();
    let new = lines(&["x", "y"]);

    splice_lines(&file, 0, 2, &new).unwrap();
    let once = fs::read_to_string(&file).unwrap();
    let second = splice_lines(&file, 0, 2, &new).unwrap();

    assert_eq!(once, "x\ny\nc\nd\n");
    assert!(!second.changed());
    assert_eq!(fs::read_to_string(&file).unwrap(), once);
}

#[test]
fn regex_replace_processes_each_file() {
    let (_td, root) = scratch();
    let kernel = root.join("FrontKernel.php");
    let cache = root.join("FrontCache.php");
    fs::write(&kernel, "class AppKernel {\n  new AppBundle\\AppBundle();\n}\n").unwrap();
    fs::write(&cache, "class AppCache extends HttpCache {}\n").unwrap();

    let rules = vec![
        ReplaceRule::new("AppBundle", "FrontBundle"),
        ReplaceRule::new("AppKernel", "FrontKernel"),
        ReplaceRule::new("AppCache", "FrontCache"),
    ];
    let edits = regex_replace_all(&[kernel.clone(), cache.clone()], &rules).unwrap();

    assert_eq!(edits.len(), 2);
    assert_eq!(
        fs::read_to_string(&kernel).unwrap(),
        "class FrontKernel {\n  new FrontBundle\\FrontBundle();\n}\n"
    );
    assert_eq!(
        fs::read_to_string(&cache).unwrap(),
        "class FrontCache extends HttpCache {}\n"
    );

    // Second pass finds nothing left to replace.
    let again = regex_replace_all(&[kernel, cache], &rules).unwrap();
    assert!(again.iter().all(|e| !e.changed()));
}

#[test]
fn regex_no_match_is_byte_identical() {
    let (_td, root) = scratch();
    let file = root.join("routing.yml");
    fs::write(&file, "app:\n    type: annotation\n").unwrap();
    let before = fs::read(&file).unwrap();

    let edits = regex_replace_all(&[file.clone()], &[ReplaceRule::new("@AppBundle", "@X")]).unwrap();

    assert!(!edits[0].changed());
    assert_eq!(fs::read(&file).unwrap(), before);
}

#[test]
fn invalid_pattern_fails_before_touching_files() {
    let (_td, root) = scratch();
    let file = root.join("a.txt");
    fs::write(&file, "AppBundle").unwrap();

    let rules = vec![
        ReplaceRule::new("AppBundle", "X"),
        ReplaceRule::new("[", "Y"),
    ];
    let err = regex_replace_all(&[file.clone()], &rules).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(fs::read_to_string(&file).unwrap(), "AppBundle");
}
