use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("doxy-filter")
        .join("tests")
        .join("fixtures")
        .join(name)
}

const SAMPLE: &str = "/// Draws a <b>bold</b> line.\n/// \\code\n/// line();\n/// \\endcode\nvoid draw();\n";

#[test]
fn extract_lists_translatable_units_as_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("draw.h");
    fs::write(&path, SAMPLE).unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("extract").arg(&path);
    cmd.assert().success().stdout(
        predicate::str::contains("\"id\": \"tu1\"")
            .and(predicate::str::contains("Draws a {1}bold{2} line."))
            .and(predicate::str::contains("line();").not()),
    );
}

#[test]
fn extract_all_includes_code_blocks() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("draw.h");
    fs::write(&path, SAMPLE).unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("extract").arg(&path).arg("--all").arg("-f").arg("text");
    cmd.assert().success().stdout(
        predicate::str::contains("[tu2] (g1) *").and(predicate::str::contains("line();")),
    );
}

#[test]
fn extract_rejects_unknown_format() {
    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("extract")
        .arg(fixture_path("special_commands.h"))
        .arg("-f")
        .arg("docx");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("format 'docx' not found"));
}

#[test]
fn merge_writes_translated_file() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("draw.h");
    let translations = dir.path().join("fr.json");
    let output = dir.path().join("draw.fr.h");
    fs::write(&source, SAMPLE).unwrap();
    fs::write(&translations, r#"{"tu1": "Trace une ligne {1}grasse{2}."}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("merge")
        .arg(&source)
        .arg("-t")
        .arg(&translations)
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        SAMPLE.replace("Draws a <b>bold</b> line.", "Trace une ligne <b>grasse</b>.")
    );
}

#[test]
fn merge_accepts_yaml_listing_on_stdout() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("draw.h");
    let translations = dir.path().join("fr.yaml");
    fs::write(&source, SAMPLE).unwrap();
    fs::write(
        &translations,
        "- id: tu1\n  group: g1\n  translatable: true\n  text: 'Une {1}ligne{2}.'\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("merge").arg(&source).arg("-t").arg(&translations);
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("/// Une <b>ligne</b>.\n/// \\code\n"));
}

#[test]
fn merge_reports_unknown_unit() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("draw.h");
    let translations = dir.path().join("fr.json");
    fs::write(&source, SAMPLE).unwrap();
    fs::write(&translations, r#"{"tu99": "Rien."}"#).unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("merge").arg(&source).arg("-t").arg(&translations);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("tu99"));
}

#[test]
fn check_passes_on_fixtures() {
    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("check")
        .arg(fixture_path("special_commands.h"))
        .arg(fixture_path("python_docs.py"));
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ok").and(predicate::str::contains("units")));
}

#[test]
fn check_walks_directories_by_extension() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.h"), "/// A.\n").unwrap();
    fs::write(dir.path().join("notes.txt"), "/// not checked\n").unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("check").arg(dir.path());
    cmd.assert().success().stdout(
        predicate::str::contains("a.h (1 units)").and(predicate::str::contains("notes.txt").not()),
    );
}

#[test]
fn check_fails_on_missing_file() {
    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("check").arg("/no/such/file.h");
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("error"));
}

#[test]
fn commands_lists_builtin_table() {
    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("commands");
    cmd.assert().success().stdout(
        predicate::str::contains("code")
            .and(predicate::str::contains("pair=endcode"))
            .and(predicate::str::contains("untranslatable")),
    );
}

#[test]
fn config_file_adds_custom_commands() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("doxy.toml");
    fs::write(
        &config,
        "[[filter.custom_commands]]\npattern = '\\\\english\\b'\nname = \"english\"\n",
    )
    .unwrap();

    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("--config").arg(&config).arg("commands");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("english"));
}

#[test]
fn formats_lists_registry() {
    let mut cmd = cargo_bin_cmd!("doxy");
    cmd.arg("formats");
    cmd.assert().success().stdout(
        predicate::str::contains("json")
            .and(predicate::str::contains("yaml"))
            .and(predicate::str::contains("text")),
    );
}
