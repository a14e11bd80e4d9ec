use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;

fn rowid() -> Command {
    let mut cmd = Command::cargo_bin("rowid").expect("rowid binary is built");
    cmd.env_remove("ROWID_DEFAULT_DELIMITER")
        .env_remove("ROWID_LOG_LEVEL")
        .env_remove("ROWID_LOG_DIR")
        .env_remove("ROWID_LOG_UNBUFFERED");
    cmd
}

fn write_input(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn test_adds_id_and_reports() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "yourfile.csv", "Name,Score\nAlice,90\nBob,85\n");
    let output = dir.path().join("output.csv");

    rowid()
        .current_dir(dir.path())
        .args(["yourfile.csv", "output.csv"])
        .assert()
        .success()
        .stdout("Auto-incrementing ID column added and written to output.csv\n");

    assert!(input.exists());
    assert_eq!(
        fs::read_to_string(output)?,
        "ID,Name,Score\n1,Alice,90\n2,Bob,85\n"
    );
    Ok(())
}

#[test]
fn test_overwrites_existing_id() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "ID,Name\n99,Alice\n42,Bob\n");
    let output = dir.path().join("out.csv");

    rowid().arg(&input).arg(&output).assert().success();

    assert_eq!(fs::read_to_string(output)?, "ID,Name\n1,Alice\n2,Bob\n");
    Ok(())
}

#[test]
fn test_custom_column_and_quiet() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "v\na\nb\n");
    let output = dir.path().join("out.csv");

    rowid()
        .args(["-q", "--column", "key", "--start", "0", "--increment", "2"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    assert_eq!(fs::read_to_string(output)?, "key,v\n0,a\n2,b\n");
    Ok(())
}

#[test]
fn test_default_delimiter_env_applies_to_input_only() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "Name;Score\nAlice;90\nBob;85\n");
    let output = dir.path().join("out.csv");

    rowid()
        .env("ROWID_DEFAULT_DELIMITER", ";")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(output)?,
        "ID,Name,Score\n1,Alice,90\n2,Bob,85\n"
    );
    Ok(())
}

#[test]
fn test_delimiter_flag_does_not_change_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.txt", "a|b\nx|1\n");
    let output = dir.path().join("out.tsv");

    rowid()
        .args(["-d", "|"])
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(output)?, "ID,a,b\n1,x,1\n");
    Ok(())
}

#[test]
fn test_log_file_records_start_and_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let logs = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "a\n1\n");
    let output = dir.path().join("out.csv");

    rowid()
        .env("ROWID_LOG_LEVEL", "info")
        .env("ROWID_LOG_DIR", logs.path())
        .env("ROWID_LOG_UNBUFFERED", "1")
        .arg(&input)
        .arg(&output)
        .assert()
        .success();

    let mut log = String::new();
    for entry in fs::read_dir(logs.path())? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with("rowid.log") {
            log.push_str(&fs::read_to_string(entry.path())?);
        }
    }
    assert!(log.contains("START"), "{log}");
    assert!(log.contains("END"), "{log}");
    Ok(())
}

#[test]
fn test_missing_input_fails_without_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("out.csv");

    rowid()
        .arg(dir.path().join("missing.csv"))
        .arg(&output)
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(
            predicate::str::contains("input file not found")
                .and(predicate::str::contains("missing.csv")),
        );

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_ragged_input_fails_without_output() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "a,b\n1,2\n3\n");
    let output = dir.path().join("out.csv");

    rowid()
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not parse"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_unwritable_output_fails() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "a\n1\n");
    let output = dir.path().join("missing_dir").join("out.csv");

    rowid()
        .arg(&input)
        .arg(&output)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("could not write"));
    Ok(())
}

#[test]
fn test_zero_increment_is_usage_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = write_input(dir.path(), "in.csv", "a\n1\n");
    let output = dir.path().join("out.csv");

    rowid()
        .args(["--increment", "0"])
        .arg(&input)
        .arg(&output)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--increment"));

    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_missing_arguments_is_usage_error() {
    rowid()
        .arg("only_input.csv")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("<input> <output>"));
}

#[test]
fn test_help_goes_to_stdout() {
    rowid()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("rowid [options] <input> <output>"));
}

#[test]
fn test_version() {
    rowid()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("rowid "));
}
