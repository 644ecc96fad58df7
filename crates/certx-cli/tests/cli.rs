use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const CERTIFICATE: &str = "GOVERNMENT HIGH SCHOOL\n\
Register No: 12345\n\
Name of Student: RAVI KUMAR\n\
Sex: Male\n\
Date of Birth: 14-02-2005\n\
Name of Father: MOHAN DAS\n\
Name of Mother: SITA DEVI\n";

fn certx() -> Command {
    Command::cargo_bin("certx").unwrap()
}

#[test]
fn parse_text_file_as_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("ravi.txt");
    fs::write(&input, CERTIFICATE).unwrap();

    certx()
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""register_number": "12345""#))
        .stdout(predicate::str::contains(r#""name": "RAVI KUMAR""#))
        .stdout(predicate::str::contains(r#""dob": "14/02/2005""#))
        .stdout(predicate::str::contains(r#""filename": "ravi.txt""#));
}

#[test]
fn parse_stdin_with_label() {
    certx()
        .args(["parse", "-", "--label", "scan_7.png", "--format", "csv"])
        .write_stdin("Reg No: 777\nGender: Female\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "filename,register_number,name,sex,dob,father_name,mother_name,address",
        ))
        .stdout(predicate::str::contains("scan_7.png,777,,Female,,,,"));
}

#[test]
fn parse_full_result_lists_missing_fields() {
    certx()
        .args(["parse", "-", "--full"])
        .write_stdin("Sex: Male")
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""missing""#))
        .stdout(predicate::str::contains(r#""register_number""#))
        .stdout(predicate::str::contains(r#""sex": "anchored""#));
}

#[test]
fn saved_records_can_be_searched_and_exported() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("records.csv");
    let input = dir.path().join("ravi.txt");
    fs::write(&input, CERTIFICATE).unwrap();

    certx()
        .arg("parse")
        .arg(&input)
        .arg("--save")
        .arg("--store")
        .arg(&store)
        .assert()
        .success();

    certx()
        .args(["parse", "-", "--label", "other.png", "--save", "--store"])
        .arg(&store)
        .write_stdin("Name: ANITHA S\nSex: Female")
        .assert()
        .success();

    certx()
        .args(["records", "--store"])
        .arg(&store)
        .args(["search", "kumar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("RAVI KUMAR"))
        .stdout(predicate::str::contains("ANITHA").not());

    certx()
        .args(["records", "--store"])
        .arg(&store)
        .args(["export", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "ANITHA S""#))
        .stdout(predicate::str::contains(r#""father_name": "MOHAN DAS""#));
}

#[test]
fn records_on_missing_store_is_empty() {
    let dir = tempfile::tempdir().unwrap();

    certx()
        .args(["records", "--store"])
        .arg(dir.path().join("none.csv"))
        .arg("list")
        .assert()
        .success()
        .stderr(predicate::str::contains("No records"));
}

#[test]
fn process_rejects_unsupported_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("notes.docx");
    fs::write(&input, b"irrelevant").unwrap();

    certx()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported file type"));
}

#[test]
fn batch_without_matches_fails() {
    let dir = tempfile::tempdir().unwrap();
    let pattern = dir.path().join("*.png");

    certx()
        .arg("batch")
        .arg(pattern.to_string_lossy().as_ref())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn batch_isolates_failing_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.png"), b"not an image").unwrap();
    fs::write(dir.path().join("broken.pdf"), b"not a pdf").unwrap();

    certx()
        .arg("batch")
        .arg(dir.path().join("*").to_string_lossy().as_ref())
        .args(["--jobs", "2"])
        .assert()
        .success()
        .stderr(predicate::str::contains("2 failed"))
        .stderr(predicate::str::contains("broken.pdf"));
}

#[test]
fn config_path_is_reported() {
    certx()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json"));
}
