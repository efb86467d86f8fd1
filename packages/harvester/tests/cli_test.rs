//! Tests for the command-line binary.

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

const SPAIN: &str = r#"class Spain(HolidayBase):
    supported_categories = (PUBLIC,)

    def _populate(self, year):
        self._add_holiday("New Year's Day", date(year, JAN, 1))
        self._add_easter_based_holiday("Good Friday", -2)
"#;

fn harvester() -> Command {
    Command::cargo_bin("holiday-harvester").expect("binary exists")
}

#[test]
fn test_parse_local_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("spain.py");
    fs::write(&file, SPAIN).expect("write fixture");

    harvester()
        .arg("parse")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"country_code\": \"ES\""))
        .stdout(predicate::str::contains("\"new_year's_day\""))
        .stdout(predicate::str::contains("\"easter_offset\": -2"))
        .stderr(predicate::str::contains("Holidays: 2"));
}

#[test]
fn test_compare_local_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("source.py");
    fs::write(&file, SPAIN).expect("write fixture");

    harvester()
        .args(["compare", "--country", "ES"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"chosen_strategy\": \"structural\""))
        .stdout(predicate::str::contains("\"differing_keys\": []"));
}

#[test]
fn test_unknown_filename_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("atlantis.py");
    fs::write(&file, SPAIN).expect("write fixture");

    harvester()
        .arg("parse")
        .arg(&file)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown source file"));
}

#[test]
fn test_invalid_country_code_fails_before_network() {
    harvester()
        .args(["fetch", "spain"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid country code format"));
}
