//! Common test utilities

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

/// Header used by every generated roster
pub const HEADER: &str = "firstname,lastname,age,field";

/// Path of the checked-in sample roster
pub const SAMPLE_DATABASE: &str = "tests/fixtures/database.csv";

/// Write `content` to a fresh temporary file
pub fn roster_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp roster");
    file.write_all(content.as_bytes()).expect("write temp roster");
    file
}

/// The three-student roster used throughout the docs
pub fn small_roster() -> NamedTempFile {
    roster_file(&format!(
        "{HEADER}\nJohann,Kerbrou,30,CS\nGuillaume,Salou,30,SWE\nArielle,Salou,20,CS\n"
    ))
}
