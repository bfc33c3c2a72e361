use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn date_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn local_date_key() -> String {
    date_key(Local::now().date_naive())
}

/// Appends `.<date_key>` to the full base path, extension included.
pub fn rotated_path(base_path: &Path, date_key: &str) -> PathBuf {
    let mut name = OsString::from(base_path.as_os_str());
    name.push(".");
    name.push(date_key);
    PathBuf::from(name)
}
