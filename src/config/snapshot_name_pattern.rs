use super::DATE_FORMAT;
use crate::prelude::*;
use chrono::NaiveDateTime;
use std::fmt;

/// Length of a rendered `{{date}}`, e.g. `20120824-123456`
const DATE_LEN: usize = 15;

/// Rendered `snapshot-name` template in which every `{{date}}` stands for an
/// arbitrary timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SnapshotNamePattern {
    /// Literal parts of the name; consecutive parts are separated by a date
    segments: Vec<String>,
}

impl SnapshotNamePattern {
    pub fn new(segments: Vec<String>) -> Self {
        Self { segments }
    }

    pub fn matches(&self, name: &VsSnapshotName) -> bool {
        let mut segments = self.segments.iter();

        let mut rest = match segments.next() {
            Some(first) => match name.as_str().strip_prefix(first.as_str()) {
                Some(rest) => rest,
                None => return false,
            },
            None => name.as_str(),
        };

        for segment in segments {
            let date = match rest.get(..DATE_LEN) {
                Some(date) => date,
                None => return false,
            };

            if NaiveDateTime::parse_from_str(date, DATE_FORMAT).is_err() {
                return false;
            }

            rest = match rest[DATE_LEN..].strip_prefix(segment.as_str()) {
                Some(rest) => rest,
                None => return false,
            };
        }

        rest.is_empty()
    }
}

impl fmt::Display for SnapshotNamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.iter().join("{{date}}"))
    }
}
