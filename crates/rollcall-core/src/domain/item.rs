use serde::{Deserialize, Serialize};
use std::fmt;

/// One unit of batch work: a forum the account follows.
///
/// `key` is the identifier the remote side expects (the url-safe forum
/// keyword), `name` is what humans read in logs and reports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    key: String,
    name: String,
}

impl Item {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt(f)
    }
}
