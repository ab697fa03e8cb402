// Test path identity and its transport encoding

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Characters kept verbatim in an encoded segment (RFC 3986 unreserved)
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Stable identity of a test within a run, e.g. `pkg.MyTest.testA`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestPath(String);

impl TestPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path with every `.` separator replaced by `/`
    pub fn uniform(&self) -> String {
        self.0.replace('.', "/")
    }

    /// Uniform path encoded as a single opaque URL path segment
    pub fn encoded(&self) -> String {
        utf8_percent_encode(&self.uniform(), SEGMENT).to_string()
    }
}

impl fmt::Display for TestPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TestPath {
    fn from(path: String) -> Self {
        Self(path)
    }
}

impl From<&str> for TestPath {
    fn from(path: &str) -> Self {
        Self(path.to_string())
    }
}
