//! Expected-status values for request assertions.

use std::fmt;

pub const OK: u16 = 200;
pub const CREATED: u16 = 201;
pub const NO_CONTENT: u16 = 204;
pub const NOT_FOUND: u16 = 404;

/// The status (or set of statuses) a request must come back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectedStatus {
    Exact(u16),
    AnyOf(Vec<u16>),
}

impl ExpectedStatus {
    pub fn any_of(codes: impl IntoIterator<Item = u16>) -> Self {
        ExpectedStatus::AnyOf(codes.into_iter().collect())
    }

    pub fn matches(&self, status: u16) -> bool {
        match self {
            ExpectedStatus::Exact(code) => *code == status,
            ExpectedStatus::AnyOf(codes) => codes.contains(&status),
        }
    }
}

impl From<u16> for ExpectedStatus {
    fn from(code: u16) -> Self {
        ExpectedStatus::Exact(code)
    }
}

impl<const N: usize> From<[u16; N]> for ExpectedStatus {
    fn from(codes: [u16; N]) -> Self {
        ExpectedStatus::any_of(codes)
    }
}

impl fmt::Display for ExpectedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpectedStatus::Exact(code) => write!(f, "{code}"),
            ExpectedStatus::AnyOf(codes) => write!(f, "one of {codes:?}"),
        }
    }
}
