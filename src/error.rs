//! Error types for loading datasets, submissions and configuration.
//!
//! The placement core itself never fails: it only ever sees a validated
//! [`Catalog`](crate::catalog::Catalog).

use std::io;

use thiserror::Error;

/// Malformed dataset input
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("line {line}: expected {expected} fields for {what}, found {found}")]
    FieldCount {
        line: usize,
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: invalid integer '{token}'")]
    InvalidInteger { line: usize, token: String },
    #[error("line {line}: {what} {value} out of range (limit {limit})")]
    OutOfRange {
        line: usize,
        what: &'static str,
        value: u64,
        limit: u64,
    },
    #[error("line {line}: {what} must be positive")]
    NotPositive { line: usize, what: &'static str },
    #[error("line {line}: cache {cache} listed twice for endpoint {endpoint}")]
    DuplicateLink {
        line: usize,
        endpoint: usize,
        cache: usize,
    },
    #[error("line {line}: unexpected trailing content")]
    TrailingContent { line: usize },
}

/// Malformed or infeasible submission file
#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: unexpected end of input, expected {expected}")]
    UnexpectedEof { line: usize, expected: &'static str },
    #[error("line {line}: invalid integer '{token}'")]
    InvalidInteger { line: usize, token: String },
    #[error("line {line}: expected a single cache count, found {found} fields")]
    BadHeader { line: usize, found: usize },
    #[error("line {line}: cache {cache} does not exist")]
    UnknownCache { line: usize, cache: u64 },
    #[error("line {line}: video {video} does not exist")]
    UnknownVideo { line: usize, video: u64 },
    #[error("line {line}: cache {cache} described twice")]
    DuplicateCache { line: usize, cache: usize },
    #[error("line {line}: video {video} listed twice on cache {cache}")]
    DuplicateVideo {
        line: usize,
        cache: usize,
        video: usize,
    },
    #[error("cache {cache} holds {used} but its capacity is {capacity}")]
    OverCapacity { cache: usize, used: u64, capacity: u64 },
    #[error("line {line}: unexpected trailing content")]
    TrailingContent { line: usize },
}

/// Unreadable or invalid planner configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
