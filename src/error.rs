//! Rich diagnostic error types for basirah.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know what went wrong and how
//! to fix it. Backend failures keep the server's response body verbatim.

use miette::Diagnostic;
use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigError;
use crate::paths::PathError;

/// Top-level error type.
///
/// Each variant wraps a subsystem-specific error, preserving the full
/// diagnostic chain through to the user.
#[derive(Debug, Error, Diagnostic)]
pub enum BasirahError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    View(#[from] ViewError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),
}

// ---------------------------------------------------------------------------
// Reference data errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ReferenceError {
    #[error("failed to read reference data: {path}")]
    #[diagnostic(
        code(basirah::reference::read),
        help(
            "The surah index (surah.json) and verse table (quran.json) must exist in the \
             data directory. Pass --data-dir or set `data_dir` in config.toml."
        )
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse reference data: {path}: {message}")]
    #[diagnostic(
        code(basirah::reference::parse),
        help(
            "surah.json holds {{\"surahs\": [{{surah_number, surah_name, total_ayat}}]}}; \
             quran.json maps surah number -> ayah number -> {{\"arabic\": ...}}."
        )
    )]
    Parse { path: String, message: String },

    #[error("non-numeric key \"{key}\" in {path}")]
    #[diagnostic(
        code(basirah::reference::invalid_key),
        help("Surah and ayah keys in quran.json must be decimal numbers.")
    )]
    InvalidKey { path: String, key: String },

    #[error("invalid surah index entry {number}: {message}")]
    #[diagnostic(
        code(basirah::reference::invalid_surah),
        help("Each surah number must be positive and appear exactly once.")
    )]
    InvalidSurah { number: u16, message: String },
}

pub type ReferenceResult<T> = std::result::Result<T, ReferenceError>;

// ---------------------------------------------------------------------------
// View / form errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ViewError {
    #[error("ayah {ayah} is outside 1..={max} for surah {surah}")]
    #[diagnostic(
        code(basirah::view::ayah_out_of_range),
        help("Run `basirah surahs` to see how many ayat each surah has.")
    )]
    AyahOutOfRange { surah: u16, ayah: u16, max: u16 },

    #[error("to-ayah {to} precedes from-ayah {from}")]
    #[diagnostic(
        code(basirah::view::inverted_range),
        help("Choose a to-ayah greater than or equal to the from-ayah.")
    )]
    InvertedRange { from: u16, to: u16 },

    #[error("surah {surah} is not in the surah index")]
    #[diagnostic(
        code(basirah::view::unknown_surah),
        help("Run `basirah surahs` to list valid surah numbers.")
    )]
    UnknownSurah { surah: u16 },

    #[error("top_k {value} is outside 1..=10")]
    #[diagnostic(code(basirah::view::top_k), help("Request between 1 and 10 results."))]
    TopKOutOfRange { value: u8 },
}

pub type ViewResult<T> = std::result::Result<T, ViewError>;
