// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # basirah
//!
//! Terminal client for a Quranic exegesis backend: per-verse tafsir from
//! classical authors, AI reflections over verse ranges, and semantic topic
//! search across commentaries.
//!
//! ## Architecture
//!
//! - **Reference data** (`reference`): local surah index and verse text
//! - **Backend client** (`client`): stateless HTTP calls behind a `Transport` seam
//! - **Session** (`session`): optional bearer token, passed explicitly to every read
//! - **View controller** (`view`): bounded-choice forms and result rendering
//! - **Interfaces** (`tui`, `render`): ratatui front end and output sinks
//!
//! ## Library usage
//!
//! ```no_run
//! use basirah::catalog::{Author, Language};
//! use basirah::client::{TafsirClient, TafsirQuery};
//! use basirah::config::BasirahConfig;
//!
//! let client = TafsirClient::from_config(&BasirahConfig::default());
//! let query = TafsirQuery {
//!     author: Author::Tabari,
//!     surah: 1,
//!     ayah: 1,
//!     language: Language::Arabic,
//! };
//! let resp = client.fetch_tafsir(None, &query).unwrap();
//! println!("{}", resp.tafsir_text);
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod paths;
pub mod reference;
pub mod render;
pub mod session;
pub mod tui;
pub mod view;
