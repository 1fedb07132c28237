//! Structured render output.
//!
//! The view controller produces `Block`s instead of printing, so the same
//! result can be drawn by the TUI, printed by the CLI, streamed as JSON, or
//! collected in memory by tests.

use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use crate::catalog::{TextDirection, TextStyle};

// ── Block types ─────────────────────────────────────────────────────────

/// One unit of rendered output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Verse locator line (`"2:255 <arabic>"` or the not-found placeholder).
    Verse { text: String },
    /// Section title, e.g. a search hit header.
    Heading { text: String },
    /// Tafsir, reflection or search body text in the chosen language.
    Body { text: String, style: TextStyle },
    /// Labelled detail, e.g. `Author: tabari`.
    Field { label: String, value: String },
    /// Backend or client error, shown verbatim.
    Error { message: String },
    /// Informational line (busy indicator, disclaimer, status).
    Notice { text: String },
    /// Visual break between search hits.
    Separator,
}

impl Block {
    pub fn verse(text: impl Into<String>) -> Self {
        Self::Verse { text: text.into() }
    }

    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading { text: text.into() }
    }

    pub fn body(text: impl Into<String>, style: TextStyle) -> Self {
        Self::Body {
            text: text.into(),
            style,
        }
    }

    pub fn field(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            label: label.into(),
            value: value.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn notice(text: impl Into<String>) -> Self {
        Self::Notice { text: text.into() }
    }

    /// Reading direction used when laying the block out.
    pub fn direction(&self) -> TextDirection {
        match self {
            Block::Verse { .. } => TextDirection::Rtl,
            Block::Body { style, .. } => style.direction(),
            _ => TextDirection::Ltr,
        }
    }
}

// ── OutputSink trait ────────────────────────────────────────────────────

/// A destination for rendered blocks.
pub trait OutputSink {
    fn emit(&self, block: &Block);

    fn emit_all(&self, blocks: &[Block]) {
        for b in blocks {
            self.emit(b);
        }
    }
}

// ── StdoutSink ──────────────────────────────────────────────────────────

/// Plain terminal output for one-shot CLI commands.
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn emit(&self, block: &Block) {
        match block {
            Block::Verse { text } => println!("{text}"),
            Block::Heading { text } => println!("\n## {text}"),
            Block::Body { text, .. } => println!("{text}"),
            Block::Field { label, value } => println!("{label}: {value}"),
            Block::Error { message } => eprintln!("error: {message}"),
            Block::Notice { text } => println!("{text}"),
            Block::Separator => println!("---"),
        }
    }
}

// ── JsonSink ────────────────────────────────────────────────────────────

/// Newline-delimited JSON, one block per line.
pub struct JsonSink;

impl OutputSink for JsonSink {
    fn emit(&self, block: &Block) {
        if let Ok(json) = serde_json::to_string(block) {
            println!("{json}");
        }
    }
}

// ── VecSink ─────────────────────────────────────────────────────────────

/// Collects blocks in memory.
#[derive(Default)]
pub struct VecSink {
    blocks: Mutex<Vec<Block>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> Vec<Block> {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.blocks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OutputSink for VecSink {
    fn emit(&self, block: &Block) {
        self.blocks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(block.clone());
    }
}
