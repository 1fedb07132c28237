//! Local reference datasets: the surah index and the verse-text table.
//!
//! Both are read once at startup and never mutated. Lookups of a verse or a
//! surah that is absent from the datasets are not errors: callers receive
//! `None`, the [`DEFAULT_MAX_AYAH`] fallback, or the [`VERSE_NOT_FOUND`]
//! placeholder.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReferenceError, ReferenceResult};
use crate::paths::{SURAH_INDEX_FILE, VERSE_FILE};

/// Ayah bound used for a surah missing from the index (the length of the
/// longest surah).
pub const DEFAULT_MAX_AYAH: u16 = 286;

/// Placeholder shown when no verse record matches a (surah, ayah) pair.
pub const VERSE_NOT_FOUND: &str = "not found";

/// One row of the surah index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurahIndexEntry {
    pub surah_number: u16,
    pub surah_name: String,
    pub total_ayat: u16,
}

/// The index file is either `{"surahs": [...]}` or a bare array.
#[derive(Deserialize)]
#[serde(untagged)]
enum SurahIndexFile {
    Wrapped { surahs: Vec<SurahIndexEntry> },
    Bare(Vec<SurahIndexEntry>),
}

/// Immutable surah index keyed by surah number.
#[derive(Debug, Clone, Default)]
pub struct SurahIndex {
    entries: Vec<SurahIndexEntry>,
    by_number: HashMap<u16, usize>,
}

impl SurahIndex {
    /// Build an index, rejecting zero or duplicate surah numbers.
    pub fn from_entries(mut entries: Vec<SurahIndexEntry>) -> ReferenceResult<Self> {
        entries.sort_by_key(|e| e.surah_number);
        let mut by_number = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            if entry.surah_number == 0 || entry.total_ayat == 0 {
                return Err(ReferenceError::InvalidSurah {
                    number: entry.surah_number,
                    message: "surah number and total_ayat must be positive".into(),
                });
            }
            if by_number.insert(entry.surah_number, pos).is_some() {
                return Err(ReferenceError::InvalidSurah {
                    number: entry.surah_number,
                    message: "duplicate surah number".into(),
                });
            }
        }
        Ok(Self { entries, by_number })
    }

    /// Parse the JSON form of the index. `origin` names the source in errors.
    pub fn from_json_str(json: &str, origin: &str) -> ReferenceResult<Self> {
        let file: SurahIndexFile =
            serde_json::from_str(json).map_err(|e| ReferenceError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;
        let entries = match file {
            SurahIndexFile::Wrapped { surahs } => surahs,
            SurahIndexFile::Bare(surahs) => surahs,
        };
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> ReferenceResult<Self> {
        let json = read_dataset(path)?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    pub fn get(&self, surah: u16) -> Option<&SurahIndexEntry> {
        self.by_number.get(&surah).map(|&pos| &self.entries[pos])
    }

    /// Entries in ascending surah order.
    pub fn entries(&self) -> &[SurahIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The Arabic text of one verse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseRecord {
    pub surah_number: u16,
    pub ayah_number: u16,
    pub arabic_text: String,
}

#[derive(Deserialize)]
struct RawVerse {
    arabic: String,
}

/// Immutable verse table keyed by (surah, ayah).
#[derive(Debug, Clone, Default)]
pub struct VerseTable {
    verses: HashMap<(u16, u16), VerseRecord>,
}

impl VerseTable {
    pub fn from_records(records: impl IntoIterator<Item = VerseRecord>) -> Self {
        Self {
            verses: records
                .into_iter()
                .map(|r| ((r.surah_number, r.ayah_number), r))
                .collect(),
        }
    }

    /// Parse `{"<surah>": {"<ayah>": {"arabic": "...", ...}}}`. Extra verse
    /// fields such as translations are ignored.
    pub fn from_json_str(json: &str, origin: &str) -> ReferenceResult<Self> {
        let raw: HashMap<String, HashMap<String, RawVerse>> =
            serde_json::from_str(json).map_err(|e| ReferenceError::Parse {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        let mut records = Vec::new();
        for (surah_key, ayat) in raw {
            let surah_number = parse_key(&surah_key, origin)?;
            for (ayah_key, verse) in ayat {
                records.push(VerseRecord {
                    surah_number,
                    ayah_number: parse_key(&ayah_key, origin)?,
                    arabic_text: verse.arabic,
                });
            }
        }
        Ok(Self::from_records(records))
    }

    pub fn load(path: &Path) -> ReferenceResult<Self> {
        let json = read_dataset(path)?;
        Self::from_json_str(&json, &path.display().to_string())
    }

    pub fn get(&self, surah: u16, ayah: u16) -> Option<&VerseRecord> {
        self.verses.get(&(surah, ayah))
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

fn parse_key(key: &str, origin: &str) -> ReferenceResult<u16> {
    key.trim().parse().map_err(|_| ReferenceError::InvalidKey {
        path: origin.to_string(),
        key: key.to_string(),
    })
}

fn read_dataset(path: &Path) -> ReferenceResult<String> {
    std::fs::read_to_string(path).map_err(|e| ReferenceError::Read {
        path: path.display().to_string(),
        source: e,
    })
}

/// Both datasets together, answering every display-string lookup the
/// interface needs.
#[derive(Debug, Clone, Default)]
pub struct ReferenceData {
    surahs: SurahIndex,
    verses: VerseTable,
}

impl ReferenceData {
    pub fn new(surahs: SurahIndex, verses: VerseTable) -> Self {
        Self { surahs, verses }
    }

    /// Load `surah.json` and `quran.json` from `dir`.
    pub fn load(dir: &Path) -> ReferenceResult<Self> {
        let surahs = SurahIndex::load(&dir.join(SURAH_INDEX_FILE))?;
        let verses = VerseTable::load(&dir.join(VERSE_FILE))?;
        tracing::debug!(
            dir = %dir.display(),
            surahs = surahs.len(),
            verses = verses.len(),
            "loaded reference data"
        );
        Ok(Self::new(surahs, verses))
    }

    pub fn surahs(&self) -> &SurahIndex {
        &self.surahs
    }

    pub fn surah_name(&self, surah: u16) -> Option<&str> {
        self.surahs.get(surah).map(|e| e.surah_name.as_str())
    }

    /// Number of ayat in `surah`, or [`DEFAULT_MAX_AYAH`] when it is not indexed.
    pub fn max_ayah(&self, surah: u16) -> u16 {
        self.surahs
            .get(surah)
            .map_or(DEFAULT_MAX_AYAH, |e| e.total_ayat)
    }

    pub fn verse(&self, surah: u16, ayah: u16) -> Option<&VerseRecord> {
        self.verses.get(surah, ayah)
    }

    /// `"<surah>:<ayah> <arabic text>"`, or [`VERSE_NOT_FOUND`].
    pub fn verse_locator(&self, surah: u16, ayah: u16) -> String {
        match self.verse(surah, ayah) {
            Some(v) => format!("{surah}:{ayah} {}", v.arabic_text),
            None => VERSE_NOT_FOUND.to_string(),
        }
    }

    /// `"<n>. <name>"` as shown in surah selectors.
    pub fn surah_label(&self, surah: u16) -> String {
        format!("{surah}. {}", self.surah_name(surah).unwrap_or_default())
    }
}
