//! Closed enumerations for the bounded choices offered by every form:
//! tafsir authors and output languages.
//!
//! Each value carries the slug the backend expects on the wire plus a
//! display label for the interface, so an unknown author or language is a
//! type error rather than a lookup miss.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A classical tafsir author known to the backend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Author {
    #[serde(rename = "alaloosi")]
    #[value(name = "alaloosi")]
    Alaloosi,
    #[serde(rename = "alrazi")]
    #[value(name = "alrazi")]
    Alrazi,
    #[serde(rename = "ibn-aashoor")]
    #[value(name = "ibn-aashoor")]
    IbnAashoor,
    #[serde(rename = "ibn-katheer")]
    #[value(name = "ibn-katheer")]
    IbnKatheer,
    #[serde(rename = "qurtubi")]
    #[value(name = "qurtubi")]
    Qurtubi,
    #[serde(rename = "tabari")]
    #[value(name = "tabari")]
    Tabari,
}

impl Author {
    /// All authors in presentation order.
    pub const ALL: [Author; 6] = [
        Author::Alaloosi,
        Author::Alrazi,
        Author::IbnAashoor,
        Author::IbnKatheer,
        Author::Qurtubi,
        Author::Tabari,
    ];

    /// Identifier used in backend paths and query parameters.
    pub fn slug(self) -> &'static str {
        match self {
            Author::Alaloosi => "alaloosi",
            Author::Alrazi => "alrazi",
            Author::IbnAashoor => "ibn-aashoor",
            Author::IbnKatheer => "ibn-katheer",
            Author::Qurtubi => "qurtubi",
            Author::Tabari => "tabari",
        }
    }

    /// Human-readable name.
    pub fn label(self) -> &'static str {
        match self {
            Author::Alaloosi => "Al Alusi",
            Author::Alrazi => "Al Razi",
            Author::IbnAashoor => "Ibn Ashur",
            Author::IbnKatheer => "Ibn Kathir",
            Author::Qurtubi => "Al Qurtubi",
            Author::Tabari => "Al Tabari",
        }
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Author {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Author::ALL
            .into_iter()
            .find(|a| a.slug() == s)
            .ok_or_else(|| UnknownChoice {
                kind: "author",
                value: s.to_string(),
            })
    }
}

/// Output language for tafsir text, reflections and search results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum Language {
    #[value(name = "ar")]
    #[serde(rename = "ar")]
    Arabic,
    #[value(name = "en")]
    #[serde(rename = "en")]
    English,
    #[value(name = "fr")]
    #[serde(rename = "fr")]
    French,
    #[value(name = "de")]
    #[serde(rename = "de")]
    German,
    #[value(name = "es")]
    #[serde(rename = "es")]
    Spanish,
    #[value(name = "ur")]
    #[serde(rename = "ur")]
    Urdu,
}

impl Language {
    /// All languages in presentation order.
    pub const ALL: [Language; 6] = [
        Language::Arabic,
        Language::English,
        Language::French,
        Language::German,
        Language::Spanish,
        Language::Urdu,
    ];

    /// Two-letter code sent as the `lang` parameter.
    pub fn code(self) -> &'static str {
        match self {
            Language::Arabic => "ar",
            Language::English => "en",
            Language::French => "fr",
            Language::German => "de",
            Language::Spanish => "es",
            Language::Urdu => "ur",
        }
    }

    /// Name of the language in its own script.
    pub fn label(self) -> &'static str {
        match self {
            Language::Arabic => "العربية",
            Language::English => "English",
            Language::French => "Français",
            Language::German => "Deutsch",
            Language::Spanish => "Spanish",
            Language::Urdu => "اردو",
        }
    }

    /// Presentation style for body text in this language.
    pub fn text_style(self) -> TextStyle {
        match self {
            Language::Arabic => TextStyle::Arabic,
            Language::Urdu => TextStyle::Urdu,
            Language::English | Language::French | Language::German | Language::Spanish => {
                TextStyle::Latin
            }
        }
    }

    pub fn direction(self) -> TextDirection {
        self.text_style().direction()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Language {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|l| l.code() == s)
            .ok_or_else(|| UnknownChoice {
                kind: "language",
                value: s.to_string(),
            })
    }
}

/// Script-specific styling applied to rendered text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextStyle {
    /// Naskh-style Arabic, right to left.
    Arabic,
    /// Nastaliq-style Urdu, right to left.
    Urdu,
    /// Latin-script languages, left to right.
    Latin,
}

impl TextStyle {
    pub fn direction(self) -> TextDirection {
        match self {
            TextStyle::Arabic | TextStyle::Urdu => TextDirection::Rtl,
            TextStyle::Latin => TextDirection::Ltr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Rtl,
    Ltr,
}

/// A string that does not name any known author or language.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: \"{value}\"")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}
