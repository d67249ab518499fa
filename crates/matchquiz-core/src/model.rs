//! Core data model types for matchquiz.
//!
//! Difficulty levels, the per-level quiz content, and the content bank that
//! groups them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::parser;

/// Difficulty level chosen on the selection screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Level {
    NewToAds,
    AdExpert,
}

impl Level {
    pub const ALL: [Level; 2] = [Level::NewToAds, Level::AdExpert];

    /// Human-readable title for menus.
    pub fn title(&self) -> &'static str {
        match self {
            Level::NewToAds => "New to Ads",
            Level::AdExpert => "Ad Expert",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::NewToAds => write!(f, "new-to-ads"),
            Level::AdExpert => write!(f, "ad-expert"),
        }
    }
}

impl FromStr for Level {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new-to-ads" | "new" | "beginner" => Ok(Level::NewToAds),
            "ad-expert" | "expert" => Ok(Level::AdExpert),
            other => Err(format!("unknown level: {other}")),
        }
    }
}

/// Everything shown for one level: the facts to memorize, then the pairs to
/// match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelContent {
    /// Cards shown on the memorizing screen.
    #[serde(default)]
    pub memorizing: Vec<String>,
    /// Prompts, in display order.
    #[serde(default)]
    pub left: Vec<String>,
    /// `right[i]` is the correct answer for `left[i]`.
    #[serde(default)]
    pub right: Vec<String>,
}

impl LevelContent {
    pub fn question_count(&self) -> usize {
        self.left.len()
    }
}

/// A named collection of level content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub levels: BTreeMap<Level, LevelContent>,
}

const BUILTIN_BANK: &str = include_str!("../content/ads-memory.toml");

impl ContentBank {
    /// The advertising quiz that ships with the game.
    pub fn builtin() -> Self {
        // Covered by `builtin_bank_parses`; a broken embed fails the test suite.
        parser::parse_content_bank_str(BUILTIN_BANK, std::path::Path::new("<builtin>"))
            .unwrap_or_else(|e| {
                tracing::error!("builtin content bank is invalid: {e:#}");
                ContentBank {
                    id: "empty".into(),
                    name: "Empty".into(),
                    levels: BTreeMap::new(),
                }
            })
    }

    pub fn level(&self, level: Level) -> Option<&LevelContent> {
        self.levels.get(&level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_display_and_parse() {
        assert_eq!(Level::NewToAds.to_string(), "new-to-ads");
        assert_eq!(Level::AdExpert.to_string(), "ad-expert");
        assert_eq!("new-to-ads".parse::<Level>().unwrap(), Level::NewToAds);
        assert_eq!("Expert".parse::<Level>().unwrap(), Level::AdExpert);
        assert!("guru".parse::<Level>().is_err());
    }

    #[test]
    fn builtin_bank_parses() {
        let bank = ContentBank::builtin();
        assert_eq!(bank.id, "ads-memory");
        let beginner = bank.level(Level::NewToAds).unwrap();
        assert_eq!(beginner.question_count(), 6);
        assert_eq!(beginner.right.len(), 6);
        assert_eq!(beginner.memorizing.len(), 6);
        let expert = bank.level(Level::AdExpert).unwrap();
        assert_eq!(expert.question_count(), 8);
        assert_eq!(expert.memorizing.len(), 7);
    }

    #[test]
    fn level_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Level::AdExpert).unwrap();
        assert_eq!(json, "\"ad-expert\"");
    }
}
