//! TOML content bank parser.
//!
//! Loads content banks from TOML files and directories, and validates them.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ContentBank, Level, LevelContent};

/// Intermediate TOML structure for parsing content bank files.
#[derive(Debug, Deserialize)]
struct TomlContentFile {
    bank: TomlBankHeader,
    #[serde(default)]
    levels: BTreeMap<String, TomlLevel>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct TomlLevel {
    #[serde(default)]
    memorizing: Vec<String>,
    #[serde(default)]
    left: Vec<String>,
    #[serde(default)]
    right: Vec<String>,
}

/// Parse a single TOML file into a `ContentBank`.
pub fn parse_content_bank(path: &Path) -> Result<ContentBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read content file: {}", path.display()))?;

    parse_content_bank_str(&content, path)
}

/// Parse a TOML string into a `ContentBank` (useful for testing).
pub fn parse_content_bank_str(content: &str, source_path: &Path) -> Result<ContentBank> {
    let parsed: TomlContentFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let levels = parsed
        .levels
        .into_iter()
        .map(|(name, level)| {
            let level_id: Level = name.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
            Ok((
                level_id,
                LevelContent {
                    memorizing: level.memorizing,
                    left: level.left,
                    right: level.right,
                },
            ))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(ContentBank {
        id: parsed.bank.id,
        name: parsed.bank.name,
        levels,
    })
}

/// Recursively load all `.toml` content bank files from a directory.
pub fn load_content_directory(dir: &Path) -> Result<Vec<ContentBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_content_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_content_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// Load a file or every bank in a directory.
pub fn load_content(path: &Path) -> Result<Vec<ContentBank>> {
    if path.is_dir() {
        load_content_directory(path)
    } else {
        Ok(vec![parse_content_bank(path)?])
    }
}

/// A warning from content bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The level (if applicable).
    pub level: Option<Level>,
    /// Warning message.
    pub message: String,
}

/// Validate a content bank for common issues.
pub fn validate_content_bank(bank: &ContentBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if bank.levels.is_empty() {
        warnings.push(ValidationWarning {
            level: None,
            message: "content bank defines no levels".into(),
        });
    }

    for (&level, content) in &bank.levels {
        let mut warn = |message: String| {
            warnings.push(ValidationWarning {
                level: Some(level),
                message,
            })
        };

        if content.left.is_empty() {
            warn("no matching prompts".into());
        }
        if content.left.len() != content.right.len() {
            warn(format!(
                "{} prompts but {} answers; prompts and answers are paired by position",
                content.left.len(),
                content.right.len()
            ));
        }
        if content.memorizing.is_empty() {
            warn("no memorizing content".into());
        }

        for (i, text) in content.left.iter().enumerate() {
            if text.trim().is_empty() {
                warn(format!("prompt {} is blank", i + 1));
            }
        }
        for (i, text) in content.right.iter().enumerate() {
            if text.trim().is_empty() {
                warn(format!("answer {} is blank", i + 1));
            }
        }

        // Identical answers are interchangeable, so either slot accepts them.
        let mut seen = HashSet::new();
        for text in &content.right {
            if !seen.insert(text.as_str()) {
                warn(format!("duplicate answer: {text}"));
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[bank]
id = "capitals"
name = "Capitals"

[levels.new-to-ads]
memorizing = ["Paris is the capital of France."]
left = ["France", "Japan"]
right = ["Paris", "Tokyo"]
"#;

    #[test]
    fn parse_valid_toml() {
        let bank = parse_content_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "capitals");
        assert_eq!(bank.name, "Capitals");
        let level = bank.level(Level::NewToAds).unwrap();
        assert_eq!(level.left, vec!["France", "Japan"]);
        assert_eq!(level.right[1], "Tokyo");
        assert!(bank.level(Level::AdExpert).is_none());
        assert!(validate_content_bank(&bank).is_empty());
    }

    #[test]
    fn parse_unknown_level() {
        let toml = r#"
[bank]
id = "x"
name = "X"

[levels.grandmaster]
left = ["a"]
right = ["b"]
"#;
        let err = parse_content_bank_str(toml, &PathBuf::from("test.toml")).unwrap_err();
        assert!(err.to_string().contains("unknown level"));
    }

    #[test]
    fn validate_mismatched_and_duplicate() {
        let toml = r#"
[bank]
id = "broken"
name = "Broken"

[levels.ad-expert]
left = ["a", "b", "c"]
right = ["x", "x"]
"#;
        let bank = parse_content_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_content_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("paired by position")));
        assert!(warnings.iter().any(|w| w.message.contains("duplicate answer")));
        assert!(warnings.iter().any(|w| w.message.contains("memorizing")));
        assert!(warnings.iter().all(|w| w.level == Some(Level::AdExpert)));
    }

    #[test]
    fn validate_empty_bank() {
        let toml = r#"
[bank]
id = "empty"
name = "Empty"
"#;
        let bank = parse_content_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_content_bank(&bank);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].level.is_none());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        let result = parse_content_bank_str(bad, &PathBuf::from("bad.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.toml"), VALID_TOML).unwrap();
        std::fs::write(dir.path().join("bad.toml"), "not toml [").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let banks = load_content_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, "capitals");

        let single = load_content(&dir.path().join("good.toml")).unwrap();
        assert_eq!(single.len(), 1);
    }
}
