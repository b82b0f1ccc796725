//! Local data assets: the JLPT kanji table and stroke-order images
//!
//! The kanji table maps a difficulty level ("N5" .. "N1") to a list of
//! kanji. Stroke-order images live next to it, keyed by the lowercase hex
//! of the kanji's codepoint.

use crate::application::errors::CommandError;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Kanji table keyed by JLPT level
#[derive(Debug, Clone)]
pub struct KanjiTable {
    levels: HashMap<String, Vec<String>>,
}

impl KanjiTable {
    /// Load the table from a JSON file of the form `{"N5": ["日", ...], ...}`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let levels: HashMap<String, Vec<String>> = serde_json::from_str(&content)
            .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;

        if levels.is_empty() {
            return Err(format!("Kanji table {} is empty", path.display()));
        }

        Ok(Self { levels })
    }

    pub fn levels(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.levels.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn has_level(&self, level: &str) -> bool {
        self.levels.contains_key(level)
    }

    /// Pick a random kanji from the given level
    pub fn random(&self, level: &str) -> Option<&str> {
        self.levels
            .get(level)?
            .choose(&mut rand::thread_rng())
            .map(|s| s.as_str())
    }

    /// Pick a random level, then a random kanji from it
    pub fn random_any(&self) -> Option<(&str, &str)> {
        let keys: Vec<&String> = self.levels.keys().collect();
        let level = keys.choose(&mut rand::thread_rng())?;
        let kanji = self.random(level)?;
        Some((level.as_str(), kanji))
    }

    /// Find which level a kanji belongs to
    pub fn level_of(&self, kanji: &str) -> Option<&str> {
        self.levels
            .iter()
            .find(|(_, list)| list.iter().any(|k| k == kanji))
            .map(|(level, _)| level.as_str())
    }
}

/// Whether the codepoint falls in a kanji block
pub fn is_kanji_codepoint(c: char) -> bool {
    let value = c as u32;
    (0x4E00..=0x9FFF).contains(&value) // Common kanji
        || (0x3400..=0x4DBF).contains(&value) // Extension A
        || (0xF900..=0xFAFF).contains(&value) // Compatibility kanji
}

/// Lowercase hex of a single kanji's codepoint, without the `0x` prefix
pub fn kanji_hex(kanji: &str) -> Result<String, CommandError> {
    let mut chars = kanji.chars();
    let c = chars
        .next()
        .ok_or_else(|| CommandError::InvalidArgs("empty kanji".to_string()))?;

    if chars.next().is_some() {
        return Err(CommandError::InvalidArgs(format!(
            "expected a single kanji, got {:?}",
            kanji
        )));
    }

    if !is_kanji_codepoint(c) {
        return Err(CommandError::InvalidArgs(format!(
            "{:?} is not a kanji",
            c
        )));
    }

    Ok(format!("{:x}", c as u32))
}

/// Path of the stroke-order image for a kanji under the data directory
pub fn stroke_order_path(data_dir: &Path, kanji: &str) -> Result<PathBuf, CommandError> {
    let hex = kanji_hex(kanji)?;
    Ok(data_dir.join("stroke_orders").join(format!("{}.png", hex)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn kanji_codepoint_ranges() {
        assert!(is_kanji_codepoint('鳥'));
        assert!(is_kanji_codepoint('日'));
        assert!(!is_kanji_codepoint('a'));
        assert!(!is_kanji_codepoint('あ'));
    }

    #[test]
    fn kanji_hex_normalizes_to_lowercase_without_prefix() {
        assert_eq!(kanji_hex("鳥").unwrap(), "9ce5");
        assert_eq!(kanji_hex("日").unwrap(), "65e5");
    }

    #[test]
    fn kanji_hex_rejects_non_kanji_and_multi_char_input() {
        assert!(kanji_hex("a").is_err());
        assert!(kanji_hex("").is_err());
        assert!(kanji_hex("鳥日").is_err());
    }

    #[test]
    fn stroke_order_path_uses_hex_filename() {
        let path = stroke_order_path(Path::new("/data"), "鳥").unwrap();
        assert_eq!(path, PathBuf::from("/data/stroke_orders/9ce5.png"));
    }

    #[test]
    fn table_loads_and_looks_up_levels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"N5": ["日", "月"], "N4": ["鳥"]}}"#).unwrap();

        let table = KanjiTable::load(file.path()).unwrap();
        assert!(table.has_level("N5"));
        assert!(!table.has_level("N9"));
        assert_eq!(table.level_of("鳥"), Some("N4"));
        assert_eq!(table.level_of("犬"), None);
        assert!(table.random("N5").is_some());
        assert!(table.random_any().is_some());
    }

    #[test]
    fn empty_table_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        assert!(KanjiTable::load(file.path()).is_err());
    }
}
