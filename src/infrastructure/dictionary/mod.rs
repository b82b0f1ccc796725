//! Japanese dictionary API clients
//!
//! Word lookups go to the jisho.org words search API; kanji detail lookups
//! go to kanjiapi.dev. Base URLs come from config so tests can point the
//! client elsewhere.

use crate::application::errors::BotError;
use crate::infrastructure::config::DictionaryConfig;
use reqwest::Client;
use serde::Deserialize;

/// One sense of a dictionary word entry
#[derive(Debug, Clone, Deserialize)]
pub struct WordSense {
    #[serde(default)]
    pub english_definitions: Vec<String>,
    #[serde(default)]
    pub parts_of_speech: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
}

/// One written/read form of a dictionary word entry
#[derive(Debug, Clone, Deserialize)]
pub struct WordJapanese {
    pub word: Option<String>,
    pub reading: Option<String>,
}

/// A single result from the words search API
#[derive(Debug, Clone, Deserialize)]
pub struct WordEntry {
    pub slug: String,
    #[serde(default)]
    pub japanese: Vec<WordJapanese>,
    #[serde(default)]
    pub senses: Vec<WordSense>,
    #[serde(default)]
    pub jlpt: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct WordsResponse {
    #[serde(default)]
    data: Vec<WordEntry>,
}

/// Kanji details from the kanji API
#[derive(Debug, Clone, Deserialize)]
pub struct KanjiEntry {
    pub kanji: String,
    #[serde(default)]
    pub meanings: Vec<String>,
    #[serde(default)]
    pub kun_readings: Vec<String>,
    #[serde(default)]
    pub on_readings: Vec<String>,
    pub stroke_count: u32,
    /// JLPT level as a bare number (5 = N5); absent for rare kanji
    pub jlpt: Option<u8>,
}

/// HTTP client for the external dictionary services
#[derive(Clone)]
pub struct DictionaryClient {
    client: Client,
    words_url: String,
    kanji_url: String,
}

impl DictionaryClient {
    pub fn new(config: &DictionaryConfig) -> Self {
        Self {
            client: Client::new(),
            words_url: config.words_url.trim_end_matches('/').to_string(),
            kanji_url: config.kanji_url.trim_end_matches('/').to_string(),
        }
    }

    /// Look up a word; `None` when the search returns no results
    pub async fn word(&self, query: &str) -> Result<Option<WordEntry>, BotError> {
        let response = self
            .client
            .get(&self.words_url)
            .query(&[("keyword", query)])
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Dictionary API error: {}",
                response.status()
            )));
        }

        let data: WordsResponse = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(data.data.into_iter().next())
    }

    /// Look up a single kanji; `None` when the API has no entry for it
    pub async fn kanji(&self, kanji: &str) -> Result<Option<KanjiEntry>, BotError> {
        let url = format!("{}/{}", self.kanji_url, kanji);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BotError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            return Err(BotError::Network(format!(
                "Kanji API error: {}",
                response.status()
            )));
        }

        let entry: KanjiEntry = response
            .json()
            .await
            .map_err(|e| BotError::Parse(e.to_string()))?;

        Ok(Some(entry))
    }
}

/// Render a reading list for display, `-` when empty
pub fn format_readings(readings: &[String]) -> String {
    if readings.is_empty() {
        "-".to_string()
    } else {
        readings.join(", ")
    }
}

/// Map an API JLPT number to the table's "N<x>" form
pub fn format_jlpt(jlpt: Option<u8>) -> Option<String> {
    jlpt.map(|n| format!("N{}", n))
}
