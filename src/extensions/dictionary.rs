//! Dictionary extension: kanji and word lookups

use crate::application::errors::{CommandError, ExtensionError};
use crate::domain::entities::{CommandSpec, Message};
use crate::extensions::context::BotContext;
use crate::extensions::group::{CommandGroup, Reply};
use crate::extensions::manifest::{ExtensionDescriptor, GroupFactory};
use crate::infrastructure::dictionary::{format_readings, DictionaryClient, WordEntry};
use async_trait::async_trait;
use std::sync::Arc;

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor {
        name: "dictionary",
        description: "Search definitions from a Japanese dictionary",
        setup,
    }
}

fn setup(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![GroupFactory::new("jisho", |ctx| {
        Ok(Arc::new(Jisho::new(ctx.clone())))
    })])
}

/// Search definitions from a Japanese dictionary
pub struct Jisho {
    ctx: Arc<BotContext>,
    client: DictionaryClient,
}

impl Jisho {
    pub fn new(ctx: Arc<BotContext>) -> Self {
        let client = DictionaryClient::new(&ctx.config.dictionary);
        Self { ctx, client }
    }

    async fn lookup_kanji(&self, query: &str) -> Result<Reply, CommandError> {
        let entry = self
            .client
            .kanji(query)
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        let Some(entry) = entry else {
            return Ok(Reply::text("No results found. Did you submit kanji?"));
        };

        let text = format!(
            "*Kanji*: {}\n*Strokes*: {}\n*Main Meanings*: {}\n*Kun'yomi*: {}\n*On'yomi*: {}",
            entry.kanji,
            entry.stroke_count,
            entry.meanings.join(", "),
            format_readings(&entry.kun_readings),
            format_readings(&entry.on_readings),
        );

        Ok(Reply::text(text))
    }

    async fn lookup_word(&self, query: &str) -> Result<Reply, CommandError> {
        let entry = self
            .client
            .word(query)
            .await
            .map_err(|e| CommandError::ExecutionFailed(e.to_string()))?;

        let Some(entry) = entry else {
            return Ok(Reply::text("No results found. Are you making up words?"));
        };

        Ok(Reply::text(format_word(&entry)))
    }
}

/// Render the first sense of a word entry
fn format_word(entry: &WordEntry) -> String {
    let word = entry
        .japanese
        .first()
        .and_then(|j| j.word.as_deref())
        .unwrap_or(&entry.slug);
    let reading = entry
        .japanese
        .first()
        .and_then(|j| j.reading.as_deref())
        .unwrap_or("-");
    let jlpt = entry
        .jlpt
        .iter()
        .map(|e| e.replace("jlpt-", "").to_uppercase())
        .collect::<Vec<_>>()
        .join(", ");

    let (parts_of_speech, definitions, antonyms) = match entry.senses.first() {
        Some(sense) => (
            sense.parts_of_speech.join(", "),
            sense.english_definitions.join(", "),
            sense.antonyms.join(", "),
        ),
        None => (String::new(), String::new(), String::new()),
    };

    format!(
        "*Word*: {}\n*Reading*: {}\n*JLPT*: {}\n*Parts of Speech*: {}\n*English Definitions*: {}\n*Antonyms*: {}",
        word, reading, jlpt, parts_of_speech, definitions, antonyms,
    )
}

#[async_trait]
impl CommandGroup for Jisho {
    fn name(&self) -> &str {
        "jisho"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("jisho")
            .with_description("Look up a kanji or word in the Japanese dictionary")
            .with_usage("jisho <kanji|word> <query>")]
    }

    async fn on_ready(&self) {
        tracing::info!(
            "Group 'jisho' ready on {}",
            self.ctx.adapter.bot_info().username
        );
    }

    async fn handle(
        &self,
        _command: &str,
        args: &[String],
        _message: &Message,
    ) -> Result<Reply, CommandError> {
        match args {
            [sub, query, ..] if sub == "kanji" => self.lookup_kanji(query).await,
            [sub, query, ..] if sub == "word" => self.lookup_word(query).await,
            _ => Ok(Reply::text("Usage: jisho <kanji|word> <query>")),
        }
    }
}
