//! Kanji-of-the-day extension
//!
//! The `kotd` command replies with a random kanji (optionally at a
//! requested JLPT level, or a caller-supplied kanji) together with its
//! stroke-order image. When `kotd.daily-chat-id` is configured, a timer
//! task posts a random kanji to that chat on an interval.

use crate::application::errors::{CommandError, ExtensionError};
use crate::domain::entities::{CommandSpec, Message};
use crate::extensions::context::BotContext;
use crate::extensions::group::{CommandGroup, Reply};
use crate::extensions::manifest::{ExtensionDescriptor, GroupFactory};
use crate::infrastructure::assets::{stroke_order_path, KanjiTable};
use crate::infrastructure::dictionary::{format_jlpt, format_readings, DictionaryClient, KanjiEntry};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

pub fn descriptor() -> ExtensionDescriptor {
    ExtensionDescriptor {
        name: "kotd",
        description: "Kanji of the day",
        setup,
    }
}

fn setup(ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    let path = ctx.config.data.directory.join("kanji.json");
    let table = KanjiTable::load(&path).map_err(|reason| ExtensionError::Setup {
        name: "kotd".to_string(),
        reason,
    })?;
    let table = Arc::new(table);

    Ok(vec![GroupFactory::new("kotd", move |ctx| {
        Ok(Arc::new(KanjiOfTheDay::new(ctx.clone(), table)))
    })])
}

/// Posts the kanji of the day
pub struct KanjiOfTheDay {
    ctx: Arc<BotContext>,
    table: Arc<KanjiTable>,
    client: DictionaryClient,
    daily: Mutex<Option<JoinHandle<()>>>,
}

impl KanjiOfTheDay {
    pub fn new(ctx: Arc<BotContext>, table: Arc<KanjiTable>) -> Self {
        let client = DictionaryClient::new(&ctx.config.dictionary);
        Self {
            ctx,
            table,
            client,
            daily: Mutex::new(None),
        }
    }

    /// Pick the kanji and its level from the caller's argument
    ///
    /// An argument matching a level name ("n4") picks randomly at that
    /// level; any other argument is treated as a kanji; no argument picks
    /// a random level first.
    fn pick(&self, arg: Option<&str>) -> Result<(String, Option<String>), CommandError> {
        match arg {
            Some(raw) => {
                let upper = raw.to_uppercase();
                if self.table.has_level(&upper) {
                    let kanji = self.table.random(&upper).ok_or_else(|| {
                        CommandError::ExecutionFailed(format!("no kanji at level {}", upper))
                    })?;
                    Ok((kanji.to_string(), Some(upper)))
                } else {
                    Ok((raw.to_string(), None))
                }
            }
            None => {
                let (level, kanji) = self.table.random_any().ok_or_else(|| {
                    CommandError::ExecutionFailed("kanji table is empty".to_string())
                })?;
                Ok((kanji.to_string(), Some(level.to_string())))
            }
        }
    }

    async fn compose(&self, kanji: &str, level: Option<String>) -> Result<Reply, CommandError> {
        let entry = match self.client.kanji(kanji).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                return Ok(Reply::text(format!("No entry found for {:?}.", kanji)));
            }
            Err(e) => {
                tracing::error!("Kanji lookup failed: {}", e);
                return Ok(Reply::text("error: failed to complete request"));
            }
        };

        // Prefer the caller's level, then the local table, then the API
        let jlpt = level
            .or_else(|| self.table.level_of(&entry.kanji).map(|s| s.to_string()))
            .or_else(|| format_jlpt(entry.jlpt))
            .unwrap_or_else(|| "None".to_string());

        let mut reply = Reply::text(format_entry(&entry, &jlpt));

        match stroke_order_path(&self.ctx.config.data.directory, &entry.kanji) {
            Ok(path) if path.exists() => {
                reply = reply.with_photo(path);
            }
            Ok(path) => {
                tracing::warn!("No stroke-order image at {}", path.display());
            }
            Err(e) => {
                tracing::warn!("Cannot derive stroke-order path for {:?}: {}", entry.kanji, e);
            }
        }

        Ok(reply)
    }
}

fn format_entry(entry: &KanjiEntry, jlpt: &str) -> String {
    format!(
        "*Kanji of the Day*: {}\nTry writing the kanji yourself!\n\n\
         *Meaning*: {}\n*Kun'yomi*: {}\n*On'yomi*: {}\n*JLPT*: {}\n*Strokes*: {}",
        entry.kanji,
        entry.meanings.join(", "),
        format_readings(&entry.kun_readings),
        format_readings(&entry.on_readings),
        jlpt,
        entry.stroke_count,
    )
}

#[async_trait]
impl CommandGroup for KanjiOfTheDay {
    fn name(&self) -> &str {
        "kotd"
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new("kotd")
            .with_description("Post the kanji of the day")
            .with_usage("kotd [kanji|N5..N1]")]
    }

    async fn on_ready(&self) {
        tracing::info!(
            "Group 'kotd' ready on {}",
            self.ctx.adapter.bot_info().username
        );

        let Some(chat_id) = self.ctx.config.kotd.daily_chat_id.clone() else {
            return;
        };

        let mut daily = match self.daily.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if daily.is_some() {
            return;
        }

        let ctx = self.ctx.clone();
        let table = self.table.clone();
        let client = self.client.clone();
        let interval_hours = self.ctx.config.kotd.interval_hours.max(1);

        *daily = Some(tokio::spawn(async move {
            let period = std::time::Duration::from_secs(interval_hours * 3600);
            let mut ticker = tokio::time::interval(period);
            // The first tick fires immediately; skip it so the daily post
            // starts one full interval after startup.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                if let Err(e) = daily_post(&ctx, &table, &client, &chat_id).await {
                    tracing::error!("Daily kanji post failed: {}", e);
                }
            }
        }));
    }

    async fn handle(
        &self,
        _command: &str,
        args: &[String],
        _message: &Message,
    ) -> Result<Reply, CommandError> {
        let (kanji, level) = self.pick(args.first().map(|s| s.as_str()))?;
        self.compose(&kanji, level).await
    }

    fn cleanup(&self) {
        let mut daily = match self.daily.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(handle) = daily.take() {
            handle.abort();
        }
    }
}

async fn daily_post(
    ctx: &Arc<BotContext>,
    table: &Arc<KanjiTable>,
    client: &DictionaryClient,
    chat_id: &str,
) -> Result<(), String> {
    let (level, kanji) = table.random_any().ok_or("kanji table is empty")?;
    let (level, kanji) = (level.to_string(), kanji.to_string());

    let entry = client
        .kanji(&kanji)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| format!("no entry for {:?}", kanji))?;

    let text = format_entry(&entry, &level);

    match stroke_order_path(&ctx.config.data.directory, &entry.kanji) {
        Ok(path) if path.exists() => {
            ctx.adapter
                .send_photo(chat_id, &text, &path)
                .await
                .map_err(|e| e.to_string())?;
        }
        _ => {
            ctx.adapter
                .send_message(chat_id, &text)
                .await
                .map_err(|e| e.to_string())?;
        }
    }

    Ok(())
}
