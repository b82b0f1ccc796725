use clap::{Parser, Subcommand};
use std::sync::Arc;

use kotoba_bot::application::messaging::{
    LoggingMiddleware, MessageDispatcher, RateLimitMiddleware,
};
use kotoba_bot::domain::entities::User;
use kotoba_bot::domain::traits::Bot;
use kotoba_bot::extensions::{BotContext, ExtensionLoader, ExtensionManifest, GroupRegistry, Reply};
use kotoba_bot::infrastructure::adapters::{ConsoleAdapter, TelegramAdapter};
use kotoba_bot::infrastructure::config::Config;

#[derive(Parser)]
#[command(name = "kotoba-bot")]
#[command(about = "A Japanese dictionary chat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Bot token (overrides config)
    #[arg(short, long)]
    token: Option<String>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .init();

    match cli.command {
        Commands::Run => {
            run_bot(cli.config, cli.token);
        }
        Commands::Version => {
            println!("kotoba-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config(&cli.config);
        }
    }
}

fn run_bot(config_path: String, token_override: Option<String>) {
    let mut config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    if let Some(token) = token_override {
        if let Some(ref mut tg) = config.adapters.telegram {
            tg.token = Some(token);
            tg.enabled = true;
        }
    }

    tracing::info!("Starting {}", config.bot.name);

    let telegram_enabled = config
        .adapters
        .telegram
        .as_ref()
        .map(|t| t.enabled)
        .unwrap_or(false);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if telegram_enabled {
        // The gateway credential is the one hard startup requirement
        let Some(token) = config.telegram_token() else {
            tracing::error!("BOT_TOKEN is not set and the config has no token; cannot authenticate");
            std::process::exit(1);
        };

        rt.block_on(run_telegram(Arc::new(config), token));
    } else {
        // Dev mode: the console sender may drive owner-only commands
        if !config.bot.owners.iter().any(|id| id == "console") {
            config.bot.owners.push("console".to_string());
        }
        rt.block_on(run_console(Arc::new(config)));
    }
}

/// Build the extension host, load everything and fire the ready hooks
async fn setup(
    config: Arc<Config>,
    adapter: Arc<dyn Bot>,
) -> (Arc<BotContext>, Arc<ExtensionLoader>, MessageDispatcher) {
    let manifest = ExtensionManifest::builtin().filtered(&config.extensions.enabled);
    let registry = Arc::new(GroupRegistry::new());
    let loader = Arc::new(ExtensionLoader::new(manifest, registry.clone()));
    let ctx = Arc::new(BotContext::new(
        config,
        adapter,
        Arc::downgrade(&loader),
    ));

    loader.load_all(&ctx);

    for group in registry.groups() {
        group.on_ready().await;
    }

    let dispatcher = MessageDispatcher::new(ctx.clone(), registry)
        .with_middleware(LoggingMiddleware)
        .with_middleware(RateLimitMiddleware::new(20, 60));

    (ctx, loader, dispatcher)
}

async fn run_telegram(config: Arc<Config>, token: String) {
    let mut adapter = TelegramAdapter::new(token);
    if let Err(e) = adapter.fetch_bot_info().await {
        tracing::error!("Failed to authenticate with Telegram: {}", e);
        std::process::exit(1);
    }

    let adapter = Arc::new(adapter);
    let info = adapter.bot_info();
    tracing::info!("Logged in as @{}", info.username);

    let (_ctx, _loader, dispatcher) = setup(config, adapter.clone()).await;

    let mut offset: i64 = 0;
    let timeout_seconds = 30;

    tracing::info!("Starting message loop...");

    loop {
        match adapter.get_updates(offset, timeout_seconds).await {
            Ok(updates) => {
                for update in &updates {
                    let Some(msg) = &update.message else { continue };
                    let Some(text) = &msg.text else { continue };

                    let chat_id = msg.chat.id.to_string();
                    let sender = msg.from.as_ref().map(|u| {
                        let mut user = User::new(u.id.to_string());
                        user.is_bot = u.is_bot;
                        if let Some(ref username) = u.username {
                            user = user.with_username(username.clone());
                        }
                        if let Some(ref first) = u.first_name {
                            user = user.with_first_name(first.clone());
                        }
                        user
                    });

                    if sender.as_ref().map(|u| u.is_bot).unwrap_or(false) {
                        continue;
                    }

                    let message = dispatcher
                        .parser()
                        .parse(chat_id.clone(), text.as_str(), sender)
                        .with_platform("telegram");

                    if let Some(reply) = dispatcher.dispatch(message).await {
                        deliver(adapter.as_ref(), &chat_id, reply).await;
                    }
                }

                if !updates.is_empty() {
                    offset = TelegramAdapter::get_next_offset(&updates);
                }
            }
            Err(e) => {
                tracing::error!("Failed to get updates: {}", e);
                tokio::time::sleep(tokio::time::Duration::from_secs(5)).await;
            }
        }
    }
}

async fn run_console(config: Arc<Config>) {
    use tokio::io::AsyncBufReadExt;

    let adapter = Arc::new(ConsoleAdapter::new());
    let (_ctx, _loader, dispatcher) = setup(config, adapter.clone()).await;

    println!("kotoba-bot dev console. Type commands, Ctrl-D to exit.");

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.trim().is_empty() {
            continue;
        }

        let message = dispatcher
            .parser()
            .parse("console", line, Some(User::new("console")))
            .with_platform("console");

        if let Some(reply) = dispatcher.dispatch(message).await {
            deliver(adapter.as_ref(), "console", reply).await;
        }
    }
}

/// Send a reply through the adapter, logging delivery failures
async fn deliver(adapter: &dyn Bot, chat_id: &str, reply: Reply) {
    let result = match reply.photo {
        Some(ref photo) => adapter.send_photo(chat_id, &reply.text, photo).await,
        None => adapter.send_message(chat_id, &reply.text).await,
    };

    if let Err(e) = result {
        tracing::error!("Failed to send message: {}", e);
    }
}

fn init_config(path: &str) {
    if std::path::Path::new(path).exists() {
        eprintln!("Config file {} already exists", path);
        return;
    }

    match serde_yaml::to_string(&Config::default()) {
        Ok(yaml) => match std::fs::write(path, yaml) {
            Ok(()) => println!("Wrote default config to {}", path),
            Err(e) => eprintln!("Failed to write {}: {}", path, e),
        },
        Err(e) => eprintln!("Failed to serialize default config: {}", e),
    }
}
