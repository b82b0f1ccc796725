//! Extension host integration tests
//! Run with: cargo test --test extension_host_test

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use kotoba_bot::application::errors::{CommandError, ExtensionError};
use kotoba_bot::application::messaging::MessageDispatcher;
use kotoba_bot::domain::entities::{CommandSpec, Message, User};
use kotoba_bot::extensions::{
    dictionary, BotContext, CommandGroup, ExtensionDescriptor, ExtensionLoader, ExtensionManifest,
    GroupFactory, GroupRegistry, Reply,
};
use kotoba_bot::infrastructure::adapters::ConsoleAdapter;
use kotoba_bot::infrastructure::config::Config;

static INIT: Once = Once::new();

fn ensure_init() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

/// Minimal group answering a single ping command named after itself
struct EchoGroup {
    name: &'static str,
    _ctx: Arc<BotContext>,
}

#[async_trait]
impl CommandGroup for EchoGroup {
    fn name(&self) -> &str {
        self.name
    }

    fn commands(&self) -> Vec<CommandSpec> {
        vec![CommandSpec::new(format!("ping-{}", self.name))]
    }

    async fn handle(
        &self,
        _command: &str,
        _args: &[String],
        _message: &Message,
    ) -> Result<Reply, CommandError> {
        Ok(Reply::text(format!("pong from {}", self.name)))
    }
}

fn echo_factory(name: &'static str) -> GroupFactory {
    GroupFactory::new(name, move |ctx| {
        Ok(Arc::new(EchoGroup {
            name,
            _ctx: ctx.clone(),
        }))
    })
}

fn setup_alpha(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![echo_factory("alpha")])
}

fn setup_beta(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![echo_factory("beta")])
}

fn setup_broken(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Err(ExtensionError::Setup {
        name: "broken".to_string(),
        reason: "deliberate failure".to_string(),
    })
}

static GAMMA_BUILDS: AtomicUsize = AtomicUsize::new(0);

fn setup_gamma(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![GroupFactory::new("gamma", |ctx| {
        GAMMA_BUILDS.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(EchoGroup {
            name: "gamma",
            _ctx: ctx.clone(),
        }))
    })])
}

/// One good factory and one that fails to construct
fn setup_mixed(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![
        echo_factory("mixed-ok"),
        GroupFactory::new("mixed-bad", |_ctx| {
            Err(ExtensionError::Construction {
                extension: "mixed".to_string(),
                group: "mixed-bad".to_string(),
                reason: "deliberate failure".to_string(),
            })
        }),
    ])
}

fn setup_shared_one(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![echo_factory("shared")])
}

fn setup_shared_two(_ctx: &Arc<BotContext>) -> Result<Vec<GroupFactory>, ExtensionError> {
    Ok(vec![echo_factory("shared")])
}

fn descriptor(name: &'static str, setup: kotoba_bot::extensions::manifest::SetupFn) -> ExtensionDescriptor {
    ExtensionDescriptor {
        name,
        description: "test extension",
        setup,
    }
}

fn write_kanji_table(dir: &Path) {
    std::fs::write(
        dir.join("kanji.json"),
        r#"{"N5": ["日", "月"], "N4": ["鳥"]}"#,
    )
    .unwrap();
}

fn test_config(data_dir: &Path) -> Config {
    let mut config = Config::default();
    config.data.directory = data_dir.to_path_buf();
    config.bot.owners.push("boss".to_string());
    config
}

fn host(
    manifest: ExtensionManifest,
    config: Config,
) -> (Arc<BotContext>, Arc<ExtensionLoader>) {
    let registry = Arc::new(GroupRegistry::new());
    let loader = Arc::new(ExtensionLoader::new(manifest, registry));
    let ctx = Arc::new(BotContext::new(
        Arc::new(config),
        Arc::new(ConsoleAdapter::new()),
        Arc::downgrade(&loader),
    ));
    (ctx, loader)
}

fn command_from(sender: &str, name: &str, args: &[&str]) -> Message {
    Message::from_command(
        "chat",
        name,
        args.iter().map(|s| s.to_string()).collect(),
    )
    .with_sender(User::new(sender))
}

// ---------------------------------------------------------------------------
// Loader behavior
// ---------------------------------------------------------------------------

#[test]
fn broken_extension_does_not_abort_the_batch() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![
        descriptor("alpha-ext", setup_alpha),
        descriptor("broken", setup_broken),
        descriptor("beta-ext", setup_beta),
    ]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    let outcomes = loader.load_all(&ctx);

    assert_eq!(outcomes.len(), 2);
    assert!(loader.registry().contains("alpha"));
    assert!(loader.registry().contains("beta"));
    assert_eq!(loader.loaded(), vec!["alpha-ext", "beta-ext"]);
    assert!(!loader.is_loaded("broken"));
}

#[test]
fn loading_twice_without_unload_is_an_error() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("alpha-ext", setup_alpha)]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    loader.load("alpha-ext", &ctx).unwrap();
    let first = loader.registry().get("alpha").unwrap();

    let err = loader.load("alpha-ext", &ctx).unwrap_err();
    assert!(matches!(err, ExtensionError::AlreadyLoaded(_)));

    // The first load's registration is untouched
    let still = loader.registry().get("alpha").unwrap();
    assert!(Arc::ptr_eq(&first, &still));
    assert_eq!(loader.registry().len(), 1);
}

#[test]
fn unknown_extension_is_an_error() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("alpha-ext", setup_alpha)]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    let err = loader.load("nope", &ctx).unwrap_err();
    assert!(matches!(err, ExtensionError::Unknown(_)));
}

#[test]
fn unload_removes_groups_and_reload_creates_fresh_instances() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("alpha-ext", setup_alpha)]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    loader.load("alpha-ext", &ctx).unwrap();
    let before = loader.registry().get("alpha").unwrap();

    let outcome = loader.reload("alpha-ext", &ctx).unwrap();
    assert_eq!(outcome.groups, vec!["alpha"]);

    let after = loader.registry().get("alpha").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));

    let removed = loader.unload("alpha-ext").unwrap();
    assert_eq!(removed, vec!["alpha"]);
    assert!(loader.registry().get("alpha").is_none());
    assert!(loader.registry().is_empty());

    let err = loader.unload("alpha-ext").unwrap_err();
    assert!(matches!(err, ExtensionError::NotLoaded(_)));
}

#[test]
fn unload_tolerates_groups_removed_out_of_band() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("alpha-ext", setup_alpha)]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    loader.load("alpha-ext", &ctx).unwrap();
    loader.registry().remove("alpha");

    // The extension record still unloads cleanly
    assert!(loader.unload("alpha-ext").is_ok());
}

#[test]
fn excluded_groups_are_never_constructed() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("gamma-ext", setup_gamma)]);
    let mut config = test_config(dir.path());
    config.extensions.exclude_groups.push("gamma".to_string());
    let (ctx, loader) = host(manifest, config);

    let outcome = loader.load("gamma-ext", &ctx).unwrap();

    assert!(outcome.groups.is_empty());
    assert!(outcome.failures.is_empty());
    assert_eq!(GAMMA_BUILDS.load(Ordering::SeqCst), 0);
    assert!(!loader.registry().contains("gamma"));
}

#[test]
fn failing_factory_does_not_abort_sibling_groups() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![descriptor("mixed", setup_mixed)]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    let outcome = loader.load("mixed", &ctx).unwrap();

    assert_eq!(outcome.groups, vec!["mixed-ok"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(loader.registry().contains("mixed-ok"));
    assert!(!loader.registry().contains("mixed-bad"));
}

#[test]
fn duplicate_group_name_keeps_the_first_registration() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![
        descriptor("one", setup_shared_one),
        descriptor("two", setup_shared_two),
    ]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    loader.load("one", &ctx).unwrap();
    let first = loader.registry().get("shared").unwrap();

    let outcome = loader.load("two", &ctx).unwrap();
    assert!(outcome.groups.is_empty());
    assert!(matches!(
        outcome.failures.as_slice(),
        [ExtensionError::DuplicateGroup(_)]
    ));

    let still = loader.registry().get("shared").unwrap();
    assert!(Arc::ptr_eq(&first, &still));
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[test]
fn scenario_a_dictionary_survives_a_broken_sibling() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    let manifest = ExtensionManifest::new(vec![
        dictionary::descriptor(),
        descriptor("broken", setup_broken),
    ]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    let outcomes = loader.load_all(&ctx);

    assert_eq!(outcomes.len(), 1);
    assert!(loader.registry().contains("jisho"));
    assert!(loader.is_loaded("dictionary"));
    assert!(!loader.is_loaded("broken"));
}

#[tokio::test]
async fn scenario_b_admin_reload_swaps_in_a_fresh_dictionary() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    write_kanji_table(dir.path());
    let (ctx, loader) = host(ExtensionManifest::builtin(), test_config(dir.path()));

    loader.load_all(&ctx);
    assert!(loader.registry().contains("jisho"));
    assert!(loader.registry().contains("kotd"));

    let dispatcher = MessageDispatcher::new(ctx.clone(), loader.registry().clone());
    let before = loader.registry().get("jisho").unwrap();

    let reply = dispatcher
        .dispatch(command_from("boss", "reload", &["dictionary"]))
        .await
        .expect("reload should produce a reply");
    assert!(
        reply.text.contains("Successfully reloaded extension 'dictionary'"),
        "unexpected reply: {}",
        reply.text
    );

    let after = loader.registry().get("jisho").unwrap();
    assert!(!Arc::ptr_eq(&before, &after));

    // The fresh instance answers commands
    let usage = dispatcher
        .dispatch(command_from("boss", "jisho", &[]))
        .await
        .expect("jisho should reply");
    assert!(usage.text.contains("Usage"));
}

#[tokio::test]
async fn admin_commands_are_owner_only() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    write_kanji_table(dir.path());
    let (ctx, loader) = host(ExtensionManifest::builtin(), test_config(dir.path()));
    loader.load_all(&ctx);

    let dispatcher = MessageDispatcher::new(ctx.clone(), loader.registry().clone());

    let denied = dispatcher
        .dispatch(command_from("guest", "reload", &["dictionary"]))
        .await
        .unwrap();
    assert!(denied.text.contains("restricted"));

    let anonymous = dispatcher
        .dispatch(Message::from_command(
            "chat",
            "reload",
            vec!["dictionary".to_string()],
        ))
        .await
        .unwrap();
    assert!(anonymous.text.contains("restricted"));
}

#[tokio::test]
async fn admin_reports_failures_back_to_the_invoker() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    write_kanji_table(dir.path());
    let (ctx, loader) = host(ExtensionManifest::builtin(), test_config(dir.path()));
    loader.load_all(&ctx);

    let dispatcher = MessageDispatcher::new(ctx.clone(), loader.registry().clone());

    let unknown = dispatcher
        .dispatch(command_from("boss", "load", &["nope"]))
        .await
        .unwrap();
    assert!(unknown.text.contains("Unknown extension"));

    let duplicate = dispatcher
        .dispatch(command_from("boss", "load", &["dictionary"]))
        .await
        .unwrap();
    assert!(duplicate.text.contains("already loaded"));
}

#[tokio::test]
async fn unknown_commands_get_a_reply_and_text_is_ignored() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    write_kanji_table(dir.path());
    let (ctx, loader) = host(ExtensionManifest::builtin(), test_config(dir.path()));
    loader.load_all(&ctx);

    let dispatcher = MessageDispatcher::new(ctx.clone(), loader.registry().clone());

    let unknown = dispatcher
        .dispatch(command_from("boss", "frobnicate", &[]))
        .await
        .unwrap();
    assert!(unknown.text.contains("Unknown command"));

    let silent = dispatcher
        .dispatch(Message::from_text("chat", "just chatting"))
        .await;
    assert!(silent.is_none());
}

#[tokio::test]
async fn help_lists_registered_commands() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    write_kanji_table(dir.path());
    let (ctx, loader) = host(ExtensionManifest::builtin(), test_config(dir.path()));
    loader.load_all(&ctx);

    let dispatcher = MessageDispatcher::new(ctx.clone(), loader.registry().clone());

    let help = dispatcher
        .dispatch(command_from("boss", "help", &[]))
        .await
        .unwrap();
    assert!(help.text.contains("jisho"));
    assert!(help.text.contains("kotd"));
    assert!(help.text.contains("reload"));
}

#[test]
fn kotd_setup_fails_without_its_data_file() {
    ensure_init();
    let dir = tempfile::tempdir().unwrap();
    // No kanji.json written
    let manifest = ExtensionManifest::builtin().filtered(&["kotd".to_string()]);
    let (ctx, loader) = host(manifest, test_config(dir.path()));

    let err = loader.load("kotd", &ctx).unwrap_err();
    assert!(matches!(err, ExtensionError::Setup { .. }));
    assert!(loader.registry().is_empty());
}
