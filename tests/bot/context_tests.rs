//! Context Construction Tests

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serenity::all::{Message, UserId};
use serenity::http::Http;

use lotbot::bot::{Bot, Context, FromOrigin, Origin};
use lotbot::cog::{BaseCog, Cog, CogError, CogMeta};
use lotbot::extensions::utility::Utility;
use lotbot::extensions::ExtensionCatalog;

use crate::common::{capture_logs, test_bot, OWNER_ID};

fn message(author: u64, content: &str) -> Message {
    let mut message = Message::default();
    message.author.id = UserId::new(author);
    message.content = content.to_string();
    message
}

fn http() -> Arc<Http> {
    Arc::new(Http::new("token"))
}

/// Records the content of every message context it sees
struct Recorder {
    base: BaseCog,
    seen: Mutex<Vec<String>>,
}

impl Recorder {
    fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            base: BaseCog::new(name, CogMeta::new().brief("records events")),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Cog for Recorder {
    fn base(&self) -> &BaseCog {
        &self.base
    }

    async fn on_context(&self, ctx: &Context) -> anyhow::Result<()> {
        if let Some(content) = ctx.origin.content() {
            self.seen.lock().push(content.to_string());
        }
        Ok(())
    }
}

/// Fails on every event
struct Broken {
    base: BaseCog,
}

#[async_trait]
impl Cog for Broken {
    fn base(&self) -> &BaseCog {
        &self.base
    }

    async fn on_context(&self, _ctx: &Context) -> anyhow::Result<()> {
        anyhow::bail!("cog exploded")
    }
}

/// Alternative context type built through the same contract
struct AuditContext {
    author: Option<UserId>,
    bot: Arc<Bot>,
}

impl FromOrigin for AuditContext {
    fn from_origin(origin: Origin, bot: Arc<Bot>, _http: Arc<Http>) -> Self {
        Self {
            author: origin.author_id(),
            bot,
        }
    }
}

#[tokio::test]
async fn test_context_is_bound_to_event_and_bot() {
    let bot = test_bot(ExtensionCatalog::new());

    let ctx = bot.get_context(Origin::from(message(7, "hello")), http());

    assert!(Arc::ptr_eq(&ctx.bot, &bot));
    assert_eq!(ctx.origin.content(), Some("hello"));
    assert_eq!(ctx.origin.author_id(), Some(UserId::new(7)));
    assert_eq!(ctx.origin.command_name(), None);
    assert!(!ctx.is_owner());
}

#[tokio::test]
async fn test_owner_is_recognised() {
    let bot = test_bot(ExtensionCatalog::new());
    let ctx = bot.get_context(Origin::from(message(OWNER_ID, "hi")), http());
    assert!(ctx.is_owner());
}

#[tokio::test]
async fn test_custom_context_type() {
    let bot = test_bot(ExtensionCatalog::new());

    let ctx: AuditContext = bot.get_context_with(Origin::from(message(9, "x")), http());

    assert_eq!(ctx.author, Some(UserId::new(9)));
    assert!(Arc::ptr_eq(&ctx.bot, &bot));
}

#[tokio::test]
async fn test_dispatch_reaches_every_cog() {
    let (logs, _guard) = capture_logs();
    let bot = test_bot(ExtensionCatalog::new());
    let first = Recorder::new("First");
    let second = Recorder::new("Second");
    bot.add_cog(first.clone()).unwrap();
    bot.add_cog(Arc::new(Broken {
        base: BaseCog::new("Broken", CogMeta::new()),
    }))
    .unwrap();
    bot.add_cog(second.clone()).unwrap();

    let ctx = bot.get_context(Origin::from(message(7, "hello")), http());
    bot.dispatch(&ctx).await;

    assert_eq!(*first.seen.lock(), vec!["hello"]);
    assert_eq!(*second.seen.lock(), vec!["hello"]);
    assert_eq!(logs.lines_containing("cog exploded").len(), 1);
}

#[tokio::test]
async fn test_duplicate_cog_name_rejected() {
    let bot = test_bot(ExtensionCatalog::new());
    bot.add_cog(Recorder::new("Same")).unwrap();

    let err = bot.add_cog(Recorder::new("Same")).unwrap_err();
    assert!(matches!(err, CogError::AlreadyRegistered(name) if name == "Same"));
    assert_eq!(bot.cogs().len(), 1);
}

/// Owner-only commands from anyone else are ignored without a reply
#[tokio::test]
async fn test_utility_ignores_non_owner_reload() {
    let bot = test_bot(ExtensionCatalog::builtin());
    bot.setup_hook().await;
    let before = bot.get_cog(Utility::NAME).unwrap().id();

    let ctx = bot.get_context(Origin::from(message(7, "!reload utility")), http());
    bot.dispatch(&ctx).await;

    assert_eq!(bot.get_cog(Utility::NAME).unwrap().id(), before);
}
