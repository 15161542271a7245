//! Bot Process Shell
//!
//! [`Bot`] owns the database pool, the HTTP session and the runtime handle
//! for the life of the process. It loads the startup extensions, builds a
//! [`Context`] for every inbound event and fans it out to the registered
//! cogs.

mod context;
mod handler;
mod lifecycle;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use serenity::all::{Client, CreateCommand, GatewayIntents, UserId};
use serenity::gateway::ShardManager;
use serenity::http::Http;
use sqlx::PgPool;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::cog::{Cog, CogError};
use crate::config::BotSettings;
use crate::extensions::{
    self, wrap_extension, ExtensionArgs, ExtensionCatalog, ExtensionManager, Operation,
};
use crate::shared::BootstrapError;

pub use context::{Context, FromOrigin, Origin};
pub use handler::Handler;
pub use lifecycle::Lifecycle;

/// Extensions loaded, in order, when the bot starts.
pub const INITIAL_EXTENSIONS: &[&str] = &[extensions::utility::NAME];

/// The bot process shell.
pub struct Bot {
    pool: PgPool,
    session: reqwest::Client,
    handle: Handle,
    settings: BotSettings,
    extensions: ExtensionManager,
    cogs: RwLock<Vec<Arc<dyn Cog>>>,
    state: Mutex<Lifecycle>,
    shard_manager: Mutex<Option<Arc<ShardManager>>>,
    started_at: Instant,
}

impl Bot {
    /// Create the bot with the built-in extension catalog. Performs no I/O.
    pub fn new(pool: PgPool, session: reqwest::Client, handle: Handle, settings: BotSettings) -> Self {
        Self::with_catalog(pool, session, handle, settings, ExtensionCatalog::builtin())
    }

    /// Create the bot with an explicit extension catalog.
    pub fn with_catalog(
        pool: PgPool,
        session: reqwest::Client,
        handle: Handle,
        settings: BotSettings,
        catalog: ExtensionCatalog,
    ) -> Self {
        let bot = Self {
            pool,
            session,
            handle,
            settings,
            extensions: ExtensionManager::new(catalog),
            cogs: RwLock::new(Vec::new()),
            state: Mutex::new(Lifecycle::Uninitialized),
            shard_manager: Mutex::new(None),
            started_at: Instant::now(),
        };
        bot.set_state(Lifecycle::Attached);
        bot
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn session(&self) -> &reqwest::Client {
        &self.session
    }

    pub fn settings(&self) -> &BotSettings {
        &self.settings
    }

    pub fn state(&self) -> Lifecycle {
        *self.state.lock()
    }

    fn set_state(&self, next: Lifecycle) {
        let prev = std::mem::replace(&mut *self.state.lock(), next);
        tracing::debug!(from = %prev, to = %next, "Lifecycle transition");
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.settings.owners.contains(&user.get())
    }

    // ============================================================================
    // Extensions
    // ============================================================================

    /// Names of the loaded extensions, in load order.
    pub fn extensions(&self) -> Vec<String> {
        self.extensions.loaded()
    }

    pub async fn load_extension(&self, name: &str, package: Option<&str>) -> Option<()> {
        wrap_extension(
            Operation::Load,
            ExtensionArgs::new(name, package),
            self.extensions.load(name, package, self),
        )
        .await
    }

    pub async fn reload_extension(&self, name: &str, package: Option<&str>) -> Option<()> {
        wrap_extension(
            Operation::Reload,
            ExtensionArgs::new(name, package),
            self.extensions.reload(name, package, self),
        )
        .await
    }

    pub async fn unload_extension(&self, name: &str, package: Option<&str>) -> Option<()> {
        wrap_extension(
            Operation::Unload,
            ExtensionArgs::new(name, package),
            self.extensions.unload(name, package, self),
        )
        .await
    }

    /// Load [`INITIAL_EXTENSIONS`] and mark the bot running.
    pub async fn setup_hook(&self) {
        self.setup_hook_with(INITIAL_EXTENSIONS).await;
    }

    /// Load `names` one after another, then mark the bot running.
    ///
    /// Failures are logged by the lifecycle wrapper and do not stop the
    /// remaining loads; the bot is marked running even if every load failed.
    pub async fn setup_hook_with(&self, names: &[&str]) {
        self.set_state(Lifecycle::ExtensionsLoading);

        for name in names {
            self.load_extension(name, None).await;
        }

        self.set_state(Lifecycle::Running);
    }

    // ============================================================================
    // Cogs
    // ============================================================================

    pub fn add_cog(&self, cog: Arc<dyn Cog>) -> Result<(), CogError> {
        let mut cogs = self.cogs.write();
        if cogs.iter().any(|existing| existing.name() == cog.name()) {
            return Err(CogError::AlreadyRegistered(cog.name().to_string()));
        }

        tracing::debug!(cog = cog.name(), id = %cog.id(), "Cog added");
        cogs.push(cog);
        Ok(())
    }

    pub fn remove_cog(&self, name: &str) -> Option<Arc<dyn Cog>> {
        let mut cogs = self.cogs.write();
        let index = cogs.iter().position(|cog| cog.name() == name)?;
        let cog = cogs.remove(index);
        tracing::debug!(cog = name, "Cog removed");
        Some(cog)
    }

    pub fn get_cog(&self, name: &str) -> Option<Arc<dyn Cog>> {
        self.cogs.read().iter().find(|cog| cog.name() == name).cloned()
    }

    pub fn cogs(&self) -> Vec<Arc<dyn Cog>> {
        self.cogs.read().clone()
    }

    /// Application commands of every registered cog.
    pub fn slash_commands(&self) -> Vec<CreateCommand> {
        self.cogs
            .read()
            .iter()
            .flat_map(|cog| cog.slash_commands())
            .collect()
    }

    // ============================================================================
    // Events
    // ============================================================================

    /// Build the default context for an inbound event.
    pub fn get_context(self: &Arc<Self>, origin: Origin, http: Arc<Http>) -> Context {
        self.get_context_with(origin, http)
    }

    /// Build a caller-chosen context type for an inbound event.
    pub fn get_context_with<C: FromOrigin>(self: &Arc<Self>, origin: Origin, http: Arc<Http>) -> C {
        C::from_origin(origin, Arc::clone(self), http)
    }

    /// Hand a context to every registered cog.
    pub async fn dispatch(&self, ctx: &Context) {
        for cog in self.cogs() {
            if let Err(e) = cog.on_context(ctx).await {
                tracing::warn!(cog = cog.name(), "Cog failed to handle event: {:#}", e);
            }
        }
    }

    /// Spawn a task on the bot's runtime. Named tasks run inside a `task` span.
    pub fn create_task<F>(&self, fut: F, name: Option<&str>) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        match name {
            Some(name) => self
                .handle
                .spawn(fut.instrument(tracing::info_span!("task", name = %name))),
            None => self.handle.spawn(fut),
        }
    }

    // ============================================================================
    // Gateway
    // ============================================================================

    /// Log in, load the startup extensions and run the gateway client until
    /// it stops.
    pub async fn start(self: &Arc<Self>, token: &str) -> Result<(), BootstrapError> {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let mut client = Client::builder(token, intents)
            .event_handler(Handler::new(Arc::clone(self)))
            .await?;
        *self.shard_manager.lock() = Some(client.shard_manager.clone());

        self.setup_hook().await;

        tracing::info!("Starting Discord bot...");
        client.start().await?;

        Ok(())
    }

    /// Stop the gateway and unload every extension. Runs once; later calls
    /// return immediately.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock();
            if state.is_stopping() {
                return;
            }
            *state = Lifecycle::ShuttingDown;
        }
        tracing::debug!(to = %Lifecycle::ShuttingDown, "Lifecycle transition");

        let shard_manager = self.shard_manager.lock().take();
        if let Some(shard_manager) = shard_manager {
            shard_manager.shutdown_all().await;
        }

        for name in self.extensions().into_iter().rev() {
            self.unload_extension(&name, None).await;
        }

        self.set_state(Lifecycle::Terminated);
    }
}
