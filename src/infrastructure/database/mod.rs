//! Database Module
//!
//! PostgreSQL connection pool bootstrap and the `jsonb` codec.

pub mod jsonb;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnection, PgPoolOptions};
use sqlx::PgPool;

use crate::config::DatabaseSettings;
use crate::shared::BootstrapError;

pub use jsonb::{decode_jsonb, encode_jsonb, Jsonb};

/// Per-connection initializer run once on every newly opened connection.
pub type InitHook<C> =
    Arc<dyn for<'c> Fn(&'c mut C) -> BoxFuture<'c, Result<(), sqlx::Error>> + Send + Sync>;

/// Initializer for PostgreSQL connections.
pub type PgInitHook = InitHook<PgConnection>;

/// Wrap an async closure as an [`InitHook`].
pub fn init_hook<C, F>(f: F) -> InitHook<C>
where
    F: for<'c> Fn(&'c mut C) -> BoxFuture<'c, Result<(), sqlx::Error>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Run `mandatory` and then, on the same connection, `extra` if present.
///
/// `extra` is skipped when `mandatory` fails.
pub fn chain_init<C>(mandatory: InitHook<C>, extra: Option<InitHook<C>>) -> InitHook<C>
where
    C: Send + 'static,
{
    init_hook(move |conn: &mut C| {
        let mandatory = mandatory.clone();
        let extra = extra.clone();
        Box::pin(async move {
            mandatory(&mut *conn).await?;
            if let Some(extra) = extra {
                extra(&mut *conn).await?;
            }
            Ok(())
        })
    })
}

/// Options forwarded to the pool builder.
pub struct PoolOptions<C = PgConnection> {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    /// Caller initializer, run after the codec registration.
    pub after_connect: Option<InitHook<C>>,
}

impl<C> Default for PoolOptions<C> {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            acquire_timeout: Duration::from_secs(30),
            after_connect: None,
        }
    }
}

impl<C> From<&DatabaseSettings> for PoolOptions<C> {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            max_connections: settings.max_connections,
            min_connections: settings.min_connections,
            acquire_timeout: settings.acquire_timeout(),
            after_connect: None,
        }
    }
}

impl<C: Send + 'static> PoolOptions<C> {
    /// Set the caller initializer.
    pub fn after_connect(mut self, hook: InitHook<C>) -> Self {
        self.after_connect = Some(hook);
        self
    }

    /// `mandatory` followed by the caller initializer, if any.
    pub fn connection_init_with(&self, mandatory: InitHook<C>) -> InitHook<C> {
        chain_init(mandatory, self.after_connect.clone())
    }
}

impl PoolOptions<PgConnection> {
    /// The full initializer chain every connection goes through.
    pub fn connection_init(&self) -> PgInitHook {
        self.connection_init_with(init_hook(|conn: &mut PgConnection| {
            Box::pin(jsonb::register(conn))
        }))
    }
}

/// Create the PostgreSQL connection pool.
///
/// Every connection registers the `jsonb` codec before the caller's own
/// initializer runs.
///
/// # Errors
///
/// - `BootstrapError::EmptyUri` if `uri` is blank
/// - `BootstrapError::Pool` if the pool cannot connect
/// - `BootstrapError::PoolAbsent` if the pool comes back unusable
pub async fn setup_pool(uri: &str, options: PoolOptions) -> Result<PgPool, BootstrapError> {
    if uri.trim().is_empty() {
        return Err(BootstrapError::EmptyUri);
    }

    let init = options.connection_init();

    let pool = PgPoolOptions::new()
        .max_connections(options.max_connections)
        .min_connections(options.min_connections)
        .acquire_timeout(options.acquire_timeout)
        .after_connect(move |conn, _meta| init(conn))
        .connect(uri)
        .await?;

    ensure_open(pool)
}

/// Reject a pool that is already closed.
pub fn ensure_open(pool: PgPool) -> Result<PgPool, BootstrapError> {
    if pool.is_closed() {
        return Err(BootstrapError::PoolAbsent);
    }
    Ok(pool)
}
