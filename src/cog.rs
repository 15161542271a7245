//! Cogs
//!
//! A cog is a feature module attached to the running bot. Each cog is
//! registered with an optional emoji and a short description, and gets a
//! pseudo-random identifier when it is built.

use std::fmt;

use async_trait::async_trait;
use serenity::all::CreateCommand;
use uuid::Uuid;

use crate::bot::Context;

/// Number of decimal digits in a [`CogId`].
const COG_ID_DIGITS: usize = 20;

/// Display metadata supplied when a cog is registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CogMeta {
    pub emoji: Option<String>,
    pub brief: Option<String>,
}

impl CogMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emoji(mut self, emoji: impl Into<String>) -> Self {
        self.emoji = Some(emoji.into());
        self
    }

    pub fn brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = Some(brief.into());
        self
    }
}

/// Pseudo-random 20 digit cog identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CogId(u128);

impl CogId {
    pub fn generate() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// The leading 20 decimal digits of the UUID's integer value.
    pub fn from_uuid(uuid: Uuid) -> Self {
        let id = uuid
            .as_u128()
            .to_string()
            .bytes()
            .take(COG_ID_DIGITS)
            .fold(0u128, |acc, digit| acc * 10 + u128::from(digit - b'0'));
        Self(id)
    }

    pub fn get(self) -> u128 {
        self.0
    }
}

impl fmt::Display for CogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State every cog carries.
#[derive(Debug, Clone)]
pub struct BaseCog {
    name: String,
    meta: CogMeta,
    id: CogId,
}

impl BaseCog {
    pub fn new(name: impl Into<String>, meta: CogMeta) -> Self {
        Self {
            name: name.into(),
            meta,
            id: CogId::generate(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &CogMeta {
        &self.meta
    }

    pub fn id(&self) -> CogId {
        self.id
    }
}

/// A feature module attached to the bot.
#[async_trait]
pub trait Cog: Send + Sync {
    fn base(&self) -> &BaseCog;

    fn name(&self) -> &str {
        self.base().name()
    }

    fn meta(&self) -> &CogMeta {
        self.base().meta()
    }

    fn id(&self) -> CogId {
        self.base().id()
    }

    /// Application commands this cog answers. Registered with Discord once
    /// the gateway is ready.
    fn slash_commands(&self) -> Vec<CreateCommand> {
        Vec::new()
    }

    /// Handle a context built from an inbound message or interaction.
    async fn on_context(&self, _ctx: &Context) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Cog registration error
#[derive(Debug, thiserror::Error)]
pub enum CogError {
    #[error("Cog {0:?} is already registered")]
    AlreadyRegistered(String),
}
