//! Execution Context
//!
//! A context is built fresh for every inbound message or interaction and is
//! dropped once that event has been handled.

use std::sync::Arc;

use serenity::all::{
    ChannelId, CreateInteractionResponse, CreateInteractionResponseMessage, Interaction, Message,
    UserId,
};
use serenity::http::Http;
use sqlx::PgPool;

use super::Bot;

/// The inbound event a context was built from.
#[derive(Debug, Clone)]
pub enum Origin {
    Message(Box<Message>),
    Interaction(Box<Interaction>),
}

impl From<Message> for Origin {
    fn from(message: Message) -> Self {
        Origin::Message(Box::new(message))
    }
}

impl From<Interaction> for Origin {
    fn from(interaction: Interaction) -> Self {
        Origin::Interaction(Box::new(interaction))
    }
}

impl Origin {
    pub fn channel_id(&self) -> Option<ChannelId> {
        match self {
            Origin::Message(message) => Some(message.channel_id),
            Origin::Interaction(interaction) => match &**interaction {
                Interaction::Command(cmd) | Interaction::Autocomplete(cmd) => Some(cmd.channel_id),
                Interaction::Component(component) => Some(component.channel_id),
                Interaction::Modal(modal) => Some(modal.channel_id),
                _ => None,
            },
        }
    }

    pub fn author_id(&self) -> Option<UserId> {
        match self {
            Origin::Message(message) => Some(message.author.id),
            Origin::Interaction(interaction) => match &**interaction {
                Interaction::Command(cmd) | Interaction::Autocomplete(cmd) => Some(cmd.user.id),
                Interaction::Component(component) => Some(component.user.id),
                Interaction::Modal(modal) => Some(modal.user.id),
                _ => None,
            },
        }
    }

    /// Text content of a message origin.
    pub fn content(&self) -> Option<&str> {
        match self {
            Origin::Message(message) => Some(message.content.as_str()),
            Origin::Interaction(_) => None,
        }
    }

    /// Name of the application command an interaction origin invoked.
    pub fn command_name(&self) -> Option<&str> {
        match self {
            Origin::Interaction(interaction) => match &**interaction {
                Interaction::Command(cmd) => Some(cmd.data.name.as_str()),
                _ => None,
            },
            Origin::Message(_) => None,
        }
    }
}

/// Build a context type from an inbound event.
///
/// Implement this on a custom type to use it with [`Bot::get_context_with`].
pub trait FromOrigin: Sized {
    fn from_origin(origin: Origin, bot: Arc<Bot>, http: Arc<Http>) -> Self;
}

/// Per-event execution context.
#[derive(Clone)]
pub struct Context {
    pub origin: Origin,
    pub bot: Arc<Bot>,
    pub http: Arc<Http>,
}

impl FromOrigin for Context {
    fn from_origin(origin: Origin, bot: Arc<Bot>, http: Arc<Http>) -> Self {
        Self { origin, bot, http }
    }
}

impl Context {
    pub fn pool(&self) -> &PgPool {
        self.bot.pool()
    }

    pub fn session(&self) -> &reqwest::Client {
        self.bot.session()
    }

    /// Whether the author of the event is a configured bot owner.
    pub fn is_owner(&self) -> bool {
        self.origin
            .author_id()
            .is_some_and(|id| self.bot.is_owner(id))
    }

    /// Respond to the event that produced this context.
    pub async fn reply(&self, content: impl Into<String>) -> serenity::Result<()> {
        let content = content.into();

        match &self.origin {
            Origin::Message(message) => {
                message.reply(&self.http, content).await?;
            }
            Origin::Interaction(interaction) => {
                let response = CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new().content(content),
                );
                match &**interaction {
                    Interaction::Command(cmd) => cmd.create_response(&self.http, response).await?,
                    Interaction::Component(component) => {
                        component.create_response(&self.http, response).await?
                    }
                    Interaction::Modal(modal) => {
                        modal.create_response(&self.http, response).await?
                    }
                    other => {
                        tracing::debug!(kind = ?other.kind(), "Interaction cannot be replied to");
                    }
                }
            }
        }

        Ok(())
    }
}
