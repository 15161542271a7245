//! Gateway event handler
//!
//! Turns inbound messages and interactions into contexts and hands them to
//! the bot's cogs.

use std::sync::Arc;

use serenity::all::{
    Command, Context as GatewayContext, EventHandler, Interaction, Message, Ready,
};
use serenity::async_trait;

use super::{Bot, Origin};

pub struct Handler {
    bot: Arc<Bot>,
}

impl Handler {
    pub fn new(bot: Arc<Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    /// Called when the bot is ready and connected to Discord
    async fn ready(&self, ctx: GatewayContext, ready: Ready) {
        tracing::info!("{} is connected to Discord!", ready.user.name);

        let commands = self.bot.slash_commands();
        let count = commands.len();
        match Command::set_global_commands(&ctx, commands).await {
            Ok(_) => tracing::info!(count, "Registered application commands"),
            Err(e) => tracing::warn!("Failed to register application commands: {}", e),
        }
    }

    async fn message(&self, ctx: GatewayContext, message: Message) {
        if message.author.bot {
            return;
        }

        let context = self.bot.get_context(Origin::from(message), ctx.http.clone());
        self.bot.dispatch(&context).await;
    }

    async fn interaction_create(&self, ctx: GatewayContext, interaction: Interaction) {
        let context = self
            .bot
            .get_context(Origin::from(interaction), ctx.http.clone());
        self.bot.dispatch(&context).await;
    }
}
