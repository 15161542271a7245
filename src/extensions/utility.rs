//! Utility extension
//!
//! Diagnostics plus owner-only commands to manage extensions at runtime.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::CreateCommand;

use super::Extension;
use crate::bot::{Bot, Context};
use crate::cog::{BaseCog, Cog, CogMeta};

/// Name the extension is registered under.
pub const NAME: &str = "utility";

pub struct UtilityExtension;

#[async_trait]
impl Extension for UtilityExtension {
    async fn setup(&self, bot: &Bot) -> anyhow::Result<()> {
        bot.add_cog(Arc::new(Utility::new()))?;
        Ok(())
    }

    async fn teardown(&self, bot: &Bot) -> anyhow::Result<()> {
        bot.remove_cog(Utility::NAME);
        Ok(())
    }
}

/// Application commands the utility cog answers, as `(name, description)`.
pub const SLASH_COMMANDS: &[(&str, &str)] = &[
    ("ping", "Check that the bot is responding"),
    ("uptime", "Show how long the bot has been running"),
];

/// A command recognised by the utility cog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command<'a> {
    Ping,
    Uptime,
    Extensions,
    Load(&'a str),
    Reload(&'a str),
    Unload(&'a str),
}

impl<'a> Command<'a> {
    /// Parse a prefixed text command, e.g. `!reload utility`.
    ///
    /// An empty prefix disables text commands.
    pub fn parse(prefix: &str, content: &'a str) -> Option<Self> {
        if prefix.is_empty() {
            return None;
        }

        let rest = content.trim().strip_prefix(prefix)?;
        let mut words = rest.split_whitespace();
        let name = words.next()?;
        let arg = words.next();

        match (name, arg) {
            ("ping", _) => Some(Command::Ping),
            ("uptime", _) => Some(Command::Uptime),
            ("extensions", _) => Some(Command::Extensions),
            ("load", Some(ext)) => Some(Command::Load(ext)),
            ("reload", Some(ext)) => Some(Command::Reload(ext)),
            ("unload", Some(ext)) => Some(Command::Unload(ext)),
            _ => None,
        }
    }

    /// Map an application command name. Only the read-only commands in
    /// [`SLASH_COMMANDS`] are exposed as slash commands.
    pub fn from_slash(name: &str) -> Option<Self> {
        match name {
            "ping" => Some(Command::Ping),
            "uptime" => Some(Command::Uptime),
            _ => None,
        }
    }

    pub fn owner_only(&self) -> bool {
        !matches!(self, Command::Ping | Command::Uptime)
    }
}

/// Format a duration as `1d 2h 3m 4s`, dropping leading zero units.
pub fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    let (days, hours, minutes, seconds) =
        (secs / 86_400, secs / 3_600 % 24, secs / 60 % 60, secs % 60);

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

pub struct Utility {
    base: BaseCog,
}

impl Utility {
    pub const NAME: &'static str = "Utility";

    pub fn new() -> Self {
        Self {
            base: BaseCog::new(
                Self::NAME,
                CogMeta::new()
                    .emoji("🛠️")
                    .brief("Bot utilities and diagnostics"),
            ),
        }
    }

    async fn run(&self, ctx: &Context, command: Command<'_>) -> anyhow::Result<()> {
        let bot = &ctx.bot;

        let reply = match command {
            Command::Ping => "Pong!".to_string(),
            Command::Uptime => format!("Up for {}", format_uptime(bot.uptime())),
            Command::Extensions => {
                let loaded = bot.extensions();
                if loaded.is_empty() {
                    "No extensions loaded.".to_string()
                } else {
                    format!("Loaded extensions: {}", loaded.join(", "))
                }
            }
            Command::Load(ext) => outcome_reply("load", ext, bot.load_extension(ext, None).await),
            Command::Reload(ext) => {
                outcome_reply("reload", ext, bot.reload_extension(ext, None).await)
            }
            Command::Unload(ext) => {
                outcome_reply("unload", ext, bot.unload_extension(ext, None).await)
            }
        };

        ctx.reply(reply).await?;
        Ok(())
    }
}

impl Default for Utility {
    fn default() -> Self {
        Self::new()
    }
}

fn outcome_reply(verb: &str, ext: &str, outcome: Option<()>) -> String {
    match outcome {
        Some(()) => format!("Finished {}ing `{}`.", verb, ext),
        None => format!("Failed to {} `{}`, check the logs.", verb, ext),
    }
}

#[async_trait]
impl Cog for Utility {
    fn base(&self) -> &BaseCog {
        &self.base
    }

    fn slash_commands(&self) -> Vec<CreateCommand> {
        SLASH_COMMANDS
            .iter()
            .map(|(name, description)| CreateCommand::new(*name).description(*description))
            .collect()
    }

    async fn on_context(&self, ctx: &Context) -> anyhow::Result<()> {
        let prefix = &ctx.bot.settings().prefix;

        let command = match (ctx.origin.content(), ctx.origin.command_name()) {
            (Some(content), _) => Command::parse(prefix, content),
            (None, Some(name)) => Command::from_slash(name),
            (None, None) => None,
        };

        let Some(command) = command else {
            return Ok(());
        };

        if command.owner_only() && !ctx.is_owner() {
            tracing::debug!(?command, "Ignoring owner-only command from non-owner");
            return Ok(());
        }

        self.run(ctx, command).await
    }
}
