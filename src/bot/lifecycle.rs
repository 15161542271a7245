//! Process shell lifecycle states.

use std::fmt;

/// Where the bot is in its life.
///
/// ```text
/// Uninitialized -> Attached -> ExtensionsLoading -> Running -> ShuttingDown -> Terminated
/// ```
///
/// `ShuttingDown` may also be entered from any earlier state when the
/// process is told to stop before it finished starting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// Pool and session handed to the bot.
    Attached,
    ExtensionsLoading,
    Running,
    ShuttingDown,
    Terminated,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Attached => "attached",
            Lifecycle::ExtensionsLoading => "extensions_loading",
            Lifecycle::Running => "running",
            Lifecycle::ShuttingDown => "shutting_down",
            Lifecycle::Terminated => "terminated",
        }
    }

    /// Whether the shell has started, or finished, shutting down.
    pub fn is_stopping(self) -> bool {
        matches!(self, Lifecycle::ShuttingDown | Lifecycle::Terminated)
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
