//! Extension Lifecycle Tests
//!
//! Startup ordering, failure containment and the log lines each lifecycle
//! operation produces.

use pretty_assertions::assert_eq;

use lotbot::bot::Lifecycle;
use lotbot::extensions::utility::{Utility, SLASH_COMMANDS};
use lotbot::extensions::ExtensionCatalog;

use crate::common::{capture_logs, probe_catalog, test_bot, Probe};

/// A failing extension is attempted in order and does not stop the rest
#[tokio::test]
async fn test_startup_continues_past_failing_extension() {
    let (logs, _guard) = capture_logs();
    let probe = Probe::new();
    probe.fail_next_setup("b");
    let bot = test_bot(probe_catalog(&probe, &["a", "b", "c"]));

    bot.setup_hook_with(&["a", "b", "c"]).await;

    assert_eq!(probe.events(), vec!["setup:a", "setup:b", "setup:c"]);
    assert_eq!(bot.extensions(), vec!["a", "c"]);
    assert_eq!(bot.state(), Lifecycle::Running);

    assert_eq!(logs.lines_containing("load_extension took").len(), 2);
    let failures = logs.lines_containing("Failed to load extension in");
    assert_eq!(failures.len(), 1);
    assert!(failures[0].contains("WARN"));
    assert!(failures[0].contains("on ext \"b\""));
    assert!(failures[0].contains("b refused to start"));
}

/// Running is reached even when nothing loads
#[tokio::test]
async fn test_startup_reaches_running_when_every_load_fails() {
    let bot = test_bot(ExtensionCatalog::new());

    bot.setup_hook_with(&["missing", "also-missing"]).await;

    assert!(bot.extensions().is_empty());
    assert_eq!(bot.state(), Lifecycle::Running);
}

/// Success log carries the operation, elapsed seconds and extension name
#[tokio::test]
async fn test_load_logs_elapsed_time() {
    let (logs, _guard) = capture_logs();
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a"]));

    assert_eq!(bot.load_extension("a", None).await, Some(()));

    let lines = logs.lines_containing("load_extension took");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("INFO"));
    assert!(lines[0].contains(" seconds on ext \"a\""));
}

/// Keyword arguments appear verbatim in the log line
#[tokio::test]
async fn test_package_is_logged_and_resolved() {
    let (logs, _guard) = capture_logs();
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["ext.music"]));

    assert_eq!(bot.load_extension(".music", Some("ext")).await, Some(()));
    assert_eq!(bot.extensions(), vec!["ext.music"]);

    let lines = logs.lines_containing("with kwargs {package: \"ext\"}");
    assert_eq!(lines.len(), 1);
}

#[tokio::test]
async fn test_double_load_is_absorbed() {
    let (logs, _guard) = capture_logs();
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a"]));

    assert_eq!(bot.load_extension("a", None).await, Some(()));
    assert_eq!(bot.load_extension("a", None).await, None);

    assert_eq!(probe.events(), vec!["setup:a"]);
    assert_eq!(logs.lines_containing("is already loaded").len(), 1);
}

#[tokio::test]
async fn test_unload_runs_teardown() {
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a"]));

    bot.load_extension("a", None).await;
    assert_eq!(bot.unload_extension("a", None).await, Some(()));

    assert_eq!(probe.events(), vec!["setup:a", "teardown:a"]);
    assert!(bot.extensions().is_empty());
}

#[tokio::test]
async fn test_unload_unknown_is_absorbed() {
    let (logs, _guard) = capture_logs();
    let bot = test_bot(ExtensionCatalog::new());

    assert_eq!(bot.unload_extension("ghost", None).await, None);

    let lines = logs.lines_containing("Failed to unload extension in");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("has not been loaded"));
}

#[tokio::test]
async fn test_reload_replaces_instance() {
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a"]));

    bot.load_extension("a", None).await;
    assert_eq!(bot.reload_extension("a", None).await, Some(()));

    assert_eq!(probe.events(), vec!["setup:a", "teardown:a", "setup:a"]);
    assert_eq!(bot.extensions(), vec!["a"]);
}

/// A failed reload restores the previous instance
#[tokio::test]
async fn test_reload_failure_rolls_back() {
    let (logs, _guard) = capture_logs();
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a"]));

    bot.load_extension("a", None).await;
    probe.fail_next_setup("a");
    assert_eq!(bot.reload_extension("a", None).await, None);

    assert_eq!(
        probe.events(),
        vec!["setup:a", "teardown:a", "setup:a", "setup:a"]
    );
    assert_eq!(bot.extensions(), vec!["a"]);
    assert_eq!(logs.lines_containing("Failed to reload extension in").len(), 1);
}

/// The built-in startup list loads the utility extension and its cog
#[tokio::test]
async fn test_builtin_setup_hook_registers_utility_cog() {
    let bot = test_bot(ExtensionCatalog::builtin());

    bot.setup_hook().await;

    assert_eq!(bot.extensions(), vec!["utility"]);
    let cog = bot.get_cog(Utility::NAME).expect("utility cog registered");
    assert_eq!(cog.meta().emoji.as_deref(), Some("🛠️"));

    bot.unload_extension("utility", None).await;
    assert!(bot.get_cog(Utility::NAME).is_none());
}

/// Reloading the utility extension swaps in a fresh cog
#[tokio::test]
async fn test_reload_utility_replaces_cog() {
    let bot = test_bot(ExtensionCatalog::builtin());
    bot.setup_hook().await;
    let before = bot.get_cog(Utility::NAME).unwrap().id();

    assert_eq!(bot.reload_extension("utility", None).await, Some(()));

    let after = bot.get_cog(Utility::NAME).unwrap().id();
    assert_ne!(before, after);
    assert_eq!(bot.cogs().len(), 1);
}

/// Slash commands registered on ready come from the loaded cogs
#[tokio::test]
async fn test_slash_commands_follow_loaded_cogs() {
    let bot = test_bot(ExtensionCatalog::builtin());
    assert!(bot.slash_commands().is_empty());

    bot.setup_hook().await;
    assert_eq!(bot.slash_commands().len(), SLASH_COMMANDS.len());

    bot.unload_extension("utility", None).await;
    assert!(bot.slash_commands().is_empty());
}
