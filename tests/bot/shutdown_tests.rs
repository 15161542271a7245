//! Shutdown and Task Tests

use pretty_assertions::assert_eq;

use lotbot::bot::Lifecycle;
use lotbot::extensions::ExtensionCatalog;
use lotbot::startup::with_pool;

use crate::common::{capture_logs, lazy_pool, probe_catalog, test_bot, Probe};

#[tokio::test]
async fn test_new_bot_is_attached() {
    let bot = test_bot(ExtensionCatalog::new());
    assert_eq!(bot.state(), Lifecycle::Attached);
}

/// Close unloads extensions in reverse load order, once
#[tokio::test]
async fn test_close_unloads_in_reverse_order() {
    let probe = Probe::new();
    let bot = test_bot(probe_catalog(&probe, &["a", "b"]));
    bot.setup_hook_with(&["a", "b"]).await;

    bot.close().await;
    bot.close().await;

    assert_eq!(
        probe.events(),
        vec!["setup:a", "setup:b", "teardown:b", "teardown:a"]
    );
    assert_eq!(bot.state(), Lifecycle::Terminated);
    assert!(bot.extensions().is_empty());
}

/// Closing before the bot ever ran still terminates
#[tokio::test]
async fn test_close_before_running() {
    let bot = test_bot(ExtensionCatalog::new());
    bot.close().await;
    assert_eq!(bot.state(), Lifecycle::Terminated);
}

/// The pool is released even when work inside the scope fails
#[tokio::test]
async fn test_pool_released_when_bot_setup_fails() {
    let pool = lazy_pool();

    let result: Result<(), &str> = with_pool(pool.clone(), |_pool| async {
        Err("failed to create bot instance")
    })
    .await;

    assert!(result.is_err());
    assert!(pool.is_closed());
}

#[tokio::test]
async fn test_create_task_runs_named_and_unnamed() {
    let bot = test_bot(ExtensionCatalog::new());

    let named = bot.create_task(async { 1 + 1 }, Some("adder"));
    let unnamed = bot.create_task(async { "done" }, None);

    assert_eq!(named.await.unwrap(), 2);
    assert_eq!(unnamed.await.unwrap(), "done");
}

#[tokio::test]
async fn test_named_task_logs_inside_span() {
    let (logs, _guard) = capture_logs();
    let bot = test_bot(ExtensionCatalog::new());

    bot.create_task(async { tracing::info!("inside task") }, Some("reporter"))
        .await
        .unwrap();

    let lines = logs.lines_containing("inside task");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("reporter"));
}
