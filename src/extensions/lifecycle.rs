//! Extension Lifecycle Wrapper
//!
//! Every load, reload and unload is timed and its outcome logged. Failures
//! are logged as warnings and swallowed so one broken extension can never
//! stop the others from loading.

use std::fmt;
use std::future::Future;
use std::time::{Duration, Instant};

use crate::shared::ExtensionError;

/// A lifecycle operation on a named extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Load,
    Reload,
    Unload,
}

impl Operation {
    /// Name of the operation as it appears in success logs.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Load => "load_extension",
            Operation::Reload => "reload_extension",
            Operation::Unload => "unload_extension",
        }
    }

    pub fn verb(self) -> &'static str {
        match self {
            Operation::Load => "load",
            Operation::Reload => "reload",
            Operation::Unload => "unload",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Arguments a lifecycle operation was invoked with.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionArgs<'a> {
    pub name: &'a str,
    pub package: Option<&'a str>,
}

impl<'a> ExtensionArgs<'a> {
    pub fn new(name: &'a str, package: Option<&'a str>) -> Self {
        Self { name, package }
    }
}

impl fmt::Display for ExtensionArgs<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "on ext \"{}\"", self.name)?;
        if let Some(package) = self.package {
            write!(f, " with kwargs {{package: \"{}\"}}", package)?;
        }
        Ok(())
    }
}

/// Result of one timed lifecycle operation.
#[derive(Debug)]
pub enum OperationOutcome<T, E = ExtensionError> {
    Success { value: T, elapsed: Duration },
    Failure { error: E, elapsed: Duration },
}

impl<T, E: fmt::Display> OperationOutcome<T, E> {
    pub fn elapsed(&self) -> Duration {
        match self {
            OperationOutcome::Success { elapsed, .. } | OperationOutcome::Failure { elapsed, .. } => {
                *elapsed
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationOutcome::Success { .. })
    }

    /// The log line describing this outcome.
    pub fn message(&self, op: Operation, args: &ExtensionArgs<'_>) -> String {
        let secs = self.elapsed().as_secs_f64();
        match self {
            OperationOutcome::Success { .. } => {
                format!("{} took {:.2} seconds {}", op.name(), secs, args)
            }
            OperationOutcome::Failure { error, .. } => format!(
                "Failed to {} extension in {:.2} seconds {}: {}",
                op.verb(),
                secs,
                args,
                error
            ),
        }
    }

    /// Log the outcome and discard the error.
    pub fn log(self, op: Operation, args: &ExtensionArgs<'_>) -> Option<T> {
        let message = self.message(op, args);
        match self {
            OperationOutcome::Success { value, .. } => {
                tracing::info!("{}", message);
                Some(value)
            }
            OperationOutcome::Failure { .. } => {
                tracing::warn!("{}", message);
                None
            }
        }
    }
}

/// Await `fut` and record how long it took.
pub async fn run_timed<T, E, F>(fut: F) -> OperationOutcome<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let result = fut.await;
    let elapsed = start.elapsed();

    match result {
        Ok(value) => OperationOutcome::Success { value, elapsed },
        Err(error) => OperationOutcome::Failure { error, elapsed },
    }
}

/// Run a lifecycle operation through the timer and the logger.
///
/// Returns `None` when the operation failed; the failure only reaches the log.
pub async fn wrap_extension<T, F>(op: Operation, args: ExtensionArgs<'_>, fut: F) -> Option<T>
where
    F: Future<Output = Result<T, ExtensionError>>,
{
    run_timed(fut).await.log(op, &args)
}
