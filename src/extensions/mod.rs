//! Extensions
//!
//! An extension is an independently loadable unit of bot functionality,
//! identified by a dotted name. The [`ExtensionCatalog`] maps names to
//! factories; the [`ExtensionManager`] tracks which ones are loaded into the
//! running bot.
//!
//! The manager's operations are the raw ones and return every failure.
//! `Bot::load_extension` and friends route them through [`lifecycle`].

pub mod lifecycle;
pub mod utility;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::bot::Bot;
use crate::shared::ExtensionError;

pub use lifecycle::{wrap_extension, ExtensionArgs, Operation, OperationOutcome};

/// A loadable unit of bot functionality.
#[async_trait]
pub trait Extension: Send + Sync {
    /// Attach the extension to the bot, usually by adding cogs.
    async fn setup(&self, bot: &Bot) -> anyhow::Result<()>;

    /// Detach the extension from the bot.
    async fn teardown(&self, _bot: &Bot) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Creates a fresh instance of an extension.
pub type ExtensionFactory = Arc<dyn Fn() -> Arc<dyn Extension> + Send + Sync>;

/// The set of extensions the process knows how to load.
#[derive(Clone, Default)]
pub struct ExtensionCatalog {
    factories: BTreeMap<String, ExtensionFactory>,
}

impl ExtensionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every extension shipped in this crate.
    pub fn builtin() -> Self {
        Self::new().register(utility::NAME, || Arc::new(utility::UtilityExtension))
    }

    /// Register a factory under a fully qualified name.
    pub fn register<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Arc<dyn Extension> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    fn create(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.factories.get(name).map(|factory| factory())
    }
}

/// Resolve a possibly relative extension name against `package`.
///
/// `".music"` in package `"ext"` is `"ext.music"`; every extra leading dot
/// climbs one package level. Absolute names are returned unchanged.
pub fn resolve_name(name: &str, package: Option<&str>) -> Result<String, ExtensionError> {
    let invalid = |reason| ExtensionError::InvalidName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }

    if !name.starts_with('.') {
        return Ok(name.to_string());
    }

    let package = match package {
        Some(package) if !package.is_empty() => package,
        _ => return Err(invalid("relative name requires a package")),
    };

    let level = name.len() - name.trim_start_matches('.').len();
    let rest = &name[level..];

    let bits: Vec<&str> = package.rsplitn(level, '.').collect();
    if bits.len() < level {
        return Err(invalid("relative name climbs beyond the top-level package"));
    }

    let base = bits[bits.len() - 1];
    if rest.is_empty() {
        Ok(base.to_string())
    } else {
        Ok(format!("{}.{}", base, rest))
    }
}

/// Tracks the extensions loaded into the running bot, in load order.
pub struct ExtensionManager {
    catalog: ExtensionCatalog,
    loaded: Mutex<Vec<(String, Arc<dyn Extension>)>>,
}

impl ExtensionManager {
    pub fn new(catalog: ExtensionCatalog) -> Self {
        Self {
            catalog,
            loaded: Mutex::new(Vec::new()),
        }
    }

    pub fn catalog(&self) -> &ExtensionCatalog {
        &self.catalog
    }

    /// Names of the loaded extensions, in load order.
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    fn get(&self, name: &str) -> Option<Arc<dyn Extension>> {
        self.loaded
            .lock()
            .iter()
            .find(|(loaded, _)| loaded == name)
            .map(|(_, ext)| ext.clone())
    }

    fn remove(&self, name: &str) -> Option<Arc<dyn Extension>> {
        let mut loaded = self.loaded.lock();
        let index = loaded.iter().position(|(loaded, _)| loaded == name)?;
        Some(loaded.remove(index).1)
    }

    /// Load an extension and run its setup.
    pub async fn load(
        &self,
        name: &str,
        package: Option<&str>,
        bot: &Bot,
    ) -> Result<(), ExtensionError> {
        let name = resolve_name(name, package)?;

        if self.is_loaded(&name) {
            return Err(ExtensionError::AlreadyLoaded(name));
        }

        let ext = self
            .catalog
            .create(&name)
            .ok_or_else(|| ExtensionError::NotFound(name.clone()))?;

        if let Err(source) = ext.setup(bot).await {
            return Err(ExtensionError::Failed { name, source });
        }

        self.loaded.lock().push((name, ext));
        Ok(())
    }

    /// Unload an extension. Teardown errors are logged, the extension is
    /// removed either way.
    pub async fn unload(
        &self,
        name: &str,
        package: Option<&str>,
        bot: &Bot,
    ) -> Result<(), ExtensionError> {
        let name = resolve_name(name, package)?;

        let ext = self
            .remove(&name)
            .ok_or_else(|| ExtensionError::NotLoaded(name.clone()))?;

        if let Err(e) = ext.teardown(bot).await {
            tracing::warn!(extension = %name, "Extension teardown failed: {:#}", e);
        }

        Ok(())
    }

    /// Replace a loaded extension with a fresh instance.
    ///
    /// If the fresh instance fails to set up, the previous one is set up
    /// again and the failure is returned.
    pub async fn reload(
        &self,
        name: &str,
        package: Option<&str>,
        bot: &Bot,
    ) -> Result<(), ExtensionError> {
        let name = resolve_name(name, package)?;

        let old = self
            .get(&name)
            .ok_or_else(|| ExtensionError::NotLoaded(name.clone()))?;
        let fresh = self
            .catalog
            .create(&name)
            .ok_or_else(|| ExtensionError::NotFound(name.clone()))?;

        if let Err(e) = old.teardown(bot).await {
            tracing::warn!(extension = %name, "Extension teardown failed: {:#}", e);
        }

        match fresh.setup(bot).await {
            Ok(()) => {
                if let Some(slot) = self.loaded.lock().iter_mut().find(|(n, _)| *n == name) {
                    slot.1 = fresh;
                }
                Ok(())
            }
            Err(source) => {
                if let Err(e) = old.setup(bot).await {
                    tracing::error!(extension = %name, "Extension rollback failed: {:#}", e);
                    self.remove(&name);
                }
                Err(ExtensionError::Failed { name, source })
            }
        }
    }
}
