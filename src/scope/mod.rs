//! Configuration scopes and the subsystem that parses their settings.
//!
//! A [`ConfigScope`] owns the single "active configuration path" pointer of
//! some context (a process, a test, a plugin host). Reading settings goes
//! through the scope's [`ConfigSubsystem`], which is free to cache what it
//! parsed until told to [`invalidate`](ConfigSubsystem::invalidate).

mod error;
mod typed;
mod xml;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::document::{APP_SETTINGS, CONNECTION_STRINGS};

pub use error::SubsystemError;
pub use xml::XmlConfigSubsystem;

/// Entries of one section, keyed by entry key (or connection name).
pub type SettingsMap = BTreeMap<String, String>;

/// The host's configuration loading machinery, as seen by a scope.
///
/// Implementations decide how and when the file behind
/// [`ConfigScope::active_path`] is parsed. The override controller only
/// relies on `invalidate` forcing the next read to parse again.
pub trait ConfigSubsystem: Send + Sync + fmt::Debug {
    /// Discards any configuration parsed for `scope`.
    fn invalidate(&self, scope: &ConfigScope) -> Result<(), SubsystemError>;

    /// Reads the section `name` of the scope's configuration.
    fn read_section(
        &self,
        scope: &ConfigScope,
        name: &str,
    ) -> Result<Option<SettingsMap>, SubsystemError>;
}

/// Process-unique identity of a scope; clones share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ScopeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct ScopeInner {
    id: ScopeId,
    name: String,
    active_path: RwLock<PathBuf>,
    subsystem: Arc<dyn ConfigSubsystem>,
}

/// Handle to a context whose configuration can be overridden.
///
/// Clones share the same pointer. Concurrent overrides on one scope are not
/// supported: callers must serialize activation and release.
#[derive(Clone)]
pub struct ConfigScope {
    inner: Arc<ScopeInner>,
}

impl fmt::Debug for ConfigScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigScope")
            .field("id", &self.inner.id)
            .field("name", &self.inner.name)
            .field("active_path", &*self.inner.active_path.read())
            .finish()
    }
}

impl ConfigScope {
    pub fn new(
        name: impl Into<String>,
        active_path: impl Into<PathBuf>,
        subsystem: Arc<dyn ConfigSubsystem>,
    ) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                id: ScopeId::next(),
                name: name.into(),
                active_path: RwLock::new(active_path.into()),
                subsystem,
            }),
        }
    }

    /// A scope backed by a fresh [`XmlConfigSubsystem`].
    pub fn with_xml(name: impl Into<String>, active_path: impl Into<PathBuf>) -> Self {
        Self::new(name, active_path, Arc::new(XmlConfigSubsystem::default()))
    }

    /// Identity used to key per-scope state. Names need not be unique.
    pub fn id(&self) -> ScopeId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn active_path(&self) -> PathBuf {
        self.inner.active_path.read().clone()
    }

    pub fn set_active_path(&self, path: impl AsRef<Path>) {
        *self.inner.active_path.write() = path.as_ref().to_path_buf();
    }

    pub fn subsystem(&self) -> &Arc<dyn ConfigSubsystem> {
        &self.inner.subsystem
    }

    pub fn invalidate_cache(&self) -> Result<(), SubsystemError> {
        self.inner.subsystem.invalidate(self)
    }

    pub fn read_section(&self, name: &str) -> Result<Option<SettingsMap>, SubsystemError> {
        self.inner.subsystem.read_section(self, name)
    }

    /// Reads one entry of `appSettings`.
    pub fn read_setting(&self, key: &str) -> Result<Option<String>, SubsystemError> {
        self.read_entry(APP_SETTINGS, key)
    }

    pub fn connection_string(&self, name: &str) -> Result<Option<String>, SubsystemError> {
        self.read_entry(CONNECTION_STRINGS, name)
    }

    pub fn read_entry(&self, section: &str, key: &str) -> Result<Option<String>, SubsystemError> {
        Ok(self
            .read_section(section)?
            .and_then(|mut entries| entries.remove(key)))
    }

    /// True when both handles refer to the same scope.
    pub fn same_scope(&self, other: &ConfigScope) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}
