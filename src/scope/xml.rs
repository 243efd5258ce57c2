use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{ConfigScope, ConfigSubsystem, ScopeId, SettingsMap, SubsystemError};
use crate::document::{ConfigDocument, DocumentError, EntryShape};

/// Settings parsed from one file.
#[derive(Debug)]
struct ParsedConfig {
    path: PathBuf,
    sections: HashMap<String, SettingsMap>,
}

/// Reads `configuration` documents from disk and caches them per scope.
///
/// The cache is keyed by [`ScopeId`], so scopes sharing a name never see
/// each other's settings. Once a scope has been read, later reads keep
/// returning the same settings, even after the scope's path moves, until
/// [`invalidate`](ConfigSubsystem::invalidate) is called for that scope.
#[derive(Debug, Default)]
pub struct XmlConfigSubsystem {
    cache: Mutex<HashMap<ScopeId, Arc<ParsedConfig>>>,
}

impl XmlConfigSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// The path the cached settings of `scope` were parsed from, if cached.
    pub fn cached_path(&self, scope: &ConfigScope) -> Option<PathBuf> {
        self.cache.lock().get(&scope.id()).map(|p| p.path.clone())
    }

    fn parsed(&self, scope: &ConfigScope) -> Result<Arc<ParsedConfig>, SubsystemError> {
        let mut cache = self.cache.lock();
        if let Some(parsed) = cache.get(&scope.id()) {
            return Ok(Arc::clone(parsed));
        }

        let parsed = Arc::new(load(&scope.active_path())?);
        debug!(
            scope = %scope.name(),
            id = %scope.id(),
            path = %parsed.path.display(),
            sections = parsed.sections.len(),
            "parsed configuration"
        );
        cache.insert(scope.id(), Arc::clone(&parsed));
        Ok(parsed)
    }
}

impl ConfigSubsystem for XmlConfigSubsystem {
    fn invalidate(&self, scope: &ConfigScope) -> Result<(), SubsystemError> {
        if self.cache.lock().remove(&scope.id()).is_some() {
            debug!(scope = %scope.name(), id = %scope.id(), "discarded cached configuration");
        }
        Ok(())
    }

    fn read_section(
        &self,
        scope: &ConfigScope,
        name: &str,
    ) -> Result<Option<SettingsMap>, SubsystemError> {
        Ok(self.parsed(scope)?.sections.get(name).cloned())
    }
}

/// A missing file reads as an empty configuration.
fn load(path: &Path) -> Result<ParsedConfig, DocumentError> {
    let doc = match ConfigDocument::from_file(path) {
        Ok(doc) => doc,
        Err(DocumentError::NotFound(_)) => {
            return Ok(ParsedConfig {
                path: path.to_path_buf(),
                sections: HashMap::new(),
            })
        }
        Err(e) => return Err(e),
    };

    let sections = doc
        .root()?
        .elements()
        .map(|section| {
            let shape = EntryShape::for_section(section.name());
            let entries = section
                .entries(shape)
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (section.name().to_string(), entries)
        })
        .collect();

    Ok(ParsedConfig {
        path: path.to_path_buf(),
        sections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const ORIGINAL: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<configuration>
  <appSettings>
    <add key="original.key" value="original.key.value" />
  </appSettings>
  <connectionStrings>
    <add name="DB1" connectionString="DB1.connection.string" />
  </connectionStrings>
</configuration>"#;

    #[test]
    fn test_reads_settings_and_connection_strings() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.config");
        fs::write(&path, ORIGINAL).unwrap();
        let scope = ConfigScope::with_xml("test", &path);

        assert_eq!(
            scope.read_setting("original.key").unwrap().as_deref(),
            Some("original.key.value")
        );
        assert_eq!(
            scope.connection_string("DB1").unwrap().as_deref(),
            Some("DB1.connection.string")
        );
        assert_eq!(scope.read_setting("dynamic.key").unwrap(), None);
        assert_eq!(scope.read_section("missing").unwrap(), None);
    }

    #[test]
    fn test_cache_survives_path_change_until_invalidated() {
        let dir = tempdir().unwrap();
        let first = dir.path().join("first.config");
        let second = dir.path().join("second.config");
        fs::write(&first, ORIGINAL).unwrap();
        fs::write(&second, "<configuration/>").unwrap();

        let subsystem = Arc::new(XmlConfigSubsystem::new());
        let scope = ConfigScope::new("test", &first, subsystem.clone());
        assert!(scope.read_setting("original.key").unwrap().is_some());

        scope.set_active_path(&second);
        assert!(scope.read_setting("original.key").unwrap().is_some());
        assert_eq!(subsystem.cached_path(&scope), Some(first));

        scope.invalidate_cache().unwrap();
        assert_eq!(subsystem.cached_path(&scope), None);
        assert!(scope.read_setting("original.key").unwrap().is_none());
        assert_eq!(subsystem.cached_path(&scope), Some(second));
    }

    #[test]
    fn test_same_named_scopes_do_not_share_cache() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.config");
        let b = dir.path().join("b.config");
        fs::write(&a, r#"<configuration><appSettings><add key="k" value="A"/></appSettings></configuration>"#).unwrap();
        fs::write(&b, r#"<configuration><appSettings><add key="k" value="B"/></appSettings></configuration>"#).unwrap();

        let subsystem = Arc::new(XmlConfigSubsystem::new());
        let first = ConfigScope::new("app", &a, subsystem.clone());
        let second = ConfigScope::new("app", &b, subsystem.clone());
        assert_ne!(first.id(), second.id());

        assert_eq!(first.read_setting("k").unwrap().as_deref(), Some("A"));
        assert_eq!(second.read_setting("k").unwrap().as_deref(), Some("B"));

        first.invalidate_cache().unwrap();
        assert_eq!(subsystem.cached_path(&first), None);
        assert_eq!(subsystem.cached_path(&second), Some(b));
    }

    #[test]
    fn test_clones_share_cache_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app.config");
        fs::write(&path, ORIGINAL).unwrap();

        let subsystem = Arc::new(XmlConfigSubsystem::new());
        let scope = ConfigScope::new("app", &path, subsystem.clone());
        let clone = scope.clone();
        assert_eq!(scope.id(), clone.id());

        scope.read_setting("original.key").unwrap();
        assert_eq!(subsystem.cached_path(&clone), Some(path));
    }

    #[test]
    fn test_missing_file_is_empty_configuration() {
        let scope = ConfigScope::with_xml("test", "/nonexistent/path/app.config");
        assert_eq!(scope.read_setting("anything").unwrap(), None);
    }

    #[test]
    fn test_wrong_root_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wrong.config");
        fs::write(&path, "<settings/>").unwrap();
        let scope = ConfigScope::with_xml("test", &path);

        let result = scope.read_setting("anything");
        assert!(matches!(
            result,
            Err(SubsystemError::Document(DocumentError::InvalidDocument { .. }))
        ));
    }
}
