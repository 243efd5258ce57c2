//! Temporary replacement of a scope's configuration file.
//!
//! [`activate`] swaps the scope's active path and invalidates whatever the
//! subsystem had parsed. The returned [`ActiveOverride`] puts the previous
//! path back when released or dropped, so the original configuration comes
//! back on every exit path of the block that holds it:
//!
//! ```no_run
//! use dynamic_config::{ConfigScope, OverrideSpec};
//!
//! let scope = ConfigScope::with_xml("app", "app.config");
//! {
//!     let _guard = OverrideSpec::new(&scope, "test.config").activate()?;
//!     // reads through `scope` now see test.config
//! }
//! // and app.config again here
//! # Ok::<(), dynamic_config::Error>(())
//! ```
//!
//! One owner per scope: overlapping overrides must be released in reverse
//! order of activation, and activations on one scope must not race.

mod factory;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::scope::ConfigScope;
use crate::Error;

/// Suffix appended to the scope's active path when no target is given.
pub const DEFAULT_TARGET_SUFFIX: &str = ".dynamic.config";

/// What to override and with which file.
#[derive(Debug, Clone)]
pub struct OverrideSpec {
    pub scope: ConfigScope,
    pub target_path: PathBuf,
}

impl OverrideSpec {
    pub fn new(scope: &ConfigScope, target_path: impl Into<PathBuf>) -> Self {
        Self {
            scope: scope.clone(),
            target_path: target_path.into(),
        }
    }

    /// Targets `<active path>.dynamic.config` next to the current file.
    pub fn for_scope(scope: &ConfigScope) -> Self {
        let mut target = scope.active_path().into_os_string();
        target.push(DEFAULT_TARGET_SUFFIX);
        Self::new(scope, target)
    }

    #[must_use]
    pub fn with_target_path(mut self, target_path: impl Into<PathBuf>) -> Self {
        self.target_path = target_path.into();
        self
    }

    /// Points the scope at `target_path`.
    pub fn activate(self) -> Result<ActiveOverride, Error> {
        activate(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideState {
    Active,
    Released,
}

/// Result of [`ActiveOverride::release`].
#[derive(Debug)]
pub enum ReleaseOutcome {
    Restored,
    AlreadyReleased,
    /// The previous path is back in place but the subsystem could not
    /// invalidate; holds [`Error::OverrideReleaseWarning`].
    RestoredWithWarning(Error),
}

/// A live override. Releasing it, explicitly or by dropping it, restores
/// the path the scope had at activation.
#[derive(Debug)]
#[must_use = "the override is released as soon as this value is dropped"]
pub struct ActiveOverride {
    scope: ConfigScope,
    target_path: PathBuf,
    previous_path: PathBuf,
    state: Mutex<OverrideState>,
}

/// Swaps the scope's active path for `spec.target_path` and invalidates the
/// subsystem's cache.
///
/// When invalidation fails the previous path is put back before the error is
/// returned.
pub fn activate(spec: OverrideSpec) -> Result<ActiveOverride, Error> {
    let OverrideSpec { scope, target_path } = spec;

    let previous_path = scope.active_path();
    if previous_path.as_os_str().is_empty() {
        return Err(Error::InvalidScope(scope.name().to_string()));
    }

    scope.set_active_path(&target_path);
    if let Err(source) = scope.invalidate_cache() {
        scope.set_active_path(&previous_path);
        warn!(
            scope = %scope.name(),
            path = %target_path.display(),
            error = %source,
            "override activation rolled back"
        );
        return Err(Error::OverrideActivationFailed {
            scope: scope.name().to_string(),
            path: target_path,
            source,
        });
    }

    debug!(
        scope = %scope.name(),
        from = %previous_path.display(),
        to = %target_path.display(),
        "configuration override activated"
    );

    Ok(ActiveOverride {
        scope,
        target_path,
        previous_path,
        state: Mutex::new(OverrideState::Active),
    })
}

impl ActiveOverride {
    pub fn scope(&self) -> &ConfigScope {
        &self.scope
    }

    /// The file the scope reads while this override is active.
    pub fn config_file(&self) -> &Path {
        &self.target_path
    }

    /// The path restored on release.
    pub fn previous_path(&self) -> &Path {
        &self.previous_path
    }

    pub fn state(&self) -> OverrideState {
        *self.state.lock()
    }

    /// Restores the previous path and invalidates again.
    ///
    /// Idempotent. Never fails: an invalidation error after the path has been
    /// restored comes back as [`ReleaseOutcome::RestoredWithWarning`].
    ///
    /// The path restored is always the one captured at activation, even when
    /// another override has moved the scope since. Releasing nested overrides
    /// out of order therefore leaves the scope on a released override's
    /// target: with `outer` then `inner` active, releasing `outer` and then
    /// `inner` ends on `outer`'s file, not the original one. A warning is
    /// logged whenever the scope is not on this override's target.
    pub fn release(&self) -> ReleaseOutcome {
        let mut state = self.state.lock();
        if *state == OverrideState::Released {
            return ReleaseOutcome::AlreadyReleased;
        }

        let current = self.scope.active_path();
        if current != self.target_path {
            warn!(
                scope = %self.scope.name(),
                expected = %self.target_path.display(),
                found = %current.display(),
                "override released out of order"
            );
        }

        self.scope.set_active_path(&self.previous_path);
        *state = OverrideState::Released;

        match self.scope.invalidate_cache() {
            Ok(()) => {
                debug!(
                    scope = %self.scope.name(),
                    path = %self.previous_path.display(),
                    "configuration override released"
                );
                ReleaseOutcome::Restored
            }
            Err(source) => {
                warn!(
                    scope = %self.scope.name(),
                    path = %self.previous_path.display(),
                    error = %source,
                    "invalidation failed while releasing override"
                );
                ReleaseOutcome::RestoredWithWarning(Error::OverrideReleaseWarning {
                    scope: self.scope.name().to_string(),
                    path: self.previous_path.clone(),
                    source,
                })
            }
        }
    }
}

impl Drop for ActiveOverride {
    fn drop(&mut self) {
        // Warnings are already logged by release.
        let _ = self.release();
    }
}
