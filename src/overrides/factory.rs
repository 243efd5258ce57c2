//! Ways of producing the override target before activating it.
//!
//! Every mode writes the file at [`OverrideSpec::target_path`] and then
//! activates, so they all hand back the same [`ActiveOverride`].

use std::path::Path;

use super::{ActiveOverride, OverrideSpec};
use crate::document::{read_text, write_text, ConfigDocument, DocumentError, DocumentSource};
use crate::Error;

impl OverrideSpec {
    /// Writes `content` verbatim to the target, then activates.
    pub fn activate_with_text(self, content: &str) -> Result<ActiveOverride, Error> {
        write_text(&self.target_path, content)?;
        self.activate()
    }

    /// Edits a copy of the scope's current configuration file.
    pub fn activate_with_existing_file<F>(self, mutate: F) -> Result<ActiveOverride, Error>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), DocumentError>,
    {
        let source = DocumentSource::File(self.scope.active_path());
        self.activate_with_document(&source, mutate)
    }

    /// Rewrites the scope's current configuration file as plain text.
    pub fn activate_with_existing_text<F>(self, transform: F) -> Result<ActiveOverride, Error>
    where
        F: FnOnce(String) -> String,
    {
        let existing = read_text(&self.scope.active_path())?;
        write_text(&self.target_path, &transform(existing))?;
        self.activate()
    }

    /// Edits a copy of `source_path`.
    pub fn activate_with_file<F>(
        self,
        source_path: impl AsRef<Path>,
        mutate: F,
    ) -> Result<ActiveOverride, Error>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), DocumentError>,
    {
        let source = DocumentSource::File(source_path.as_ref().to_path_buf());
        self.activate_with_document(&source, mutate)
    }

    /// Builds the target from an empty `configuration` document.
    pub fn activate_from_scratch<F>(self, mutate: F) -> Result<ActiveOverride, Error>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), DocumentError>,
    {
        self.activate_with_document(&DocumentSource::Scratch, mutate)
    }

    fn activate_with_document<F>(
        self,
        source: &DocumentSource,
        mutate: F,
    ) -> Result<ActiveOverride, Error>
    where
        F: FnOnce(&mut ConfigDocument) -> Result<(), DocumentError>,
    {
        source.apply_and_save(mutate, &self.target_path)?;
        self.activate()
    }
}
