pub mod document;
pub mod overrides;
pub mod scope;
mod error;

pub use document::{ConfigDocument, DocumentError, Element};
pub use error::Error;
pub use overrides::{activate, ActiveOverride, OverrideSpec, ReleaseOutcome};
pub use scope::{ConfigScope, ConfigSubsystem, ScopeId, SubsystemError, XmlConfigSubsystem};
