//! Profile settings of Gradle projects.
//!
//! A profile is an XML document mapped onto an immutable [`ConfigTree`]. [`ProfileSettings`] owns
//! the current tree of one document and hands out [`DomTrackingProperty`]s: live, typed views of
//! one or more paths of the tree which stay in sync with the document in both directions.

mod error;
mod executor;
mod listeners;
mod path;
mod property;
mod settings;
pub mod standard;
mod tracking;
mod tree;
mod xml;

pub use error::{Result, SettingsError};
pub use executor::{document_event_executor, event_executor, wait_for_settings_events, TaskExecutor};
pub use listeners::{ChangeListener, ListenerRef};
pub use path::{relative_paths, ConfigKey, ConfigPath};
pub use property::{
    const_source, MutableProperty, PropertyDef, PropertyKeyEncodingDef, PropertySource,
    PropertyValueDef, ValueKeyEquality,
};
pub use settings::{ConfigUpdate, ProfileSettings};
pub use tracking::DomTrackingProperty;
pub use tree::{ConfigTree, ConfigTreeBuilder};
pub use xml::{parse_xml, write_xml, PROFILE_ROOT_ELEMENT};
