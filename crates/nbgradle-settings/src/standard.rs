//! Property definitions of the common project settings.

use std::fmt;
use std::sync::Arc;

use crate::property::{
    const_source, PropertyDef, PropertyKeyEncodingDef, PropertySource, PropertyValueDef,
    ValueKeyEquality,
};
use crate::{
    ConfigKey, ConfigPath, ConfigTree, ConfigTreeBuilder, DomTrackingProperty, ProfileSettings,
};

pub const SOURCE_ENCODING: &str = "source-encoding";
pub const SOURCE_LEVEL: &str = "source-level";
pub const TARGET_PLATFORM_NAME: &str = "target-platform-name";
pub const TARGET_PLATFORM_VERSION: &str = "target-platform";

/// Value key of a plain text setting: the stored subtree, `None` when nothing is stored.
pub type TextKey = Option<ConfigTree>;

struct TreeEncoding;

impl PropertyKeyEncodingDef<TextKey> for TreeEncoding {
    fn decode(&self, tree: &ConfigTree) -> TextKey {
        (!tree.is_empty()).then(|| tree.clone())
    }

    fn encode(&self, key: &TextKey) -> ConfigTree {
        key.clone().unwrap_or_default()
    }
}

struct TextValue;

impl PropertyValueDef<TextKey, Option<String>> for TextValue {
    fn property(&self, key: &TextKey) -> Arc<dyn PropertySource<Option<String>>> {
        const_source(key.as_ref().and_then(|tree| tree.value()).map(str::to_owned))
    }

    fn key_from_value(&self, value: &Option<String>) -> TextKey {
        value
            .as_deref()
            .filter(|value| !value.is_empty())
            .map(ConfigTree::single_value)
    }
}

/// Text stored as the value of a single node.
///
/// With `natural_equality == false` keys are compared by identity, so every assignment counts as
/// a change.
pub fn text_property_def(natural_equality: bool) -> PropertyDef<TextKey, Option<String>> {
    let def: PropertyDef<TextKey, Option<String>> =
        PropertyDef::new(Arc::new(TreeEncoding), Arc::new(TextValue));
    if natural_equality {
        def
    } else {
        def.with_value_key_equality(ValueKeyEquality::Reference)
    }
}

/// A Java platform: its specification name (`j2se`, `j2me`, ...) and version.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlatformId {
    pub name: String,
    pub version: String,
}

impl PlatformId {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

struct PlatformEncoding;

impl PropertyKeyEncodingDef<Option<PlatformId>> for PlatformEncoding {
    fn decode(&self, tree: &ConfigTree) -> Option<PlatformId> {
        let name = tree.child_tree(TARGET_PLATFORM_NAME);
        let version = tree.child_tree(TARGET_PLATFORM_VERSION);
        Some(PlatformId::new(name.value()?, version.value()?))
    }

    fn encode(&self, key: &Option<PlatformId>) -> ConfigTree {
        let Some(platform) = key else {
            return ConfigTree::empty();
        };
        let mut builder = ConfigTreeBuilder::new();
        builder.set_child_tree(
            ConfigKey::from_static(TARGET_PLATFORM_NAME),
            ConfigTree::single_value(platform.name.as_str()),
        );
        builder.set_child_tree(
            ConfigKey::from_static(TARGET_PLATFORM_VERSION),
            ConfigTree::single_value(platform.version.as_str()),
        );
        builder.create()
    }
}

struct IdentityValue;

impl<T> PropertyValueDef<T, T> for IdentityValue
where
    T: Clone + Send + Sync + 'static,
{
    fn property(&self, key: &T) -> Arc<dyn PropertySource<T>> {
        const_source(key.clone())
    }

    fn key_from_value(&self, value: &T) -> T {
        value.clone()
    }
}

/// The target platform, stored as two sibling nodes: its name and its version.
pub fn target_platform_def() -> PropertyDef<Option<PlatformId>, Option<PlatformId>> {
    PropertyDef::new(Arc::new(PlatformEncoding), Arc::new(IdentityValue))
}

pub fn target_platform_paths() -> Vec<ConfigPath> {
    vec![
        ConfigPath::from_static(&[TARGET_PLATFORM_NAME]),
        ConfigPath::from_static(&[TARGET_PLATFORM_VERSION]),
    ]
}

pub fn text_property(
    settings: &ProfileSettings,
    path: ConfigPath,
) -> DomTrackingProperty<TextKey, Option<String>> {
    settings.get_property(path, &text_property_def(true))
}

pub fn source_encoding(settings: &ProfileSettings) -> DomTrackingProperty<TextKey, Option<String>> {
    text_property(settings, ConfigPath::from_static(&[SOURCE_ENCODING]))
}

pub fn source_level(settings: &ProfileSettings) -> DomTrackingProperty<TextKey, Option<String>> {
    text_property(settings, ConfigPath::from_static(&[SOURCE_LEVEL]))
}

pub fn target_platform(
    settings: &ProfileSettings,
) -> DomTrackingProperty<Option<PlatformId>, Option<PlatformId>> {
    DomTrackingProperty::new(
        settings.clone(),
        Arc::from(target_platform_paths()),
        target_platform_def(),
    )
}
