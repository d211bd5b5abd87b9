use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use smol_str::SmolStr;

use crate::{Result, SettingsError};

/// One segment of a [`ConfigPath`]: the tag name of an element in a profile document.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey(SmolStr);

impl ConfigKey {
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(SettingsError::InvalidKey(name.to_owned()));
        }
        Ok(Self(SmolStr::new(name)))
    }

    /// Builds a key from a name known at compile time.
    ///
    /// # Panics
    ///
    /// Panics if `name` is empty.
    pub fn from_static(name: &'static str) -> Self {
        assert!(!name.is_empty(), "config keys must not be empty");
        Self(SmolStr::new(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ConfigKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a node in a [`crate::ConfigTree`], from the document root downwards.
///
/// Paths are cheap to clone; the root path has no keys.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ConfigPath {
    keys: Arc<[ConfigKey]>,
}

impl ConfigPath {
    pub fn root() -> Self {
        Self {
            keys: Arc::from(Vec::new()),
        }
    }

    /// Parses every key, rejecting the whole path if any key is invalid.
    pub fn from_keys<I, S>(keys: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keys = keys
            .into_iter()
            .map(ConfigKey::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { keys: keys.into() })
    }

    pub fn from_config_keys(keys: impl IntoIterator<Item = ConfigKey>) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    /// # Panics
    ///
    /// Panics if any of the keys is empty.
    pub fn from_static(keys: &[&'static str]) -> Self {
        Self::from_config_keys(keys.iter().copied().map(ConfigKey::from_static))
    }

    pub fn keys(&self) -> &[ConfigKey] {
        &self.keys
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub fn key_at(&self, index: usize) -> Option<&ConfigKey> {
        self.keys.get(index)
    }

    pub fn is_root(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn parent(&self) -> Option<ConfigPath> {
        let (_, parent) = self.keys.split_last()?;
        Some(Self::from_config_keys(parent.iter().cloned()))
    }

    pub fn child(&self, key: ConfigKey) -> ConfigPath {
        Self::from_config_keys(self.keys.iter().cloned().chain(std::iter::once(key)))
    }

    pub fn join(&self, relative: &ConfigPath) -> ConfigPath {
        if relative.is_root() {
            return self.clone();
        }
        Self::from_config_keys(self.keys.iter().chain(relative.keys.iter()).cloned())
    }

    /// Prefix relation: the root is the parent of every path, every path is its own parent.
    pub fn is_parent_of_or_equal(&self, other: &ConfigPath) -> bool {
        other.keys.starts_with(&self.keys)
    }

    /// Two paths overlap when one of them addresses a node inside the other's subtree.
    pub fn overlaps(&self, other: &ConfigPath) -> bool {
        self.is_parent_of_or_equal(other) || other.is_parent_of_or_equal(self)
    }

    /// Drops the first `count` keys. Stripping more keys than the path has yields the root.
    pub fn strip_prefix(&self, count: usize) -> ConfigPath {
        if count == 0 {
            return self.clone();
        }
        let start = count.min(self.keys.len());
        Self::from_config_keys(self.keys[start..].iter().cloned())
    }

    /// Longest path that is a parent of (or equal to) every path in `paths`.
    pub fn common_parent(paths: &[ConfigPath]) -> ConfigPath {
        match paths {
            [] => ConfigPath::root(),
            [single] => single.clone(),
            [first, rest @ ..] => {
                let mut len = first.key_count();
                for path in rest {
                    len = first
                        .keys
                        .iter()
                        .zip(path.keys.iter())
                        .take(len)
                        .take_while(|(a, b)| a == b)
                        .count();
                }
                Self::from_config_keys(first.keys[..len].iter().cloned())
            }
        }
    }
}

/// Splits the storage locations of a property into their common parent and the suffix of each
/// location below that parent, in the original order.
pub fn relative_paths(paths: &[ConfigPath]) -> (ConfigPath, Vec<ConfigPath>) {
    let parent = ConfigPath::common_parent(paths);
    let depth = parent.key_count();
    let relative = paths.iter().map(|path| path.strip_prefix(depth)).collect();
    (parent, relative)
}

impl fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, key) in self.keys.iter().enumerate() {
            if index > 0 {
                f.write_str("/")?;
            }
            f.write_str(key.as_str())?;
        }
        Ok(())
    }
}

impl fmt::Debug for ConfigPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigPath({self})")
    }
}
