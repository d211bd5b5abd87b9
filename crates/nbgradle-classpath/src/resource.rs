use std::fs;
use std::path::{Path, PathBuf};

use url::Url;

use crate::filter::FileGroupFilter;

/// One entry of a classpath: a directory or archive root, optionally restricted by a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathResource {
    url: Url,
    root: Option<PathBuf>,
    filter: Option<FileGroupFilter>,
}

impl PathResource {
    /// A resource known only by its URL (for example a platform boot library).
    pub fn from_url(url: Url) -> Self {
        Self {
            url,
            root: None,
            filter: None,
        }
    }

    /// The resource of `file`, or `None` if `file` cannot be put on a classpath.
    pub fn for_file(file: &Path) -> Option<Self> {
        Some(Self {
            url: url_for_archive_or_dir(file)?,
            root: Some(file.to_path_buf()),
            filter: None,
        })
    }

    /// Like [`Self::for_file`], only exposing the files `filter` includes.
    pub fn for_filtered_file(file: &Path, filter: FileGroupFilter) -> Option<Self> {
        let mut resource = Self::for_file(file)?;
        if !filter.is_allow_all() {
            resource.filter = Some(filter);
        }
        Some(resource)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn filter(&self) -> Option<&FileGroupFilter> {
        self.filter.as_ref()
    }

    /// Whether `file` (an absolute path) is visible through this resource.
    pub fn contains(&self, file: &Path) -> bool {
        let Some(root) = &self.root else {
            return false;
        };
        let Ok(relative) = file.strip_prefix(root) else {
            return false;
        };
        match &self.filter {
            Some(filter) => filter.includes(relative),
            None => true,
        }
    }
}

fn is_archive_name(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jar") || ext.eq_ignore_ascii_case("zip"))
}

/// Classpath URL of `path`.
///
/// Archives (`.jar`, `.zip`) map to `jar:` URLs of their root, anything else to a directory URL,
/// whether or not the directory exists yet. Relative paths and existing regular files that are
/// not archives have no URL.
pub fn url_for_archive_or_dir(path: &Path) -> Option<Url> {
    if !path.is_absolute() {
        return None;
    }

    let metadata = fs::metadata(path).ok();
    if metadata.as_ref().is_some_and(|metadata| metadata.is_dir()) {
        return Url::from_directory_path(path).ok();
    }
    if is_archive_name(path) {
        let file_url = Url::from_file_path(path).ok()?;
        return Url::parse(&format!("jar:{file_url}!/")).ok();
    }
    if metadata.is_some_and(|metadata| metadata.is_file()) {
        return None;
    }
    Url::from_directory_path(path).ok()
}
