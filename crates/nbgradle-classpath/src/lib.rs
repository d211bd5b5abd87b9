//! Classpath aggregation for Gradle Java projects.
//!
//! [`ClassPathResourceBuilder`] turns a [`nbgradle_model::java::JavaModel`] into the classpaths
//! the IDE needs: sources, compile and runtime classpath per source set, and the project-wide
//! [`SpecialClassPath`]s. Jar dependencies built by other open projects can be replaced by those
//! projects' class directories (see `classpath.detect_project_dependencies_by_jar_name` in
//! [`nbgradle_config::GlobalConfig`]).

use thiserror::Error;

mod builder;
mod filter;
mod key;
mod resource;

pub use builder::{
    path_resources, ClassPathResourceBuilder, OpenedJavaProject, OpenedProjects, ProjectPlatform,
};
pub use filter::{FileGroupFilter, IncludeExcludeRules};
pub use key::{ClassPathKey, ClassPathType, SpecialClassPath};
pub use resource::{url_for_archive_or_dir, PathResource};

#[derive(Debug, Error)]
pub enum ClasspathError {
    #[error("classpaths have not been built yet; call `build` first")]
    NotBuilt,
}

pub type Result<T, E = ClasspathError> = std::result::Result<T, E>;
