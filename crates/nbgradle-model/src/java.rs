//! IDE-side model of a Gradle Java project.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{JarOutput, JAR_TASK_NAME};

pub const MAIN_SOURCE_SET: &str = "main";
pub const TEST_SOURCE_SET: &str = "test";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaModel {
    pub main_module: JavaModule,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaModule {
    pub project_dir: PathBuf,
    #[serde(default)]
    pub sources: Vec<JavaSourceSet>,
    #[serde(default)]
    pub jar_outputs: Vec<JarOutputDef>,
}

impl JavaModule {
    pub fn source_set(&self, name: &str) -> Option<&JavaSourceSet> {
        self.sources.iter().find(|source_set| source_set.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaSourceSet {
    pub name: String,
    #[serde(default)]
    pub source_groups: Vec<JavaSourceGroup>,
    pub output_dirs: JavaOutputDirs,
    #[serde(default)]
    pub classpaths: JavaClassPaths,
}

/// Source roots of one language (`java`, `resources`, ...) with their include / exclude patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaSourceGroup {
    pub name: String,
    #[serde(default)]
    pub source_roots: Vec<PathBuf>,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaOutputDirs {
    pub classes_dir: PathBuf,
    pub resources_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaClassPaths {
    #[serde(default)]
    pub compile: Vec<PathBuf>,
    #[serde(default)]
    pub runtime: Vec<PathBuf>,
}

/// A jar built by the project together with the class directories packaged into it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarOutputDef {
    pub task_name: String,
    pub jar: PathBuf,
    #[serde(default)]
    pub class_dirs: Vec<PathBuf>,
}

impl JarOutputDef {
    /// Pairs a reported jar output with its class directories. Outputs without an archive file
    /// cannot be matched against classpath entries and yield `None`.
    pub fn from_output(output: &JarOutput, class_dirs: Vec<PathBuf>) -> Option<Self> {
        Some(Self {
            task_name: output.task_name().to_owned(),
            jar: output.jar()?.to_path_buf(),
            class_dirs,
        })
    }

    /// Whether this is the output of the project's standard `jar` task.
    pub fn is_default_jar(&self) -> bool {
        self.task_name == JAR_TASK_NAME
    }

    /// Lower-cased file name of the jar.
    pub fn jar_name(&self) -> Option<String> {
        jar_file_name(&self.jar)
    }
}

/// Lower-cased file name of `path`, the key jars are matched by.
pub fn jar_file_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
}

/// Another Gradle project the current one depends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaProjectDependency {
    pub project_dir: PathBuf,
    pub module: JavaModule,
}
