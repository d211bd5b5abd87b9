use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{GradleProject, GradleTask};

/// Serialized description of a Gradle project, as captured by the tooling API.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GradleProjectSnapshot {
    pub path: String,
    pub project_dir: PathBuf,
    #[serde(default)]
    pub plugins: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<GradleTaskSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GradleTaskSnapshot {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub type_hierarchy: Vec<String>,
    pub archive_file: Option<PathBuf>,
}

impl GradleProjectSnapshot {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

impl GradleProject for GradleProjectSnapshot {
    fn has_plugin(&self, plugin_id: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin == plugin_id)
    }

    fn tasks(&self) -> Vec<&dyn GradleTask> {
        self.tasks.iter().map(|task| task as &dyn GradleTask).collect()
    }
}

impl GradleTask for GradleTaskSnapshot {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn type_hierarchy(&self) -> &[String] {
        &self.type_hierarchy
    }

    fn archive_file(&self) -> Option<&Path> {
        self.archive_file.as_deref()
    }
}
