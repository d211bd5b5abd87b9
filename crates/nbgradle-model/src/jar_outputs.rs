use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{GradleProject, ProjectInfoBuilder, JAR_TASK_NAME, JAVA_PLUGIN_ID};

/// A jar producing task and the archive it writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarOutput {
    task_name: String,
    jar: Option<PathBuf>,
}

impl JarOutput {
    pub fn new(task_name: impl Into<String>, jar: Option<PathBuf>) -> Self {
        Self {
            task_name: task_name.into(),
            jar,
        }
    }

    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// `None` when the task did not report an archive file.
    pub fn jar(&self) -> Option<&Path> {
        self.jar.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JarOutputsModel {
    jars: Vec<JarOutput>,
}

impl JarOutputsModel {
    pub fn new(jars: Vec<JarOutput>) -> Self {
        Self { jars }
    }

    pub fn jars(&self) -> &[JarOutput] {
        &self.jars
    }

    pub fn is_empty(&self) -> bool {
        self.jars.is_empty()
    }
}

/// Collects every task of the same kind as the project's `jar` task.
#[derive(Debug, Clone, Copy, Default)]
pub struct JarOutputsModelBuilder;

impl ProjectInfoBuilder for JarOutputsModelBuilder {
    type Info = JarOutputsModel;

    fn project_info(&self, project: &dyn GradleProject) -> Option<JarOutputsModel> {
        if !project.has_plugin(JAVA_PLUGIN_ID) {
            return None;
        }

        let Some(jar_type) = project
            .find_task_by_name(JAR_TASK_NAME)
            .and_then(|task| task.task_type().map(str::to_owned))
        else {
            tracing::debug!(
                target: "nbgradle.model",
                "java project without a resolvable jar task"
            );
            return Some(JarOutputsModel::default());
        };

        let jars = project
            .tasks()
            .into_iter()
            .filter(|task| task.is_assignable_to(&jar_type))
            .map(|task| JarOutput::new(task.name(), task.archive_file().map(Path::to_path_buf)))
            .collect();
        Some(JarOutputsModel::new(jars))
    }
}
