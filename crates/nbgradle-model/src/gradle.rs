use std::path::Path;

/// Id of the plugin adding Java compilation (and the `jar` task) to a project.
pub const JAVA_PLUGIN_ID: &str = "java";

pub const JAR_TASK_NAME: &str = "jar";

/// A task of a [`GradleProject`].
pub trait GradleTask {
    fn name(&self) -> &str;

    /// Absolute task path, e.g. `:app:jar`.
    fn path(&self) -> &str;

    /// Names of the task's type followed by its supertypes, most specific first.
    fn type_hierarchy(&self) -> &[String];

    /// The archive the task produces, if it produces one.
    fn archive_file(&self) -> Option<&Path>;

    fn task_type(&self) -> Option<&str> {
        self.type_hierarchy().first().map(String::as_str)
    }

    /// Whether the task is an instance of `type_name`.
    fn is_assignable_to(&self, type_name: &str) -> bool {
        self.type_hierarchy().iter().any(|ty| ty == type_name)
    }
}

/// The parts of a Gradle project model builders need.
pub trait GradleProject {
    fn has_plugin(&self, plugin_id: &str) -> bool;

    fn tasks(&self) -> Vec<&dyn GradleTask>;

    /// Looks a task up by its name, falling back to the first task whose path ends with
    /// `:<name>`.
    fn find_task_by_name(&self, name: &str) -> Option<&dyn GradleTask> {
        let tasks = self.tasks();
        if let Some(task) = tasks.iter().find(|task| task.name() == name) {
            return Some(*task);
        }

        let suffix = format!(":{name}");
        tasks.into_iter().find(|task| task.path().ends_with(&suffix))
    }
}

/// Extracts one kind of information from a Gradle project.
pub trait ProjectInfoBuilder {
    type Info;

    /// `None` means the project has nothing to report for this builder.
    fn project_info(&self, project: &dyn GradleProject) -> Option<Self::Info>;
}
