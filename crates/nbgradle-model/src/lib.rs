//! Project models exchanged between Gradle and the IDE.
//!
//! [`JarOutputsModelBuilder`] runs against a Gradle project (anything implementing
//! [`GradleProject`], e.g. a [`GradleProjectSnapshot`]) and reports the jar archives the project
//! produces. The `java` module holds the IDE-side Java project model the classpath builder
//! consumes.

mod gradle;
mod gradle_snapshot;
mod jar_outputs;
pub mod java;

pub use gradle::{GradleProject, GradleTask, ProjectInfoBuilder, JAR_TASK_NAME, JAVA_PLUGIN_ID};
pub use gradle_snapshot::{GradleProjectSnapshot, GradleTaskSnapshot};
pub use jar_outputs::{JarOutput, JarOutputsModel, JarOutputsModelBuilder};
