use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use nbgradle_classpath::{ClassPathResourceBuilder, OpenedJavaProject, PathResource, ProjectPlatform};
use nbgradle_config::{with_global_config, ClasspathConfig, GlobalConfig};
use nbgradle_model::java::{
    JarOutputDef, JavaClassPaths, JavaModel, JavaModule, JavaOutputDirs, JavaProjectDependency,
    JavaSourceGroup, JavaSourceSet,
};
use tempfile::TempDir;
use url::Url;

mod builder;
mod special;

/// A scratch directory holding project layouts.
pub struct Layout {
    dir: TempDir,
}

impl Layout {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn dir(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.path(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"PK").unwrap();
        path
    }
}

pub fn source_set(name: &str, project_dir: &Path) -> JavaSourceSet {
    JavaSourceSet {
        name: name.to_string(),
        source_groups: vec![JavaSourceGroup {
            name: "java".to_string(),
            source_roots: vec![project_dir.join("src").join(name).join("java")],
            includes: Vec::new(),
            excludes: Vec::new(),
        }],
        output_dirs: JavaOutputDirs {
            classes_dir: project_dir.join("build/classes/java").join(name),
            resources_dir: project_dir.join("build/resources").join(name),
        },
        classpaths: JavaClassPaths::default(),
    }
}

pub fn module(project_dir: &Path, sources: Vec<JavaSourceSet>) -> JavaModule {
    JavaModule {
        project_dir: project_dir.to_path_buf(),
        sources,
        jar_outputs: Vec::new(),
    }
}

pub fn jar_output(task_name: &str, jar: PathBuf, class_dirs: Vec<PathBuf>) -> JarOutputDef {
    JarOutputDef {
        task_name: task_name.to_string(),
        jar,
        class_dirs,
    }
}

pub fn opened(module: JavaModule) -> OpenedJavaProject {
    OpenedJavaProject {
        project_dir: module.project_dir.clone(),
        module,
        translated_dependencies: Vec::new(),
    }
}

pub fn dependency(module: JavaModule) -> (PathBuf, JavaProjectDependency) {
    (
        module.project_dir.clone(),
        JavaProjectDependency {
            project_dir: module.project_dir.clone(),
            module,
        },
    )
}

pub fn platform() -> ProjectPlatform {
    ProjectPlatform::new(
        "j2se",
        "1.8",
        vec![Url::parse("jar:file:///jdk/jre/lib/rt.jar!/").unwrap()],
    )
}

pub fn jar_name_detection(enabled: bool) -> GlobalConfig {
    GlobalConfig {
        classpath: ClasspathConfig {
            detect_project_dependencies_by_jar_name: enabled,
        },
        ..GlobalConfig::default()
    }
}

/// Builds the classpaths of `model` with jar name detection turned on or off.
pub fn build<'a>(
    detect_by_jar_name: bool,
    model: &'a JavaModel,
    dependencies: &'a HashMap<PathBuf, JavaProjectDependency>,
    platform: &'a ProjectPlatform,
    opened: Vec<OpenedJavaProject>,
) -> ClassPathResourceBuilder<'a> {
    let mut builder = ClassPathResourceBuilder::new(model, dependencies, platform);
    with_global_config(jar_name_detection(detect_by_jar_name), || builder.build(&opened));
    builder
}

pub fn dir_url(path: &Path) -> String {
    Url::from_directory_path(path).unwrap().to_string()
}

pub fn jar_url(path: &Path) -> String {
    format!("jar:{}!/", Url::from_file_path(path).unwrap())
}

pub fn urls(resources: &[PathResource]) -> Vec<String> {
    resources.iter().map(|resource| resource.url().to_string()).collect()
}
