use std::collections::HashMap;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use nbgradle_model::java::{jar_file_name, JavaModel, JavaModule, JavaProjectDependency, JavaSourceSet};
use url::Url;

use crate::filter::FileGroupFilter;
use crate::key::{ClassPathKey, ClassPathType, SpecialClassPath};
use crate::resource::PathResource;
use crate::{ClasspathError, Result};

/// The Java platform a project is built against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectPlatform {
    pub name: String,
    pub version: String,
    pub boot_libraries: Vec<Url>,
}

impl ProjectPlatform {
    pub fn new(name: impl Into<String>, version: impl Into<String>, boot_libraries: Vec<Url>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            boot_libraries,
        }
    }
}

/// A Gradle Java project currently open in the IDE.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpenedJavaProject {
    pub project_dir: PathBuf,
    pub module: JavaModule,
    /// Project dependencies of this project resolved to their models.
    pub translated_dependencies: Vec<JavaProjectDependency>,
}

/// Source of the projects currently open in the IDE.
pub trait OpenedProjects {
    fn java_projects(&self) -> Vec<OpenedJavaProject>;
}

impl OpenedProjects for Vec<OpenedJavaProject> {
    fn java_projects(&self) -> Vec<OpenedJavaProject> {
        self.clone()
    }
}

/// Open projects together with the projects they depend on, one entry per project directory.
fn all_opened_java_modules(opened: &dyn OpenedProjects) -> IndexMap<PathBuf, JavaModule> {
    let mut result = IndexMap::new();
    for project in opened.java_projects() {
        result.insert(project.project_dir, project.module);
        for dependency in project.translated_dependencies {
            result.insert(dependency.project_dir, dependency.module);
        }
    }
    result
}

/// Lower-cased jar file name → class directories packaged into that jar, over every opened
/// project. When two jars share a name, the output of a project's `jar` task wins.
fn find_opened_projects_output(opened: &dyn OpenedProjects) -> HashMap<String, Vec<PathBuf>> {
    let mut result: HashMap<String, Vec<PathBuf>> = HashMap::new();
    for module in all_opened_java_modules(opened).into_values() {
        for output in module.jar_outputs {
            if output.class_dirs.is_empty() {
                continue;
            }
            let Some(key) = output.jar_name() else {
                continue;
            };
            if !result.contains_key(&key) || output.is_default_jar() {
                result.insert(key, output.class_dirs);
            }
        }
    }
    result
}

/// Replaces jar dependencies built by opened projects with their class directories.
struct JarTranslation {
    outputs: Option<HashMap<String, Vec<PathBuf>>>,
}

impl JarTranslation {
    fn translate(&self, original: &[PathBuf]) -> Vec<PathBuf> {
        let Some(outputs) = &self.outputs else {
            return original.to_vec();
        };

        let mut result = Vec::with_capacity(original.len());
        for file in original {
            match jar_file_name(file).and_then(|name| outputs.get(&name)) {
                Some(class_dirs) => result.extend(class_dirs.iter().cloned()),
                None => result.push(file.clone()),
            }
        }
        result
    }

    fn compile_classpath(&self, source_set: &JavaSourceSet) -> Vec<PathBuf> {
        self.translate(&source_set.classpaths.compile)
    }

    fn runtime_classpath(&self, source_set: &JavaSourceSet) -> Vec<PathBuf> {
        self.translate(&source_set.classpaths.runtime)
    }
}

/// Resources of `files` in order, skipping duplicates. Files without a classpath URL are added to
/// `invalid`.
pub fn path_resources<'a>(
    files: impl IntoIterator<Item = &'a PathBuf>,
    invalid: &mut IndexSet<PathBuf>,
    filter: &FileGroupFilter,
) -> Vec<PathResource> {
    let files: IndexSet<&PathBuf> = files.into_iter().collect();

    let mut result = Vec::with_capacity(files.len());
    for file in files {
        let resource = if filter.is_allow_all() {
            PathResource::for_file(file)
        } else {
            PathResource::for_filtered_file(file, filter.clone())
        };
        match resource {
            Some(resource) => result.push(resource),
            None => {
                tracing::warn!(
                    target: "nbgradle.classpath",
                    path = %file.display(),
                    "Class path entry is invalid"
                );
                invalid.insert(file.clone());
            }
        }
    }
    result
}

fn output_dir_resources(source_set: &JavaSourceSet) -> Vec<PathResource> {
    let dirs = &source_set.output_dirs;
    [&dirs.classes_dir, &dirs.resources_dir]
        .into_iter()
        .filter_map(|dir| PathResource::for_file(dir))
        .collect()
}

fn classes_dirs(module: &JavaModule) -> impl Iterator<Item = &PathBuf> + '_ {
    module
        .sources
        .iter()
        .map(|source_set| &source_set.output_dirs.classes_dir)
}

struct BuiltClassPaths {
    missing: IndexSet<PathBuf>,
    resources: HashMap<ClassPathKey, Vec<PathResource>>,
}

/// Computes the classpaths of a Java project: the sources, compile and runtime classpath of
/// every source set plus the [`SpecialClassPath`]s.
///
/// Nothing is computed until [`Self::build`] is called; the accessors fail before that.
pub struct ClassPathResourceBuilder<'a> {
    model: &'a JavaModel,
    translated_dependencies: &'a HashMap<PathBuf, JavaProjectDependency>,
    platform: &'a ProjectPlatform,
    built: Option<BuiltClassPaths>,
}

impl<'a> ClassPathResourceBuilder<'a> {
    pub fn new(
        model: &'a JavaModel,
        translated_dependencies: &'a HashMap<PathBuf, JavaProjectDependency>,
        platform: &'a ProjectPlatform,
    ) -> Self {
        Self {
            model,
            translated_dependencies,
            platform,
            built: None,
        }
    }

    /// Resolves every classpath. Jar dependencies are matched against the jars of `opened`
    /// projects when detecting project dependencies by jar name is enabled in the global
    /// configuration.
    pub fn build(&mut self, opened: &dyn OpenedProjects) {
        let detect_by_jar_name = nbgradle_config::global_config()
            .classpath
            .detect_project_dependencies_by_jar_name;
        let translation = JarTranslation {
            outputs: detect_by_jar_name.then(|| find_opened_projects_output(opened)),
        };

        let mut built = BuiltClassPaths {
            missing: IndexSet::new(),
            resources: HashMap::new(),
        };

        let main_module = &self.model.main_module;
        for source_set in &main_module.sources {
            self.load_source_set(&translation, source_set, &mut built);
        }

        let boot = self
            .platform
            .boot_libraries
            .iter()
            .cloned()
            .map(PathResource::from_url)
            .collect();
        built.resources.insert(SpecialClassPath::Boot.into(), boot);

        let mut all_runtime = IndexSet::new();
        for source_set in &main_module.sources {
            all_runtime.insert(source_set.output_dirs.classes_dir.clone());
            all_runtime.extend(translation.runtime_classpath(source_set));
        }
        built
            .resources
            .insert(SpecialClassPath::AllRuntime.into(), special_resources(&all_runtime));

        let mut all_build_output: IndexSet<PathBuf> = classes_dirs(main_module).cloned().collect();
        for dependency in self.translated_dependencies.values() {
            all_build_output.extend(classes_dirs(&dependency.module).cloned());
        }
        built.resources.insert(
            SpecialClassPath::AllBuildOutput.into(),
            special_resources(&all_build_output),
        );

        let compile_for_global = self.without_dependency_output(
            main_module
                .sources
                .iter()
                .flat_map(|source_set| source_set.classpaths.compile.iter().cloned()),
        );
        built.resources.insert(
            SpecialClassPath::CompileForGlobal.into(),
            special_resources(&compile_for_global),
        );

        let runtime_for_global = self.without_dependency_output(
            main_module
                .sources
                .iter()
                .flat_map(|source_set| source_set.classpaths.runtime.iter().cloned()),
        );
        built.resources.insert(
            SpecialClassPath::RuntimeForGlobal.into(),
            special_resources(&runtime_for_global),
        );

        tracing::debug!(
            target: "nbgradle.classpath",
            project = %main_module.project_dir.display(),
            classpaths = built.resources.len(),
            missing = built.missing.len(),
            "built project classpaths"
        );
        self.built = Some(built);
    }

    fn load_source_set(
        &self,
        translation: &JarTranslation,
        source_set: &JavaSourceSet,
        built: &mut BuiltClassPaths,
    ) {
        let name = source_set.name.as_str();

        let compile = path_resources(
            &translation.compile_classpath(source_set),
            &mut built.missing,
            &FileGroupFilter::AllowAll,
        );
        built
            .resources
            .insert(ClassPathKey::source_set(name, ClassPathType::Compile), compile);

        let mut runtime = path_resources(
            &translation.runtime_classpath(source_set),
            &mut built.missing,
            &FileGroupFilter::AllowAll,
        );
        runtime.extend(output_dir_resources(source_set));
        built
            .resources
            .insert(ClassPathKey::source_set(name, ClassPathType::Runtime), runtime);

        let mut roots: IndexMap<PathBuf, FileGroupFilter> = IndexMap::new();
        for group in &source_set.source_groups {
            let filter = FileGroupFilter::from_patterns(&group.includes, &group.excludes);
            for root in &group.source_roots {
                match roots.get_mut(root) {
                    Some(previous) => *previous = previous.union(&filter),
                    None => {
                        roots.insert(root.clone(), filter.clone());
                    }
                }
            }
        }
        let mut sources = Vec::with_capacity(roots.len());
        for (root, filter) in &roots {
            sources.extend(path_resources([root], &mut built.missing, filter));
        }
        built
            .resources
            .insert(ClassPathKey::source_set(name, ClassPathType::Sources), sources);
    }

    fn without_dependency_output(&self, files: impl Iterator<Item = PathBuf>) -> IndexSet<PathBuf> {
        let mut result: IndexSet<PathBuf> = files.collect();
        for dependency in self.translated_dependencies.values() {
            for classes_dir in classes_dirs(&dependency.module) {
                result.shift_remove(classes_dir);
            }
        }
        result
    }

    /// Entries that could not be put on the classpath of any source set.
    pub fn missing(&self) -> Result<&IndexSet<PathBuf>> {
        self.built
            .as_ref()
            .map(|built| &built.missing)
            .ok_or(ClasspathError::NotBuilt)
    }

    pub fn classpath_resources(&self) -> Result<&HashMap<ClassPathKey, Vec<PathResource>>> {
        self.built
            .as_ref()
            .map(|built| &built.resources)
            .ok_or(ClasspathError::NotBuilt)
    }

    pub fn classpath(&self, key: &ClassPathKey) -> Result<&[PathResource]> {
        Ok(self
            .classpath_resources()?
            .get(key)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }
}

/// Special classpaths never report missing entries.
fn special_resources(files: &IndexSet<PathBuf>) -> Vec<PathResource> {
    path_resources(files, &mut IndexSet::new(), &FileGroupFilter::AllowAll)
}

