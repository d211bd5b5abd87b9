use std::collections::HashMap;

use nbgradle_classpath::{ClassPathKey, SpecialClassPath};
use nbgradle_model::java::{JavaModel, MAIN_SOURCE_SET, TEST_SOURCE_SET};
use pretty_assertions::assert_eq;

use super::*;

fn special(kind: SpecialClassPath) -> ClassPathKey {
    kind.into()
}

#[test]
fn boot_classpath_lists_the_platform_libraries() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let model = JavaModel {
        main_module: module(&app, Vec::new()),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    assert_eq!(
        urls(builder.classpath(&special(SpecialClassPath::Boot)).unwrap()),
        vec!["jar:file:///jdk/jre/lib/rt.jar!/".to_string()]
    );
}

#[test]
fn build_output_includes_project_dependencies() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let lib = layout.dir("lib");
    let lib_module = module(&lib, vec![source_set(MAIN_SOURCE_SET, &lib)]);
    let lib_classes = lib_module.sources[0].output_dirs.classes_dir.clone();

    let main = source_set(MAIN_SOURCE_SET, &app);
    let test = source_set(TEST_SOURCE_SET, &app);
    let main_classes = main.output_dirs.classes_dir.clone();
    let test_classes = test.output_dirs.classes_dir.clone();
    let model = JavaModel {
        main_module: module(&app, vec![main, test]),
    };
    let dependencies: HashMap<_, _> = [dependency(lib_module)].into_iter().collect();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    assert_eq!(
        urls(builder.classpath(&special(SpecialClassPath::AllBuildOutput)).unwrap()),
        vec![dir_url(&main_classes), dir_url(&test_classes), dir_url(&lib_classes)]
    );
}

#[test]
fn global_classpaths_drop_dependency_output_and_skip_translation() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let lib = layout.dir("lib");
    let lib_module = {
        let mut lib_module = module(&lib, vec![source_set(MAIN_SOURCE_SET, &lib)]);
        lib_module.jar_outputs = vec![jar_output(
            "jar",
            lib.join("build/libs/lib.jar"),
            vec![lib.join("build/classes/java/main")],
        )];
        lib_module
    };
    let lib_classes = lib_module.sources[0].output_dirs.classes_dir.clone();
    let lib_jar = layout.file("repo/lib.jar");
    let junit = layout.file("repo/junit.jar");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.classpaths.compile = vec![lib_classes.clone(), lib_jar.clone()];
    main.classpaths.runtime = vec![lib_classes.clone(), lib_jar.clone()];
    let mut test = source_set(TEST_SOURCE_SET, &app);
    test.classpaths.compile = vec![lib_jar.clone(), junit.clone()];
    test.classpaths.runtime = vec![junit.clone()];
    let model = JavaModel {
        main_module: module(&app, vec![main, test]),
    };
    let dependencies: HashMap<_, _> = [dependency(lib_module.clone())].into_iter().collect();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, vec![opened(lib_module)]);

    assert_eq!(
        urls(builder.classpath(&special(SpecialClassPath::CompileForGlobal)).unwrap()),
        vec![jar_url(&lib_jar), jar_url(&junit)]
    );
    assert_eq!(
        urls(builder.classpath(&special(SpecialClassPath::RuntimeForGlobal)).unwrap()),
        vec![jar_url(&lib_jar), jar_url(&junit)]
    );
}

#[test]
fn all_runtime_combines_classes_dirs_and_translated_runtime_classpaths() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let lib = layout.dir("lib");
    let lib_classes = lib.join("build/classes/java/main");
    let mut lib_module = module(&lib, Vec::new());
    lib_module.jar_outputs = vec![jar_output(
        "jar",
        lib.join("build/libs/lib.jar"),
        vec![lib_classes.clone()],
    )];
    let lib_jar = layout.file("repo/lib.jar");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.classpaths.runtime = vec![lib_jar];
    let main_classes = main.output_dirs.classes_dir.clone();
    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, vec![opened(lib_module)]);

    assert_eq!(
        urls(builder.classpath(&special(SpecialClassPath::AllRuntime)).unwrap()),
        vec![dir_url(&main_classes), dir_url(&lib_classes)]
    );
}

#[test]
fn special_classpaths_do_not_report_missing_entries() {
    let layout = Layout::new();
    let app = layout.dir("app");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    let not_a_library = layout.path("notes.txt");
    std::fs::write(&not_a_library, "text").unwrap();
    // A classes dir that is a regular file is dropped everywhere without being reported.
    main.output_dirs.classes_dir = not_a_library.clone();
    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    assert!(builder.missing().unwrap().is_empty());
    assert!(builder
        .classpath(&special(SpecialClassPath::AllBuildOutput))
        .unwrap()
        .is_empty());
}
