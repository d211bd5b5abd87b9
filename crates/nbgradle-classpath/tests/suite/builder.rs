use std::collections::HashMap;
use std::path::Path;

use nbgradle_classpath::{
    ClassPathKey, ClassPathResourceBuilder, ClassPathType, ClasspathError, FileGroupFilter,
};
use nbgradle_config::{with_captured_logs, LoggingConfig};
use nbgradle_model::java::{JavaModel, JavaSourceGroup, MAIN_SOURCE_SET, TEST_SOURCE_SET};
use pretty_assertions::assert_eq;

use super::*;

fn key(source_set: &str, kind: ClassPathType) -> ClassPathKey {
    ClassPathKey::source_set(source_set, kind)
}

#[test]
fn accessors_fail_before_build() {
    let layout = Layout::new();
    let model = JavaModel {
        main_module: module(&layout.path("app"), Vec::new()),
    };
    let dependencies = HashMap::new();
    let platform = platform();

    let builder = ClassPathResourceBuilder::new(&model, &dependencies, &platform);
    assert!(matches!(builder.missing(), Err(ClasspathError::NotBuilt)));
    assert!(matches!(builder.classpath_resources(), Err(ClasspathError::NotBuilt)));
}

#[test]
fn every_source_set_gets_three_classpaths() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let model = JavaModel {
        main_module: module(
            &app,
            vec![source_set(MAIN_SOURCE_SET, &app), source_set(TEST_SOURCE_SET, &app)],
        ),
    };
    let dependencies = HashMap::new();
    let platform = platform();

    let builder = build(true, &model, &dependencies, &platform, Vec::new());
    let resources = builder.classpath_resources().unwrap();
    for source_set in [MAIN_SOURCE_SET, TEST_SOURCE_SET] {
        for kind in [ClassPathType::Sources, ClassPathType::Compile, ClassPathType::Runtime] {
            assert!(resources.contains_key(&key(source_set, kind)), "{source_set} {kind:?}");
        }
    }
    // 2 source sets * 3 + 5 special classpaths.
    assert_eq!(resources.len(), 11);
    assert!(builder.missing().unwrap().is_empty());
}

#[test]
fn runtime_classpath_ends_with_the_output_dirs() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let guava = layout.file("repo/guava.jar");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.classpaths.compile = vec![guava.clone()];
    main.classpaths.runtime = vec![guava.clone(), guava.clone()];
    let classes = main.output_dirs.classes_dir.clone();
    let resources_dir = main.output_dirs.resources_dir.clone();

    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    assert_eq!(
        urls(builder.classpath(&key(MAIN_SOURCE_SET, ClassPathType::Compile)).unwrap()),
        vec![jar_url(&guava)]
    );
    assert_eq!(
        urls(builder.classpath(&key(MAIN_SOURCE_SET, ClassPathType::Runtime)).unwrap()),
        vec![jar_url(&guava), dir_url(&classes), dir_url(&resources_dir)]
    );
}

#[test]
fn invalid_entries_are_reported_as_missing() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let readme = layout.path("repo/README.txt");
    std::fs::create_dir_all(readme.parent().unwrap()).unwrap();
    std::fs::write(&readme, "not a library").unwrap();
    let valid = layout.file("repo/valid.jar");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.classpaths.compile = vec![readme.clone(), Path::new("relative.jar").to_path_buf(), valid.clone()];

    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let (builder, logs) = with_captured_logs(&LoggingConfig::default(), || {
        build(true, &model, &dependencies, &platform, Vec::new())
    });
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("Class path entry is invalid"), "{logs}");
    assert!(logs.contains("README.txt"), "{logs}");

    let missing: Vec<_> = builder.missing().unwrap().iter().cloned().collect();
    assert_eq!(missing, vec![readme, Path::new("relative.jar").to_path_buf()]);
    assert_eq!(
        urls(builder.classpath(&key(MAIN_SOURCE_SET, ClassPathType::Compile)).unwrap()),
        vec![jar_url(&valid)]
    );
}

#[test]
fn source_roots_shared_by_groups_merge_their_filters() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let shared = layout.dir("app/src/main/shared");
    let resources_root = layout.dir("app/src/main/resources");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.source_groups = vec![
        JavaSourceGroup {
            name: "java".to_string(),
            source_roots: vec![shared.clone()],
            includes: vec!["**/*.java".to_string()],
            excludes: Vec::new(),
        },
        JavaSourceGroup {
            name: "resources".to_string(),
            source_roots: vec![resources_root.clone(), shared.clone()],
            includes: vec!["**/*.properties".to_string()],
            excludes: Vec::new(),
        },
    ];

    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    let sources = builder
        .classpath(&key(MAIN_SOURCE_SET, ClassPathType::Sources))
        .unwrap();
    assert_eq!(urls(sources), vec![dir_url(&shared), dir_url(&resources_root)]);

    let shared_resource = &sources[0];
    assert!(shared_resource.contains(&shared.join("pkg/Main.java")));
    assert!(shared_resource.contains(&shared.join("pkg/app.properties")));
    assert!(!shared_resource.contains(&shared.join("pkg/layout.xml")));

    let resources_resource = &sources[1];
    assert!(!resources_resource.contains(&resources_root.join("pkg/Main.java")));
    assert!(matches!(
        resources_resource.filter(),
        Some(FileGroupFilter::AnyOf(rules)) if rules.len() == 1
    ));
}

#[test]
fn unfiltered_source_roots_have_no_filter() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let model = JavaModel {
        main_module: module(&app, vec![source_set(MAIN_SOURCE_SET, &app)]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let builder = build(true, &model, &dependencies, &platform, Vec::new());

    let sources = builder
        .classpath(&key(MAIN_SOURCE_SET, ClassPathType::Sources))
        .unwrap();
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].filter(), None);
}

#[test]
fn invalid_source_patterns_do_not_hide_the_root() {
    let layout = Layout::new();
    let app = layout.dir("app");
    let root = layout.dir("app/src/main/java");

    let mut main = source_set(MAIN_SOURCE_SET, &app);
    main.source_groups[0].includes = vec!["a[".to_string()];

    let model = JavaModel {
        main_module: module(&app, vec![main]),
    };
    let dependencies = HashMap::new();
    let platform = platform();
    let (builder, logs) = with_captured_logs(&LoggingConfig::default(), || {
        build(true, &model, &dependencies, &platform, Vec::new())
    });
    assert!(logs.contains("ignoring invalid source pattern"), "{logs}");

    let sources = builder
        .classpath(&key(MAIN_SOURCE_SET, ClassPathType::Sources))
        .unwrap();
    assert_eq!(urls(sources), vec![dir_url(&root)]);
    assert_eq!(sources[0].filter(), None);
    assert!(sources[0].contains(&root.join("pkg/Main.java")));
}
