use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Ant-style include / exclude patterns of one source group.
///
/// Paths are matched relative to the source root. An empty include list includes everything;
/// excludes always win over includes. Patterns that are not valid globs are dropped.
#[derive(Clone, Debug)]
pub struct IncludeExcludeRules {
    includes: Vec<String>,
    excludes: Vec<String>,
    include_set: GlobSet,
    exclude_set: GlobSet,
}

impl IncludeExcludeRules {
    pub fn new(includes: &[String], excludes: &[String]) -> Self {
        let (include_set, includes) = build_glob_set(includes);
        let (exclude_set, excludes) = build_glob_set(excludes);
        Self {
            includes,
            excludes,
            include_set,
            exclude_set,
        }
    }

    /// The include patterns in effect.
    pub fn include_patterns(&self) -> &[String] {
        &self.includes
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.excludes
    }

    pub fn is_allow_all(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }

    pub fn includes(&self, relative: &Path) -> bool {
        if self.exclude_set.is_match(relative) {
            return false;
        }
        self.includes.is_empty() || self.include_set.is_match(relative)
    }
}

impl PartialEq for IncludeExcludeRules {
    fn eq(&self, other: &Self) -> bool {
        self.includes == other.includes && self.excludes == other.excludes
    }
}

impl Eq for IncludeExcludeRules {}

/// Compiles `patterns`, returning the set and the patterns it was built from.
fn build_glob_set(patterns: &[String]) -> (GlobSet, Vec<String>) {
    let mut builder = GlobSetBuilder::new();
    let mut accepted = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        // `dir/` is shorthand for `dir/**` in Ant patterns.
        let glob = if pattern.ends_with('/') {
            format!("{pattern}**")
        } else {
            pattern.clone()
        };
        match GlobBuilder::new(&glob).literal_separator(true).build() {
            Ok(glob) => {
                builder.add(glob);
                accepted.push(pattern.clone());
            }
            Err(err) => {
                tracing::warn!(
                    target: "nbgradle.classpath",
                    pattern = %pattern,
                    error = %err,
                    "ignoring invalid source pattern"
                );
            }
        }
    }

    match builder.build() {
        Ok(set) => (set, accepted),
        Err(err) => {
            tracing::warn!(
                target: "nbgradle.classpath",
                error = %err,
                "failed to build source pattern set"
            );
            (GlobSet::empty(), Vec::new())
        }
    }
}

/// Decides which files below a source root belong to the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileGroupFilter {
    AllowAll,
    /// A file is included when any of the rules includes it.
    AnyOf(Vec<IncludeExcludeRules>),
}

impl FileGroupFilter {
    pub fn from_rules(rules: IncludeExcludeRules) -> Self {
        if rules.is_allow_all() {
            FileGroupFilter::AllowAll
        } else {
            FileGroupFilter::AnyOf(vec![rules])
        }
    }

    pub fn from_patterns(includes: &[String], excludes: &[String]) -> Self {
        Self::from_rules(IncludeExcludeRules::new(includes, excludes))
    }

    pub fn is_allow_all(&self) -> bool {
        matches!(self, FileGroupFilter::AllowAll)
    }

    /// Files included by either filter.
    pub fn union(&self, other: &FileGroupFilter) -> FileGroupFilter {
        match (self, other) {
            (FileGroupFilter::AnyOf(left), FileGroupFilter::AnyOf(right)) => {
                let mut rules = left.clone();
                for rule in right {
                    if !rules.contains(rule) {
                        rules.push(rule.clone());
                    }
                }
                FileGroupFilter::AnyOf(rules)
            }
            _ => FileGroupFilter::AllowAll,
        }
    }

    pub fn includes(&self, relative: &Path) -> bool {
        match self {
            FileGroupFilter::AllowAll => true,
            FileGroupFilter::AnyOf(rules) => rules.iter().any(|rules| rules.includes(relative)),
        }
    }
}
