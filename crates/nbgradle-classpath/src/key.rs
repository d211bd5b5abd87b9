use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassPathType {
    Sources,
    Compile,
    Runtime,
}

/// Classpaths spanning the whole project rather than a single source set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SpecialClassPath {
    /// Boot libraries of the project's Java platform.
    Boot,
    /// Class output directories plus the runtime classpath of every source set.
    AllRuntime,
    /// Class output directories of the project and of its project dependencies.
    AllBuildOutput,
    /// Untranslated compile classpath, without the output of project dependencies.
    CompileForGlobal,
    /// Untranslated runtime classpath, without the output of project dependencies.
    RuntimeForGlobal,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClassPathKey {
    SourceSet {
        source_set: String,
        kind: ClassPathType,
    },
    Special(SpecialClassPath),
}

impl ClassPathKey {
    pub fn source_set(source_set: impl Into<String>, kind: ClassPathType) -> Self {
        ClassPathKey::SourceSet {
            source_set: source_set.into(),
            kind,
        }
    }
}

impl From<SpecialClassPath> for ClassPathKey {
    fn from(value: SpecialClassPath) -> Self {
        ClassPathKey::Special(value)
    }
}

impl fmt::Display for ClassPathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassPathKey::SourceSet { source_set, kind } => write!(f, "{source_set}:{kind:?}"),
            ClassPathKey::Special(special) => write!(f, "{special:?}"),
        }
    }
}
