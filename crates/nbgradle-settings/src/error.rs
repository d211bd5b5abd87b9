use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid config key {0:?}: keys must not be empty")]
    InvalidKey(String),

    #[error("a property must be bound to at least one config path")]
    EmptyPathList,

    #[error("failed to parse XML config: {0}")]
    Xml(String),

    #[error("failed to write XML config: {0}")]
    XmlWrite(String),

    #[error("failed to access config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = SettingsError> = std::result::Result<T, E>;
