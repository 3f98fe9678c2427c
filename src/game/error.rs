use std::path::PathBuf;

/// Errors surfaced by the game core
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read config file {path:?}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("visualizer failed during playback: {0:#}")]
    Visualizer(anyhow::Error),
}
