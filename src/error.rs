use thiserror::Error;

/// Errors surfaced while setting up the arena or loading its configuration.
#[derive(Debug, Error)]
pub enum ArenaError {
    #[error("render surface `{0}` not found")]
    MissingRenderSurface(String),

    #[error(
        "invalid arena bounds: margin {margin} must be smaller than \
         min(half_width {half_width}, half_depth {half_depth})"
    )]
    InvalidBounds {
        half_width: f32,
        half_depth: f32,
        margin: f32,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),
}

pub type Result<T, E = ArenaError> = std::result::Result<T, E>;
