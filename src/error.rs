use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid YAML in TM2Source.")]
    TM2Source(#[from] serde_yaml::Error),

    #[error("Could not read TM2Source: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TM2Source: {0}")]
    InvalidSource(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid tile '{input}': {reason}")]
    InvalidTile { input: String, reason: String },

    #[error("Unknown layer '{0}'")]
    UnknownLayer(String),

    #[error("Unsupported geometry kind: {0}")]
    UnsupportedGeometry(&'static str),

    #[error("Coordinate ({x}, {y}) has no literal form")]
    NonFiniteCoordinate { x: f64, y: f64 },

    #[error("Unsupported SRID {0}, only 3857 and 4326 can be reprojected")]
    UnsupportedSrid(i32),

    #[error("Invalid WKT: {0}")]
    Wkt(String),

    #[error("Parse error at offset {offset}: {message}")]
    Parse { offset: usize, message: String },

    #[error("Formatting failed")]
    Fmt(#[from] fmt::Error),
}

impl Error {
    pub(crate) fn invalid_tile(input: &str, reason: impl Into<String>) -> Error {
        Error::InvalidTile {
            input: input.to_owned(),
            reason: reason.into(),
        }
    }
}
