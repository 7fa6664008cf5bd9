use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PedibusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("error at line {line}")]
    Parse { line: usize },

    #[error("{}: cannot be read ({source})", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<PedibusError>,
    },

    #[error("{}: cannot be written ({source})", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid date '{0}', expected yyyy/mm/dd")]
    InvalidDate(String),

    #[error("date out of range: {0}")]
    DateOutOfRange(String),

    #[error("{0} is not a walking-bus day")]
    NotADutyDay(String),

    #[error("unknown guide: {0}")]
    UnknownGuide(String),

    #[error("guide index {index} out of range (roster has {len} entries)")]
    GuideIndex { index: usize, len: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, PedibusError>;

impl PedibusError {
    /// Wrap a failure that happened while reading `path`.
    pub fn load(path: impl Into<PathBuf>, source: PedibusError) -> Self {
        PedibusError::Load {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// 1-based line number of a history parse failure, looking through
    /// [`PedibusError::Load`] wrappers.
    pub fn parse_line(&self) -> Option<usize> {
        match self {
            PedibusError::Parse { line } => Some(*line),
            PedibusError::Load { source, .. } => source.parse_line(),
            _ => None,
        }
    }
}
