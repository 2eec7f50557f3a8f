use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Which of the two inputs of a diff something refers to
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    Old,
    New,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Old => f.write_str("old"),
            Side::New => f.write_str("new"),
        }
    }
}

/// An error returned when a diff can't be computed or rendered
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown template `{0}`")]
    UnknownTemplate(String),

    #[error("{side} input is not a sequence of lines: line {index} contains a line break")]
    InvalidSequence { side: Side, index: usize },

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("tab size {0} is larger than {max}", max = crate::render::MAX_TAB_SIZE)]
    TabSizeTooLarge(usize),

    #[error("invalid options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}
