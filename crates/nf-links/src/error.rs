//! Error types for link configuration and state.

use thiserror::Error;

/// Errors reported by link models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinkError {
    #[error("{link}: {what} out of range ({value})")]
    OutOfRange {
        link: String,
        what: &'static str,
        value: f64,
    },

    #[error("{link}: invalid argument: {what}")]
    InvalidArg { link: String, what: &'static str },

    #[error("{link}: expected {expected} ports, bound to {actual}")]
    PortCount {
        link: String,
        expected: usize,
        actual: usize,
    },

    #[error("{link}: saved state is missing '{key}'")]
    MissingState { link: String, key: String },
}

pub type LinkResult<T> = Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_names_link() {
        let err = LinkError::OutOfRange {
            link: "r1".into(),
            what: "conductance",
            value: -1.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("r1"));
        assert!(msg.contains("conductance"));
    }
}
