//! Errors raised while loading proxy settings

use std::path::PathBuf;
use thiserror::Error;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML could not be parsed; `line` is 1-based when the parser knows it
    #[error("malformed settings in {}{}: {message}", .path.display(), location(.line, .column))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("${{{var}}} is referenced but not set")]
    MissingEnvVar { var: String },

    #[error("{var}={value:?} is not usable: {reason}")]
    BadEnvValue {
        var: String,
        value: String,
        reason: String,
    },
}

fn location(line: &Option<usize>, column: &Option<usize>) -> String {
    match (line, column) {
        (Some(l), Some(c)) => format!(" (line {}, column {})", l, c),
        (Some(l), None) => format!(" (line {})", l),
        _ => String::new(),
    }
}

/// A setting that parsed but makes no sense, e.g. `server.port: 0`
#[derive(Debug, Error)]
#[error("invalid setting {field}: {kind}")]
pub struct ValidationError {
    /// Dotted path of the offending setting
    pub field: String,
    pub kind: ValidationErrorKind,
}

#[derive(Debug, Error)]
pub enum ValidationErrorKind {
    #[error("out of range ({0})")]
    OutOfRange(String),
    #[error("malformed ({0})")]
    Malformed(String),
}

impl ValidationError {
    pub fn out_of_range(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationErrorKind::OutOfRange(reason.into()),
        }
    }

    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind: ValidationErrorKind::Malformed(reason.into()),
        }
    }
}
