use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (bad threshold, duplicate side label, etc.).
    ConfigValidation(String),
    /// A normalization rule produced an invalid regular expression.
    Pattern(String),
    /// Markup selector could not be built.
    Markup(String),
    /// A catalogue record split into the wrong number of `*^*` fields.
    FieldCount { position: usize, expected: usize, found: usize },
    /// A catalogue record has an empty field where a value is required.
    EmptyField { position: usize, field: &'static str },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::Pattern(msg) => write!(f, "invalid rule pattern: {msg}"),
            Self::Markup(msg) => write!(f, "markup error: {msg}"),
            Self::FieldCount { position, expected, found } => write!(
                f,
                "record {position}: expected {expected} field(s), found {found}"
            ),
            Self::EmptyField { position, field } => {
                write!(f, "record {position}: empty {field} field")
            }
        }
    }
}

impl std::error::Error for ReconError {}
