use thiserror::Error;

/// Misuse detected while declaring arguments, menus or constraints.
///
/// These are programming errors in the embedding program, raised at the
/// call site that caused them. Problems with the parsed command line never
/// show up here; they are recorded on the parser instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("argument keys must be non-empty")]
    EmptyKey,
    #[error("key '{0}' is already declared")]
    DuplicateKey(String),
    #[error("invalid range [{min}, {max}]: max must be at least 1 and not below min")]
    InvalidRange { min: usize, max: usize },
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
    #[error("unknown help menu '{0}'")]
    UnknownHelpMenu(String),
    #[error("help menu '{0}' is already declared")]
    DuplicateHelpMenu(String),
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("a container target must be the only storage of an argument")]
    MultipleContainerTargets,
}

pub type ConfigResult<T> = Result<T, ConfigError>;
