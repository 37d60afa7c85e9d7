/// Boundary error: a user-facing message plus the process exit code.
///
/// Exit codes: `2` for configuration/usage problems, `4` for fetch and data
/// problems.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the single batched API call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("BLS request failed: {0}")]
    Transport(String),

    #[error("Unexpected BLS response shape: {0}")]
    UnexpectedShape(String),

    #[error("Invalid series request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Only transport failures are worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, FetchError::Transport(_))
    }
}

impl From<FetchError> for AppError {
    fn from(err: FetchError) -> Self {
        let code = match err {
            FetchError::InvalidRequest(_) => 2,
            FetchError::Transport(_) | FetchError::UnexpectedShape(_) => 4,
        };
        AppError::new(code, err.to_string())
    }
}

/// A single observation whose value could not be parsed.
///
/// Recovered locally: the observation is dropped and the gap stays in the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("series {series_id} {year}-{period}: unparsable value '{raw}'")]
pub struct ValueParseError {
    pub series_id: String,
    pub year: String,
    pub period: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("column '{0}' not found in observation table")]
    MissingColumn(String),
}

impl From<TableError> for AppError {
    fn from(err: TableError) -> Self {
        AppError::new(4, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_errors_map_to_exit_codes() {
        let transport: AppError = FetchError::Transport("connection refused".into()).into();
        assert_eq!(transport.exit_code(), 4);
        assert!(transport.to_string().contains("connection refused"));

        let invalid: AppError = FetchError::InvalidRequest("no series".into()).into();
        assert_eq!(invalid.exit_code(), 2);
    }

    #[test]
    fn only_transport_is_transient() {
        assert!(FetchError::Transport("timeout".into()).is_transient());
        assert!(!FetchError::UnexpectedShape("missing Results".into()).is_transient());
        assert!(!FetchError::InvalidRequest("dup".into()).is_transient());
    }
}
