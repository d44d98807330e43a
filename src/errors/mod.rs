use anyhow::Context as _;
use thiserror::Error;

/// Errors surfaced by the rating engine
#[derive(Debug, Error, PartialEq)]
pub enum RatingError {
    #[error("cannot fit ratings from an empty comparison list")]
    EmptyInput,

    #[error("information matrix is {rows}x{cols} but the solution has {expected} parameters")]
    DimensionMismatch {
        rows: usize,
        cols: usize,
        expected: usize,
    },
}

/// Add context to parse errors
pub fn parse_context(data_type: &str) -> String {
    format!("Failed to parse {}", data_type)
}

/// Add context to file errors
pub fn io_context(operation: &str, path: &str) -> String {
    format!("Failed to {} file: {}", operation, path)
}

/// Wrap result with parse context
pub fn with_parse_context<T, E>(result: Result<T, E>, data_type: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(parse_context(data_type))
}

/// Wrap result with file operation context
pub fn with_io_context<T, E>(result: Result<T, E>, operation: &str, path: &str) -> anyhow::Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    result.context(io_context(operation, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message() {
        assert_eq!(
            RatingError::EmptyInput.to_string(),
            "cannot fit ratings from an empty comparison list"
        );
    }

    #[test]
    fn test_parse_context_is_attached() {
        let result: Result<u32, _> = "x".parse::<u32>();
        let err = with_parse_context(result, "comparisons").unwrap_err();

        assert_eq!(err.to_string(), "Failed to parse comparisons");
    }
}
