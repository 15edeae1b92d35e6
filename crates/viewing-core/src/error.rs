use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the viewing-history analyzer.
#[derive(Error, Debug)]
pub enum ViewingError {
    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No viewing-activity export was found at or under the given path.
    #[error("No viewing activity export found at {0}")]
    ExportNotFound(PathBuf),

    /// The export is missing one of the fixed column headers.
    #[error("Missing column in export: {0}")]
    MissingColumn(String),

    /// The CSV reader failed to decode a row.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// A start timestamp could not be parsed.
    #[error("Invalid timestamp at row {row}: {value:?}")]
    TimestampParse { row: usize, value: String },

    /// A duration value could not be parsed as `HH:MM:SS`.
    #[error("Invalid duration at row {row}: {value:?}")]
    DurationParse { row: usize, value: String },

    /// A row carried an empty profile name.
    #[error("Empty profile name at row {row}")]
    EmptyProfile { row: usize },

    /// A profile filter matched no record.
    #[error("Invalid profile name {name:?}. Please choose from: {}", .available.join(", "))]
    UnknownProfile { name: String, available: Vec<String> },

    /// A group key name is not one of the supported dimensions.
    #[error("Invalid group key: {0}")]
    InvalidGroupKey(String),

    /// A top-N count was zero or negative.
    #[error("top_n must be an integer greater than 0, got {0}")]
    InvalidTopN(i64),

    /// A timezone name is not a recognised IANA identifier.
    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the viewing crates.
pub type Result<T> = std::result::Result<T, ViewingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_file_read() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = ViewingError::FileRead {
            path: PathBuf::from("/exports/ViewingActivity.csv"),
            source: io_err,
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to read file"));
        assert!(msg.contains("/exports/ViewingActivity.csv"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_error_display_timestamp_parse() {
        let err = ViewingError::TimestampParse {
            row: 12,
            value: "yesterday".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid timestamp at row 12: \"yesterday\"");
    }

    #[test]
    fn test_error_display_duration_parse() {
        let err = ViewingError::DurationParse {
            row: 3,
            value: "1h20m".to_string(),
        };
        assert_eq!(err.to_string(), "Invalid duration at row 3: \"1h20m\"");
    }

    #[test]
    fn test_error_display_unknown_profile_lists_choices() {
        let err = ViewingError::UnknownProfile {
            name: "Guest".to_string(),
            available: vec!["Dana".to_string(), "Kids".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid profile name \"Guest\". Please choose from: Dana, Kids"
        );
    }

    #[test]
    fn test_error_display_invalid_top_n() {
        let err = ViewingError::InvalidTopN(0);
        assert_eq!(
            err.to_string(),
            "top_n must be an integer greater than 0, got 0"
        );
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = ViewingError::MissingColumn("Start Time".to_string());
        assert_eq!(err.to_string(), "Missing column in export: Start Time");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ViewingError = io_err.into();
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: ViewingError = json_err.into();
        assert!(err.to_string().contains("Failed to parse JSON"));
    }
}
