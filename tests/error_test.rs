//! Tests for error types

use seigla_controle::{Error, ErrorKind, ValidationError};
use std::path::PathBuf;

#[test]
fn test_validation_error_messages() {
    let error = Error::from(ValidationError::MissingField("PL"));
    let error_str = format!("{error}");
    assert!(error_str.contains("required field missing"));
    assert!(error_str.contains("PL"));
    assert_eq!(error.kind(), ErrorKind::Validation);
    assert!(!error.is_retryable());

    let error = Error::from(ValidationError::NonNumeric {
        field: "SNIT",
        value: "12a".to_string(),
    });
    assert!(error.to_string().contains("non-numeric field: SNIT = \"12a\""));
}

#[test]
fn test_storage_access_error_is_retryable() {
    let error = Error::StorageAccess {
        path: PathBuf::from("controle-03-24.parquet"),
        message: "Permission denied".to_string(),
    };
    let error_str = format!("{error}");
    assert!(error_str.contains("controle-03-24.parquet"));
    assert!(error_str.contains("retry the save"));
    assert_eq!(error.kind(), ErrorKind::StorageAccess);
    assert!(error.is_retryable());
}

#[test]
fn test_schema_error_lists_found_columns() {
    let error = Error::Schema {
        path: PathBuf::from("x.parquet"),
        found: vec!["LOT".to_string(), "NORMAL".to_string()],
    };
    assert!(error.to_string().contains("[\"LOT\", \"NORMAL\"]"));
    assert_eq!(error.kind(), ErrorKind::Schema);
    assert!(!error.is_retryable());
}

#[test]
fn test_navigation_errors() {
    let error = Error::UnsavedChanges("controle-03-24.parquet".to_string());
    assert_eq!(error.kind(), ErrorKind::Navigation);

    let error = Error::InvalidEvent {
        state: "ListPeriods",
        event: "Finish",
    };
    assert_eq!(
        error.to_string(),
        "Event Finish not accepted while in state ListPeriods"
    );
}

#[test]
fn test_config_error() {
    let error = Error::Config("extension must not be empty".to_string());
    assert_eq!(format!("{error}"), "Configuration error: extension must not be empty");
    assert_eq!(error.kind(), ErrorKind::Config);
}
