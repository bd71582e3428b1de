use http::StatusCode;
use restsql_data::{DataError, ErrorKind, IntoDataError};

#[test]
fn test_error_kinds() {
    assert_eq!(DataError::NotFound("x".into()).kind(), ErrorKind::NotFound);
    assert_eq!(DataError::BadRequest("x".into()).kind(), ErrorKind::BadRequest);
    assert_eq!(DataError::Other("x".into()).kind(), ErrorKind::Internal);
    assert_eq!(
        DataError::database(std::io::Error::other("down")).kind(),
        ErrorKind::Internal
    );
}

#[test]
fn test_error_status_codes() {
    assert_eq!(DataError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
    assert_eq!(DataError::BadRequest("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(
        DataError::Other("x".into()).status_code(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}

#[test]
fn test_error_display_formatting() {
    assert_eq!(DataError::NotFound("Todo".into()).to_string(), "Not found: Todo");
    assert_eq!(DataError::BadRequest("w".into()).to_string(), "Bad request: w");
    assert_eq!(
        DataError::database(std::io::Error::other("refused")).to_string(),
        "Database error: refused"
    );
    assert_eq!(DataError::Other("v".into()).to_string(), "Data error: v");
}

#[test]
fn test_database_error_exposes_source() {
    use std::error::Error;
    let err = DataError::database(std::io::Error::other("refused"));
    assert!(err.source().is_some());
    assert!(DataError::NotFound("x".into()).source().is_none());
}

#[test]
fn test_domain_errors_pass_through_unchanged() {
    let err = DataError::NotFound("no entity with id 'abc'".into()).into_data_error();
    assert!(matches!(err, DataError::NotFound(msg) if msg == "no entity with id 'abc'"));
}
