//! Typed path parameter helpers.

use uuid::Uuid;

use gisthub_core::error::AppError;

/// Parses a UUID from a path segment.
pub fn parse_uuid(s: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(s).map_err(|_| AppError::validation(format!("Invalid UUID: {s}")))
}

/// Parses a version number from a path segment or query value.
pub fn parse_version(s: &str) -> Result<i32, AppError> {
    s.trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or_else(|| AppError::invalid_field("version", format!("Invalid version: {s}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gisthub_core::ErrorKind;

    #[test]
    fn test_parse_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_uuid(&id.to_string()).unwrap(), id);
        assert!(parse_uuid("not-a-uuid").unwrap_err().is(ErrorKind::Validation));
    }

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("3").unwrap(), 3);
        assert_eq!(parse_version(" 12 ").unwrap(), 12);
        assert!(parse_version("abc").is_err());
        assert!(parse_version("0").is_err());
        assert!(parse_version("-1").is_err());
    }
}
