use crate::error::{AppError, AppResult};

pub fn invalid(field: &str) -> AppError {
    AppError::Validation(format!("please fill {} correctly", field))
}

/// Trimmed text, rejecting absent or blank values.
pub fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| invalid(field))
}

/// Positive identifier.
pub fn required_id(value: Option<i32>, field: &str) -> AppResult<i32> {
    value.filter(|id| *id > 0).ok_or_else(|| invalid(field))
}

/// Present-but-blank is rejected; absent passes through for partial updates.
pub fn optional_text(value: Option<String>, field: &str) -> AppResult<Option<String>> {
    match value {
        Some(v) => required_text(Some(v), field).map(Some),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims() {
        assert_eq!(required_text(Some("  Garuda ".into()), "name").unwrap(), "Garuda");
    }

    #[test]
    fn test_blank_text_is_invalid() {
        let err = required_text(Some("   ".into()), "name").unwrap_err();
        assert_eq!(err.to_string(), "please fill name correctly");
        assert!(required_text(None, "name").is_err());
    }

    #[test]
    fn test_required_id() {
        assert_eq!(required_id(Some(4), "tour id").unwrap(), 4);
        assert!(required_id(Some(0), "tour id").is_err());
        assert!(required_id(Some(-3), "tour id").is_err());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None, "name").unwrap(), None);
        assert!(optional_text(Some(String::new()), "name").is_err());
    }
}
