//! Input gate for resume generation. Runs before any network call.

use thiserror::Error;

/// Minimum accepted input length, in characters, after trimming.
pub const MIN_INPUT_CHARS: usize = 50;
/// Maximum accepted input length, in characters, after trimming.
pub const MAX_INPUT_CHARS: usize = 10_000;
/// Maximum number of items accepted by a single batch call.
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user_input cannot be empty")]
    Empty,

    #[error("user_input must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    #[error("user_input must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    #[error("batch must contain at least one item")]
    EmptyBatch,

    #[error("batch may contain at most {max} items (got {actual})")]
    BatchTooLarge { max: usize, actual: usize },
}

/// Checks the length bounds of raw resume text.
///
/// Length is measured in characters of the trimmed text, so padding with whitespace
/// cannot push a short input over the minimum.
pub fn validate(raw_text: &str) -> Result<(), ValidationError> {
    let trimmed = raw_text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }

    let actual = trimmed.chars().count();
    if actual < MIN_INPUT_CHARS {
        return Err(ValidationError::TooShort {
            min: MIN_INPUT_CHARS,
            actual,
        });
    }
    if actual > MAX_INPUT_CHARS {
        return Err(ValidationError::TooLong {
            max: MAX_INPUT_CHARS,
            actual,
        });
    }

    Ok(())
}

/// Checks the size of a batch before any item is looked at.
pub fn validate_batch_size(len: usize) -> Result<(), ValidationError> {
    if len == 0 {
        return Err(ValidationError::EmptyBatch);
    }
    if len > MAX_BATCH_SIZE {
        return Err(ValidationError::BatchTooLarge {
            max: MAX_BATCH_SIZE,
            actual: len,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds_inclusive() {
        assert!(validate(&"a".repeat(MIN_INPUT_CHARS)).is_ok());
        assert!(validate(&"a".repeat(MAX_INPUT_CHARS)).is_ok());
    }

    #[test]
    fn test_rejects_one_below_minimum() {
        let err = validate(&"a".repeat(MIN_INPUT_CHARS - 1)).unwrap_err();
        assert_eq!(
            err,
            ValidationError::TooShort {
                min: MIN_INPUT_CHARS,
                actual: MIN_INPUT_CHARS - 1
            }
        );
    }

    #[test]
    fn test_rejects_one_above_maximum() {
        let err = validate(&"a".repeat(MAX_INPUT_CHARS + 1)).unwrap_err();
        assert!(matches!(err, ValidationError::TooLong { actual, .. } if actual == MAX_INPUT_CHARS + 1));
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(validate(&" \n\t ".repeat(40)), Err(ValidationError::Empty));
        assert_eq!(validate(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_padding_does_not_count_toward_length() {
        let padded = format!("{}{}{}", " ".repeat(100), "a".repeat(10), " ".repeat(100));
        assert!(matches!(
            validate(&padded),
            Err(ValidationError::TooShort { actual: 10, .. })
        ));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 50 two-byte characters: 100 bytes but exactly the minimum in characters.
        let accented = "é".repeat(MIN_INPUT_CHARS);
        assert!(validate(&accented).is_ok());

        // 5,000 four-byte characters would exceed the maximum if bytes were counted.
        let wide = "😀".repeat(5_000);
        assert!(validate(&wide).is_ok());
    }

    #[test]
    fn test_batch_size_limits() {
        assert_eq!(validate_batch_size(0), Err(ValidationError::EmptyBatch));
        assert!(validate_batch_size(1).is_ok());
        assert!(validate_batch_size(MAX_BATCH_SIZE).is_ok());
        assert_eq!(
            validate_batch_size(MAX_BATCH_SIZE + 1),
            Err(ValidationError::BatchTooLarge {
                max: MAX_BATCH_SIZE,
                actual: MAX_BATCH_SIZE + 1
            })
        );
    }

    #[test]
    fn test_error_messages_name_the_limit() {
        let err = validate("too short").unwrap_err();
        assert_eq!(
            err.to_string(),
            "user_input must be at least 50 characters (got 9)"
        );
    }
}
