//! Pattern validation for text settings

use regex::Regex;
use thiserror::Error;

/// CSS length such as `4em`, `32px` or `80%`
pub const CSS_UNIT_PATTERN: &str =
    r"^\d+(?:cm|mm|in|px|pt|pc|em|ex|ch|rem|vw|vh|vmin|vmax|%)$";

#[derive(Debug, Error)]
pub enum ValidationError {
    /// The pattern itself does not compile
    #[error("Invalid validation pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("Invalid value for {field}: '{value}'")]
    Rejected { field: String, value: String },
}

/// Accepts text matching a regular expression
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
}

impl PatternValidator {
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidPattern`] when `pattern` does not compile.
    pub fn new(pattern: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(pattern).map_err(|source| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    /// Validator for CSS lengths
    ///
    /// # Errors
    ///
    /// Never fails in practice; the pattern is fixed.
    pub fn css_unit() -> Result<Self, ValidationError> {
        Self::new(CSS_UNIT_PATTERN)
    }

    #[must_use]
    pub fn validate(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// Like [`Self::validate`], naming `field` on failure
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Rejected`] when `value` does not match.
    pub fn check(&self, field: &str, value: &str) -> Result<(), ValidationError> {
        if self.validate(value) {
            Ok(())
        } else {
            Err(ValidationError::Rejected {
                field: field.to_string(),
                value: value.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_units() {
        let validator = PatternValidator::css_unit().unwrap();
        for ok in ["4em", "32px", "80%", "12vmin", "3rem"] {
            assert!(validator.validate(ok), "{ok}");
        }
        for bad in ["", "em", "4 em", "4emx", "1.5em", "4EM"] {
            assert!(!validator.validate(bad), "{bad}");
        }
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = PatternValidator::new("(unclosed").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
        assert!(err.to_string().contains("(unclosed"));
    }

    #[test]
    fn test_check_names_field() {
        let validator = PatternValidator::css_unit().unwrap();
        let err = validator.check("font_size", "big").unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for font_size: 'big'");
    }
}
