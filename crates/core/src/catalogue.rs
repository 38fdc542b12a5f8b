//! Room type and design theme codes understood by the staging provider.
//!
//! The provider owns the catalogue, so unknown codes are passed through as
//! long as they are well formed. The lists below are the choices offered to
//! the browser client.

use serde::Serialize;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Longest code accepted from a client.
pub const MAX_CODE_LEN: usize = 64;

/// Prefix shared by every space type code.
pub const SPACE_TYPE_PREFIX: &str = "ST-";

/// Prefix shared by every design theme code.
pub const DESIGN_THEME_PREFIX: &str = "DT-";

/// A selectable catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub code: &'static str,
    pub label: &'static str,
}

/// Interior space types.
pub const SPACE_TYPES: &[CatalogueEntry] = &[
    CatalogueEntry { code: "ST-INT-011", label: "Living Room" },
    CatalogueEntry { code: "ST-INT-003", label: "Bedroom" },
    CatalogueEntry { code: "ST-INT-009", label: "Kitchen" },
    CatalogueEntry { code: "ST-INT-002", label: "Bathroom" },
    CatalogueEntry { code: "ST-INT-004", label: "Dining Room" },
];

/// Interior design themes. Omitting a theme lets the provider decide.
pub const DESIGN_THEMES: &[CatalogueEntry] = &[
    CatalogueEntry { code: "DT-INT-011", label: "Modern" },
    CatalogueEntry { code: "DT-INT-003", label: "Contemporary" },
    CatalogueEntry { code: "DT-INT-013", label: "Scandinavian" },
    CatalogueEntry { code: "DT-INT-010", label: "Minimal" },
];

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that `value` looks like a provider catalogue code: `prefix`
/// followed by at least one character, at most [`MAX_CODE_LEN`] characters
/// in total, all ASCII letters, digits, `-` or `_`.
pub fn validate_code(field: &str, prefix: &str, value: &str) -> Result<(), CoreError> {
    if value.is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if value.len() > MAX_CODE_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_CODE_LEN} characters"
        )));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(CoreError::Validation(format!(
            "{field} '{value}' contains invalid characters"
        )));
    }
    match value.strip_prefix(prefix) {
        Some(rest) if !rest.is_empty() => Ok(()),
        _ => Err(CoreError::Validation(format!(
            "{field} '{value}' must be a {prefix}... code"
        ))),
    }
}

pub fn validate_space_type(code: &str) -> Result<(), CoreError> {
    validate_code("space_type", SPACE_TYPE_PREFIX, code)
}

pub fn validate_design_theme(code: &str) -> Result<(), CoreError> {
    validate_code("design_theme", DESIGN_THEME_PREFIX, code)
}

/// Human-readable label for a known space type code.
pub fn space_type_label(code: &str) -> Option<&'static str> {
    SPACE_TYPES.iter().find(|e| e.code == code).map(|e| e.label)
}

/// Human-readable label for a known design theme code.
pub fn design_theme_label(code: &str) -> Option<&'static str> {
    DESIGN_THEMES.iter().find(|e| e.code == code).map(|e| e.label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_codes_are_valid() {
        for entry in SPACE_TYPES {
            assert!(validate_space_type(entry.code).is_ok(), "{}", entry.code);
        }
        for entry in DESIGN_THEMES {
            assert!(validate_design_theme(entry.code).is_ok(), "{}", entry.code);
        }
    }

    #[test]
    fn unknown_code_with_prefix_is_accepted() {
        assert!(validate_space_type("ST-EXT-001").is_ok());
        assert!(validate_design_theme("DT-INT-099").is_ok());
    }

    #[test]
    fn codes_without_field_prefix_are_rejected() {
        assert!(validate_space_type("living_room").is_err());
        assert!(validate_design_theme("whatever").is_err());
        assert!(validate_space_type("DT-INT-011").is_err());
        assert!(validate_design_theme("ST-INT-011").is_err());
        assert!(validate_space_type("ST-").is_err());
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(validate_space_type("").is_err());
        assert!(validate_space_type("ST INT").is_err());
        let long = format!("ST-{}", "x".repeat(MAX_CODE_LEN));
        assert!(validate_space_type(&long).is_err());
    }

    #[test]
    fn labels_resolve() {
        assert_eq!(space_type_label("ST-INT-009"), Some("Kitchen"));
        assert_eq!(design_theme_label("DT-INT-013"), Some("Scandinavian"));
        assert_eq!(space_type_label("nope"), None);
    }
}
