//! chatmacro Core - Fundamental types
//!
//! This crate provides the types shared by the parser, evaluator and plugins:
//! - `TemplateError`: typed parse/evaluation errors with machine-readable codes
//! - `ErrorReport`: serializable error view for front ends
//! - `MacroTable`: the `%NAME:KEY%` lookup table

mod error;
mod macros;

pub use error::{codes, BoxError, ErrorReport, TemplateError};
pub use macros::MacroTable;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{BoxError, ErrorReport, MacroTable, TemplateError};
}

#[cfg(test)]
mod tests {
    use super::*;

    mod error_tests {
        use super::*;

        #[test]
        fn test_codes_match_variants() {
            let err = TemplateError::UnterminatedMacro { name: "abc".into(), offset: 0 };
            assert_eq!(err.code(), codes::UNTERMINATED_MACRO);

            let err = TemplateError::MissingScope { plugin: "GAME".into() };
            assert_eq!(err.code(), codes::MISSING_SCOPE);

            let err = TemplateError::plugin_failed("GAME", "api down");
            assert_eq!(err.code(), codes::PLUGIN_ERROR);
        }

        #[test]
        fn test_plugin_failure_keeps_source() {
            let err = TemplateError::plugin_failed("GAME", "api down");
            assert_eq!(err.to_string(), "plugin `GAME` failed: api down");
            let source = std::error::Error::source(&err).unwrap();
            assert_eq!(source.to_string(), "api down");
        }

        #[test]
        fn test_unknown_plugin_suggests_similar() {
            let err = TemplateError::UnknownPlugin {
                name: "UPER".into(),
                similar: vec!["UPPER".into(), "LOWER".into()],
            };
            assert_eq!(err.suggestion().as_deref(), Some("Similar: UPPER, LOWER"));

            let err = TemplateError::UnknownPlugin { name: "X".into(), similar: vec![] };
            assert!(err.suggestion().is_none());
        }

        #[test]
        fn test_report_serializes() {
            let err = TemplateError::UnknownMacroKey { name: "USER".into(), key: "AGE".into() };
            let json = serde_json::to_value(err.report()).unwrap();
            assert_eq!(json["code"], "UNKNOWN_MACRO_KEY");
            assert_eq!(json["message"], "unknown macro key `USER:AGE`");
            assert!(json["suggestion"].is_string());
        }

        #[test]
        fn test_report_display() {
            let report = ErrorReport::new("BAD_REQUEST", "missing field").with_suggestion("send JSON");
            assert_eq!(report.to_string(), "[BAD_REQUEST] missing field (suggestion: send JSON)");
        }
    }
}
