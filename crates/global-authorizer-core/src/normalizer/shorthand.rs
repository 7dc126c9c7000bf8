//! `"METHOD /path"` shorthand parsing.
//!
//! Strict: a string that does not yield both a method and a path is an error.
//! The bare `"*"` catch-all is only accepted on HTTP API events.

use crate::model::ApiKind;

pub const CATCH_ALL: &str = "*";

/// Why a shorthand string was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShorthandError {
    Empty,
    MissingPath,
    CatchAllNotSupported,
}

impl ShorthandError {
    pub fn reason(&self) -> &'static str {
        match self {
            ShorthandError::Empty => "expected 'METHOD /path', got an empty string",
            ShorthandError::MissingPath => "expected 'METHOD /path', no path found",
            ShorthandError::CatchAllNotSupported => {
                "the '*' catch-all is only valid on httpApi events"
            }
        }
    }
}

/// Splits `text` on the first run of whitespace into method and path.
pub fn parse_shorthand(kind: ApiKind, text: &str) -> Result<(String, String), ShorthandError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ShorthandError::Empty);
    }
    if text == CATCH_ALL {
        return if kind.supports_catch_all() {
            Ok((CATCH_ALL.to_string(), CATCH_ALL.to_string()))
        } else {
            Err(ShorthandError::CatchAllNotSupported)
        };
    }

    match text.split_once(char::is_whitespace) {
        Some((method, path)) if !path.trim().is_empty() => {
            Ok((method.to_string(), path.trim().to_string()))
        }
        _ => Err(ShorthandError::MissingPath),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok(kind: ApiKind, text: &str) -> (String, String) {
        parse_shorthand(kind, text).unwrap()
    }

    #[test]
    fn splits_method_and_path() {
        assert_eq!(
            ok(ApiKind::RestApi, "GET /path1"),
            ("GET".to_string(), "/path1".to_string())
        );
        assert_eq!(
            ok(ApiKind::HttpApi, "post /users/{id}"),
            ("post".to_string(), "/users/{id}".to_string())
        );
        assert_eq!(
            ok(ApiKind::RestApi, "  ANY   /proxy/{proxy+}  "),
            ("ANY".to_string(), "/proxy/{proxy+}".to_string())
        );
    }

    #[test]
    fn catch_all_only_on_http_api() {
        assert_eq!(
            ok(ApiKind::HttpApi, "*"),
            ("*".to_string(), "*".to_string())
        );
        assert_eq!(
            parse_shorthand(ApiKind::RestApi, "*"),
            Err(ShorthandError::CatchAllNotSupported)
        );
        assert_eq!(
            ok(ApiKind::HttpApi, "* /any"),
            ("*".to_string(), "/any".to_string())
        );
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(parse_shorthand(ApiKind::RestApi, ""), Err(ShorthandError::Empty));
        assert_eq!(parse_shorthand(ApiKind::HttpApi, "   "), Err(ShorthandError::Empty));
        assert_eq!(
            parse_shorthand(ApiKind::RestApi, "GET"),
            Err(ShorthandError::MissingPath)
        );
        assert_eq!(
            parse_shorthand(ApiKind::HttpApi, "/only-a-path"),
            Err(ShorthandError::MissingPath)
        );
    }
}
