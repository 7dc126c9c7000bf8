//! Error types for the global authorizer pass.

use serde_yaml::Value;

use crate::model::ApiKind;

/// Tag prepended to every error message so failures are recognizable in host logs.
pub const ERROR_TAG: &str = "[serverless-global-authorizer]";

/// Global authorizer errors. All of them abort the current pass.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlobalAuthorizerError {
    /// A default authorizer was needed for a kind with no configured value.
    #[error("[serverless-global-authorizer] Missing global authorizer configuration for {kind}")]
    MissingAuthorizerConfig { kind: ApiKind },

    /// Shorthand event string does not parse into method and path.
    #[error(
        "[serverless-global-authorizer] Invalid {event} event shorthand {value:?} in function '{function}': {reason}"
    )]
    InvalidEventSyntax {
        function: String,
        event: &'static str,
        value: String,
        reason: String,
    },

    /// Opt-out flag present with a non-boolean value.
    #[error(
        "[serverless-global-authorizer] Invalid value for '{flag}' in function '{function}': expected a boolean, got {}",
        render_literal(.value)
    )]
    InvalidFlagType {
        function: String,
        flag: &'static str,
        value: Value,
    },

    /// The plugin only serves the aws provider.
    #[error("[serverless-global-authorizer] Unsupported provider '{provider}', only 'aws' is supported")]
    UnsupportedProvider { provider: String },

    /// Configuration failed schema validation in strict mode, or a schema did not compile.
    #[error("[serverless-global-authorizer] Schema error: {message}")]
    Schema { message: String },
}

impl GlobalAuthorizerError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Schema { .. } => 1,
            Self::MissingAuthorizerConfig { .. }
            | Self::InvalidEventSyntax { .. }
            | Self::InvalidFlagType { .. }
            | Self::UnsupportedProvider { .. } => 2,
        }
    }
}

fn render_literal(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| format!("{value:?}"))
}

/// Result type for global authorizer operations.
pub type GlobalAuthorizerResult<T> = Result<T, GlobalAuthorizerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_message_carries_the_tag() {
        let errors = vec![
            GlobalAuthorizerError::MissingAuthorizerConfig {
                kind: ApiKind::RestApi,
            },
            GlobalAuthorizerError::InvalidEventSyntax {
                function: "f".into(),
                event: "http",
                value: "GET".into(),
                reason: "missing path".into(),
            },
            GlobalAuthorizerError::InvalidFlagType {
                function: "f".into(),
                flag: "globalAuthorizerEnabled",
                value: Value::String("invalid".into()),
            },
            GlobalAuthorizerError::UnsupportedProvider {
                provider: "azure".into(),
            },
            GlobalAuthorizerError::Schema {
                message: "boom".into(),
            },
        ];
        for err in errors {
            assert!(err.to_string().starts_with(ERROR_TAG), "{err}");
        }
    }

    #[test]
    fn missing_config_names_the_kind() {
        let err = GlobalAuthorizerError::MissingAuthorizerConfig {
            kind: ApiKind::RestApi,
        };
        assert_eq!(
            err.to_string(),
            "[serverless-global-authorizer] Missing global authorizer configuration for REST API Gateway"
        );
        let err = GlobalAuthorizerError::MissingAuthorizerConfig {
            kind: ApiKind::HttpApi,
        };
        assert!(err.to_string().ends_with("HTTP API Gateway"));
    }

    #[test]
    fn invalid_flag_echoes_literal_value() {
        let err = GlobalAuthorizerError::InvalidFlagType {
            function: "fn1".into(),
            flag: "globalAuthorizerEnabled",
            value: Value::String("invalid".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("globalAuthorizerEnabled"));
        assert!(msg.contains("\"invalid\""));

        let err = GlobalAuthorizerError::InvalidFlagType {
            function: "fn1".into(),
            flag: "globalAuthorizerEnabled",
            value: Value::Number(1.into()),
        };
        assert!(err.to_string().ends_with("got 1"));
    }

    #[test]
    fn exit_codes_split_schema_from_pass_failures() {
        assert_eq!(
            GlobalAuthorizerError::Schema {
                message: String::new()
            }
            .exit_code(),
            1
        );
        assert_eq!(
            GlobalAuthorizerError::MissingAuthorizerConfig {
                kind: ApiKind::HttpApi
            }
            .exit_code(),
            2
        );
    }
}
