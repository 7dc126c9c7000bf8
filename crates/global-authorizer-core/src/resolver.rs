//! Default authorizer lookup.
//!
//! Reads `custom.globalAuthorizer.{restApi|httpApi}.authorizer`. The value is
//! opaque configuration and is handed back unchanged.

use serde_yaml::Value;

use crate::errors::{GlobalAuthorizerError, GlobalAuthorizerResult};
use crate::model::{ApiKind, ConfigSource};

pub const CUSTOM_KEY: &str = "custom";
pub const GLOBAL_AUTHORIZER_KEY: &str = "globalAuthorizer";
pub const AUTHORIZER_KEY: &str = "authorizer";

/// Typed view of the global authorizer block.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlobalAuthorizerBlock<'a> {
    pub rest_api: Option<&'a Value>,
    pub http_api: Option<&'a Value>,
}

impl<'a> GlobalAuthorizerBlock<'a> {
    pub fn from_source(source: &'a dyn ConfigSource) -> Self {
        let lookup = |kind: ApiKind| {
            source.value_at(&[
                CUSTOM_KEY,
                GLOBAL_AUTHORIZER_KEY,
                kind.config_key(),
                AUTHORIZER_KEY,
            ])
        };
        Self {
            rest_api: lookup(ApiKind::RestApi),
            http_api: lookup(ApiKind::HttpApi),
        }
    }

    pub fn slot(&self, kind: ApiKind) -> Option<&'a Value> {
        match kind {
            ApiKind::RestApi => self.rest_api,
            ApiKind::HttpApi => self.http_api,
        }
    }
}

pub struct AuthorizerResolver<'a> {
    source: &'a dyn ConfigSource,
}

impl<'a> AuthorizerResolver<'a> {
    pub fn new(source: &'a dyn ConfigSource) -> Self {
        Self { source }
    }

    /// Configured default authorizer for `kind`. Absent or falsy is an error.
    pub fn resolve(&self, kind: ApiKind) -> GlobalAuthorizerResult<Value> {
        match GlobalAuthorizerBlock::from_source(self.source).slot(kind) {
            Some(value) if !is_falsy(value) => Ok(value.clone()),
            _ => Err(GlobalAuthorizerError::MissingAuthorizerConfig { kind }),
        }
    }
}

/// `null`, `false`, `0`, `NaN`, and `""` count as not configured.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.is_nan() || n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => false,
    }
}
