//! Configuration schema contributions.
//!
//! The pass declares two fragments with the host:
//!
//! - the `custom.globalAuthorizer` block, and
//! - the boolean opt-out flag on `aws` `http` and `httpApi` events.
//!
//! [`SchemaRegistry`] is the local stand-in for the host's schema store. It
//! collects fragments and validates a whole service description against them.

use std::collections::BTreeMap;

use jsonschema::Draft;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{GlobalAuthorizerError, GlobalAuthorizerResult};
use crate::model::{ApiKind, OPT_OUT_FLAG};

pub const AWS_PROVIDER: &str = "aws";

const CUSTOM_SCHEMA_JSON: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../schemas/global_authorizer_custom.schema.json"
));

/// Cap on reported violations, keeps CLI output readable.
pub const MAX_VIOLATIONS: usize = 10;

/// Host-side schema registration surface.
pub trait ConfigSchemaHandler {
    /// Adds properties under the top-level `custom` section.
    fn define_custom_properties(&mut self, schema: Value);

    /// Adds properties to the object form of `provider`'s `event` declarations.
    fn define_function_event_properties(&mut self, provider: &str, event: &str, schema: Value);
}

/// Fragment for `custom.globalAuthorizer`.
pub fn custom_properties_schema() -> GlobalAuthorizerResult<Value> {
    serde_json::from_str(CUSTOM_SCHEMA_JSON).map_err(|e| GlobalAuthorizerError::Schema {
        message: format!("failed to parse embedded custom properties schema: {e}"),
    })
}

/// Fragment for the per-event opt-out flag.
pub fn event_properties_schema() -> Value {
    json!({
        "properties": {
            OPT_OUT_FLAG: { "type": "boolean" }
        }
    })
}

/// Registers every fragment the pass contributes.
pub fn define_serverless_schema(
    handler: &mut dyn ConfigSchemaHandler,
) -> GlobalAuthorizerResult<()> {
    handler.define_custom_properties(custom_properties_schema()?);
    for kind in ApiKind::ALL {
        handler.define_function_event_properties(
            AWS_PROVIDER,
            kind.event_key(),
            event_properties_schema(),
        );
    }
    Ok(())
}

/// Collected schema fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    custom: Vec<Value>,
    events: BTreeMap<(String, String), Vec<Value>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty() && self.events.is_empty()
    }

    pub fn custom_fragments(&self) -> &[Value] {
        &self.custom
    }

    pub fn event_fragments(&self, provider: &str, event: &str) -> &[Value] {
        self.events
            .get(&(provider.to_string(), event.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Composed schema for a whole service description under `provider`.
    pub fn compose(&self, provider: &str) -> Value {
        let mut event_properties = serde_json::Map::new();
        for ((p, event), fragments) in &self.events {
            if p != provider {
                continue;
            }
            let mut object_form = vec![json!({ "type": "object" })];
            object_form.extend(fragments.iter().cloned());
            event_properties.insert(
                event.clone(),
                json!({ "anyOf": [{ "type": "string" }, { "allOf": object_form }] }),
            );
        }

        let mut properties = serde_json::Map::new();
        if !self.custom.is_empty() {
            properties.insert(
                "custom".to_string(),
                json!({ "anyOf": [{ "type": "null" }, { "allOf": self.custom }] }),
            );
        }
        if !event_properties.is_empty() {
            properties.insert(
                "functions".to_string(),
                json!({
                    "anyOf": [
                        { "type": "null" },
                        {
                            "type": "object",
                            "additionalProperties": {
                                "anyOf": [
                                    { "type": "null" },
                                    {
                                        "type": "object",
                                        "properties": {
                                            "events": {
                                                "anyOf": [
                                                    { "type": "null" },
                                                    {
                                                        "type": "array",
                                                        "items": { "properties": event_properties }
                                                    }
                                                ]
                                            }
                                        }
                                    }
                                ]
                            }
                        }
                    ]
                }),
            );
        }

        json!({ "type": "object", "properties": properties })
    }

    /// Validates `config` and returns up to [`MAX_VIOLATIONS`] messages.
    /// An empty list means the description is valid.
    pub fn validate(&self, config: &Value, provider: &str) -> GlobalAuthorizerResult<Vec<String>> {
        let schema = self.compose(provider);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .map_err(|e| GlobalAuthorizerError::Schema {
                message: format!("failed to compile configuration schema: {e}"),
            })?;

        if validator.is_valid(config) {
            return Ok(Vec::new());
        }
        Ok(validator
            .iter_errors(config)
            .take(MAX_VIOLATIONS)
            .map(|e| e.to_string())
            .collect())
    }
}

impl ConfigSchemaHandler for SchemaRegistry {
    fn define_custom_properties(&mut self, schema: Value) {
        if self.custom.contains(&schema) {
            warn!("custom properties fragment registered twice, ignoring");
            return;
        }
        debug!("custom properties fragment registered");
        self.custom.push(schema);
    }

    fn define_function_event_properties(&mut self, provider: &str, event: &str, schema: Value) {
        let fragments = self
            .events
            .entry((provider.to_string(), event.to_string()))
            .or_default();
        if fragments.contains(&schema) {
            warn!(provider, event, "event properties fragment registered twice, ignoring");
            return;
        }
        debug!(provider, event, "event properties fragment registered");
        fragments.push(schema);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        custom: Vec<Value>,
        events: Vec<(String, String, Value)>,
    }

    impl ConfigSchemaHandler for Recorder {
        fn define_custom_properties(&mut self, schema: Value) {
            self.custom.push(schema);
        }

        fn define_function_event_properties(
            &mut self,
            provider: &str,
            event: &str,
            schema: Value,
        ) {
            self.events
                .push((provider.to_string(), event.to_string(), schema));
        }
    }

    fn registry() -> SchemaRegistry {
        let mut registry = SchemaRegistry::new();
        define_serverless_schema(&mut registry).unwrap();
        registry
    }

    #[test]
    fn registers_custom_block_and_both_event_kinds() {
        let mut recorder = Recorder::default();
        define_serverless_schema(&mut recorder).unwrap();

        assert_eq!(recorder.custom.len(), 1);
        let block = &recorder.custom[0]["properties"]["globalAuthorizer"];
        assert_eq!(block["additionalProperties"], json!(false));
        for key in ["restApi", "httpApi"] {
            assert_eq!(block["properties"][key]["required"], json!(["authorizer"]));
        }

        let events: Vec<(&str, &str)> = recorder
            .events
            .iter()
            .map(|(p, e, _)| (p.as_str(), e.as_str()))
            .collect();
        assert_eq!(events, vec![("aws", "http"), ("aws", "httpApi")]);
        for (_, _, schema) in &recorder.events {
            assert_eq!(
                schema["properties"]["globalAuthorizerEnabled"]["type"],
                json!("boolean")
            );
        }
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let mut registry = registry();
        define_serverless_schema(&mut registry).unwrap();
        assert_eq!(registry.custom_fragments().len(), 1);
        assert_eq!(registry.event_fragments("aws", "http").len(), 1);
        assert!(registry.event_fragments("azure", "http").is_empty());
    }

    #[test]
    fn accepts_well_formed_description() {
        let config = json!({
            "service": "svc",
            "provider": { "name": "aws" },
            "custom": {
                "globalAuthorizer": {
                    "restApi": { "authorizer": "aws_iam" },
                    "httpApi": { "authorizer": { "name": "jwt" } }
                }
            },
            "functions": {
                "a": {
                    "handler": "a.handler",
                    "events": [
                        { "http": "GET /a" },
                        { "httpApi": { "path": "/b", "method": "get", "globalAuthorizerEnabled": false } },
                        { "sqs": { "arn": "arn:aws:sqs:::q" } }
                    ]
                },
                "b": null
            }
        });
        assert_eq!(registry().validate(&config, "aws").unwrap(), Vec::<String>::new());
    }

    #[test]
    fn rejects_unknown_keys_and_non_boolean_flag() {
        let registry = registry();

        let config = json!({
            "custom": { "globalAuthorizer": { "restApi": { "authorizer": "aws_iam", "extra": 1 } } }
        });
        assert!(!registry.validate(&config, "aws").unwrap().is_empty());

        let config = json!({
            "custom": { "globalAuthorizer": { "restApi": {} } }
        });
        assert!(!registry.validate(&config, "aws").unwrap().is_empty());

        let config = json!({
            "functions": {
                "a": { "events": [ { "http": { "path": "/", "globalAuthorizerEnabled": "invalid" } } ] }
            }
        });
        assert!(!registry.validate(&config, "aws").unwrap().is_empty());
        // Event fragments are scoped to their provider.
        assert!(registry.validate(&config, "azure").unwrap().is_empty());
    }

    #[test]
    fn empty_registry_accepts_objects() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        assert!(registry
            .validate(&json!({ "custom": { "anything": true } }), "aws")
            .unwrap()
            .is_empty());
    }
}
