//! Service description model.
//!
//! Everything the pass does not understand is carried through verbatim, in
//! its original key order. Only the pieces the pass reads or rewrites get a
//! typed representation:
//!
//! ```text
//! ServiceConfig
//! ├── provider.name          (provider lock)
//! ├── custom.globalAuthorizer (resolver input, opaque)
//! └── functions: name → FunctionDefinition
//!                          └── events: [EventDeclaration]
//!                                       ├── Http(HttpEvent)     `- http: ...`
//!                                       ├── HttpApi(HttpEvent)  `- httpApi: ...`
//!                                       └── Other(Value)        `- sqs: ...` etc.
//! ```

mod event;
mod lifted;

pub use event::{
    ApiKind, AuthorizerSlot, EventDeclaration, HttpEvent, StructuredHttpEvent, OPT_OUT_FLAG,
};

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use lifted::{lift, lower};

const FUNCTIONS_KEY: &str = "functions";
const EVENTS_KEY: &str = "events";

/// Raised when a service description has the wrong shape to be loaded at all.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid service description: {0}")]
pub struct ShapeError(pub String);

/// Nested configuration lookup, as offered by the host.
pub trait ConfigSource {
    /// Returns the value at `path`, walking mappings by key.
    fn value_at(&self, path: &[&str]) -> Option<&Value>;
}

impl ConfigSource for Mapping {
    fn value_at(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.get(*first)?;
        for segment in rest {
            current = current.as_mapping()?.get(*segment)?;
        }
        Some(current)
    }
}

/// A single function: its trigger events plus every other setting verbatim.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct FunctionDefinition {
    pub events: Option<Vec<EventDeclaration>>,
    rest: Mapping,
    events_position: Option<usize>,
}

impl FunctionDefinition {
    pub fn new(events: Vec<EventDeclaration>) -> Self {
        Self {
            events: Some(events),
            rest: Mapping::new(),
            events_position: None,
        }
    }

    /// Events in declaration order; an absent list reads as empty.
    pub fn events(&self) -> &[EventDeclaration] {
        self.events.as_deref().unwrap_or_default()
    }

    /// Any non-event setting, e.g. `handler`.
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.rest.get(key)
    }

    pub fn to_value(&self) -> Value {
        let events = match &self.events {
            Some(events) => Some(Value::Sequence(
                events.iter().map(EventDeclaration::to_value).collect(),
            )),
            None => self.events_position.map(|_| Value::Null),
        };
        Value::Mapping(lower(&self.rest, EVENTS_KEY, self.events_position, events))
    }
}

impl TryFrom<Value> for FunctionDefinition {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mapping = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            other => {
                return Err(ShapeError(format!(
                    "function definition must be a mapping, got {}",
                    describe(&other)
                )))
            }
        };

        let (rest, lifted) = lift(mapping, EVENTS_KEY);
        let (events_position, events) = match lifted {
            None => (None, None),
            Some((position, Value::Null)) => (Some(position), None),
            Some((position, Value::Sequence(items))) => (
                Some(position),
                Some(items.into_iter().map(EventDeclaration::from).collect()),
            ),
            Some((_, other)) => {
                return Err(ShapeError(format!(
                    "'events' must be a list, got {}",
                    describe(&other)
                )))
            }
        };

        Ok(Self {
            events,
            rest,
            events_position,
        })
    }
}

impl From<FunctionDefinition> for Value {
    fn from(function: FunctionDefinition) -> Self {
        function.to_value()
    }
}

/// Root of a service description.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ServiceConfig {
    functions: Option<Vec<(String, FunctionDefinition)>>,
    rest: Mapping,
    functions_position: Option<usize>,
}

impl ServiceConfig {
    /// Parses YAML and resolves `<<` merge keys before typing the result.
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        let mut value: Value =
            serde_yaml::from_str(content).context("failed to parse service description")?;
        value
            .apply_merge()
            .context("failed to resolve YAML merge keys")?;
        let config = ServiceConfig::try_from(value).context("failed to parse service description")?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_yaml_string(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(&self.to_value()).context("failed to serialize service description")
    }

    /// JSON view for schema validation. YAML tags become single-key maps.
    pub fn to_json(&self) -> anyhow::Result<serde_json::Value> {
        serde_json::to_value(self.to_value()).context("service description is not JSON-compatible")
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.rest.value_at(&["provider", "name"])?.as_str()
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions().map(|(name, _)| name.to_string()).collect()
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, &FunctionDefinition)> {
        self.functions
            .iter()
            .flatten()
            .map(|(name, function)| (name.as_str(), function))
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions().find(|(n, _)| *n == name).map(|(_, f)| f)
    }

    pub fn function_mut(&mut self, name: &str) -> Option<&mut FunctionDefinition> {
        self.functions
            .iter_mut()
            .flatten()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    /// Adds or replaces a function, keeping the position of an existing one.
    pub fn insert_function(&mut self, name: impl Into<String>, function: FunctionDefinition) {
        let name = name.into();
        let functions = self.functions.get_or_insert_with(Vec::new);
        match functions.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = function,
            None => functions.push((name, function)),
        }
    }

    pub fn to_value(&self) -> Value {
        let functions = match &self.functions {
            Some(functions) => {
                let mut mapping = Mapping::with_capacity(functions.len());
                for (name, function) in functions {
                    mapping.insert(Value::String(name.clone()), function.to_value());
                }
                Some(Value::Mapping(mapping))
            }
            None => self.functions_position.map(|_| Value::Null),
        };
        Value::Mapping(lower(
            &self.rest,
            FUNCTIONS_KEY,
            self.functions_position,
            functions,
        ))
    }
}

impl ConfigSource for ServiceConfig {
    fn value_at(&self, path: &[&str]) -> Option<&Value> {
        self.rest.value_at(path)
    }
}

impl TryFrom<Value> for ServiceConfig {
    type Error = ShapeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mapping = match value {
            Value::Mapping(m) => m,
            Value::Null => Mapping::new(),
            other => {
                return Err(ShapeError(format!(
                    "service description must be a mapping, got {}",
                    describe(&other)
                )))
            }
        };

        let (rest, lifted) = lift(mapping, FUNCTIONS_KEY);
        let (functions_position, functions) = match lifted {
            None => (None, None),
            Some((position, Value::Null)) => (Some(position), None),
            Some((position, Value::Mapping(entries))) => {
                let mut functions = Vec::with_capacity(entries.len());
                for (name, body) in entries {
                    let name = match name {
                        Value::String(s) => s,
                        other => {
                            return Err(ShapeError(format!(
                                "function names must be strings, got {}",
                                describe(&other)
                            )))
                        }
                    };
                    let function = FunctionDefinition::try_from(body)
                        .map_err(|e| ShapeError(format!("function '{}': {}", name, e.0)))?;
                    functions.push((name, function));
                }
                (Some(position), Some(functions))
            }
            Some((_, other)) => {
                return Err(ShapeError(format!(
                    "'functions' must be a mapping, got {}",
                    describe(&other)
                )))
            }
        };

        Ok(Self {
            functions,
            rest,
            functions_position,
        })
    }
}

impl From<ServiceConfig> for Value {
    fn from(config: ServiceConfig) -> Self {
        config.to_value()
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
