//! Host integration: the surface a service framework exposes to the plugin,
//! an in-memory implementation of it, and the plugin lifecycle entry point.

use std::fmt::{self, Display};

use tracing::{info, warn};

use crate::errors::{GlobalAuthorizerError, GlobalAuthorizerResult};
use crate::model::{ConfigSource, EventDeclaration, ServiceConfig};
use crate::normalizer::{process_function_events, AppliedAuthorizer};
use crate::resolver::AuthorizerResolver;
use crate::schema::{define_serverless_schema, ConfigSchemaHandler, SchemaRegistry, AWS_PROVIDER};

/// What the plugin needs from the framework hosting it.
pub trait ServiceHost: ConfigSource {
    fn provider_name(&self) -> Option<&str>;

    /// Function names in declaration order.
    fn function_names(&self) -> Vec<String>;

    /// Events of `name`; empty when the function is unknown or has none.
    fn events_in_function(&self, name: &str) -> &[EventDeclaration];

    fn replace_events(&mut self, name: &str, events: Vec<EventDeclaration>);

    fn schema_handler(&mut self) -> &mut dyn ConfigSchemaHandler;
}

/// How schema violations are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationMode {
    /// Log violations and carry on.
    #[default]
    Warn,
    /// Fail with [`GlobalAuthorizerError::Schema`].
    Strict,
}

/// In-memory host over a loaded service description.
#[derive(Debug, Clone, Default)]
pub struct LocalHost {
    service: ServiceConfig,
    schema: SchemaRegistry,
}

impl LocalHost {
    pub fn new(service: ServiceConfig) -> Self {
        Self {
            service,
            schema: SchemaRegistry::new(),
        }
    }

    pub fn service(&self) -> &ServiceConfig {
        &self.service
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    pub fn into_service(self) -> ServiceConfig {
        self.service
    }

    /// Checks the description against every registered fragment and returns
    /// the violations found.
    pub fn validate_configuration(
        &self,
        mode: ValidationMode,
    ) -> GlobalAuthorizerResult<Vec<String>> {
        let config = match self.service.to_json() {
            Ok(config) => config,
            Err(e) => {
                let message = format!("{e:#}");
                return match mode {
                    ValidationMode::Warn => {
                        warn!(%message, "configuration cannot be schema-checked");
                        Ok(vec![message])
                    }
                    ValidationMode::Strict => Err(GlobalAuthorizerError::Schema { message }),
                };
            }
        };
        let provider = self.service.provider_name().unwrap_or(AWS_PROVIDER);
        let violations = self.schema.validate(&config, provider)?;

        if violations.is_empty() {
            return Ok(violations);
        }
        match mode {
            ValidationMode::Warn => {
                for violation in &violations {
                    warn!(%violation, "configuration schema violation");
                }
                Ok(violations)
            }
            ValidationMode::Strict => Err(GlobalAuthorizerError::Schema {
                message: violations.join("; "),
            }),
        }
    }
}

impl ConfigSource for LocalHost {
    fn value_at(&self, path: &[&str]) -> Option<&serde_yaml::Value> {
        self.service.value_at(path)
    }
}

impl ServiceHost for LocalHost {
    fn provider_name(&self) -> Option<&str> {
        self.service.provider_name()
    }

    fn function_names(&self) -> Vec<String> {
        self.service.function_names()
    }

    fn events_in_function(&self, name: &str) -> &[EventDeclaration] {
        self.service
            .function(name)
            .map(|f| f.events())
            .unwrap_or_default()
    }

    fn replace_events(&mut self, name: &str, events: Vec<EventDeclaration>) {
        match self.service.function_mut(name) {
            Some(function) => function.events = Some(events),
            None => warn!(function = name, "cannot replace events of unknown function"),
        }
    }

    fn schema_handler(&mut self) -> &mut dyn ConfigSchemaHandler {
        &mut self.schema
    }
}

/// Framework lifecycle points the plugin attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    Initialize,
}

impl LifecycleHook {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleHook::Initialize => "initialize",
        }
    }
}

impl Display for LifecycleHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The global authorizer plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalAuthorizerPlugin {
    _private: (),
}

impl GlobalAuthorizerPlugin {
    pub const NAME: &'static str = "serverless-global-authorizer";

    const HOOKS: &'static [LifecycleHook] = &[LifecycleHook::Initialize];

    /// Attaches to `host`. Only the `aws` provider is served; a description
    /// without a provider name is accepted. Registers the schema fragments.
    pub fn new<H: ServiceHost>(host: &mut H) -> GlobalAuthorizerResult<Self> {
        match host.provider_name() {
            None | Some(AWS_PROVIDER) => {}
            Some(other) => {
                return Err(GlobalAuthorizerError::UnsupportedProvider {
                    provider: other.to_string(),
                })
            }
        }
        define_serverless_schema(host.schema_handler())?;
        Ok(Self { _private: () })
    }

    pub fn hooks(&self) -> &'static [LifecycleHook] {
        Self::HOOKS
    }

    pub fn run_hook<H: ServiceHost>(
        &self,
        hook: LifecycleHook,
        host: &mut H,
    ) -> GlobalAuthorizerResult<Vec<AppliedAuthorizer>> {
        match hook {
            LifecycleHook::Initialize => self.initialize(host),
        }
    }

    /// Applies default authorizers across every function of `host`. Nothing
    /// is written back unless every function was processed successfully.
    pub fn initialize<H: ServiceHost>(
        &self,
        host: &mut H,
    ) -> GlobalAuthorizerResult<Vec<AppliedAuthorizer>> {
        let names = host.function_names();
        let mut patches = Vec::new();
        let mut applied = Vec::new();
        {
            let resolver = AuthorizerResolver::new(&*host);
            for name in &names {
                if let Some(outcome) =
                    process_function_events(name, host.events_in_function(name), &resolver)?
                {
                    applied.extend(outcome.applied);
                    patches.push((name.as_str(), outcome.events));
                }
            }
        }

        for (name, events) in patches {
            host.replace_events(name, events);
        }
        info!(
            functions = names.len(),
            applied = applied.len(),
            "global authorizer applied"
        );
        Ok(applied)
    }
}
