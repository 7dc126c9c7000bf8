//! Default authorizer injection for HTTP-triggered functions.
//!
//! A service description declares one default authorizer per API kind under
//! `custom.globalAuthorizer`. This crate applies it to every `http` and
//! `httpApi` event that does not declare its own:
//!
//! - Schema fragments for the `custom` block and the per-event opt-out flag
//! - Default authorizer lookup
//! - Shorthand expansion (`GET /path`, `*`) and merge
//! - An in-memory host and the `initialize` lifecycle hook
//!
//! # Quick Start
//!
//! ```no_run
//! use global_authorizer_core::{process, ServiceConfig};
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = ServiceConfig::from_file("serverless.yml".as_ref())?;
//! let outcome = process(&config)?;
//! println!("{}", outcome.config.to_yaml_string()?);
//! # Ok(())
//! # }
//! ```
//!
//! # Opting out
//!
//! | Event setting | Result |
//! |---------------|--------|
//! | `authorizer: <anything>` (even `null`) | left as written |
//! | `globalAuthorizerEnabled: false` | left as written |
//! | `globalAuthorizerEnabled: true` or absent | default applied |
//! | `globalAuthorizerEnabled: <non-boolean>` | error |

pub mod errors;
pub mod host;
pub mod model;
pub mod normalizer;
pub mod resolver;
pub mod schema;

pub use errors::{GlobalAuthorizerError, GlobalAuthorizerResult, ERROR_TAG};
pub use host::{GlobalAuthorizerPlugin, LifecycleHook, LocalHost, ServiceHost, ValidationMode};
pub use model::{
    ApiKind, AuthorizerSlot, ConfigSource, EventDeclaration, FunctionDefinition, HttpEvent,
    ServiceConfig, ShapeError, StructuredHttpEvent, OPT_OUT_FLAG,
};
pub use normalizer::{process, AppliedAuthorizer, ProcessOutcome};
pub use resolver::{is_falsy, AuthorizerResolver, GlobalAuthorizerBlock};
pub use schema::{
    custom_properties_schema, define_serverless_schema, event_properties_schema,
    ConfigSchemaHandler, SchemaRegistry, AWS_PROVIDER,
};
