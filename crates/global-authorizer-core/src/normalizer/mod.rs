//! Event normalization and default-authorizer merge.
//!
//! Per function, per event, in declaration order:
//!
//! 1. Non-HTTP events are left alone.
//! 2. An explicit `authorizer` key (any value, `null` included) wins.
//! 3. `globalAuthorizerEnabled: false` opts out; a non-boolean flag is an error.
//! 4. Shorthand strings are expanded into structured form.
//! 5. The resolved default authorizer is merged in.
//!
//! The first error aborts the pass. [`process`] is a pure transform: the
//! input configuration is never modified.

mod gate;
mod shorthand;

pub use gate::{opt_out_gate, Gate};
pub use shorthand::{parse_shorthand, ShorthandError, CATCH_ALL};

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{GlobalAuthorizerError, GlobalAuthorizerResult};
use crate::model::{
    ApiKind, EventDeclaration, HttpEvent, ServiceConfig, StructuredHttpEvent, OPT_OUT_FLAG,
};
use crate::resolver::AuthorizerResolver;

/// Record of one event that received the default authorizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedAuthorizer {
    pub function: String,
    /// Position in the function's `events` list.
    pub index: usize,
    pub kind: ApiKind,
    /// True when the event was rewritten from shorthand into structured form.
    pub expanded_shorthand: bool,
}

/// Rewritten events of one function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionOutcome {
    pub events: Vec<EventDeclaration>,
    pub applied: Vec<AppliedAuthorizer>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub config: ServiceConfig,
    pub applied: Vec<AppliedAuthorizer>,
}

impl ProcessOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Runs the pass over every function and returns the transformed configuration.
pub fn process(config: &ServiceConfig) -> GlobalAuthorizerResult<ProcessOutcome> {
    let resolver = AuthorizerResolver::new(config);
    let mut out = config.clone();
    let mut applied = Vec::new();

    for (name, function) in config.functions() {
        if let Some(outcome) = process_function_events(name, function.events(), &resolver)? {
            if let Some(target) = out.function_mut(name) {
                target.events = Some(outcome.events);
            }
            applied.extend(outcome.applied);
        }
    }

    info!(
        functions = config.function_names().len(),
        applied = applied.len(),
        "global authorizer pass complete"
    );
    Ok(ProcessOutcome {
        config: out,
        applied,
    })
}

/// Runs the pass over one function's events. `None` means nothing changed.
pub fn process_function_events(
    function: &str,
    events: &[EventDeclaration],
    resolver: &AuthorizerResolver<'_>,
) -> GlobalAuthorizerResult<Option<FunctionOutcome>> {
    let mut rewritten: Option<Vec<EventDeclaration>> = None;
    let mut applied = Vec::new();

    for (index, event) in events.iter().enumerate() {
        if let Some(replacement) = process_event(function, event, resolver)? {
            if let Some((kind, _)) = replacement.http_event() {
                applied.push(AppliedAuthorizer {
                    function: function.to_string(),
                    index,
                    kind,
                    expanded_shorthand: matches!(
                        event.http_event(),
                        Some((_, HttpEvent::Shorthand(_)))
                    ),
                });
            }
            rewritten.get_or_insert_with(|| events.to_vec())[index] = replacement;
        }
    }

    Ok(rewritten.map(|events| FunctionOutcome { events, applied }))
}

/// Decides one event. Returns the replacement declaration, or `None` when the
/// event stays as written.
pub fn process_event(
    function: &str,
    event: &EventDeclaration,
    resolver: &AuthorizerResolver<'_>,
) -> GlobalAuthorizerResult<Option<EventDeclaration>> {
    let Some((kind, http)) = event.http_event() else {
        return Ok(None);
    };

    let mut structured = match http {
        HttpEvent::Structured(structured) => {
            if structured.authorizer().is_present() {
                debug!(function, kind = %kind, "explicit authorizer present, skipping");
                return Ok(None);
            }
            let gate = opt_out_gate(structured.opt_out_flag()).map_err(|value| {
                GlobalAuthorizerError::InvalidFlagType {
                    function: function.to_string(),
                    flag: OPT_OUT_FLAG,
                    value,
                }
            })?;
            if gate == Gate::Closed {
                debug!(function, kind = %kind, "opted out of global authorizer");
                return Ok(None);
            }
            structured.clone()
        }
        HttpEvent::Shorthand(text) => {
            let (method, path) = parse_shorthand(kind, text).map_err(|e| {
                GlobalAuthorizerError::InvalidEventSyntax {
                    function: function.to_string(),
                    event: kind.event_key(),
                    value: text.clone(),
                    reason: e.reason().to_string(),
                }
            })?;
            StructuredHttpEvent::new(method, path)
        }
    };

    let authorizer = resolver.resolve(kind)?;
    structured.set_authorizer(authorizer);
    debug!(function, kind = %kind, "default authorizer applied");
    Ok(Some(EventDeclaration::from_http(
        kind,
        HttpEvent::Structured(structured),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::{Mapping, Value};

    fn config(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn event(yaml: &str) -> EventDeclaration {
        serde_yaml::from_str(yaml).unwrap()
    }

    const BOTH: &str = r#"
custom:
  globalAuthorizer:
    restApi:
      authorizer: aws_iam
    httpApi:
      authorizer:
        type: jwt
"#;

    #[test]
    fn shorthand_becomes_structured() {
        let source = config(BOTH);
        let resolver = AuthorizerResolver::new(&source);

        let out = process_event("f", &event("http: GET /path1"), &resolver)
            .unwrap()
            .unwrap();
        assert_eq!(out, event("http:\n  method: GET\n  path: /path1\n  authorizer: aws_iam"));

        let out = process_event("f", &event("httpApi: '*'"), &resolver)
            .unwrap()
            .unwrap();
        assert_eq!(
            out,
            event("httpApi:\n  method: '*'\n  path: '*'\n  authorizer:\n    type: jwt")
        );
    }

    #[test]
    fn skips_explicit_opted_out_and_other_events() {
        let source = config(BOTH);
        let resolver = AuthorizerResolver::new(&source);
        for yaml in [
            "http:\n  path: /open\n  method: get\n  authorizer: null",
            "httpApi:\n  path: /open\n  method: get\n  authorizer:\n    type: aws_iam",
            "http:\n  path: /a\n  method: get\n  globalAuthorizerEnabled: false",
            "sqs:\n  arn: arn:aws:sqs",
        ] {
            assert_eq!(process_event("f", &event(yaml), &resolver).unwrap(), None, "{yaml}");
        }
    }

    #[test]
    fn explicit_enable_still_applies() {
        let source = config(BOTH);
        let resolver = AuthorizerResolver::new(&source);
        let out = process_event(
            "f",
            &event("http:\n  path: /a\n  method: get\n  globalAuthorizerEnabled: true"),
            &resolver,
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            out,
            event("http:\n  path: /a\n  method: get\n  globalAuthorizerEnabled: true\n  authorizer: aws_iam")
        );
    }

    #[test]
    fn errors_carry_context() {
        let source = config(BOTH);
        let resolver = AuthorizerResolver::new(&source);

        let err = process_event("orders", &event("http: GET"), &resolver).unwrap_err();
        assert!(matches!(
            err,
            GlobalAuthorizerError::InvalidEventSyntax { ref function, event: "http", ref value, .. }
                if function == "orders" && value == "GET"
        ));

        let err = process_event(
            "orders",
            &event("httpApi:\n  path: /a\n  globalAuthorizerEnabled: invalid"),
            &resolver,
        )
        .unwrap_err();
        assert_eq!(
            err,
            GlobalAuthorizerError::InvalidFlagType {
                function: "orders".into(),
                flag: OPT_OUT_FLAG,
                value: Value::String("invalid".into()),
            }
        );
    }

    #[test]
    fn function_outcome_tracks_only_changed_events() {
        let source = config(BOTH);
        let resolver = AuthorizerResolver::new(&source);
        let events = vec![
            event("sqs:\n  arn: arn:aws:sqs"),
            event("http: POST /orders"),
            event("httpApi:\n  path: /b\n  method: get\n  authorizer: null"),
            event("httpApi:\n  path: /c\n  method: get"),
        ];
        let outcome = process_function_events("f", &events, &resolver)
            .unwrap()
            .unwrap();
        assert_eq!(outcome.events.len(), 4);
        assert_eq!(outcome.events[0], events[0]);
        assert_eq!(outcome.events[2], events[2]);
        assert_eq!(
            outcome.applied,
            vec![
                AppliedAuthorizer {
                    function: "f".into(),
                    index: 1,
                    kind: ApiKind::RestApi,
                    expanded_shorthand: true,
                },
                AppliedAuthorizer {
                    function: "f".into(),
                    index: 3,
                    kind: ApiKind::HttpApi,
                    expanded_shorthand: false,
                },
            ]
        );

        assert_eq!(
            process_function_events("f", &events[..1], &resolver).unwrap(),
            None
        );
    }
}
