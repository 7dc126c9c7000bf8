use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Per-event switch that opts a single event out of default-authorizer injection.
pub const OPT_OUT_FLAG: &str = "globalAuthorizerEnabled";

const AUTHORIZER_KEY: &str = "authorizer";
const METHOD_KEY: &str = "method";
const PATH_KEY: &str = "path";

/// The two HTTP trigger kinds the pass cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApiKind {
    /// API Gateway REST API (`http` events).
    RestApi,
    /// API Gateway HTTP API (`httpApi` events).
    HttpApi,
}

impl ApiKind {
    pub const ALL: [ApiKind; 2] = [ApiKind::RestApi, ApiKind::HttpApi];

    /// Tag key of the event declaration.
    pub fn event_key(self) -> &'static str {
        match self {
            ApiKind::RestApi => "http",
            ApiKind::HttpApi => "httpApi",
        }
    }

    /// Key under `custom.globalAuthorizer`.
    pub fn config_key(self) -> &'static str {
        match self {
            ApiKind::RestApi => "restApi",
            ApiKind::HttpApi => "httpApi",
        }
    }

    /// Whether the bare `"*"` shorthand means "every method, every path".
    pub fn supports_catch_all(self) -> bool {
        matches!(self, ApiKind::HttpApi)
    }

    fn from_event_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event_key() == key)
    }
}

impl Display for ApiKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiKind::RestApi => write!(f, "REST API Gateway"),
            ApiKind::HttpApi => write!(f, "HTTP API Gateway"),
        }
    }
}

/// State of an event's `authorizer` key. Presence, not truthiness, decides.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthorizerSlot<'a> {
    Absent,
    /// Key present, with any value including `null` or `false`.
    Present(&'a Value),
}

impl AuthorizerSlot<'_> {
    pub fn is_present(&self) -> bool {
        matches!(self, AuthorizerSlot::Present(_))
    }
}

/// Structured form of an HTTP event. Keeps every key verbatim and in order;
/// typed accessors cover the keys the pass reads or writes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredHttpEvent {
    fields: Mapping,
}

impl StructuredHttpEvent {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let mut fields = Mapping::new();
        fields.insert(METHOD_KEY.into(), Value::String(method.into()));
        fields.insert(PATH_KEY.into(), Value::String(path.into()));
        Self { fields }
    }

    pub fn from_mapping(fields: Mapping) -> Self {
        Self { fields }
    }

    pub fn method(&self) -> Option<&str> {
        self.fields.get(METHOD_KEY).and_then(Value::as_str)
    }

    pub fn path(&self) -> Option<&str> {
        self.fields.get(PATH_KEY).and_then(Value::as_str)
    }

    pub fn authorizer(&self) -> AuthorizerSlot<'_> {
        match self.fields.get(AUTHORIZER_KEY) {
            Some(value) => AuthorizerSlot::Present(value),
            None => AuthorizerSlot::Absent,
        }
    }

    pub fn set_authorizer(&mut self, authorizer: Value) {
        self.fields.insert(AUTHORIZER_KEY.into(), authorizer);
    }

    /// Raw value of the opt-out flag, if the key is present. Not type-checked.
    pub fn opt_out_flag(&self) -> Option<&Value> {
        self.fields.get(OPT_OUT_FLAG)
    }

    pub fn fields(&self) -> &Mapping {
        &self.fields
    }
}

/// Payload of an HTTP-kind event.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpEvent {
    /// `"METHOD /path"`, or `"*"` on HTTP API events.
    Shorthand(String),
    Structured(StructuredHttpEvent),
}

impl HttpEvent {
    pub fn to_value(&self) -> Value {
        match self {
            HttpEvent::Shorthand(text) => Value::String(text.clone()),
            HttpEvent::Structured(event) => Value::Mapping(event.fields.clone()),
        }
    }
}

/// One entry of a function's `events` list.
///
/// Only single-key mappings tagged `http` or `httpApi` with a string or
/// mapping payload are typed; everything else is inert to the pass and kept
/// exactly as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum EventDeclaration {
    Http(HttpEvent),
    HttpApi(HttpEvent),
    Other(Value),
}

impl EventDeclaration {
    pub fn from_http(kind: ApiKind, event: HttpEvent) -> Self {
        match kind {
            ApiKind::RestApi => EventDeclaration::Http(event),
            ApiKind::HttpApi => EventDeclaration::HttpApi(event),
        }
    }

    pub fn kind(&self) -> Option<ApiKind> {
        self.http_event().map(|(kind, _)| kind)
    }

    pub fn http_event(&self) -> Option<(ApiKind, &HttpEvent)> {
        match self {
            EventDeclaration::Http(event) => Some((ApiKind::RestApi, event)),
            EventDeclaration::HttpApi(event) => Some((ApiKind::HttpApi, event)),
            EventDeclaration::Other(_) => None,
        }
    }

    pub fn to_value(&self) -> Value {
        match self.http_event() {
            Some((kind, event)) => {
                let mut tagged = Mapping::with_capacity(1);
                tagged.insert(kind.event_key().into(), event.to_value());
                Value::Mapping(tagged)
            }
            None => match self {
                EventDeclaration::Other(value) => value.clone(),
                _ => Value::Null,
            },
        }
    }
}

impl From<Value> for EventDeclaration {
    fn from(value: Value) -> Self {
        let tagged = match &value {
            Value::Mapping(m) if m.len() == 1 => m.iter().next().and_then(|(key, payload)| {
                let kind = ApiKind::from_event_key(key.as_str()?)?;
                let event = match payload {
                    Value::String(text) => HttpEvent::Shorthand(text.clone()),
                    Value::Mapping(fields) => {
                        HttpEvent::Structured(StructuredHttpEvent::from_mapping(fields.clone()))
                    }
                    _ => return None,
                };
                Some(EventDeclaration::from_http(kind, event))
            }),
            _ => None,
        };
        tagged.unwrap_or(EventDeclaration::Other(value))
    }
}

impl From<EventDeclaration> for Value {
    fn from(event: EventDeclaration) -> Self {
        match event {
            EventDeclaration::Other(value) => value,
            typed => typed.to_value(),
        }
    }
}
