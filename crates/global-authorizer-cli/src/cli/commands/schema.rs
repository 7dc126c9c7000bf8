use global_authorizer_core::{define_serverless_schema, ApiKind, SchemaRegistry, AWS_PROVIDER};
use serde_json::{json, Map, Value};

use crate::cli::args::{SchemaArgs, SchemaFormat};
use crate::exit_codes;

pub fn run(args: SchemaArgs) -> anyhow::Result<i32> {
    let mut registry = SchemaRegistry::new();
    define_serverless_schema(&mut registry)?;
    let doc = fragments_document(&registry);

    match args.format {
        SchemaFormat::Json => println!("{}", serde_json::to_string_pretty(&doc)?),
        SchemaFormat::Yaml => print!("{}", serde_yaml::to_string(&doc)?),
    }
    Ok(exit_codes::SUCCESS)
}

fn fragments_document(registry: &SchemaRegistry) -> Value {
    let mut events = Map::new();
    for kind in ApiKind::ALL {
        let event = kind.event_key();
        events.insert(
            event.to_string(),
            Value::Array(registry.event_fragments(AWS_PROVIDER, event).to_vec()),
        );
    }
    json!({
        "custom": registry.custom_fragments(),
        "functionEvents": { AWS_PROVIDER: events },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_fragment() {
        let mut registry = SchemaRegistry::new();
        define_serverless_schema(&mut registry).unwrap();
        let doc = fragments_document(&registry);

        assert_eq!(doc["custom"].as_array().map(Vec::len), Some(1));
        for event in ["http", "httpApi"] {
            assert_eq!(
                doc["functionEvents"]["aws"][event][0]["properties"]["globalAuthorizerEnabled"]
                    ["type"],
                "boolean"
            );
        }
    }
}
