use global_authorizer_core::{GlobalAuthorizerPlugin, LocalHost, ServiceConfig, ValidationMode};
use serde_json::json;

use crate::cli::args::{ReportFormat, ValidateArgs};
use crate::exit_codes;

pub fn run(args: ValidateArgs) -> anyhow::Result<i32> {
    let service = ServiceConfig::from_file(&args.config)?;
    let mut host = LocalHost::new(service);

    let violations = match GlobalAuthorizerPlugin::new(&mut host)
        .and_then(|_| host.validate_configuration(ValidationMode::Warn))
    {
        Ok(violations) => violations,
        Err(e) => {
            eprintln!("{e}");
            return Ok(e.exit_code());
        }
    };

    let exit_code = if violations.is_empty() {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    };

    match args.format {
        ReportFormat::Json => {
            let doc = json!({
                "file": args.config,
                "valid": violations.is_empty(),
                "violations": violations,
                "exit_code": exit_code,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        ReportFormat::Text => {
            if violations.is_empty() {
                eprintln!("✔ Validation OK");
            } else {
                eprintln!(
                    "✖ Validation failed ({} violation{})",
                    violations.len(),
                    if violations.len() != 1 { "s" } else { "" }
                );
                for v in &violations {
                    eprintln!("  - {v}");
                }
            }
        }
    }

    Ok(exit_code)
}
