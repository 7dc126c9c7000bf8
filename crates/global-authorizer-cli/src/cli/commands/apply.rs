use anyhow::Context;
use global_authorizer_core::{
    AppliedAuthorizer, GlobalAuthorizerPlugin, GlobalAuthorizerResult, LocalHost, ServiceConfig,
    ValidationMode,
};
use serde_json::json;

use crate::cli::args::{ApplyArgs, ReportFormat};
use crate::exit_codes;

pub fn run(args: ApplyArgs) -> anyhow::Result<i32> {
    let service = ServiceConfig::from_file(&args.config)?;
    let mut host = LocalHost::new(service);
    let mode = if args.strict {
        ValidationMode::Strict
    } else {
        ValidationMode::Warn
    };

    let applied = match apply(&mut host, mode) {
        Ok(applied) => applied,
        Err(e) => {
            eprintln!("{e}");
            return Ok(e.exit_code());
        }
    };

    if args.dry_run {
        println!("{}", render_report(&applied, args.format)?);
        return Ok(exit_codes::SUCCESS);
    }

    let yaml = host.into_service().to_yaml_string()?;
    let target = if args.in_place {
        Some(&args.config)
    } else {
        args.output.as_ref()
    };
    match target {
        Some(path) => {
            std::fs::write(path, yaml)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{}", render_report(&applied, args.format)?);
            eprintln!("Written to {}", path.display());
        }
        None => {
            print!("{yaml}");
            eprintln!("{}", render_report(&applied, args.format)?);
        }
    }
    Ok(exit_codes::SUCCESS)
}

/// Registers the plugin, validates, then runs every hook it serves.
fn apply(
    host: &mut LocalHost,
    mode: ValidationMode,
) -> GlobalAuthorizerResult<Vec<AppliedAuthorizer>> {
    let plugin = GlobalAuthorizerPlugin::new(host)?;
    host.validate_configuration(mode)?;

    let mut applied = Vec::new();
    for hook in plugin.hooks() {
        tracing::debug!(plugin = GlobalAuthorizerPlugin::NAME, %hook, "running hook");
        applied.extend(plugin.run_hook(*hook, host)?);
    }
    Ok(applied)
}

fn render_report(applied: &[AppliedAuthorizer], format: ReportFormat) -> anyhow::Result<String> {
    match format {
        ReportFormat::Json => {
            let doc = json!({
                "count": applied.len(),
                "applied": applied,
            });
            Ok(serde_json::to_string_pretty(&doc)?)
        }
        ReportFormat::Text => {
            if applied.is_empty() {
                return Ok("No events needed a default authorizer".to_string());
            }
            let mut lines = vec![format!(
                "Applied default authorizer to {} event{}:",
                applied.len(),
                if applied.len() != 1 { "s" } else { "" }
            )];
            for a in applied {
                lines.push(format!(
                    "  {}[{}] {}{}",
                    a.function,
                    a.index,
                    a.kind.event_key(),
                    if a.expanded_shorthand {
                        " (shorthand expanded)"
                    } else {
                        ""
                    }
                ));
            }
            Ok(lines.join("\n"))
        }
    }
}
