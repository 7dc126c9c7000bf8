use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "global-authorizer",
    version,
    about = "Apply a default authorizer to every HTTP event of a serverless service"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Apply the configured default authorizers and write the result
    Apply(ApplyArgs),
    /// Check the service description against the registered schema fragments
    Validate(ValidateArgs),
    /// Print the schema fragments the plugin registers
    Schema(SchemaArgs),
    Version,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemaFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Parser, Debug, Clone)]
pub struct ApplyArgs {
    /// Service description (YAML or JSON)
    #[arg(long, env = "GLOBAL_AUTHORIZER_CONFIG", default_value = "serverless.yml")]
    pub config: PathBuf,

    /// Write the result here instead of stdout
    #[arg(short, long, conflicts_with = "in_place")]
    pub output: Option<PathBuf>,

    /// Overwrite the input file
    #[arg(long)]
    pub in_place: bool,

    /// Report what would change without writing the description
    #[arg(long)]
    pub dry_run: bool,

    /// Treat schema violations as errors instead of warnings
    #[arg(long, env = "GLOBAL_AUTHORIZER_STRICT")]
    pub strict: bool,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    #[arg(long, env = "GLOBAL_AUTHORIZER_CONFIG", default_value = "serverless.yml")]
    pub config: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    #[arg(long, value_enum, default_value_t = SchemaFormat::Json)]
    pub format: SchemaFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_defaults() {
        let cli = Cli::try_parse_from(["global-authorizer", "apply"]).unwrap();
        let Command::Apply(args) = cli.cmd else {
            panic!("expected apply");
        };
        assert_eq!(args.config, PathBuf::from("serverless.yml"));
        assert!(!args.in_place && !args.dry_run);
        assert_eq!(args.format, ReportFormat::Text);
    }

    #[test]
    fn output_conflicts_with_in_place() {
        let res = Cli::try_parse_from([
            "global-authorizer",
            "apply",
            "--in-place",
            "--output",
            "out.yml",
        ]);
        assert!(res.is_err());
    }
}
