//! Fixture inspection commands

use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use certcheck_common::fixture::builtin;
use certcheck_common::Fixture;

use crate::commands::Context;
use crate::output::{self, TableDisplay};

#[derive(Subcommand)]
pub enum FixturesCommands {
    /// List the fixture for every environment that has one
    List,

    /// Show the expected certifications for one environment
    Show(ShowArgs),

    /// Parse and validate a fixture file
    Validate(ValidateArgs),
}

#[derive(Args)]
pub struct ShowArgs {
    /// Environment name, e.g. AIA-STAGE
    pub environment: String,
}

#[derive(Args)]
pub struct ValidateArgs {
    /// Path to a fixture YAML file
    #[arg(required = true)]
    pub path: PathBuf,
}

/// One row of `fixtures list`
#[derive(Debug, Serialize)]
pub struct FixtureInfo {
    pub environment: String,
    pub certifications: usize,
    pub source: String,
}

impl TableDisplay for FixtureInfo {
    fn headers() -> Vec<&'static str> {
        vec!["Environment", "Certifications", "Source"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.environment.clone(),
            self.certifications.to_string(),
            self.source.clone(),
        ]
    }
}

pub async fn execute(cmd: FixturesCommands, ctx: &Context) -> anyhow::Result<()> {
    match cmd {
        FixturesCommands::List => list(ctx),
        FixturesCommands::Show(args) => show(args, ctx),
        FixturesCommands::Validate(args) => validate(args),
    }
}

/// Fixtures from the directory win over the built-in ones
pub fn available(ctx: &Context) -> anyhow::Result<Vec<FixtureInfo>> {
    let (from_dir, dir_name) = match ctx.config.fixtures_dir().filter(|d| d.is_dir()) {
        Some(dir) => (Fixture::load_all(dir)?, dir.display().to_string()),
        None => (Vec::new(), String::new()),
    };

    let mut infos = Vec::new();
    for env in &ctx.config.environments {
        let found = from_dir
            .iter()
            .find(|f| f.environment.eq_ignore_ascii_case(&env.name))
            .map(|f| (f.clone(), dir_name.clone()))
            .or_else(|| builtin(&env.name).map(|f| (f, "built-in".to_string())));

        if let Some((fixture, source)) = found {
            infos.push(FixtureInfo {
                environment: env.name.clone(),
                certifications: fixture.certifications.len(),
                source,
            });
        }
    }
    Ok(infos)
}

fn list(ctx: &Context) -> anyhow::Result<()> {
    output::print_list(&available(ctx)?, ctx.format)
}

fn show(args: ShowArgs, ctx: &Context) -> anyhow::Result<()> {
    let env = ctx.config.environment(&args.environment)?;
    let fixture = Fixture::for_environment(ctx.config.fixtures_dir(), &env.name)?;
    output::print_list(&fixture.certifications, ctx.format)
}

fn validate(args: ValidateArgs) -> anyhow::Result<()> {
    match Fixture::from_file(&args.path) {
        Ok(fixture) => {
            output::print_success(&format!(
                "{}: {} certifications for {}",
                args.path.display(),
                fixture.certifications.len(),
                fixture.environment
            ));
            Ok(())
        }
        Err(e) => {
            output::print_error(&e.to_string());
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use certcheck_common::HarnessConfig;

    #[test]
    fn test_directory_fixture_overrides_builtin() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("aia.yaml"),
            "environment: AIA\ncertifications:\n  - title: X\n    subtitle: x\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("demo.yml"),
            "environment: DEMO\ncertifications:\n  - title: Y\n    subtitle: y\n  - title: Z\n    subtitle: z\n",
        )
        .unwrap();

        let ctx = Context {
            config: HarnessConfig::from_lookup("report", |_| None)
                .with_fixtures_dir(Some(dir.path().to_path_buf())),
            format: OutputFormat::Json,
        };
        let infos = available(&ctx).unwrap();
        let names: Vec<&str> = infos.iter().map(|i| i.environment.as_str()).collect();
        assert_eq!(names, vec!["DEMO", "AIA", "AIA-STAGE"]);
        assert_eq!(infos[0].certifications, 2);
        assert_eq!(infos[1].certifications, 1);
        assert_eq!(infos[2].source, "built-in");
    }
}
