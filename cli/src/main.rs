mod action;
mod config;
mod diagnostic;
mod housekeeping;
mod orchestrator;
mod path_utils;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ngs_setup_core::SetupError;

use crate::action::Action;
use crate::config::ConfigStore;
use crate::orchestrator::Orchestrator;
use crate::orchestrator::Outcome;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Version stamping, cleanup and bundled-tool acquisition for the NGS toolkit"
)]
struct Cli {
    /// Project root holding `VERSION.txt`, `setup.toml` and the utils package.
    #[arg(long, env = "NGS_SETUP_PROJECT_DIR")]
    project_dir: Option<PathBuf>,

    /// Project config file; defaults to `<project-dir>/setup.toml`.
    #[arg(long, env = "NGS_SETUP_CONFIG")]
    config: Option<PathBuf>,

    /// Log every fallback step (same as `debug = true` in the config).
    #[arg(long, short)]
    verbose: bool,

    /// Packaging command line; only the last token is acted on
    /// (`tag`, `publish`, `up`, `clean`, `manifest`, `install`, `develop`, `build`, `build_ext`).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("resolve current directory")?;
    let project_dir = match &cli.project_dir {
        Some(dir) => path_utils::resolve_in(&cwd, dir),
        None => cwd.clone(),
    };
    let store = match &cli.config {
        Some(path) => ConfigStore::new(path_utils::resolve_in(&cwd, path)),
        None => ConfigStore::for_project(&project_dir),
    };

    let mut config = store.load()?;
    config.debug |= cli.verbose;
    init_logging(config.debug);
    tracing::debug!("config from {}: {config:?}", store.path().display());

    let action = Action::from_last_token(cli.tokens.last().map(String::as_str));
    let orchestrator = Orchestrator::new(project_dir.clone(), config);
    match orchestrator.run(action) {
        Ok(Outcome::Installed { record, tools }) => {
            for (name, resolved) in &tools {
                println!(
                    "{name}: {} ({})",
                    path_utils::display_short(&resolved.path, Some(&project_dir)),
                    resolved.source
                );
            }
            tracing::info!("installed version {}", record.version);
            Ok(())
        }
        Ok(Outcome::Tagged(record)) => {
            tracing::info!("tagged version {}", record.version);
            Ok(())
        }
        Ok(Outcome::Cleaned(removed)) => {
            tracing::debug!("removed {} directories", removed.len());
            Ok(())
        }
        Ok(Outcome::Manifest(manifest)) => {
            let json = serde_json::to_string_pretty(&manifest).context("serialize manifest")?;
            println!("{json}");
            Ok(())
        }
        Ok(Outcome::PassedThrough(token)) => {
            tracing::info!("`{token}` is not handled here; nothing to do");
            Ok(())
        }
        Ok(Outcome::Published | Outcome::Updated) => Ok(()),
        Err(err) => {
            if let Some(setup_err) = err.downcast_ref::<SetupError>() {
                eprint!("{}", diagnostic::render_ansi(setup_err));
                std::process::exit(1);
            }
            Err(err)
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn last_token_selects_the_action() {
        let cli = Cli::try_parse_from(["ngs-setup", "sdist", "clean"]).expect("parse args");
        assert_eq!(
            Action::from_last_token(cli.tokens.last().map(String::as_str)),
            Action::Clean
        );
    }

    #[test]
    fn no_tokens_means_install() {
        let cli = Cli::try_parse_from(["ngs-setup"]).expect("parse args");
        assert!(cli.tokens.is_empty());
        assert_eq!(Action::from_last_token(None), Action::Install);
    }

    #[test]
    fn packaging_flags_after_the_first_token_are_kept_verbatim() {
        let cli = Cli::try_parse_from(["ngs-setup", "--verbose", "install", "--user"])
            .expect("parse args");
        assert!(cli.verbose);
        assert_eq!(cli.tokens, vec!["install", "--user"]);
        assert_eq!(
            Action::from_last_token(cli.tokens.last().map(String::as_str)),
            Action::PassThrough("--user".to_string())
        );
    }

    #[test]
    fn project_dir_flag_parses() {
        let cli = Cli::try_parse_from(["ngs-setup", "--project-dir", "~/proj", "tag"])
            .expect("parse args");
        assert_eq!(cli.project_dir, Some(PathBuf::from("~/proj")));
        assert_eq!(cli.tokens, vec!["tag"]);
    }
}
