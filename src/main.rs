mod action;
mod cli_args;
mod comment;
mod config;
mod error;
mod event;
mod github;
mod llm;
mod logging;
mod output;
mod pr;
mod setup;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use crate::action::RunContext;
use crate::config::Config;
use crate::github::GitHubClient;
pub use cli_args::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match try_main(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    let cfg = Config::from_sources(cli)?;

    // Decide provider + model
    let setup = setup::build_llm_client(&cfg.provider_config())?;
    log::info!("Using {} with model {}", setup.provider, setup.model);

    let github = GitHubClient::new(&cfg.github_token, &cfg.api_url)?;

    let ctx = RunContext {
        repo: &cfg.repo,
        pr_number: cfg.pr_number,
        custom_prompt: &cfg.prompt,
        limits: setup.limits,
        dry_run: cfg.dry_run,
    };
    let instructions = action::run(&ctx, &github, &github, setup.client.as_ref())?;

    if let Some(path) = &cfg.output_file {
        output::set_output(path, "instructions", &instructions)?;
    }

    if cfg.dry_run || cfg.output_file.is_none() {
        println!("----- QA Instructions Preview -----");
        println!("{instructions}");
    }

    Ok(())
}
