use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod aggregate;
mod cli;
mod config;
mod duration;
mod error;
mod ext;
mod jira;
mod model;
mod pagination;
mod processor;
mod render;
mod util;
mod window;

use crate::cli::{Cli, normalize};
use crate::config::JiraConfig;
use crate::jira::api::JiraHttpApi;

fn init_tracing(debug: bool) {
  let default = if debug { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  if cli.gen_man {
    let page = util::render_man_page::<Cli>()?;
    print!("{}", page);
    return Ok(());
  }

  // Phase 1: normalize CLI
  let cfg = normalize(cli)?;
  init_tracing(cfg.debug);

  // Phase 2: configuration and client
  let jira = JiraConfig::from_env().context("loading Jira configuration")?;
  let api = JiraHttpApi::new(&jira);

  // Phase 3: select, fetch, aggregate, render
  let now = util::effective_now(cfg.now);
  let out = processor::process(&api, &jira, &cfg, now)?;
  print!("{}", out);

  Ok(())
}
