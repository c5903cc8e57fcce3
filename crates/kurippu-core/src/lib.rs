pub mod app;
pub mod cli;
pub mod clock;
pub mod commands;
pub mod config;
pub mod datastore;
pub mod form;
pub mod i18n;
pub mod list_view;
pub mod persist;
pub mod render;
pub mod shell;
pub mod store;
pub mod task;

use std::ffi::OsString;
use std::io;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let pre =
    cli::preprocess_args(&raw_args)?;
  let cli = cli::GlobalCli::parse_from(
    pre.cleaned_args
  );

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting kurippu"
  );
  debug!(?pre.rc_overrides, "preprocessed rc overrides");

  let mut cfg = config::Config::load(
    cli.rcfile.as_deref()
  )?;
  cfg.apply_overrides(
    pre.rc_overrides.into_iter().chain(
      cli
        .rc_overrides
        .into_iter()
        .map(|kv| (kv.key, kv.value))
    )
  );

  let data_dir =
    config::resolve_data_dir(
      &cfg,
      cli.data.as_deref()
    )
    .context(
      "failed to resolve data \
       directory"
    )?;

  let storage =
    datastore::FileStore::open(
      &data_dir
    )
    .with_context(|| {
      format!(
        "failed to open datastore at \
         {}",
        data_dir.display()
      )
    })?;

  let options =
    app::AppOptions::from_config(&cfg)?;
  let mut todo = app::TodoApp::open(
    storage,
    clock::SystemClock,
    options
  )
  .with_context(|| {
    format!(
      "failed to load tasks from {}",
      data_dir.display()
    )
  })?;

  let renderer =
    render::Renderer::new(&cfg);
  let inv = cli::Invocation::parse(
    &cfg, cli.rest
  )?;

  let stdin = io::stdin();
  let stdout = io::stdout();
  commands::dispatch(
    &mut todo,
    &renderer,
    inv,
    &mut stdin.lock(),
    &mut stdout.lock()
  )?;

  info!("done");
  Ok(())
}
