//! `portal` command-line entry point.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use ortho_config::OrthoConfig;
use portal_client::PortalSettings;
use portal_client::inbound::cli::{Cli, CliError, connect, execute};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Nothing else can be reported if stderr itself is gone.
            drop(writeln!(io::stderr().lock(), "error: {}", err.render()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let settings = PortalSettings::load_from_iter([OsString::from("portal")]).map_err(|err| {
        CliError::Config {
            message: err.to_string(),
        }
    })?;
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| CliError::io("create Tokio runtime", &err))?;

    let portal = connect(&settings)?;
    let mut stdout = io::stdout().lock();
    runtime.block_on(execute(&portal, cli.command, &mut stdout))
}
