use crate::args::Cli;
use crate::commands::dispatch::{DispatchConfig, dispatch, print_sentences};
use crate::shared::discovery::resolve_port;
use crate::shared::lock::PortLock;
use crate::shared::session::SystemPorts;
use crate::shared::signal::install_interrupt_flag;
use anyhow::Result;
use std::io;

// Public entrypoint: turn the selected intent into requests and run them against the receiver.
pub fn run_cli(cli: Cli) -> Result<()> {
    // Blank command lists are rejected here, before any device I/O.
    let requests = cli.requests()?;
    let mut out = io::stdout().lock();

    if cli.dry_run {
        print_sentences(&requests, &mut out)?;
        return Ok(());
    }

    let _lock = cli.lock_file.as_deref().map(PortLock::acquire).transpose()?;
    let running = install_interrupt_flag()?;
    let config = dispatch_config(&cli, resolve_port(cli.port.as_deref()));
    tracing::info!(
        port = %config.port_name,
        baud_rate = config.baud_rate,
        requests = requests.len(),
        "starting exchange"
    );

    let mut opener = SystemPorts {
        poll: config.settings.poll,
    };
    let completed = dispatch(&mut opener, &requests, &config, &running, &mut out)?;
    tracing::info!(completed, "all requests sent");
    Ok(())
}

fn dispatch_config(cli: &Cli, port_name: String) -> DispatchConfig {
    DispatchConfig {
        port_name,
        baud_rate: cli.baud_rate,
        settings: cli.exchange_settings(),
        policy: cli.failure_policy(),
    }
}
