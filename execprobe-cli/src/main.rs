mod app;
mod output;

use std::process;
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use strum::VariantNames;

use execprobe::{signal, Probe};

use crate::app::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::try_parse().unwrap_or_else(|err| {
        // clap exits 2 on bad arguments by default; this tool's contract is
        // 0 for --help/--version and 1 for everything invalid.
        let code = i32::from(err.use_stderr());
        let _ = err.print();
        process::exit(code);
    });

    // Show execprobe debug output on stderr with --verbose unless --json;
    // RUST_LOG overrides.
    if !cli.global.json {
        let level = if cli.global.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };
        env_logger::Builder::new()
            .filter_module("execprobe", level)
            .parse_default_env()
            .target(env_logger::Target::Stderr)
            .format_timestamp(None)
            .format_module_path(false)
            .format_target(false)
            .init();
    }

    let probe = Probe::from_str(&cli.mode).unwrap_or_else(|_| {
        eprintln!("error: unrecognized mode '{}'", cli.mode);
        eprintln!("valid modes: {}", Probe::VARIANTS.join(", "));
        process::exit(1);
    });

    // Trap the faults a denied probe produces; must be in place before the
    // jump.
    signal::install_fault_handlers().context("installing fault handlers")?;

    output::announce(probe, &cli.global)?;
    let returned = probe.run()?;
    output::report(probe, returned, &cli.global)?;
    Ok(())
}
