//! Sharepad CLI - one shared text/image pad for your local network
//!
//! Run the server on one machine; every other device on the network reads
//! and writes the same text and image, from a browser or from this CLI.
//!
//! ## Quick Start
//!
//! ```bash
//! # Start the server
//! sharepad serve
//!
//! # From another terminal or machine
//! sharepad put "hello" --server 192.168.1.20:8080
//! sharepad get
//! ```

#![allow(clippy::doc_markdown)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

use anyhow::Result;
use clap::Parser;

mod commands;
pub mod ui;

use commands::{Cli, Command, Globals};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let globals = Globals::new(&cli);

    let result = match cli.command {
        Command::Serve(args) => commands::serve::run(args, &globals).await,
        Command::Get(args) => commands::get::run(args, &globals).await,
        Command::Put(args) => commands::put::run(args, &globals).await,
        Command::Paste => commands::clipboard::run_paste(&globals).await,
        Command::Copy(args) => commands::clipboard::run_copy(args, &globals).await,
        Command::Upload(args) => commands::upload::run(args, &globals).await,
        Command::Clear(args) => commands::clear::run(args, &globals).await,
        Command::Watch(args) => commands::watch::run(args, &globals).await,
        Command::Config(args) => commands::config::run(args.action, &globals),
        Command::Completions(args) => {
            commands::completions::generate_to_stdout(args.shell);
            Ok(())
        }
    };

    if let Err(e) = &result {
        if let Some(hint) = e
            .downcast_ref::<sharepad_core::Error>()
            .and_then(sharepad_core::Error::suggestion)
        {
            if !globals.quiet {
                eprintln!();
                for line in hint.lines() {
                    eprintln!("  {}", line);
                }
                eprintln!();
            }
        }
    }

    result
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default = match verbose {
        0 => "warn,sharepad=info,sharepad_core=info",
        1 => "warn,sharepad=debug,sharepad_core=debug",
        _ => "debug",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
