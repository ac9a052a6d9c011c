mod cli;
mod commands;
mod config;
mod diagnostic;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() {
    let cli = cli::Cli::parse();
    init_tracing(&cli.global);
    let output = output::OutputContext::from_global(&cli.global);

    let result = config::load_config(cli.global.config.as_deref()).and_then(|config| {
        match cli.command {
            cli::Commands::Parse(args) => commands::parse::run(args, &config, &output),
            cli::Commands::Generate(args) => commands::generate::run(args, &config, &output),
            cli::Commands::Fmt(args) => commands::fmt::run(args, &config, &output),
            cli::Commands::Check(args) => commands::check::run(args, &config, &output),
            cli::Commands::Completions(args) => commands::completions::run(args),
        }
    });

    match result {
        Ok(()) => std::process::exit(error::ExitCode::Success as i32),
        Err(e) => {
            output.print_error(&e);
            std::process::exit(e.exit_code() as i32);
        }
    }
}

/// Logs go to stderr. `RUST_LOG` wins over the `-v`/`-q` default.
fn init_tracing(global: &cli::GlobalOpts) {
    let default = match (global.quiet, global.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!global.no_color)
                .with_target(false),
        )
        .init();
}
