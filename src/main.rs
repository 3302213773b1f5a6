use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use finance_tools::cli::{Cli, Command, run_calculator};
use finance_tools::config::AppConfig;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,finance_tools=debug".into()),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing();

    if let Command::Serve(args) = &cli.command {
        let config = match AppConfig::new(args.host, args.port, args.tax_table.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Configuration error: {e}");
                std::process::exit(1);
            }
        };
        if let Err(e) = finance_tools::api::run_http_server(config).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    info!(command = ?cli.command, "running calculator");
    match run_calculator(&cli.command, cli.json) {
        Ok(output) => print!("{output}"),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
