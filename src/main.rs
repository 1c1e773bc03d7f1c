use clap::Parser;
use tracing_subscriber::EnvFilter;

use clinic_feasibility::api::{Cli, Command, run_command, run_http_server};

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Command::Serve(args) = &cli.command {
        if let Err(e) = run_http_server(args.port).await {
            tracing::error!(error = %e, "server error");
            std::process::exit(1);
        }
        return;
    }

    match run_command(&cli.command) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("clinic_feasibility=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
