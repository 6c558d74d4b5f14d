use clap::Parser;
use log::info;
use server::config::GameConfig;
use server::game::Game;
use server::network::Server;
use std::time::Duration;

/// Command line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Server IP address to bind to
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Server port to listen on
    #[clap(short, long, default_value = "8080")]
    port: u16,
    /// Milliseconds between game ticks
    #[clap(short, long, default_value = "100")]
    tick_ms: u64,
    /// Length of one game in seconds
    #[clap(short, long, default_value = "180")]
    duration_secs: u64,
    /// Seed for the cat brains
    #[clap(short, long)]
    seed: Option<u64>,
}

/// Main-method of the application.
/// Parses command-line arguments, then runs the server until Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=debug for detailed logging");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = GameConfig {
        seed: args.seed,
        ..GameConfig::with_timing(
            Duration::from_millis(args.tick_ms.max(1)),
            Duration::from_secs(args.duration_secs),
        )
    };
    let game = Game::new(config);

    let address = format!("{}:{}", args.host, args.port);
    let server = Server::bind(&address, game).await?;

    tokio::select! {
        result = server.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    }

    Ok(())
}
