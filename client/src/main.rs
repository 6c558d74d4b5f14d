use clap::Parser;
use client::game::ClientGame;
use client::input::WanderInput;
use client::network::ServerConnection;
use log::{info, warn};
use shared::PlayfieldMap;
use std::time::{Duration, Instant};
use tokio::time::{interval, MissedTickBehavior};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server WebSocket URL to connect to
    #[arg(short = 's', long, default_value = "ws://127.0.0.1:8080")]
    server: String,

    /// Frames per second of the local loop
    #[arg(short = 'f', long, default_value = "60")]
    fps: u32,

    /// Seed for the wandering bot
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=debug for detailed logging");
    }
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    info!("Starting client...");
    info!("Connecting to: {}", args.server);

    let mut connection = ServerConnection::open(&args.server).await?;
    let id = connection.wait_for_connection().await?;

    let mut game = ClientGame::new(PlayfieldMap::default());
    game.connected(id);

    let mut input = WanderInput::new(args.seed);
    let mut frames = interval(Duration::from_secs_f64(1.0 / f64::from(args.fps.max(1))));
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = frames.tick() => {
                let now = Instant::now();
                let elapsed_ms = now.duration_since(last_frame).as_secs_f32() * 1000.0;
                last_frame = now;

                for event in connection.begin_frame() {
                    game.apply_event(event);
                }

                game.frame(elapsed_ms, input.next_direction());
                if input.wants_tunnel_toggle() && game.toggle_tunnel() {
                    if let Some(color) = game.tunnel().map(str::to_string) {
                        game.cast_vote(&color);
                    }
                }

                if let Some(message) = game.player_message() {
                    connection.send(&message);
                }
                connection.end_frame();

                if game.phase().is_final() {
                    info!("Game finished: {:?}", game.phase());
                    break;
                }
                if connection.is_closed() {
                    warn!("Server closed the connection");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(message) = game.quit() {
                    connection.send(&message);
                    connection.end_frame();
                }
                info!("Received Ctrl+C, quitting");
                break;
            }
        }
    }

    Ok(())
}
