use clap::Parser;
use log::{error, info};
use server::config::GameConfig;
use server::network::{Server, ServerMessage};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// Board width in squares
    #[arg(long, default_value = "10")]
    width: i32,

    /// Board height in squares
    #[arg(long, default_value = "10")]
    height: i32,

    /// Starting hit points of every ship
    #[arg(long, default_value = "10")]
    hp: i32,

    /// Damage dealt by one attack
    #[arg(short, long, default_value = "3")]
    damage: i32,

    /// How many squares a ship may move per turn
    #[arg(short, long, default_value = "1")]
    range: i32,

    /// Ship names every player starts with
    #[arg(short, long, value_delimiter = ',', default_value = "Scout,Frigate,Cruiser")]
    fleet: Vec<String>,

    /// Computer players are added until a game has this many players
    #[arg(long, default_value = "2")]
    min_players: usize,

    /// Maximum number of connected clients
    #[arg(short, long, default_value = "4")]
    max_clients: usize,

    /// Seed for computer decisions, random if unset
    #[arg(long)]
    seed: Option<u64>,

    /// Seconds of silence before a client is dropped
    #[arg(long, default_value = "300")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let bind_addr = format!("{}:{}", args.host, args.port);

    let config = GameConfig {
        board_width: args.width,
        board_height: args.height,
        starting_hp: args.hp,
        damage: args.damage,
        movement_range: args.range,
        fleet: args.fleet,
        min_players: args.min_players,
        max_players: args.max_clients.max(args.min_players),
        seed: args.seed,
    };

    info!("Starting server on {}", bind_addr);
    info!(
        "Board {}x{}, fleet {:?}, {} hp, {} damage",
        config.board_width, config.board_height, config.fleet, config.starting_hp, config.damage
    );

    let mut server = Server::new(&bind_addr, config, args.max_clients)
        .await?
        .with_client_timeout(Duration::from_secs(args.timeout_secs));

    let shutdown = server.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down");
            if let Err(e) = shutdown.send(ServerMessage::Shutdown) {
                error!("Failed to signal shutdown: {}", e);
            }
        }
    });

    server.run().await?;

    Ok(())
}
