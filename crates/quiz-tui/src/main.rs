use clap::Parser;

mod client;
mod tui;

#[derive(Parser)]
#[command(name = "quiz")]
#[command(about = "Join a live quiz game", long_about = None)]
struct Cli {
    /// WebSocket server URL
    #[arg(short, long, default_value = "ws://127.0.0.1:8080")]
    server: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    println!("Connecting to {}...", cli.server);

    if let Err(e) = client::start_client(&cli.server).await {
        eprintln!("Error: {}", e);
    }
}
