use clap::{Parser, Subcommand};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use uuid::Uuid;

use nexus_bridge::protocol::messages::unix_millis;
use nexus_bridge::protocol::{ClientRequest, ClientResponse};

#[derive(Parser)]
#[command(name = "bridge-cli")]
#[command(about = "Send validation requests to a running nexus-bridge", long_about = None)]
struct Cli {
    /// Client-facing socket of the bridge.
    #[arg(short, long, default_value = "/tmp/xyron-go.sock")]
    socket: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one validation request and print the response
    Validate {
        /// Wallet or node identifier
        #[arg(short, long)]
        wallet: String,
        /// Optional message to attach
        #[arg(short, long)]
        message: Option<String>,
        /// Correlation id (generated when omitted)
        #[arg(short, long)]
        tx_id: Option<String>,
    },
    /// Fire several validations at once and summarize the outcomes
    Burst {
        /// Number of concurrent requests
        #[arg(short, long, default_value_t = 8)]
        count: usize,
        /// Wallet or node identifier
        #[arg(short, long, default_value = "burst-wallet")]
        wallet: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { wallet, message, tx_id } => {
            let request = ClientRequest {
                wallet_id: wallet,
                message,
                tx_id: tx_id.unwrap_or_else(new_tx_id),
            };
            let response = send(&cli.socket, &request).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Burst { count, wallet } => {
            let started = std::time::Instant::now();
            let mut tasks = Vec::with_capacity(count);
            for i in 0..count {
                let socket = cli.socket.clone();
                let request = ClientRequest {
                    wallet_id: wallet.clone(),
                    message: Some(format!("burst message {}", i)),
                    tx_id: new_tx_id(),
                };
                tasks.push(tokio::spawn(async move {
                    let sent = std::time::Instant::now();
                    let result = send(&socket, &request).await.map_err(|e| e.to_string());
                    (result, sent.elapsed())
                }));
            }

            let (mut succeeded, mut failed, mut unreachable) = (0usize, 0usize, 0usize);
            for task in tasks {
                let (result, elapsed) = task.await?;
                match result {
                    Ok(resp) if resp.is_success() => succeeded += 1,
                    Ok(_) => failed += 1,
                    Err(e) => {
                        unreachable += 1;
                        eprintln!("Request failed: {}", e);
                    }
                }
                println!("{:>8.1} ms", elapsed.as_secs_f64() * 1000.0);
            }

            println!(
                "{} requests in {:.1} ms: {} success, {} error, {} transport failures",
                count,
                started.elapsed().as_secs_f64() * 1000.0,
                succeeded,
                failed,
                unreachable
            );
        }
    }

    Ok(())
}

fn new_tx_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("tx_{}_{}", unix_millis(), &suffix[..8])
}

async fn send(
    socket: &str,
    request: &ClientRequest,
) -> Result<ClientResponse, Box<dyn std::error::Error + Send + Sync>> {
    let mut stream = UnixStream::connect(socket).await?;
    stream.write_all(&serde_json::to_vec(request)?).await?;

    // The bridge closes the connection after its single response.
    let mut body = Vec::new();
    stream.read_to_end(&mut body).await?;
    Ok(serde_json::from_slice(&body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tx_id_shape() {
        let id = new_tx_id();
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "tx");
        assert!(parts[1].parse::<i64>().unwrap() > 0);
        assert_eq!(parts[2].len(), 8);
        assert_ne!(new_tx_id(), id);
    }

    #[test]
    fn test_validate_args_parse() {
        let cli = Cli::try_parse_from(["bridge-cli", "validate", "--wallet", "w1", "-m", "hi"]).unwrap();
        assert_eq!(cli.socket, "/tmp/xyron-go.sock");
        match cli.command {
            Commands::Validate { wallet, message, tx_id } => {
                assert_eq!(wallet, "w1");
                assert_eq!(message.as_deref(), Some("hi"));
                assert!(tx_id.is_none());
            }
            Commands::Burst { .. } => panic!("expected validate"),
        }
    }
}
