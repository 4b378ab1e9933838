//! # tirik
//!
//! Command-line access to the Tirikchilik donation API.
//!
//! ## Usage
//!
//! ```bash
//! # Optional overrides
//! export TIRIK_BASE_URL=https://api.tirikchilik.uz
//! export TIRIK_PROJECT=my-project
//!
//! tirik resolve my-project
//! tirik pay --amount 50000 --card 8600123412341234 --expiry 2709 --donater Aziz
//! tirik status ecdd416a-1bba-4047-9ebb-808b24424487
//! ```

use clap::{Parser, Subcommand};
use tirik_client::{TirikClient, TirikConfig};
use tirik_core::{Card, DonationGateway, Envelope, PaymentRequest};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a project name to its donate id
    Resolve {
        name: String,
    },

    /// Create a card payment and print the upstream response
    Pay {
        #[arg(long, env = "TIRIK_PROJECT")]
        project: String,

        /// Amount in minor currency units
        #[arg(long)]
        amount: u64,

        #[arg(long)]
        card: String,

        /// Card expiry as printed on the card (e.g. 2709)
        #[arg(long)]
        expiry: String,

        #[arg(long)]
        donater: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Print the status of a payment
    Status {
        #[arg(long, env = "TIRIK_PROJECT")]
        project: String,

        pay_id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    let config = TirikConfig::from_env()?;
    info!("Using Tirikchilik API at {}", config.base_url);

    match cli.command {
        Command::Resolve { name } => {
            let client = TirikClient::connect_with(config, &name).await?;
            println!("{}", client.project_id());
        }
        Command::Pay {
            project,
            amount,
            card,
            expiry,
            donater,
            notes,
        } => {
            let client = TirikClient::connect_with(config, &project).await?;

            let mut request = PaymentRequest::new(amount, Card::new(card, expiry));
            if let Some(donater) = donater {
                request = request.with_donater(donater);
            }
            if let Some(notes) = notes {
                request = request.with_notes(notes);
            }

            print_envelope(&client.create_payment(&request).await?)?;
        }
        Command::Status { project, pay_id } => {
            let client = TirikClient::connect_with(config, &project).await?;
            print_status(&client, &pay_id).await?;
        }
    }

    Ok(())
}

async fn print_status(gateway: &dyn DonationGateway, pay_id: &str) -> anyhow::Result<()> {
    let envelope = gateway.get_payment_status(pay_id).await?;
    print_envelope(&envelope)
}

fn print_envelope(envelope: &Envelope) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(envelope.as_value())?);
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    // Logs go to stderr so stdout stays machine-readable.
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pay() {
        let cli = Cli::try_parse_from([
            "tirik", "pay", "--project", "acme", "--amount", "50000", "--card",
            "8600123412341234", "--expiry", "2709", "--notes", "thanks",
        ])
        .unwrap();

        match cli.command {
            Command::Pay {
                project,
                amount,
                donater,
                notes,
                ..
            } => {
                assert_eq!(project, "acme");
                assert_eq!(amount, 50000);
                assert!(donater.is_none());
                assert_eq!(notes.as_deref(), Some("thanks"));
            }
            _ => panic!("expected pay command"),
        }
    }

    #[test]
    fn test_parse_rejects_negative_amount() {
        let result = Cli::try_parse_from([
            "tirik", "pay", "--project", "acme", "--amount", "-5", "--card", "1", "--expiry", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_status() {
        let cli =
            Cli::try_parse_from(["tirik", "status", "--project", "acme", "ecdd416a"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Status { ref pay_id, .. } if pay_id == "ecdd416a"
        ));
    }
}
