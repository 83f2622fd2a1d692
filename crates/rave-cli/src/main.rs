use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rave::{ParamValue, Params, RaveClient, RaveConfig, VerifyTransaction};

/// Encrypt card payloads, compute integrity hashes and query the Rave API.
///
/// Keys come from RAVE_SECKEY / RAVE_PUBKEY (a `.env` file is honoured).
#[derive(Debug, Parser)]
#[command(name = "rave-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 3DES-24 encrypt a plaintext payload with the configured secret key.
    Encrypt { plaintext: String },
    /// Integrity hash of `name=value` pairs, concatenated in byte-wise name order.
    Checksum {
        #[arg(required = true, value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },
    /// List banks available for account charges.
    Banks,
    /// Verify a transaction by its processor reference.
    Verify { flw_ref: String },
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}

/// Plain integers become numbers; anything whose digits would not survive a
/// round trip (leading zeros, `+` signs) stays text.
fn param_value(raw: &str) -> ParamValue {
    match raw.parse::<i64>() {
        Ok(n) if n.to_string() == raw => ParamValue::Integer(n),
        _ => ParamValue::Text(raw.to_string()),
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), rave::RaveError> {
    let config = RaveConfig::from_env()?;
    tracing::debug!(?config, "loaded configuration");
    let client = RaveClient::new(config)?;

    match cli.command {
        Command::Encrypt { plaintext } => {
            println!("{}", client.encrypt_3des(&plaintext)?);
        }
        Command::Checksum { fields } => {
            let params: Params = fields
                .iter()
                .map(|(name, value)| (name.clone(), param_value(value)))
                .collect();
            println!("{}", client.checksum().generate_sorted(&params)?);
        }
        Command::Banks => {
            for bank in client.list_banks().await? {
                println!("{}\t{}", bank.bankcode, bank.bankname);
            }
        }
        Command::Verify { flw_ref } => {
            let resp = client
                .verify_transaction(&VerifyTransaction::new(flw_ref))
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }
    Ok(())
}
