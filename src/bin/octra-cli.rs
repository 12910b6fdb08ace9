use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use octra_wallet::config::{default_config, load_config, WalletConfig};
use octra_wallet::ledger::{
    get_history, get_stats, prepare_transfer, submit_and_confirm, ConfirmationWaiter, HttpGateway,
    LedgerGateway,
};
use octra_wallet::lifecycle::Cancellation;
use octra_wallet::observability::init_logging;
use octra_wallet::wallet::amount::to_atoms;
use octra_wallet::wallet::{Address, KeyMaterial, KeystoreRecord};

/// Environment variable holding the keystore password.
const PASSWORD_ENV_VAR: &str = "OCTRA_KEYSTORE_PASSWORD";

#[derive(Parser)]
#[command(name = "octra-cli")]
#[command(about = "Octra wallet: keys, keystores and transfers", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Keystore file to sign with instead of OCTRA_PRIVATE_KEY
    #[arg(short, long, global = true)]
    keystore: Option<PathBuf>,

    /// Keystore password (falls back to OCTRA_KEYSTORE_PASSWORD)
    #[arg(short, long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new key; writes a keystore when --keystore is given
    Keygen,
    /// Seal the OCTRA_PRIVATE_KEY seed into the --keystore file
    Encrypt,
    /// Open the --keystore file and show its address
    Decrypt {
        /// Also print the base64 seed
        #[arg(long)]
        show_seed: bool,
    },
    /// Show balance and nonce
    Balance {
        /// Address to query (defaults to the signing key's)
        address: Option<String>,
    },
    /// Sign and submit a transfer
    Send {
        /// Recipient address
        to: String,
        /// Amount in display units, e.g. 1.25
        amount: f64,
        /// Unsigned memo attached to the submission
        #[arg(short, long)]
        message: Option<String>,
        /// Return after submission without waiting for confirmation
        #[arg(long)]
        no_wait: bool,
    },
    /// List recent transactions
    History {
        address: Option<String>,
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
    /// Incoming/outgoing totals over recent history
    Stats { address: Option<String> },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => default_config()?,
    };
    init_logging(&config.observability.log_level);

    match &cli.command {
        Commands::Keygen => keygen(&cli)?,
        Commands::Encrypt => {
            let path = require_keystore_path(&cli)?;
            let keys = KeyMaterial::from_env()?;
            let record = KeystoreRecord::encrypt(&keys, &password(&cli)?)?;
            record.save(path)?;
            print_json(&json!({ "address": keys.address(), "keystore": path.display().to_string() }))?;
        }
        Commands::Decrypt { show_seed } => {
            let keys = open_keystore(require_keystore_path(&cli)?, &cli)?;
            let mut out = json!({
                "address": keys.address(),
                "public_key": keys.public_key_base64(),
            });
            if *show_seed {
                out["private_key"] = Value::from(keys.export_seed_base64().as_str());
            }
            print_json(&out)?;
        }
        Commands::Balance { address } => {
            let gateway = HttpGateway::new(&config.node)?;
            let address = resolve_address(address.as_deref(), &cli)?;
            let info = gateway.get_balance(address.as_str()).await?;
            print_json(&serde_json::to_value(&info)?)?;
        }
        Commands::Send {
            to,
            amount,
            message,
            no_wait,
        } => {
            let keys = signing_keys(&cli)?;
            let to = Address::parse(to)?;
            let amount_atoms = to_atoms(*amount)?;
            send(&config, &keys, to, amount_atoms, message.clone(), *no_wait).await?;
        }
        Commands::History { address, limit } => {
            let gateway = HttpGateway::new(&config.node)?;
            let address = resolve_address(address.as_deref(), &cli)?;
            let history = get_history(&gateway, address.as_str(), *limit).await?;
            print_json(&serde_json::to_value(&history)?)?;
        }
        Commands::Stats { address } => {
            let gateway = HttpGateway::new(&config.node)?;
            let address = resolve_address(address.as_deref(), &cli)?;
            let stats = get_stats(&gateway, address.as_str()).await?;
            print_json(&json!({
                "address": address,
                "total_in": stats.total_in.to_string(),
                "total_out": stats.total_out.to_string(),
                "tx_count": stats.tx_count,
            }))?;
        }
    }

    Ok(())
}

fn keygen(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let keys = KeyMaterial::generate()?;
    let mut out = json!({
        "address": keys.address(),
        "public_key": keys.public_key_base64(),
    });

    match &cli.keystore {
        Some(path) => {
            KeystoreRecord::encrypt(&keys, &password(cli)?)?.save(path)?;
            out["keystore"] = Value::from(path.display().to_string());
        }
        None => {
            out["private_key"] = Value::from(keys.export_seed_base64().as_str());
        }
    }

    print_json(&out)
}

async fn send(
    config: &WalletConfig,
    keys: &KeyMaterial,
    to: Address,
    amount_atoms: u64,
    message: Option<String>,
    no_wait: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = HttpGateway::new(&config.node)?;
    let signed = prepare_transfer(&gateway, keys, to, amount_atoms, message).await?;

    if no_wait {
        let receipt = gateway.submit(&signed.broadcast_form()).await?;
        return print_json(&json!({ "tx_hash": receipt.tx_hash, "status": "submitted" }));
    }

    let cancellation = Arc::new(Cancellation::new());
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, abandoning confirmation wait");
            on_interrupt.cancel();
        }
    });

    let waiter = ConfirmationWaiter::from_config(gateway.clone(), &config.confirmation);
    let outcome = submit_and_confirm(
        &gateway,
        &signed,
        &waiter,
        config.confirmation.timeout(),
        &cancellation.token(),
    )
    .await?;

    print_json(&json!({
        "tx_hash": outcome.receipt.tx_hash,
        "status": outcome.record.status.as_deref().unwrap_or("confirmed"),
        "epoch": outcome.record.epoch_number(),
    }))
}

fn password(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    if let Some(password) = &cli.password {
        return Ok(password.clone());
    }
    std::env::var(PASSWORD_ENV_VAR)
        .map_err(|_| format!("keystore password required: pass --password or set {}", PASSWORD_ENV_VAR).into())
}

fn require_keystore_path(cli: &Cli) -> Result<&Path, Box<dyn std::error::Error>> {
    cli.keystore
        .as_deref()
        .ok_or_else(|| "--keystore <path> is required for this command".into())
}

fn open_keystore(path: &Path, cli: &Cli) -> Result<KeyMaterial, Box<dyn std::error::Error>> {
    let record = KeystoreRecord::load(path)?;
    Ok(record.decrypt(&password(cli)?)?)
}

/// Keystore when given, else the environment seed.
fn signing_keys(cli: &Cli) -> Result<KeyMaterial, Box<dyn std::error::Error>> {
    match &cli.keystore {
        Some(path) => open_keystore(path, cli),
        None => Ok(KeyMaterial::from_env()?),
    }
}

fn resolve_address(explicit: Option<&str>, cli: &Cli) -> Result<Address, Box<dyn std::error::Error>> {
    match explicit {
        Some(text) => Ok(Address::parse(text)?),
        None => match &cli.keystore {
            // The address field is readable without the password
            Some(path) => Ok(KeystoreRecord::load(path)?.address),
            None => Ok(KeyMaterial::from_env()?.address().clone()),
        },
    }
}

fn print_json(value: &Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "octra-cli", "send", "octRecipient", "1.5", "-c", "wallet.toml", "-k", "key.json",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("wallet.toml")));
        assert_eq!(cli.keystore.as_deref(), Some(Path::new("key.json")));
        assert!(matches!(cli.command, Commands::Send { amount, .. } if amount == 1.5));

        let cli = Cli::try_parse_from(["octra-cli", "--config", "wallet.toml", "stats"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(Path::new("wallet.toml")));
    }
}
