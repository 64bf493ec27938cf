//! Lassie CLI
//!
//! A terminal client for the Lassie association management API: sign in,
//! inspect and update the person record, list account transactions, and
//! invoke model methods directly. Results print as JSON on stdout; logs
//! go to stderr.

mod config;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use lassie_sdk::{LassieClient, ResponseShape};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{CredentialsFile, FileConfig, FileKeyStore};

/// Lassie - terminal client for the Lassie association management API
#[derive(Parser, Debug)]
#[command(name = "lassie")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./lassie-config.toml")]
    config: PathBuf,

    /// Path to the stored person credentials
    #[arg(long, default_value = "./lassie-credentials.toml")]
    credentials: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in and store the issued person credentials
    Login {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Login password
        #[arg(short, long, env = "LASSIE_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Forget the stored person credentials
    Logout,

    /// Show the signed-in user's profile record
    Info,

    /// Update fields on the person record
    Update {
        /// field=value pairs to send
        #[arg(required = true, value_parser = parse_pair)]
        fields: Vec<(String, String)>,
    },

    /// List transactions for one of the configured accounts
    Transactions {
        /// Account index (0 or 1)
        #[arg(short, long, default_value_t = 0)]
        account: usize,
    },

    /// Invoke a model method directly
    Model {
        /// Model group name
        group: String,

        /// Method name
        method: String,

        /// key=value arguments, appended in the given order
        #[arg(short = 'a', long = "arg", value_parser = parse_pair)]
        args: Vec<(String, String)>,

        /// Normalize the response as an array instead of an object
        #[arg(long)]
        array: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = Args::parse();

    let file_config = FileConfig::load(&args.config)
        .with_context(|| format!("failed to load configuration from {:?}", args.config))?;
    let credentials = CredentialsFile::load(&args.credentials)
        .with_context(|| format!("failed to read credentials from {:?}", args.credentials))?;

    let store = Arc::new(FileKeyStore::new(credentials));
    let client = LassieClient::new(file_config.into_api_config(), store);

    match args.command {
        Command::Login { username, password } => {
            login(&client, &args.credentials, &username, &password).await
        }
        Command::Logout => logout(&args.credentials),
        Command::Info => {
            let info = client.get_person_information().await?;
            print_json(&Value::Object(info))
        }
        Command::Update { fields } => {
            let fields: Vec<(&str, &str)> = fields
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let updated = client.update_person(&fields).await?;
            print_json(&Value::Object(updated))
        }
        Command::Transactions { account } => {
            let transactions = client.list_transactions(account).await?;
            print_json(&Value::Array(transactions))
        }
        Command::Model {
            group,
            method,
            args: model_args,
            array,
        } => {
            let shape = if array {
                ResponseShape::Array
            } else {
                ResponseShape::Object
            };
            let pairs: Vec<(&str, &str)> = model_args
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let value = client
                .invoke_model(
                    &group,
                    &method,
                    (!pairs.is_empty()).then_some(pairs.as_slice()),
                    shape,
                )
                .await?;
            print_json(&value)
        }
    }
}

/// Sign in and persist the person pair the server issued.
async fn login(
    client: &LassieClient,
    credentials_path: &Path,
    username: &str,
    password: &str,
) -> anyhow::Result<()> {
    let response = client.create_person_keys(username, password).await?;

    let api_key = response.get("api_key").and_then(Value::as_str);
    let api_secret = response.get("api_secret").and_then(Value::as_str);
    let (Some(api_key), Some(api_secret)) = (api_key, api_secret) else {
        anyhow::bail!("login response carried no api_key/api_secret fields");
    };

    CredentialsFile {
        api_key: Some(api_key.to_owned()),
        api_secret: Some(api_secret.to_owned()),
    }
    .save(credentials_path)?;

    tracing::info!(
        "Signed in as {}, credentials stored in {:?}",
        username,
        credentials_path
    );
    Ok(())
}

/// Delete the stored credentials; a missing file already means signed out.
fn logout(credentials_path: &Path) -> anyhow::Result<()> {
    match std::fs::remove_file(credentials_path) {
        Ok(()) => tracing::info!("Stored credentials removed"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No stored credentials, nothing to do")
        }
        Err(e) => return Err(e).context("failed to remove credentials file"),
    }
    Ok(())
}

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a `key=value` command line argument.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))
}

/// Initialize the tracing subscriber with environment-based filtering.
///
/// Logs go to stderr so JSON output on stdout stays pipeable.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn pairs_split_on_the_first_equals() {
        assert_eq!(parse_pair("a=1"), Ok(("a".to_owned(), "1".to_owned())));
        assert_eq!(
            parse_pair("note=a=b"),
            Ok(("note".to_owned(), "a=b".to_owned()))
        );
        assert!(parse_pair("bare").is_err());
    }
}
