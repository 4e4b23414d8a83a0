use anyhow::{Context, Result};
use billed_core::{KeyValueStorage, Session, UserType, JWT_KEY, USER_KEY};
use billed_store::{ApiStore, MockStore, Store};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

mod bills_cmd;
mod config;
mod logging;
mod state;

use bills_cmd::SubmitArgs;
use state::FileStorage;

#[derive(Parser, Debug)]
#[command(
    name = "billed",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BILLED_BUILD_SHA"), ")"),
    about = "Billed expense reports from the command line"
)]
struct Cli {
    /// Use the built-in sample store instead of the API
    #[arg(long, global = true)]
    mock: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Store the session (and optional API token) used by later commands
    Login {
        #[arg(long)]
        email: String,

        /// Bearer token for the API
        #[arg(long)]
        jwt: Option<String>,

        #[arg(long)]
        admin: bool,
    },

    /// Forget the stored session and token
    Logout,

    /// Bill commands
    Bills {
        #[command(subcommand)]
        command: BillsCommand,
    },

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum BillsCommand {
    /// List bills, newest first
    List,

    /// Show one bill as JSON
    Show { id: String },

    /// Submit a new bill
    Submit {
        /// Proof image (jpg, jpeg or png)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Expense type (default: Transports)
        #[arg(long = "type")]
        expense_type: Option<String>,

        #[arg(long)]
        name: String,

        /// Date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Amount incl. VAT
        #[arg(long)]
        amount: String,

        #[arg(long, default_value = "")]
        vat: String,

        /// VAT percentage (default: 20)
        #[arg(long, default_value = "")]
        pct: String,

        #[arg(long, default_value = "")]
        commentary: String,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init(&cfg.logging.level);

    let storage: Arc<dyn KeyValueStorage> = Arc::new(FileStorage::open(state::storage_path()?)?);

    match cli.command {
        Command::Login { email, jwt, admin } => {
            let session = Session {
                user_type: if admin { UserType::Admin } else { UserType::Employee },
                email,
            };
            storage.set_item(USER_KEY, &serde_json::to_string(&session)?);
            if let Some(jwt) = jwt {
                storage.set_item(JWT_KEY, &jwt);
            }
            println!("Logged in as {} ({:?})", session.email, session.user_type);
        }

        Command::Logout => {
            storage.remove_item(USER_KEY);
            storage.remove_item(JWT_KEY);
            println!("Logged out");
        }

        Command::Bills { command } => {
            let store = open_store(cli.mock || cfg.api.mock, &cfg.api.base_url, storage.clone())?;
            match command {
                BillsCommand::List => {
                    let bills = bills_cmd::list_bills(store, storage).await?;
                    print!("{}", bills_cmd::render_table(&bills));
                    println!("\n{} bill(s)", bills.len());
                }
                BillsCommand::Show { id } => {
                    let bill = bills_cmd::show_bill(store, storage, &id).await?;
                    println!("{}", serde_json::to_string_pretty(&bill)?);
                }
                BillsCommand::Submit {
                    file,
                    expense_type,
                    name,
                    date,
                    amount,
                    vat,
                    pct,
                    commentary,
                } => {
                    let args = SubmitArgs {
                        file,
                        expense_type,
                        name,
                        date,
                        amount,
                        vat,
                        pct,
                        commentary,
                    };
                    bills_cmd::submit_bill(store, storage, &args).await?;
                    println!("Bill submitted");
                }
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path()?.display());
                print!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
            }
        },
    }

    Ok(())
}

fn open_store(
    mock: bool,
    base_url: &str,
    storage: Arc<dyn KeyValueStorage>,
) -> Result<Arc<dyn Store>> {
    if mock {
        debug!("using sample store");
        return Ok(Arc::new(MockStore::new()));
    }
    let store = ApiStore::parse(base_url)
        .with_context(|| format!("api.base_url = {base_url}"))?
        .with_storage(storage);
    debug!(base = %store.base_url(), "using remote store");
    Ok(Arc::new(store))
}
