//! CLI entry point for the wholeshare rebalancer.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use wholeshare_rebalancer::broker;
use wholeshare_rebalancer::config::Config;
use wholeshare_rebalancer::error::{Error, Result};
use wholeshare_rebalancer::execution::{self, Mode, Outcome, RunRequest, TerminalConfirmer};

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Whole-share portfolio rebalancer for Questrade accounts")]
#[command(version)]
struct Cli {
    /// Path to rebalancer.toml
    #[arg(long, global = true, default_value = "rebalancer.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List account types and numbers
    #[command(name = "listAccounts", visible_alias = "list-accounts")]
    ListAccounts,

    /// Compute and validate the buy plan without placing orders
    #[command(name = "showOrders", visible_alias = "show-orders")]
    ShowOrders {
        /// Account type, e.g. TFSA
        account_type: String,
        /// Account number
        account_number: String,
        /// Spend only cash / DCA this run
        #[arg(long)]
        dca: Option<f64>,
        /// Print the plan report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Compute, validate, confirm, and place the buy orders
    #[command(name = "placeOrders", visible_alias = "place-orders")]
    PlaceOrders {
        /// Account type, e.g. TFSA
        account_type: String,
        /// Account number
        account_number: String,
        /// Skip the typed confirmation (for automation/cron)
        #[arg(long = "noConfirm", visible_alias = "no-confirm")]
        no_confirm: bool,
        /// Spend only cash / DCA this run
        #[arg(long)]
        dca: Option<f64>,
    },

    /// Exchange a refresh token for API credentials
    Login {
        /// Refresh token from the Questrade app hub (prompted when omitted)
        #[arg(long)]
        refresh_token: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = dispatch(cli.command, &config) {
        eprintln!("{e}");
        if matches!(e, Error::DataUnavailable(_)) {
            eprintln!("Most likely the exchange is just closed");
        }
        process::exit(e.exit_code());
    }
}

/// Run one subcommand. The brokerage session is dropped before this returns.
fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::ListAccounts => {
            let session = broker::connect_questrade(&config.connection)?;
            for account in execution::list_accounts(&session)? {
                println!("{} {}", account.account_type, account.number);
            }
            Ok(())
        }
        Command::ShowOrders {
            account_type,
            account_number,
            dca,
            json,
        } => rebalance(
            config,
            RunRequest {
                account_type,
                account_number,
                mode: Mode::Show,
                dca,
                json,
            },
        ),
        Command::PlaceOrders {
            account_type,
            account_number,
            no_confirm,
            dca,
        } => rebalance(
            config,
            RunRequest {
                account_type,
                account_number,
                mode: Mode::Place {
                    confirm: !no_confirm,
                },
                dca,
                json: false,
            },
        ),
        Command::Login { refresh_token } => {
            let token = match refresh_token {
                Some(t) => t,
                None => dialoguer::Password::new()
                    .with_prompt("Refresh token")
                    .interact()
                    .map_err(|e| Error::Prompt(e.to_string()))?,
            };
            broker::login(&config.connection, token.trim())?;
            println!(
                "Credentials written to {}",
                config.connection.credentials_file.display()
            );
            Ok(())
        }
    }
}

fn rebalance(config: &Config, request: RunRequest) -> Result<()> {
    let session = broker::connect_questrade(&config.connection)?;
    let outcome = execution::run(&session, config, &request, &TerminalConfirmer)?;
    if matches!(outcome, Outcome::Shown(_)) && !request.json {
        println!("\nPlan is valid. No orders placed (showOrders).");
    }
    Ok(())
}
