use std::path::PathBuf;

use clap::{Parser, Subcommand};
use stablepay_sdk::objects::WithdrawalStatus;
use uuid::Uuid;

pub(crate) const DEFAULT_CONFIG: &str = "./stablepay.toml";

#[derive(Parser, Debug)]
#[command(name = "stablepay", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// Hex private key of the withdrawing wallet
    #[arg(long, global = true, env = "STABLEPAY_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Print results as JSON
    #[arg(long, global = true, default_value_t = false)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured chains and their custody wallets
    Chains,
    /// Check whether a token needs an approval before withdrawing
    Allowance {
        /// Chain id
        #[arg(long)]
        chain: u64,
        /// Token contract address, or `native`
        #[arg(long)]
        token: String,
        /// Amount in whole tokens (e.g. 12.5)
        #[arg(long)]
        amount: String,
    },
    /// Send tokens to the chain's custody wallet and record the withdrawal
    Withdraw {
        /// Chain id
        #[arg(long)]
        chain: u64,
        /// Token contract address, or `native`
        #[arg(long)]
        token: String,
        /// Amount in whole tokens (e.g. 12.5)
        #[arg(long)]
        amount: String,
        /// Skip the confirmation prompt
        #[arg(short, long, default_value_t = false)]
        yes: bool,
        /// Do not record the withdrawal with the ledger
        #[arg(long, default_value_t = false)]
        no_ledger: bool,
    },
    /// Look up a recorded withdrawal
    Status {
        /// Withdrawal id returned by `withdraw`
        id: Uuid,
    },
    /// Ledger administration
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// List withdrawals, newest first
    List {
        #[arg(long)]
        status: Option<WithdrawalStatus>,
        #[arg(long)]
        chain: Option<u64>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long, default_value_t = 20)]
        limit: i64,
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },
    /// Move a withdrawal to a new settlement status
    SetStatus {
        id: Uuid,
        status: WithdrawalStatus,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_withdraw() {
        let cli = Cli::try_parse_from([
            "stablepay",
            "withdraw",
            "--chain",
            "137",
            "--token",
            "native",
            "--amount",
            "1.5",
            "--yes",
        ])
        .unwrap();
        match cli.command {
            Commands::Withdraw {
                chain, token, yes, no_ledger, ..
            } => {
                assert_eq!(chain, 137);
                assert_eq!(token, "native");
                assert!(yes);
                assert!(!no_ledger);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG));
    }

    #[test]
    fn test_parse_admin_set_status() {
        let cli = Cli::try_parse_from([
            "stablepay",
            "--json",
            "admin",
            "set-status",
            "0191b1c4-0000-7000-8000-000000000000",
            "processing",
        ])
        .unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::Admin {
                command: AdminCommands::SetStatus {
                    status: WithdrawalStatus::Processing,
                    ..
                }
            }
        ));
    }
}
