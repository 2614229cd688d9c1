pub mod args;
mod config;
mod consent;
mod ledger;
mod withdraw;

use alloy::primitives::Address;
use anyhow::Context;
use serde_json::json;
use stablepay_core::chain_registry::{NATIVE_SENTINEL, parse_address};
use stablepay_core::evm::AlloyWallet;

use crate::args::{Cli, Commands};
use crate::config::CliConfig;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.config)?;

    match &cli.command {
        Commands::Chains => show_chains(&config, cli.json),
        Commands::Allowance {
            chain,
            token,
            amount,
        } => withdraw::show_allowance(&cli, &config, *chain, token, amount).await,
        Commands::Withdraw {
            chain,
            token,
            amount,
            yes,
            no_ledger,
        } => {
            withdraw::withdraw(
                &cli,
                &config,
                withdraw::WithdrawArgs {
                    chain_id: *chain,
                    token,
                    amount,
                    yes: *yes,
                    record: !no_ledger,
                },
            )
            .await
        }
        Commands::Status { id } => ledger::show_status(&config, *id, cli.json).await,
        Commands::Admin { command } => ledger::admin(&config, command, cli.json).await,
    }
}

fn show_chains(config: &CliConfig, as_json: bool) -> anyhow::Result<()> {
    let registry = config.registry()?;
    let mut profiles: Vec<_> = registry.profiles().collect();
    profiles.sort_by_key(|p| p.chain_id);

    if as_json {
        let chains: Vec<_> = profiles
            .iter()
            .map(|p| {
                json!({
                    "chain_id": p.chain_id,
                    "native_symbol": p.native_symbol.as_str(),
                    "custody_address": p.custody_address.to_string(),
                    "rpc_url": config.rpc_url(p.chain_id).map(|u| u.as_str()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&chains)?);
        return Ok(());
    }

    for p in profiles {
        println!(
            "{:>10}  {:<8} custody {}",
            p.chain_id, p.native_symbol, p.custody_address
        );
    }
    Ok(())
}

/// `native` (any case) selects the chain's native asset.
fn token_argument(token: &str) -> String {
    if token.trim().eq_ignore_ascii_case("native") {
        NATIVE_SENTINEL.to_string()
    } else {
        token.trim().to_string()
    }
}

fn token_address(token: &str) -> anyhow::Result<Address> {
    parse_address(&token_argument(token)).with_context(|| format!("invalid token address: {token}"))
}

fn connect_wallet(cli: &Cli, config: &CliConfig, chain_id: u64) -> anyhow::Result<AlloyWallet> {
    let rpc_url = config
        .rpc_url(chain_id)
        .with_context(|| format!("chain {chain_id} is not configured"))?
        .clone();
    let key = cli
        .private_key
        .as_deref()
        .context("no private key; set STABLEPAY_PRIVATE_KEY or pass --private-key")?;
    Ok(AlloyWallet::connect(rpc_url, key)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_keyword_maps_to_sentinel() {
        assert_eq!(token_address("native").unwrap(), NATIVE_SENTINEL);
        assert_eq!(token_address(" Native ").unwrap(), NATIVE_SENTINEL);
        assert_eq!(
            token_address("0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359")
                .unwrap()
                .to_string(),
            "0x3c499c542cEF5E3811e1192ce70d8cC03d5c3359"
        );
        assert!(token_address("usdc").is_err());
    }
}
