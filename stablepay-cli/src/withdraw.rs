use std::sync::Arc;

use anyhow::{Context, bail};
use stablepay_core::allowance::AllowanceChecker;
use stablepay_core::amount::parse_amount;
use stablepay_core::consent::{AutoConsent, ConsentGate};
use stablepay_core::ledger::Settlement;
use stablepay_core::orchestrator::{
    OrchestratorOptions, TransferEvent, TransferRequest, WithdrawalOrchestrator,
    transfer_event_channel,
};
use stablepay_core::rates::{COINGECKO_API, CoinGeckoRates, FiatRateSource, StaticRates};
use stablepay_core::wallet::WalletProvider;
use stablepay_sdk::client::LedgerClient;
use stablepay_sdk::objects::{TransferStateView, TransferStep};
use url::Url;

use crate::args::Cli;
use crate::config::{CliConfig, RatesConfig};
use crate::consent::TerminalConsent;
use crate::{connect_wallet, token_address, token_argument};

pub(crate) struct WithdrawArgs<'a> {
    pub chain_id: u64,
    pub token: &'a str,
    pub amount: &'a str,
    pub yes: bool,
    /// Hand the confirmed transfer to the ledger.
    pub record: bool,
}

pub(crate) async fn show_allowance(
    cli: &Cli,
    config: &CliConfig,
    chain_id: u64,
    token: &str,
    amount: &str,
) -> anyhow::Result<()> {
    let registry = config.registry()?;
    let profile = registry.profile(chain_id)?;
    let wallet = connect_wallet(cli, config, chain_id)?;
    let token = token_address(token)?;
    let amount = parse_amount(amount)?;

    let status = AllowanceChecker::new(&wallet)
        .check(
            profile,
            token,
            wallet.address(),
            profile.custody_address,
            amount,
        )
        .await?;

    if cli.json {
        let value = serde_json::json!({
            "chain_id": chain_id,
            "token": token.to_string(),
            "owner": wallet.address().to_string(),
            "spender": profile.custody_address.to_string(),
            "needs_approval": status.needs_approval,
            "current_allowance": status.current_allowance,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else if status.needs_approval {
        println!(
            "Approval required: current allowance {} is below {amount}",
            status.current_allowance
        );
    } else {
        println!(
            "No approval needed (allowance {})",
            status.current_allowance
        );
    }
    Ok(())
}

pub(crate) async fn withdraw(
    cli: &Cli,
    config: &CliConfig,
    args: WithdrawArgs<'_>,
) -> anyhow::Result<()> {
    let registry = config.registry()?;
    let wallet = connect_wallet(cli, config, args.chain_id)?;
    let request = TransferRequest::new(
        &token_argument(args.token),
        args.amount,
        args.chain_id,
        &wallet.address().to_string(),
    )?;

    let (events, mut event_rx) = transfer_event_channel();
    let mut orchestrator = WithdrawalOrchestrator::new(registry, wallet)
        .with_options(OrchestratorOptions {
            confirmation_timeout: config.confirmation_timeout(),
        })
        .with_events(events);
    if args.record {
        orchestrator = orchestrator.with_settlement(settlement(config)?);
    }

    let progress = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            match event {
                TransferEvent::StepChanged(step) => tracing::info!(%step, "step"),
                TransferEvent::ApprovalConfirmed(hash) => {
                    tracing::info!(tx_hash = %hash, "approval confirmed")
                }
                TransferEvent::TransferConfirmed(hash) => {
                    tracing::info!(tx_hash = %hash, "transfer confirmed")
                }
                TransferEvent::WithdrawalRecorded(id) => {
                    tracing::info!(withdrawal_id = %id, "withdrawal recorded")
                }
            }
        }
    });

    let consent: Box<dyn ConsentGate> = if args.yes {
        Box::new(AutoConsent::accept())
    } else {
        Box::new(TerminalConsent)
    };
    let result = orchestrator
        .execute_transfer(&request, consent.as_ref())
        .await;
    let view = orchestrator.view();
    drop(orchestrator);
    let _ = progress.await;

    print_view(&view, cli.json)?;
    match result {
        Ok(Some(_)) => Ok(()),
        Ok(None) => {
            if !cli.json {
                println!("Withdrawal cancelled; nothing was submitted.");
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn settlement(config: &CliConfig) -> anyhow::Result<Settlement> {
    let ledger = config.ledger()?;
    let Some(bank) = config.bank.clone() else {
        bail!("recording a withdrawal needs a [bank] section; pass --no-ledger to skip");
    };
    bank.validate().context("invalid [bank] details")?;
    let Some(rates) = config.rates.as_ref() else {
        bail!("recording a withdrawal needs a [rates] section; pass --no-ledger to skip");
    };

    let client = LedgerClient::new(ledger.base_url.clone(), ledger.secret.as_bytes());
    Ok(Settlement::new(Arc::new(client), rate_source(rates)?, bank))
}

fn rate_source(rates: &RatesConfig) -> anyhow::Result<Arc<dyn FiatRateSource>> {
    Ok(match rates {
        RatesConfig::Static { rates } => Arc::new(StaticRates::new(
            rates.iter().map(|(symbol, rate)| (symbol, *rate)),
        )),
        RatesConfig::Coingecko { ids, base_url } => {
            let base_url = match base_url {
                Some(url) => url.clone(),
                None => Url::parse(COINGECKO_API)?,
            };
            Arc::new(CoinGeckoRates::new(base_url, ids.iter())?)
        }
    })
}

fn print_view(view: &TransferStateView, as_json: bool) -> anyhow::Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }
    match view.step {
        TransferStep::Completed => println!("Withdrawal transfer confirmed."),
        TransferStep::Error => println!("Withdrawal failed."),
        _ => {}
    }
    if let Some(hash) = &view.approval_hash {
        println!("  approval:    {hash}");
    }
    if let Some(hash) = &view.transaction_hash {
        println!("  transaction: {hash}");
    }
    if let Some(url) = &view.explorer_url {
        println!("  explorer:    {url}");
    }
    if let Some(id) = view.withdrawal_id {
        println!("  withdrawal:  {id}");
    } else if view.step == TransferStep::Completed {
        println!("  withdrawal:  not recorded with the ledger");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_static_rate_source() {
        let rates = RatesConfig::Static {
            rates: HashMap::from([("USDC".to_string(), Decimal::new(8325, 2))]),
        };
        let source = rate_source(&rates).unwrap();
        assert_eq!(source.inr_rate("usdc").await.unwrap(), Decimal::new(8325, 2));
    }

    #[test]
    fn test_settlement_requires_bank_details() {
        let config: CliConfig = toml::from_str(
            r#"
[[chains]]
chain_id = 1
custody_address = "0x1111111111111111111111111111111111111111"
rpc_url = "http://127.0.0.1:8545"

[ledger]
base_url = "http://localhost:8080"
secret = "replace-with-at-least-16-bytes"

[rates]
source = "static"
rates = { ETH = 250000 }
"#,
        )
        .unwrap();
        let err = settlement(&config).err().unwrap();
        assert!(err.to_string().contains("[bank]"));
    }
}
