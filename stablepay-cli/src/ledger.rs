use anyhow::Context;
use stablepay_sdk::client::{AdminClient, LedgerClient};
use stablepay_sdk::objects::admin::{AdminWithdrawalResponse, ListWithdrawalsQuery};
use stablepay_sdk::objects::{Blockchain, WithdrawalResponse};
use uuid::Uuid;

use crate::args::AdminCommands;
use crate::config::CliConfig;

pub(crate) async fn show_status(config: &CliConfig, id: Uuid, as_json: bool) -> anyhow::Result<()> {
    let ledger = config.ledger()?;
    let client = LedgerClient::new(ledger.base_url.clone(), ledger.secret.as_bytes());
    let withdrawal = client
        .get_withdrawal(id)
        .await
        .with_context(|| format!("fetching withdrawal {id}"))?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&withdrawal)?);
    } else {
        print_withdrawal(&withdrawal);
    }
    Ok(())
}

pub(crate) async fn admin(
    config: &CliConfig,
    command: &AdminCommands,
    as_json: bool,
) -> anyhow::Result<()> {
    let ledger = config.ledger()?;
    let secret = ledger
        .admin_secret
        .as_deref()
        .context("no admin_secret in [ledger]")?;
    let client = AdminClient::new(ledger.base_url.clone(), secret);

    match command {
        AdminCommands::List {
            status,
            chain,
            user,
            limit,
            offset,
        } => {
            let query = ListWithdrawalsQuery {
                limit: *limit,
                offset: *offset,
                status: *status,
                chain_id: *chain,
                user_address: user.clone(),
            };
            let withdrawals = client.list_withdrawals(&query).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&withdrawals)?);
            } else if withdrawals.is_empty() {
                println!("No withdrawals.");
            } else {
                withdrawals.iter().for_each(print_admin_row);
            }
        }
        AdminCommands::SetStatus { id, status } => {
            let updated = client.update_withdrawal_status(*id, *status).await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&updated)?);
            } else {
                print_admin_row(&updated);
            }
        }
    }
    Ok(())
}

fn chain_name(chain_id: u64) -> String {
    Blockchain::from_chain_id(chain_id)
        .map(|c| c.to_string())
        .unwrap_or_else(|| chain_id.to_string())
}

fn print_withdrawal(w: &WithdrawalResponse) {
    println!("withdrawal {}", w.withdrawal_id);
    println!("  status:   {}", w.status);
    println!("  amount:   {} {} on {}", w.token_amount, w.token_symbol, chain_name(w.chain_id));
    println!("  INR:      {}", w.inr_amount);
    println!("  transfer: {}", w.transfer_hash);
}

fn print_admin_row(w: &AdminWithdrawalResponse) {
    println!(
        "{}  {:<10}  {:>14} {:<6} {:<10}  INR {:>12}  {} {}",
        w.withdrawal_id,
        w.status.to_string(),
        w.token_amount,
        w.token_symbol,
        chain_name(w.chain_id),
        w.inr_amount,
        w.bank_ifsc,
        w.bank_account_holder,
    );
}
