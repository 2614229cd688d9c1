//! Withdrawal Orchestrator.
//!
//! Drives one withdrawal attempt through
//! `checking-allowance → [requesting-approval → approving] → transferring →
//! completed`, asking the [`ConsentGate`] once the allowance is known and
//! before anything is submitted. Failures land in `error` with the error's
//! message; a declined consent returns to `idle`.
//!
//! The orchestrator owns its [`TransferOutcome`]. Components only return
//! values, and callers see the outcome through [`state`](WithdrawalOrchestrator::state).

use std::time::Duration;

use alloy::primitives::{Address, TxHash, U256};
use rust_decimal::Decimal;
use stablepay_sdk::objects::{InitiateWithdrawal, TransferStateView, TransferStep, WithdrawalResponse};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::allowance::AllowanceChecker;
use crate::amount::{NATIVE_DECIMALS, format_base_units, parse_amount, to_base_units};
use crate::approval::ApprovalRequester;
use crate::chain_registry::{ChainProfile, ChainRegistry, parse_address};
use crate::consent::{ConsentGate, ConsentRequest};
use crate::error::TransferError;
use crate::ledger::{LedgerError, Settlement};
use crate::rates::to_inr;
use crate::transfer::TransferExecutor;
use crate::wallet::WalletProvider;

/// A single withdrawal the user asked for. Validated on construction and
/// immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    token: Address,
    amount: Decimal,
    chain_id: u64,
    owner: Address,
}

impl TransferRequest {
    /// `token` is the token contract, or the native sentinel for the chain's
    /// native asset.
    pub fn new(token: &str, amount: &str, chain_id: u64, owner: &str) -> Result<Self, TransferError> {
        let token = parse_address(token.trim()).ok_or_else(|| {
            TransferError::InvalidRequest(format!("invalid token address: {token}"))
        })?;
        let owner = parse_address(owner.trim()).ok_or_else(|| {
            TransferError::InvalidRequest(format!("invalid owner address: {owner}"))
        })?;
        let amount = parse_amount(amount).map_err(TransferError::amount)?;
        Self::from_parts(token, amount, chain_id, owner)
    }

    pub fn from_parts(
        token: Address,
        amount: Decimal,
        chain_id: u64,
        owner: Address,
    ) -> Result<Self, TransferError> {
        if token == Address::ZERO {
            return Err(TransferError::InvalidRequest(
                "the zero address is not a token; use the native sentinel for native transfers"
                    .to_string(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(TransferError::InvalidRequest(
                "amount must be greater than zero".to_string(),
            ));
        }
        Ok(Self {
            token,
            amount: amount.normalize(),
            chain_id,
            owner,
        })
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn owner(&self) -> Address {
        self.owner
    }
}

/// Progress and result of the current attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOutcome {
    pub step: TransferStep,
    pub transaction_hash: Option<TxHash>,
    pub approval_hash: Option<TxHash>,
    pub error: Option<String>,
    /// Ledger record id, once the hand-off succeeded.
    pub withdrawal_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferEvent {
    StepChanged(TransferStep),
    ApprovalConfirmed(TxHash),
    TransferConfirmed(TxHash),
    WithdrawalRecorded(Uuid),
}

pub const DEFAULT_EVENT_BUFFER: usize = 64;

pub type TransferEventSender = mpsc::Sender<TransferEvent>;
pub type TransferEventReceiver = mpsc::Receiver<TransferEvent>;

pub fn transfer_event_channel() -> (TransferEventSender, TransferEventReceiver) {
    mpsc::channel(DEFAULT_EVENT_BUFFER)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrchestratorOptions {
    /// Upper bound on each confirmation wait. `None` waits for as long as the
    /// wallet provider does.
    pub confirmation_timeout: Option<Duration>,
}

#[derive(Debug, Clone)]
struct TokenInfo {
    symbol: String,
    decimals: u8,
    native: bool,
}

/// Details of the attempt the outcome belongs to.
#[derive(Debug, Clone)]
struct Attempt {
    profile: ChainProfile,
    token_symbol: Option<String>,
}

pub struct WithdrawalOrchestrator<W> {
    registry: ChainRegistry,
    wallet: W,
    options: OrchestratorOptions,
    settlement: Option<Settlement>,
    events: Option<TransferEventSender>,
    outcome: TransferOutcome,
    attempt: Option<Attempt>,
}

impl<W: WalletProvider> WithdrawalOrchestrator<W> {
    pub fn new(registry: ChainRegistry, wallet: W) -> Self {
        Self {
            registry,
            wallet,
            options: OrchestratorOptions::default(),
            settlement: None,
            events: None,
            outcome: TransferOutcome::default(),
            attempt: None,
        }
    }

    pub fn with_options(mut self, options: OrchestratorOptions) -> Self {
        self.options = options;
        self
    }

    /// Record completed transfers with the ledger. Without this the flow
    /// ends at `completed`.
    pub fn with_settlement(mut self, settlement: Settlement) -> Self {
        self.settlement = Some(settlement);
        self
    }

    pub fn with_events(mut self, events: TransferEventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &TransferOutcome {
        &self.outcome
    }

    pub fn wallet(&self) -> &W {
        &self.wallet
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    /// Return every field of the outcome to its initial value. Also the way
    /// out of an attempt that was abandoned mid-flight.
    pub fn reset(&mut self) {
        self.outcome = TransferOutcome::default();
        self.attempt = None;
    }

    /// Block explorer link for the completed transfer.
    pub fn explorer_link(&self) -> Option<String> {
        let attempt = self.attempt.as_ref()?;
        let hash = self.outcome.transaction_hash?;
        Some(attempt.profile.explorer_tx_url(hash))
    }

    pub fn view(&self) -> TransferStateView {
        TransferStateView {
            step: self.outcome.step,
            chain_id: self.attempt.as_ref().map(|a| a.profile.chain_id),
            token_symbol: self.attempt.as_ref().and_then(|a| a.token_symbol.clone()),
            approval_hash: self.outcome.approval_hash.map(|h| h.to_string()),
            transaction_hash: self.outcome.transaction_hash.map(|h| h.to_string()),
            explorer_url: self.explorer_link(),
            error: self.outcome.error.clone(),
            withdrawal_id: self.outcome.withdrawal_id,
        }
    }

    /// Run one withdrawal attempt.
    ///
    /// Returns the confirmed transfer hash, `None` when the user declined,
    /// or the error that moved the outcome to `error`. Refuses to start
    /// while another attempt is in flight, leaving its state untouched.
    #[tracing::instrument(skip_all, fields(chain_id = request.chain_id(), token = %request.token()))]
    pub async fn execute_transfer(
        &mut self,
        request: &TransferRequest,
        consent: &dyn ConsentGate,
    ) -> Result<Option<TxHash>, TransferError> {
        if self.outcome.step.is_in_flight() {
            warn!(step = %self.outcome.step, "transfer already in progress");
            return Err(TransferError::AlreadyInFlight);
        }
        self.reset();

        match self.run(request, consent).await {
            Ok(Some(hash)) => Ok(Some(hash)),
            Ok(None) => {
                self.set_step(TransferStep::Idle);
                Ok(None)
            }
            Err(e) => {
                error!(step = %self.outcome.step, error = %e, "withdrawal failed");
                self.outcome.error = Some(e.to_string());
                self.set_step(TransferStep::Error);
                Err(e)
            }
        }
    }

    async fn run(
        &mut self,
        request: &TransferRequest,
        consent: &dyn ConsentGate,
    ) -> Result<Option<TxHash>, TransferError> {
        let profile = self.registry.profile(request.chain_id())?.clone();
        self.attempt = Some(Attempt {
            profile: profile.clone(),
            token_symbol: None,
        });
        let timeout = self.options.confirmation_timeout;
        let custody = profile.custody_address;

        self.set_step(TransferStep::CheckingAllowance);
        self.check_wallet(&profile, request).await?;

        let token = self.resolve_token(&profile, request.token()).await?;
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.token_symbol = Some(token.symbol.clone());
        }
        let required = to_base_units(request.amount(), token.decimals).map_err(TransferError::amount)?;
        self.check_balance(request, &token, required).await?;
        if let Some(settlement) = &self.settlement {
            check_payout(settlement, request.amount(), &token.symbol).await?;
        }

        let checker = AllowanceChecker::new(&self.wallet);
        let allowance = if token.native {
            checker
                .check(&profile, request.token(), request.owner(), custody, request.amount())
                .await?
        } else {
            checker
                .check_units(request.token(), request.owner(), custody, required, token.decimals)
                .await?
        };
        let needs_approval = allowance.needs_approval && !token.native;

        let prompt = ConsentRequest {
            token: request.token(),
            token_symbol: token.symbol.clone(),
            amount: request.amount(),
            destination: custody,
            chain_id: profile.chain_id,
            native_symbol: profile.native_symbol.to_string(),
            is_native: token.native,
            requires_approval: needs_approval,
        };
        debug!(needs_approval, "waiting for consent");
        if !consent.request_consent(&prompt).await {
            info!("withdrawal declined by user");
            return Ok(None);
        }

        if needs_approval {
            self.set_step(TransferStep::RequestingApproval);
            let pending = ApprovalRequester::new(&self.wallet, timeout)
                .submit(request.token(), custody, required)
                .await?;
            self.set_step(TransferStep::Approving);
            let approval = ApprovalRequester::new(&self.wallet, timeout)
                .confirm(pending)
                .await?;
            self.outcome.approval_hash = Some(approval);
            self.emit(TransferEvent::ApprovalConfirmed(approval));
        }

        self.set_step(TransferStep::Transferring);
        let hash = TransferExecutor::new(&self.wallet, timeout)
            .execute_units(&profile, request.token(), required, custody)
            .await?;
        self.outcome.transaction_hash = Some(hash);
        self.set_step(TransferStep::Completed);
        self.emit(TransferEvent::TransferConfirmed(hash));
        info!(tx_hash = %hash, explorer = %profile.explorer_tx_url(hash), "withdrawal transfer confirmed");

        self.record_withdrawal(request, &profile, &token.symbol, hash)
            .await;
        Ok(Some(hash))
    }

    async fn check_wallet(
        &self,
        profile: &ChainProfile,
        request: &TransferRequest,
    ) -> Result<(), TransferError> {
        let connected = self
            .wallet
            .chain_id()
            .await
            .map_err(TransferError::read("wallet chain id"))?;
        if connected != profile.chain_id {
            return Err(TransferError::WrongNetwork {
                expected: profile.chain_id,
                connected,
            });
        }
        let address = self.wallet.address();
        if address != request.owner() {
            return Err(TransferError::OwnerMismatch {
                owner: request.owner().to_string(),
                connected: address.to_string(),
            });
        }
        Ok(())
    }

    async fn resolve_token(
        &self,
        profile: &ChainProfile,
        token: Address,
    ) -> Result<TokenInfo, TransferError> {
        if profile.is_native(token) {
            return Ok(TokenInfo {
                symbol: profile.native_symbol.to_string(),
                decimals: NATIVE_DECIMALS,
                native: true,
            });
        }
        let decimals = self
            .wallet
            .decimals(token)
            .await
            .map_err(TransferError::read("token decimals"))?;
        let symbol = self
            .wallet
            .symbol(token)
            .await
            .map_err(TransferError::read("token symbol"))?;
        Ok(TokenInfo {
            symbol,
            decimals,
            native: false,
        })
    }

    async fn check_balance(
        &self,
        request: &TransferRequest,
        token: &TokenInfo,
        required: U256,
    ) -> Result<(), TransferError> {
        let available = if token.native {
            self.wallet.native_balance(request.owner()).await
        } else {
            self.wallet.balance_of(request.token(), request.owner()).await
        }
        .map_err(TransferError::read("balance"))?;
        if available < required {
            return Err(TransferError::InsufficientFunds {
                symbol: token.symbol.clone(),
                available: format_base_units(available, token.decimals),
                required: format_base_units(required, token.decimals),
            });
        }
        Ok(())
    }

    /// Best effort. A failure here is logged and never undoes `completed`.
    async fn record_withdrawal(
        &mut self,
        request: &TransferRequest,
        profile: &ChainProfile,
        symbol: &str,
        hash: TxHash,
    ) {
        let Some(settlement) = self.settlement.clone() else {
            return;
        };
        match hand_off(&settlement, request, profile, symbol, hash).await {
            Ok(record) => {
                info!(
                    tx_hash = %hash,
                    withdrawal_id = %record.withdrawal_id,
                    inr_amount = %record.inr_amount,
                    "withdrawal recorded"
                );
                self.outcome.withdrawal_id = Some(record.withdrawal_id);
                self.emit(TransferEvent::WithdrawalRecorded(record.withdrawal_id));
            }
            Err(e) => {
                error!(tx_hash = %hash, error = %e, "failed to record withdrawal with the ledger");
            }
        }
    }

    fn set_step(&mut self, step: TransferStep) {
        debug!(step = %step, "transfer step changed");
        self.outcome.step = step;
        self.emit(TransferEvent::StepChanged(step));
    }

    /// Never waits on the receiver. Events that do not fit are dropped.
    fn emit(&self, event: TransferEvent) {
        let Some(events) = &self.events else {
            return;
        };
        match events.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!(event = ?event, "transfer event channel full, dropping event");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

/// Amounts worth less than one paisa cannot be recorded with the ledger, so
/// they are refused before anything is submitted. An unavailable rate only
/// skips the check.
async fn check_payout(
    settlement: &Settlement,
    amount: Decimal,
    symbol: &str,
) -> Result<(), TransferError> {
    match settlement.rates.inr_rate(symbol).await {
        Ok(rate) => {
            let inr_amount = to_inr(amount, rate);
            if inr_amount <= Decimal::ZERO {
                warn!(%amount, symbol, %rate, "withdrawal rounds to zero INR");
                return Err(TransferError::InvalidRequest(format!(
                    "{amount} {symbol} is worth less than 0.01 INR"
                )));
            }
            Ok(())
        }
        Err(e) => {
            warn!(symbol, error = %e, "INR rate unavailable, the ledger record may be skipped");
            Ok(())
        }
    }
}

async fn hand_off(
    settlement: &Settlement,
    request: &TransferRequest,
    profile: &ChainProfile,
    symbol: &str,
    hash: TxHash,
) -> Result<WithdrawalResponse, LedgerError> {
    let rate = settlement.rates.inr_rate(symbol).await?;
    let inr_amount = to_inr(request.amount(), rate);
    settlement
        .ledger
        .initiate_withdrawal(InitiateWithdrawal {
            user_address: request.owner().to_string(),
            token_symbol: symbol.to_string(),
            token_amount: request.amount(),
            chain_id: profile.chain_id,
            transfer_hash: hash.to_string(),
            inr_amount,
            bank_details: settlement.bank_details.clone(),
        })
        .await
}
