//! Scripted wallet for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use alloy::primitives::{Address, TxHash, U256, address, keccak256};
use async_trait::async_trait;

use stablepay_sdk::objects::{
    BankDetails, InitiateWithdrawal, ValidationError, WithdrawalResponse, WithdrawalStatus,
};
use uuid::Uuid;

use crate::chain_registry::{ChainProfile, ChainRegistry, NATIVE_SENTINEL};
use crate::config::ChainEntry;
use crate::consent::{ConsentGate, ConsentRequest};
use crate::ledger::{LedgerError, WithdrawalLedger};
use crate::wallet::{ConfirmedTx, WalletError, WalletProvider};

pub(crate) const USDC: Address = address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359");

pub(crate) fn owner() -> Address {
    address!("52908400098527886E0F7030069857D2E4169EE7")
}

pub(crate) fn custody() -> Address {
    address!("1111111111111111111111111111111111111111")
}

pub(crate) fn registry() -> ChainRegistry {
    let entries: Vec<ChainEntry> = [1u64, 137]
        .into_iter()
        .map(|chain_id| ChainEntry {
            chain_id,
            custody_address: Some(custody().to_string()),
            native_symbol: None,
            explorer_tx_url_template: None,
        })
        .collect();
    ChainRegistry::from_entries(&entries).unwrap()
}

pub(crate) fn polygon_profile() -> ChainProfile {
    registry().profile(137).unwrap().clone()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ChainId,
    NativeBalance,
    Decimals,
    Symbol,
    BalanceOf,
    Allowance,
    SendNative { to: Address, value: U256 },
    Approve { spender: Address, amount: U256 },
    Transfer { to: Address, amount: U256 },
    Confirm(TxHash),
}

impl Call {
    pub(crate) fn is_submission(&self) -> bool {
        matches!(
            self,
            Call::SendNative { .. } | Call::Approve { .. } | Call::Transfer { .. }
        )
    }
}

#[derive(Default)]
struct State {
    calls: Vec<Call>,
    tokens: HashMap<Address, (String, u8)>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, U256>,
    read_failure: Option<WalletError>,
    submit_failure: Option<WalletError>,
    confirm_failure: Option<WalletError>,
    reverts: bool,
    hangs: bool,
    rehash_on_confirm: bool,
    nonce: u64,
}

/// In-memory wallet. Balances are keyed by token address, with the native
/// balance under [`NATIVE_SENTINEL`]. Approvals and transfers update the
/// scripted state the way a chain would.
pub(crate) struct MockWallet {
    chain_id: u64,
    address: Address,
    state: Mutex<State>,
}

impl MockWallet {
    pub(crate) fn new(chain_id: u64, address: Address) -> Self {
        Self {
            chain_id,
            address,
            state: Mutex::new(State::default()),
        }
    }

    pub(crate) fn with_token(self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.state
            .lock()
            .unwrap()
            .tokens
            .insert(token, (symbol.to_string(), decimals));
        self
    }

    pub(crate) fn set_balance(&self, token: Address, balance: U256) {
        self.state.lock().unwrap().balances.insert(token, balance);
    }

    pub(crate) fn set_allowance(&self, token: Address, allowance: U256) {
        self.state.lock().unwrap().allowances.insert(token, allowance);
    }

    pub(crate) fn allowance_of(&self, token: Address) -> U256 {
        self.state
            .lock()
            .unwrap()
            .allowances
            .get(&token)
            .copied()
            .unwrap_or_default()
    }

    pub(crate) fn fail_reads(&self, error: WalletError) {
        self.state.lock().unwrap().read_failure = Some(error);
    }

    pub(crate) fn fail_submissions(&self, error: WalletError) {
        self.state.lock().unwrap().submit_failure = Some(error);
    }

    pub(crate) fn fail_confirmations(&self, error: WalletError) {
        self.state.lock().unwrap().confirm_failure = Some(error);
    }

    pub(crate) fn revert_transactions(&self) {
        self.state.lock().unwrap().reverts = true;
    }

    /// Confirmation waits never resolve.
    pub(crate) fn hang_confirmations(&self) {
        self.state.lock().unwrap().hangs = true;
    }

    /// Receipts report a different hash than the one submitted.
    pub(crate) fn rehash_on_confirm(&self) {
        self.state.lock().unwrap().rehash_on_confirm = true;
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn read(&self, call: Call) -> Result<(), WalletError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        match &state.read_failure {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }

    fn token_info(&self, token: Address) -> Result<(String, u8), WalletError> {
        self.state
            .lock()
            .unwrap()
            .tokens
            .get(&token)
            .cloned()
            .ok_or_else(|| WalletError::Rpc(format!("no contract code at {token}")))
    }

    fn submit(&self, call: Call, apply: impl FnOnce(&mut State)) -> Result<TxHash, WalletError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(e) = &state.submit_failure {
            return Err(e.clone());
        }
        state.nonce += 1;
        let hash = keccak256(format!("{}:{}", self.chain_id, state.nonce));
        apply(&mut state);
        Ok(hash)
    }
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.read(Call::ChainId)?;
        Ok(self.chain_id)
    }

    async fn native_balance(&self, _owner: Address) -> Result<U256, WalletError> {
        self.read(Call::NativeBalance)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&NATIVE_SENTINEL)
            .copied()
            .unwrap_or_default())
    }

    async fn decimals(&self, token: Address) -> Result<u8, WalletError> {
        self.read(Call::Decimals)?;
        Ok(self.token_info(token)?.1)
    }

    async fn symbol(&self, token: Address) -> Result<String, WalletError> {
        self.read(Call::Symbol)?;
        Ok(self.token_info(token)?.0)
    }

    async fn balance_of(&self, token: Address, _owner: Address) -> Result<U256, WalletError> {
        self.read(Call::BalanceOf)?;
        self.token_info(token)?;
        Ok(self
            .state
            .lock()
            .unwrap()
            .balances
            .get(&token)
            .copied()
            .unwrap_or_default())
    }

    async fn allowance(
        &self,
        token: Address,
        _owner: Address,
        _spender: Address,
    ) -> Result<U256, WalletError> {
        self.read(Call::Allowance)?;
        self.token_info(token)?;
        Ok(self.allowance_of(token))
    }

    async fn send_native(&self, to: Address, value: U256) -> Result<TxHash, WalletError> {
        self.submit(Call::SendNative { to, value }, |state| {
            let balance = state.balances.entry(NATIVE_SENTINEL).or_default();
            *balance = balance.saturating_sub(value);
        })
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError> {
        self.submit(Call::Approve { spender, amount }, |state| {
            state.allowances.insert(token, amount);
        })
    }

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError> {
        self.submit(Call::Transfer { to, amount }, |state| {
            let balance = state.balances.entry(token).or_default();
            *balance = balance.saturating_sub(amount);
        })
    }

    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<ConfirmedTx, WalletError> {
        let (hangs, failure, reverts, rehash) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::Confirm(hash));
            (
                state.hangs,
                state.confirm_failure.clone(),
                state.reverts,
                state.rehash_on_confirm,
            )
        };
        if hangs {
            std::future::pending::<()>().await;
        }
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(ConfirmedTx {
            hash: if rehash { keccak256(hash) } else { hash },
            success: !reverts,
            block_number: Some(19_000_000),
        })
    }
}

pub(crate) fn bank_details() -> BankDetails {
    BankDetails {
        account_holder: "Asha Verma".to_string(),
        account_number: "123456789012".to_string(),
        ifsc: "HDFC0001234".to_string(),
    }
}

/// Answers every prompt the same way and keeps what it was asked.
pub(crate) struct RecordingConsent {
    answer: bool,
    prompts: Mutex<Vec<ConsentRequest>>,
}

impl RecordingConsent {
    pub(crate) fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<ConsentRequest> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConsentGate for RecordingConsent {
    async fn request_consent(&self, request: &ConsentRequest) -> bool {
        self.prompts.lock().unwrap().push(request.clone());
        self.answer
    }
}

#[derive(Default)]
pub(crate) struct RecordingLedger {
    fail: bool,
    requests: Mutex<Vec<InitiateWithdrawal>>,
}

impl RecordingLedger {
    pub(crate) fn failing() -> Self {
        Self {
            fail: true,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<InitiateWithdrawal> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl WithdrawalLedger for RecordingLedger {
    async fn initiate_withdrawal(
        &self,
        request: InitiateWithdrawal,
    ) -> Result<WithdrawalResponse, LedgerError> {
        if self.fail {
            return Err(LedgerError::Invalid(ValidationError::UnsupportedChain(
                request.chain_id,
            )));
        }
        request.validate()?;
        self.requests.lock().unwrap().push(request.clone());
        Ok(WithdrawalResponse {
            withdrawal_id: Uuid::now_v7(),
            user_address: request.user_address,
            token_symbol: request.token_symbol,
            token_amount: request.token_amount,
            chain_id: request.chain_id,
            transfer_hash: request.transfer_hash,
            inr_amount: request.inr_amount,
            status: WithdrawalStatus::Pending,
            created_at: 1_700_000_000,
        })
    }
}
