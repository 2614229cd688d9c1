//! [`WalletProvider`] over an alloy HTTP provider and a local private key.

use alloy::{
    network::{EthereumWallet, TransactionBuilder},
    primitives::{Address, TxHash, U256},
    providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder},
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
    sol,
};
use async_trait::async_trait;
use tracing::{debug, info};
use url::Url;

use crate::wallet::{ConfirmedTx, WalletError, WalletProvider};

sol! {
    /// Standard fungible-token interface.
    #[sol(rpc)]
    contract Erc20 {
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
        function balanceOf(address owner) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvmSetupError {
    #[error("invalid private key")]
    InvalidKey,
}

/// Signs with a single local key and sends through one JSON-RPC endpoint.
#[derive(Clone)]
pub struct AlloyWallet {
    provider: DynProvider,
    address: Address,
}

impl AlloyWallet {
    pub fn connect(rpc_url: Url, private_key: &str) -> Result<Self, EvmSetupError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|_| EvmSetupError::InvalidKey)?;
        let address = signer.address();
        let provider = ProviderBuilder::new()
            .wallet(EthereumWallet::from(signer))
            .connect_http(rpc_url)
            .erased();

        info!(address = %address, "EVM wallet initialized");
        Ok(Self { provider, address })
    }

    fn token(&self, token: Address) -> Erc20::Erc20Instance<DynProvider> {
        Erc20::new(token, self.provider.clone())
    }
}

fn classify(e: impl std::fmt::Display) -> WalletError {
    WalletError::classify(e.to_string())
}

#[async_trait]
impl WalletProvider for AlloyWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn chain_id(&self) -> Result<u64, WalletError> {
        self.provider.get_chain_id().await.map_err(classify)
    }

    async fn native_balance(&self, owner: Address) -> Result<U256, WalletError> {
        self.provider.get_balance(owner).await.map_err(classify)
    }

    async fn decimals(&self, token: Address) -> Result<u8, WalletError> {
        self.token(token).decimals().call().await.map_err(classify)
    }

    async fn symbol(&self, token: Address) -> Result<String, WalletError> {
        self.token(token).symbol().call().await.map_err(classify)
    }

    async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        self.token(token).balanceOf(owner).call().await.map_err(classify)
    }

    async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, WalletError> {
        self.token(token)
            .allowance(owner, spender)
            .call()
            .await
            .map_err(classify)
    }

    async fn send_native(&self, to: Address, value: U256) -> Result<TxHash, WalletError> {
        let tx = TransactionRequest::default()
            .with_from(self.address)
            .with_to(to)
            .with_value(value);
        let pending = self.provider.send_transaction(tx).await.map_err(classify)?;
        let hash = *pending.tx_hash();
        debug!(tx_hash = %hash, to = %to, "native transfer submitted");
        Ok(hash)
    }

    async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError> {
        let pending = self
            .token(token)
            .approve(spender, amount)
            .from(self.address)
            .send()
            .await
            .map_err(classify)?;
        let hash = *pending.tx_hash();
        debug!(tx_hash = %hash, token = %token, "approval submitted");
        Ok(hash)
    }

    async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<TxHash, WalletError> {
        let pending = self
            .token(token)
            .transfer(to, amount)
            .from(self.address)
            .send()
            .await
            .map_err(classify)?;
        let hash = *pending.tx_hash();
        debug!(tx_hash = %hash, token = %token, "token transfer submitted");
        Ok(hash)
    }

    async fn wait_for_confirmation(&self, hash: TxHash) -> Result<ConfirmedTx, WalletError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), hash)
            .get_receipt()
            .await
            .map_err(classify)?;
        Ok(ConfirmedTx {
            hash: receipt.transaction_hash,
            success: receipt.status(),
            block_number: receipt.block_number,
        })
    }
}
