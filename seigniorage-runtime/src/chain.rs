//! Network access for every contract handle.
//!
//! [`ChainBackend`] is the single seam between the client and the chain:
//! read calls, gas estimation, submission and receipt polling. The alloy
//! implementation talks JSON-RPC over HTTP; binding a [`SigningIdentity`]
//! yields a second backend whose provider signs with a local key.

use std::fmt;
use std::sync::Arc;

use alloy::network::{EthereumWallet, ReceiptResponse};
use alloy::primitives::{Address, B256, Bytes};
use alloy::providers::{DynProvider, PendingTransactionBuilder, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::error::{ProtocolError, RpcError};
use crate::types::TransactionOutcome;

/// The chain a session talks to. Fixed for the lifetime of the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    pub chain_id: u64,
    pub rpc_url: String,
}

impl NetworkIdentity {
    pub fn new(chain_id: u64, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id,
            rpc_url: rpc_url.into(),
        }
    }
}

/// An unlocked account that mutating calls are attributed to.
#[derive(Clone)]
pub struct SigningIdentity {
    signer: PrivateKeySigner,
}

impl SigningIdentity {
    /// Create an identity from a hex-encoded private key (with or without "0x").
    pub fn from_private_key(private_key: &str) -> Result<Self, ProtocolError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| ProtocolError::Config(format!("Invalid private key: {e}")))?;
        Ok(Self { signer })
    }

    pub fn from_signer(signer: PrivateKeySigner) -> Self {
        Self { signer }
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    pub fn wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address())
            .finish()
    }
}

#[async_trait]
pub trait ChainBackend: Send + Sync {
    fn chain_id(&self) -> u64;

    /// Execute a read-only `eth_call` and return the raw return data.
    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError>;

    /// Dry-run a transaction from `from` and return the estimated gas.
    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<u64, RpcError>;

    /// Sign and broadcast a transaction with an explicit gas limit.
    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
        gas_limit: u64,
    ) -> Result<B256, RpcError>;

    /// Wait until the transaction is mined.
    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionOutcome, RpcError>;

    /// Produce a backend that signs with `signer`. Does not modify `self`.
    fn connect(&self, signer: &SigningIdentity) -> Result<Arc<dyn ChainBackend>, ProtocolError>;
}

/// Call a view function at `to` and decode its return value.
pub async fn call_view<C>(
    backend: &dyn ChainBackend,
    to: Address,
    call: &C,
) -> Result<C::Return, RpcError>
where
    C: SolCall + Sync,
{
    let output = backend.call(to, Bytes::from(call.abi_encode())).await?;
    C::abi_decode_returns(&output)
        .map_err(|e| RpcError::new(format!("Malformed return data: {e}")))
}

/// [`ChainBackend`] over an alloy HTTP provider.
pub struct AlloyBackend {
    provider: DynProvider,
    rpc_url: url::Url,
    chain_id: u64,
}

impl AlloyBackend {
    /// Read-only backend for `network`.
    pub fn connect_http(network: &NetworkIdentity) -> Result<Self, ProtocolError> {
        let rpc_url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e| ProtocolError::Config(format!("Invalid RPC URL: {e}")))?;

        let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();

        Ok(Self {
            provider,
            rpc_url,
            chain_id: network.chain_id,
        })
    }

    pub fn provider(&self) -> &DynProvider {
        &self.provider
    }
}

#[async_trait]
impl ChainBackend for AlloyBackend {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError> {
        let tx = TransactionRequest::default().to(to).input(input.into());
        self.provider
            .call(tx)
            .await
            .map_err(|e| RpcError::new(e.to_string()))
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<u64, RpcError> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(input.into());
        self.provider
            .estimate_gas(tx)
            .await
            .map_err(|e| RpcError::new(e.to_string()))
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
        gas_limit: u64,
    ) -> Result<B256, RpcError> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(input.into())
            .gas_limit(gas_limit);

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| RpcError::new(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionOutcome, RpcError> {
        let receipt = PendingTransactionBuilder::new(self.provider.root().clone(), tx_hash)
            .get_receipt()
            .await
            .map_err(|e| RpcError::new(format!("Receipt fetch failed: {e}")))?;

        Ok(TransactionOutcome {
            tx_hash,
            block_number: receipt.block_number,
            gas_used: Some(receipt.gas_used),
            success: receipt.status(),
        })
    }

    fn connect(&self, signer: &SigningIdentity) -> Result<Arc<dyn ChainBackend>, ProtocolError> {
        let provider = ProviderBuilder::new()
            .wallet(signer.wallet())
            .connect_http(self.rpc_url.clone())
            .erased();

        Ok(Arc::new(AlloyBackend {
            provider,
            rpc_url: self.rpc_url.clone(),
            chain_id: self.chain_id,
        }))
    }
}

/// A submitted transaction. Await [`PendingTransaction::confirm`] for the receipt.
pub struct PendingTransaction {
    tx_hash: B256,
    contract: String,
    method: &'static str,
    backend: Arc<dyn ChainBackend>,
}

impl PendingTransaction {
    pub(crate) fn new(
        tx_hash: B256,
        contract: String,
        method: &'static str,
        backend: Arc<dyn ChainBackend>,
    ) -> Self {
        Self {
            tx_hash,
            contract,
            method,
            backend,
        }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx_hash
    }

    pub fn tx_hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.tx_hash.as_slice()))
    }

    pub fn method(&self) -> &str {
        self.method
    }

    /// Wait for the transaction to be mined.
    ///
    /// The transaction is already broadcast, so a failed receipt fetch is a
    /// read failure: the call may still be mined.
    pub async fn confirm(self) -> Result<TransactionOutcome, ProtocolError> {
        self.backend
            .wait_for_receipt(self.tx_hash)
            .await
            .map_err(|e| ProtocolError::RemoteRead {
                contract: self.contract.clone(),
                method: self.method.to_string(),
                message: format!("receipt for {}: {e}", self.tx_hash_hex()),
            })
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingTransaction")
            .field("tx_hash", &self.tx_hash)
            .field("contract", &self.contract)
            .field("method", &self.method)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Hardhat account #0
    const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    #[test]
    fn test_signing_identity_from_key() {
        let identity = SigningIdentity::from_private_key(TEST_KEY).unwrap();
        let expected: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(identity.address(), expected);
    }

    #[test]
    fn test_invalid_private_key() {
        assert!(SigningIdentity::from_private_key("not-a-key").is_err());
    }

    #[test]
    fn test_alloy_backend_creation() {
        let backend = AlloyBackend::connect_http(&NetworkIdentity::new(31337, "http://localhost:8545"));
        assert!(backend.is_ok());
        assert_eq!(backend.unwrap().chain_id(), 31337);
    }

    #[test]
    fn test_invalid_rpc_url() {
        let result = AlloyBackend::connect_http(&NetworkIdentity::new(1, "not a url"));
        assert!(result.is_err());
    }

    #[test]
    fn test_connect_keeps_chain_id() {
        let backend =
            AlloyBackend::connect_http(&NetworkIdentity::new(128, "http://localhost:8545")).unwrap();
        let identity = SigningIdentity::from_private_key(TEST_KEY).unwrap();
        let signed = backend.connect(&identity).unwrap();
        assert_eq!(signed.chain_id(), 128);
    }
}
