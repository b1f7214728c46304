#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};

use alloy::primitives::{Address, B256, Bytes, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use seigniorage_runtime::chain::{ChainBackend, SigningIdentity};
use seigniorage_runtime::config::ProtocolConfig;
use seigniorage_runtime::error::{ProtocolError, RouteError, RpcError};
use seigniorage_runtime::price_route::{PriceRoute, RouteToken};
use seigniorage_runtime::{SeigniorageClient, TransactionOutcome};

static LOG_INIT: Once = Once::new();

pub fn setup_log() {
    LOG_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt::try_init();
    });
}

// Hardhat account #0
pub const TEST_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub const CASH: Address = addr(0x0c01);
pub const SHARE: Address = addr(0x0c02);
pub const BOND: Address = addr(0x0c03);
pub const SHARE_LP: Address = addr(0x0c04);
pub const TREASURY: Address = addr(0x0d01);
pub const ORACLE: Address = addr(0x0d02);
pub const SHARE_BOARDROOM: Address = addr(0x0d03);
pub const LP_BOARDROOM: Address = addr(0x0d04);
pub const CASH_LP_POOL: Address = addr(0x0d05);
pub const BOARDROOM_V1: Address = addr(0x0d06);
pub const BOARDROOM_V2: Address = addr(0x0d07);
pub const HUSD: Address = addr(0x0e01);
pub const FACTORY: Address = addr(0x0f01);

const fn addr(tail: u16) -> Address {
    let mut bytes = [0u8; 20];
    bytes[18] = (tail >> 8) as u8;
    bytes[19] = tail as u8;
    Address::new(bytes)
}

pub fn config_json(with_legacy: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "chain_id": 128,
        "rpc_url": "http://localhost:8545",
        "deployments": {
            "Cash": { "address": CASH, "role": "token" },
            "Share": { "address": SHARE, "role": "token" },
            "Bond": { "address": BOND, "role": "token" },
            "ShareLp": { "address": SHARE_LP, "role": "token" },
            "Treasury": { "address": TREASURY, "role": "treasury" },
            "SeigniorageOracle": { "address": ORACLE, "role": "oracle" },
            "shareBoardroom": { "address": SHARE_BOARDROOM, "role": "boardroom" },
            "lpBoardroom": { "address": LP_BOARDROOM, "role": "boardroom" },
            "CashLpPool": { "address": CASH_LP_POOL, "role": "reward_pool" }
        },
        "external_tokens": {
            "HUSD": [HUSD, 8]
        },
        "reference_token": "HUSD",
        "dex_factory": FACTORY,
        "symbols": { "cash": "GOC", "share": "GOS", "bond": "GOB", "share_lp": "GLP" },
        "base_launch_date": "2020-11-29T23:00:00Z",
        "bond_launches_at": "2020-12-05T00:00:00Z",
        "boardroom_launches_at": "2020-12-11T00:00:00Z",
        "refresh_interval_ms": 10000,
        "gas_limit_multiplier": 1.1,
        "banks": [
            { "name": "Cash LP", "contract": "CashLpPool", "deposit_token_name": "GOC_HUSD-LP",
              "earn_token_name": "GOS", "sort": 1 }
        ]
    });
    if with_legacy {
        value["deployments"]["Boardroom1"] =
            serde_json::json!({ "address": BOARDROOM_V1, "role": "boardroom" });
        value["deployments"]["Boardroom2"] =
            serde_json::json!({ "address": BOARDROOM_V2, "role": "boardroom" });
    }
    value
}

pub fn test_config() -> ProtocolConfig {
    ProtocolConfig::from_json_str(&config_json(false).to_string()).unwrap()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTx {
    pub from: Address,
    pub to: Address,
    pub selector: [u8; 4],
    pub input: Bytes,
    pub gas_limit: u64,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<(Address, [u8; 4]), Result<Bytes, String>>,
    estimates: HashMap<(Address, [u8; 4]), Result<u64, String>>,
    send_failures: HashMap<(Address, [u8; 4]), String>,
    calls: Vec<(Address, [u8; 4])>,
    estimate_calls: usize,
    sent: Vec<SentTx>,
    connected: Vec<Address>,
    fail_connect: bool,
    fail_receipts: bool,
}

/// In-memory chain answering ABI calls by (address, selector).
#[derive(Clone)]
pub struct MockChain {
    chain_id: u64,
    state: Arc<Mutex<MockState>>,
    account: Option<Address>,
}

impl MockChain {
    pub fn new() -> Self {
        Self {
            chain_id: 128,
            state: Arc::new(Mutex::new(MockState::default())),
            account: None,
        }
    }

    /// Answer `C` at `to` with `value`.
    pub fn on<C: SolCall, V: SolValue>(&self, to: Address, value: V) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert((to, C::SELECTOR), Ok(Bytes::from(value.abi_encode())));
        self
    }

    /// Answer `C` at `to` with pre-encoded return data.
    pub fn on_raw<C: SolCall>(&self, to: Address, data: Vec<u8>) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert((to, C::SELECTOR), Ok(Bytes::from(data)));
        self
    }

    pub fn fail<C: SolCall>(&self, to: Address, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .responses
            .insert((to, C::SELECTOR), Err(message.to_string()));
        self
    }

    pub fn estimate<C: SolCall>(&self, to: Address, gas: u64) -> &Self {
        self.state
            .lock()
            .unwrap()
            .estimates
            .insert((to, C::SELECTOR), Ok(gas));
        self
    }

    pub fn revert_on_estimate<C: SolCall>(&self, to: Address, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .estimates
            .insert((to, C::SELECTOR), Err(message.to_string()));
        self
    }

    pub fn fail_send<C: SolCall>(&self, to: Address, message: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .send_failures
            .insert((to, C::SELECTOR), message.to_string());
        self
    }

    pub fn fail_connect(&self) {
        self.state.lock().unwrap().fail_connect = true;
    }

    pub fn fail_receipts(&self) {
        self.state.lock().unwrap().fail_receipts = true;
    }

    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    pub fn estimate_count(&self) -> usize {
        self.state.lock().unwrap().estimate_calls
    }

    pub fn calls_to<C: SolCall>(&self, to: Address) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| **c == (to, C::SELECTOR))
            .count()
    }

    pub fn sent(&self) -> Vec<SentTx> {
        self.state.lock().unwrap().sent.clone()
    }

    pub fn connected(&self) -> Vec<Address> {
        self.state.lock().unwrap().connected.clone()
    }

    fn selector(input: &Bytes) -> [u8; 4] {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(&input[..4]);
        selector
    }
}

#[async_trait]
impl ChainBackend for MockChain {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn call(&self, to: Address, input: Bytes) -> Result<Bytes, RpcError> {
        let selector = Self::selector(&input);
        let mut state = self.state.lock().unwrap();
        state.calls.push((to, selector));
        match state.responses.get(&(to, selector)) {
            Some(Ok(data)) => Ok(data.clone()),
            Some(Err(message)) => Err(RpcError::new(message.clone())),
            None => Err(RpcError::new(format!(
                "no mock for {to} selector 0x{}",
                hex::encode(selector)
            ))),
        }
    }

    async fn estimate_gas(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
    ) -> Result<u64, RpcError> {
        assert_eq!(Some(from), self.account, "estimate from unexpected account");
        let selector = Self::selector(&input);
        let mut state = self.state.lock().unwrap();
        state.estimate_calls += 1;
        match state.estimates.get(&(to, selector)) {
            Some(Ok(gas)) => Ok(*gas),
            Some(Err(message)) => Err(RpcError::new(message.clone())),
            None => Ok(50_000),
        }
    }

    async fn send_transaction(
        &self,
        from: Address,
        to: Address,
        input: Bytes,
        gas_limit: u64,
    ) -> Result<B256, RpcError> {
        let selector = Self::selector(&input);
        let mut state = self.state.lock().unwrap();
        if let Some(message) = state.send_failures.get(&(to, selector)) {
            return Err(RpcError::new(message.clone()));
        }
        state.sent.push(SentTx {
            from,
            to,
            selector,
            input,
            gas_limit,
        });
        Ok(B256::with_last_byte(state.sent.len() as u8))
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<TransactionOutcome, RpcError> {
        if self.state.lock().unwrap().fail_receipts {
            return Err(RpcError::new("receipt polling timed out"));
        }
        Ok(TransactionOutcome {
            tx_hash,
            block_number: Some(1),
            gas_used: Some(21_000),
            success: true,
        })
    }

    fn connect(&self, signer: &SigningIdentity) -> Result<Arc<dyn ChainBackend>, ProtocolError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_connect {
            return Err(ProtocolError::Config("wallet rejected connection".into()));
        }
        state.connected.push(signer.address());
        Ok(Arc::new(MockChain {
            chain_id: self.chain_id,
            state: self.state.clone(),
            account: Some(signer.address()),
        }))
    }
}

/// Price route with a fixed answer.
pub struct StaticRoute {
    result: Result<Decimal, RouteError>,
    lookups: Mutex<usize>,
}

impl StaticRoute {
    pub fn price(price: Decimal) -> Self {
        Self {
            result: Ok(price),
            lookups: Mutex::new(0),
        }
    }

    pub fn failing(error: RouteError) -> Self {
        Self {
            result: Err(error),
            lookups: Mutex::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl PriceRoute for StaticRoute {
    async fn mid_price(&self, _token: &RouteToken, _quote: &RouteToken) -> Result<Decimal, RouteError> {
        *self.lookups.lock().unwrap() += 1;
        self.result.clone()
    }
}

pub fn client_with(chain: &MockChain, route: Arc<dyn PriceRoute>) -> SeigniorageClient {
    setup_log();
    SeigniorageClient::with_backend(test_config(), Arc::new(chain.clone()), route).unwrap()
}

pub fn client(chain: &MockChain) -> SeigniorageClient {
    client_with(chain, Arc::new(StaticRoute::price(Decimal::ONE)))
}

static TEST_SIGNER: Lazy<SigningIdentity> =
    Lazy::new(|| SigningIdentity::from_private_key(TEST_KEY).unwrap());

pub fn signer() -> SigningIdentity {
    TEST_SIGNER.clone()
}

pub fn wad(whole: u64) -> U256 {
    U256::from(whole) * U256::from(10u64).pow(U256::from(18u64))
}
