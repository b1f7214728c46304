//! Contract registry: logical names to live, callable handles.
//!
//! Every handle and token accessor the client uses lives in this registry.
//! Handles are addressed by [`HandleId`] or by logical name and share one
//! [`Binding`]; `bind_signer` swaps that binding for all of them at once.

use std::collections::HashMap;
use std::sync::Arc;

use alloy::primitives::Address;
use alloy::sol_types::SolCall;
use tracing::info;

use crate::chain::{call_view, ChainBackend, NetworkIdentity, SigningIdentity};
use crate::config::ProtocolConfig;
use crate::error::ProtocolError;
use crate::token::TokenAccessor;
use crate::types::{ContractRole, ProtocolToken};
use crate::units::check_decimals;

pub const TREASURY: &str = "Treasury";
pub const SEIGNIORAGE_ORACLE: &str = "SeigniorageOracle";
pub const SHARE_BOARDROOM: &str = "shareBoardroom";
pub const LP_BOARDROOM: &str = "lpBoardroom";
pub const BOARDROOM_V1: &str = "Boardroom1";
pub const BOARDROOM_V2: &str = "Boardroom2";

/// Decimal count of the protocol's own tokens.
pub const PROTOCOL_DECIMALS: u8 = 18;

/// The backend a handle dispatches through and the account, if any, that
/// mutating calls are sent from.
#[derive(Clone)]
pub struct Binding {
    backend: Arc<dyn ChainBackend>,
    account: Option<Address>,
}

impl Binding {
    pub fn read_only(backend: Arc<dyn ChainBackend>) -> Self {
        Self {
            backend,
            account: None,
        }
    }

    pub fn signed(backend: Arc<dyn ChainBackend>, account: Address) -> Self {
        Self {
            backend,
            account: Some(account),
        }
    }

    pub fn backend(&self) -> &Arc<dyn ChainBackend> {
        &self.backend
    }

    pub fn account(&self) -> Option<Address> {
        self.account
    }
}

/// A deployed contract bound to the network or to the session's signer.
#[derive(Clone)]
pub struct ContractHandle {
    name: String,
    address: Address,
    role: ContractRole,
    binding: Binding,
}

impl ContractHandle {
    pub fn new(name: impl Into<String>, address: Address, role: ContractRole, binding: Binding) -> Self {
        Self {
            name: name.into(),
            address,
            role,
            binding,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn role(&self) -> ContractRole {
        self.role
    }

    pub fn account(&self) -> Option<Address> {
        self.binding.account
    }

    pub fn is_signer_bound(&self) -> bool {
        self.binding.account.is_some()
    }

    pub fn backend(&self) -> &Arc<dyn ChainBackend> {
        &self.binding.backend
    }

    pub(crate) fn connect(&mut self, binding: &Binding) {
        self.binding = binding.clone();
    }

    /// Call a view function and decode its return value.
    pub async fn read<C>(&self, call: C) -> Result<C::Return, ProtocolError>
    where
        C: SolCall + Send + Sync,
    {
        call_view(self.binding.backend.as_ref(), self.address, &call)
            .await
            .map_err(|e| ProtocolError::RemoteRead {
                contract: self.name.clone(),
                method: method_name::<C>().to_string(),
                message: e.to_string(),
            })
    }
}

impl std::fmt::Debug for ContractHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractHandle")
            .field("name", &self.name)
            .field("address", &self.address)
            .field("role", &self.role)
            .field("account", &self.binding.account)
            .finish()
    }
}

/// Function name of a call, without its parameter list.
pub(crate) fn method_name<C: SolCall>() -> &'static str {
    C::SIGNATURE.split('(').next().unwrap_or(C::SIGNATURE)
}

/// Stable index of a handle inside a [`ContractRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(usize);

pub struct ContractRegistry {
    network: NetworkIdentity,
    read_backend: Arc<dyn ChainBackend>,
    binding: Binding,
    handles: Vec<ContractHandle>,
    by_name: HashMap<String, HandleId>,
    tokens: Vec<TokenAccessor>,
    tokens_by_symbol: HashMap<String, usize>,
    protocol_tokens: HashMap<ProtocolToken, usize>,
    signer: Option<SigningIdentity>,
}

impl ContractRegistry {
    pub fn new(network: NetworkIdentity, backend: Arc<dyn ChainBackend>) -> Self {
        Self {
            network,
            binding: Binding::read_only(backend.clone()),
            read_backend: backend,
            handles: Vec::new(),
            by_name: HashMap::new(),
            tokens: Vec::new(),
            tokens_by_symbol: HashMap::new(),
            protocol_tokens: HashMap::new(),
            signer: None,
        }
    }

    /// Register every deployment, protocol token and external token in `config`.
    pub fn from_config(
        config: &ProtocolConfig,
        backend: Arc<dyn ChainBackend>,
    ) -> Result<Self, ProtocolError> {
        let network = NetworkIdentity::new(config.chain_id, config.rpc_url.clone());
        let mut registry = Self::new(network, backend);

        for (name, deployment) in &config.deployments {
            registry.register(name, deployment.address, deployment.role)?;
        }

        for token in ProtocolToken::ALL {
            let deployment = config.deployments.get(token.deployment_name()).ok_or_else(|| {
                ProtocolError::Config(format!("missing deployment {}", token.deployment_name()))
            })?;
            let symbol = config.symbols.symbol_of(token).to_string();
            let index = registry.register_token(symbol, deployment.address, PROTOCOL_DECIMALS)?;
            registry.protocol_tokens.insert(token, index);
        }

        for (symbol, external) in &config.external_tokens {
            registry.register_token(symbol.clone(), external.address(), external.decimals())?;
        }

        Ok(registry)
    }

    /// Create a handle for `name`. Handles registered after a signer was
    /// bound start out signer-bound.
    pub fn register(
        &mut self,
        name: &str,
        address: Address,
        role: ContractRole,
    ) -> Result<HandleId, ProtocolError> {
        if self.by_name.contains_key(name) {
            return Err(ProtocolError::Config(format!("duplicate contract name {name}")));
        }
        let id = HandleId(self.handles.len());
        self.handles
            .push(ContractHandle::new(name, address, role, self.binding.clone()));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn register_token(
        &mut self,
        symbol: String,
        address: Address,
        decimals: u8,
    ) -> Result<usize, ProtocolError> {
        check_decimals(decimals)?;
        if self.tokens_by_symbol.contains_key(&symbol) {
            return Err(ProtocolError::Config(format!("duplicate token symbol {symbol}")));
        }
        let index = self.tokens.len();
        self.tokens.push(TokenAccessor::new(
            symbol.clone(),
            address,
            decimals,
            self.binding.clone(),
        ));
        self.tokens_by_symbol.insert(symbol, index);
        Ok(index)
    }

    pub fn network(&self) -> &NetworkIdentity {
        &self.network
    }

    /// Backend for reads that do not go through a registered handle.
    pub fn read_backend(&self) -> &Arc<dyn ChainBackend> {
        &self.read_backend
    }

    pub fn id_of(&self, name: &str) -> Option<HandleId> {
        self.by_name.get(name).copied()
    }

    pub fn handle(&self, id: HandleId) -> &ContractHandle {
        &self.handles[id.0]
    }

    pub fn handles(&self) -> impl Iterator<Item = &ContractHandle> {
        self.handles.iter()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &TokenAccessor> {
        self.tokens.iter()
    }

    pub fn lookup(&self, name: &str) -> Result<&ContractHandle, ProtocolError> {
        self.id_of(name)
            .map(|id| self.handle(id))
            .ok_or_else(|| ProtocolError::UnknownContract(name.to_string()))
    }

    /// Look up `name` and check that it implements `role`.
    pub fn lookup_role(&self, name: &str, role: ContractRole) -> Result<&ContractHandle, ProtocolError> {
        let handle = self.lookup(name)?;
        if handle.role() != role {
            return Err(ProtocolError::RoleMismatch {
                name: name.to_string(),
                expected: role.to_string(),
                actual: handle.role().to_string(),
            });
        }
        Ok(handle)
    }

    pub fn token(&self, token: ProtocolToken) -> Result<&TokenAccessor, ProtocolError> {
        self.protocol_tokens
            .get(&token)
            .map(|&i| &self.tokens[i])
            .ok_or_else(|| ProtocolError::UnknownToken(token.deployment_name().to_string()))
    }

    pub fn external_token(&self, symbol: &str) -> Result<&TokenAccessor, ProtocolError> {
        self.tokens_by_symbol
            .get(symbol)
            .map(|&i| &self.tokens[i])
            .ok_or_else(|| ProtocolError::UnknownToken(symbol.to_string()))
    }

    pub fn signer(&self) -> Option<&SigningIdentity> {
        self.signer.as_ref()
    }

    pub fn account(&self) -> Option<Address> {
        self.binding.account()
    }

    pub fn is_signer_bound(&self) -> bool {
        self.signer.is_some()
    }

    /// Rebind every handle and token accessor to `signer`.
    ///
    /// The signing backend is created before any handle is touched, so a
    /// failure leaves the registry fully read-bound.
    pub fn bind_signer(&mut self, signer: SigningIdentity) -> Result<(), ProtocolError> {
        if self.signer.is_some() {
            return Err(ProtocolError::SignerAlreadyBound);
        }
        let backend = self.read_backend.connect(&signer)?;
        let binding = Binding::signed(backend, signer.address());

        for handle in &mut self.handles {
            handle.connect(&binding);
        }
        for token in &mut self.tokens {
            token.connect(&binding);
        }
        self.binding = binding;

        info!(
            "Signer bound: account={}, handles={}, tokens={}",
            signer.address(),
            self.handles.len(),
            self.tokens.len()
        );
        self.signer = Some(signer);
        Ok(())
    }
}
