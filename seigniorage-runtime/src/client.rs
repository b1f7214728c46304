//! The orchestration object handed to UI collaborators.
//!
//! `SeigniorageClient` owns the contract registry, the gas-adaptive issuer,
//! the DEX price route and the boardroom resolution state. Reads borrow it
//! shared; binding a signer borrows it exclusively, so no handle can be used
//! while the session is being rebound.

use std::sync::Arc;

use alloy::primitives::Address;

use crate::bank::StakingPool;
use crate::boardroom::{probe_or_latest, Boardroom, BoardroomResolution};
use crate::chain::{AlloyBackend, ChainBackend, NetworkIdentity, SigningIdentity};
use crate::config::{BankInfo, ProtocolConfig};
use crate::error::ProtocolError;
use crate::gas::GasAdaptiveIssuer;
use crate::price_route::{PriceRoute, RouteToken, UniswapV2Route};
use crate::registry::{ContractRegistry, TREASURY};
use crate::stats::StatEngine;
use crate::token::TokenAccessor;
use crate::treasury::Treasury;
use crate::types::{BoardroomVersion, ContractRole, ProtocolToken};

pub struct SeigniorageClient {
    config: ProtocolConfig,
    registry: ContractRegistry,
    issuer: GasAdaptiveIssuer,
    route: Arc<dyn PriceRoute>,
    reference: RouteToken,
    resolution: BoardroomResolution,
}

impl SeigniorageClient {
    /// Connect to `config.rpc_url` over HTTP with a Uniswap-V2 price route.
    pub fn connect(config: ProtocolConfig) -> Result<Self, ProtocolError> {
        let network = NetworkIdentity::new(config.chain_id, config.rpc_url.clone());
        let backend: Arc<dyn ChainBackend> = Arc::new(AlloyBackend::connect_http(&network)?);
        let route = Arc::new(UniswapV2Route::new(backend.clone(), config.dex_factory));
        Self::with_backend(config, backend, route)
    }

    /// Build a client over an existing backend and price route.
    pub fn with_backend(
        config: ProtocolConfig,
        backend: Arc<dyn ChainBackend>,
        route: Arc<dyn PriceRoute>,
    ) -> Result<Self, ProtocolError> {
        config.validate()?;
        let issuer = GasAdaptiveIssuer::new(config.gas_limit_multiplier)?;
        let registry = ContractRegistry::from_config(&config, backend)?;

        let reference_accessor = registry.external_token(&config.reference_token)?;
        let reference = RouteToken::new(
            reference_accessor.address(),
            reference_accessor.decimals(),
            reference_accessor.symbol(),
        );

        Ok(Self {
            config,
            registry,
            issuer,
            route,
            reference,
            resolution: BoardroomResolution::Unresolved,
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn registry(&self) -> &ContractRegistry {
        &self.registry
    }

    pub fn issuer(&self) -> &GasAdaptiveIssuer {
        &self.issuer
    }

    pub fn is_unlocked(&self) -> bool {
        self.registry.is_signer_bound()
    }

    pub fn account(&self) -> Option<Address> {
        self.registry.account()
    }

    /// Bind `signer` to every handle and resolve the boardroom to `latest`.
    pub fn bind_signer(&mut self, signer: SigningIdentity) -> Result<(), ProtocolError> {
        self.registry.bind_signer(signer)?;
        self.resolution.resolve(BoardroomVersion::Latest);
        Ok(())
    }

    /// Bind `signer`, then resolve the boardroom from any legacy position.
    pub async fn bind_signer_with_legacy_probe(
        &mut self,
        signer: SigningIdentity,
    ) -> Result<BoardroomVersion, ProtocolError> {
        let account = signer.address();
        self.registry.bind_signer(signer)?;
        let version = probe_or_latest(&self.registry, account).await;
        self.resolution.resolve(version);
        Ok(version)
    }

    pub fn boardroom_resolution(&self) -> BoardroomResolution {
        self.resolution
    }

    pub fn is_old_boardroom_member(&self) -> bool {
        matches!(
            self.resolution.version(),
            Some(v) if v != BoardroomVersion::Latest
        )
    }

    /// The boardroom this account's resolved version maps to.
    pub fn boardroom(&self) -> Result<Boardroom<'_>, ProtocolError> {
        let version = self
            .resolution
            .version()
            .ok_or_else(|| ProtocolError::unbound("boardroom"))?;
        Boardroom::select(&self.registry, version, &self.issuer)
    }

    pub fn lp_boardroom(&self) -> Result<Boardroom<'_>, ProtocolError> {
        if self.resolution.version().is_none() {
            return Err(ProtocolError::unbound("lp boardroom"));
        }
        Boardroom::select(&self.registry, BoardroomVersion::Lp, &self.issuer)
    }

    pub fn stats(&self) -> StatEngine<'_> {
        StatEngine::new(&self.registry, self.route.as_ref(), self.reference.clone())
    }

    pub fn treasury(&self) -> Result<Treasury<'_>, ProtocolError> {
        let handle = self.registry.lookup_role(TREASURY, ContractRole::Treasury)?;
        Ok(Treasury::new(handle, &self.issuer))
    }

    pub fn pool(&self, name: &str) -> Result<StakingPool<'_>, ProtocolError> {
        StakingPool::select(&self.registry, name, &self.issuer)
    }

    pub fn banks(&self) -> Vec<&BankInfo> {
        self.config.sorted_banks()
    }

    pub fn token(&self, token: ProtocolToken) -> Result<&TokenAccessor, ProtocolError> {
        self.registry.token(token)
    }

    pub fn external_token(&self, symbol: &str) -> Result<&TokenAccessor, ProtocolError> {
        self.registry.external_token(symbol)
    }
}
