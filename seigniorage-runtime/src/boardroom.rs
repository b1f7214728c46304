//! Versioned boardroom staking.
//!
//! A session starts [`BoardroomResolution::Unresolved`]. Binding a signer
//! resolves it to a [`BoardroomVersion`] exactly once; after that the
//! resolution never changes. The LP boardroom is addressed by its fixed
//! version and is available whenever the primary resolution is.

use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::chain::PendingTransaction;
use crate::contracts::IBoardroom;
use crate::error::ProtocolError;
use crate::gas::GasAdaptiveIssuer;
use crate::registry::{ContractHandle, ContractRegistry, PROTOCOL_DECIMALS};
use crate::treasury::timestamp_to_datetime;
use crate::types::{BoardroomVersion, ContractRole};
use crate::units::parse_units;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoardroomResolution {
    #[default]
    Unresolved,
    Resolved(BoardroomVersion),
}

impl BoardroomResolution {
    pub fn version(&self) -> Option<BoardroomVersion> {
        match self {
            BoardroomResolution::Unresolved => None,
            BoardroomResolution::Resolved(v) => Some(*v),
        }
    }

    /// Move to `Resolved(version)`. Returns false, leaving the state
    /// untouched, if already resolved.
    pub fn resolve(&mut self, version: BoardroomVersion) -> bool {
        match self {
            BoardroomResolution::Unresolved => {
                *self = BoardroomResolution::Resolved(version);
                info!("Boardroom version resolved: {version}");
                true
            }
            BoardroomResolution::Resolved(_) => false,
        }
    }
}

/// Check the legacy boardrooms for an existing position of `account`.
///
/// `Boardroom1` is consulted first via `getShareOf`, then `Boardroom2` via
/// `balanceOf`. Legacy boardrooms absent from the registry are skipped.
pub async fn probe_legacy_version(
    registry: &ContractRegistry,
    account: Address,
) -> Result<BoardroomVersion, ProtocolError> {
    if let Some(id) = registry.id_of(BoardroomVersion::V1.contract_name()) {
        let staked = registry
            .handle(id)
            .read(IBoardroom::getShareOfCall { account })
            .await?;
        if !staked.is_zero() {
            info!("Account {account} is using boardroom v1 (staked {staked})");
            return Ok(BoardroomVersion::V1);
        }
    }
    if let Some(id) = registry.id_of(BoardroomVersion::V2.contract_name()) {
        let staked = registry
            .handle(id)
            .read(IBoardroom::balanceOfCall { account })
            .await?;
        if !staked.is_zero() {
            info!("Account {account} is using boardroom v2 (staked {staked})");
            return Ok(BoardroomVersion::V2);
        }
    }
    Ok(BoardroomVersion::Latest)
}

/// Probe legacy boardrooms, falling back to `Latest` on read failure.
pub async fn probe_or_latest(registry: &ContractRegistry, account: Address) -> BoardroomVersion {
    match probe_legacy_version(registry, account).await {
        Ok(version) => version,
        Err(e) => {
            warn!("Failed to fetch boardroom version: {e}");
            BoardroomVersion::Latest
        }
    }
}

/// One boardroom contract, selected by version.
pub struct Boardroom<'a> {
    handle: &'a ContractHandle,
    version: BoardroomVersion,
    issuer: &'a GasAdaptiveIssuer,
}

impl<'a> Boardroom<'a> {
    /// Only reachable through the client, which gates on the resolution.
    pub(crate) fn select(
        registry: &'a ContractRegistry,
        version: BoardroomVersion,
        issuer: &'a GasAdaptiveIssuer,
    ) -> Result<Self, ProtocolError> {
        let handle = registry.lookup_role(version.contract_name(), ContractRole::Boardroom)?;
        Ok(Self {
            handle,
            version,
            issuer,
        })
    }

    pub fn version(&self) -> BoardroomVersion {
        self.version
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    /// Stake `amount` shares (human-readable).
    pub async fn stake(&self, amount: &str) -> Result<PendingTransaction, ProtocolError> {
        let amount = parse_units(amount, PROTOCOL_DECIMALS)?;
        self.issuer
            .submit(self.handle, IBoardroom::stakeCall { amount })
            .await
    }

    /// Withdraw `amount` staked shares (human-readable). Reverts on-chain
    /// while the withdrawal lock is active.
    pub async fn withdraw(&self, amount: &str) -> Result<PendingTransaction, ProtocolError> {
        let amount = parse_units(amount, PROTOCOL_DECIMALS)?;
        self.issuer
            .submit(self.handle, IBoardroom::withdrawCall { amount })
            .await
    }

    pub async fn harvest(&self) -> Result<PendingTransaction, ProtocolError> {
        self.issuer
            .submit(self.handle, IBoardroom::claimRewardCall {})
            .await
    }

    /// Harvest and withdraw everything in one transaction.
    pub async fn exit(&self) -> Result<PendingTransaction, ProtocolError> {
        self.issuer.submit(self.handle, IBoardroom::exitCall {}).await
    }

    pub async fn earned(&self, account: Address) -> Result<U256, ProtocolError> {
        self.handle.read(IBoardroom::earnedCall { account }).await
    }

    pub async fn staked_balance(&self, account: Address) -> Result<U256, ProtocolError> {
        match self.version {
            BoardroomVersion::V1 => self.handle.read(IBoardroom::getShareOfCall { account }).await,
            _ => self.handle.read(IBoardroom::balanceOfCall { account }).await,
        }
    }

    pub async fn can_withdraw(&self, account: Address) -> Result<bool, ProtocolError> {
        self.handle.read(IBoardroom::canWithdrawCall { account }).await
    }

    /// When `account`'s stake becomes withdrawable.
    pub async fn withdraw_unlock_time(&self, account: Address) -> Result<DateTime<Utc>, ProtocolError> {
        let secs = self
            .handle
            .read(IBoardroom::getCanWithdrawTimeCall { account })
            .await?;
        timestamp_to_datetime(secs)
    }
}
