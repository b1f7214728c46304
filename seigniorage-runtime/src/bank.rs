use alloy::primitives::{Address, U256};

use crate::chain::PendingTransaction;
use crate::config::BankInfo;
use crate::contracts::IRewardPool;
use crate::error::ProtocolError;
use crate::gas::GasAdaptiveIssuer;
use crate::registry::{ContractHandle, ContractRegistry};
use crate::types::ContractRole;

/// A reward pool ("bank"). Amounts are base units of the deposit token.
pub struct StakingPool<'a> {
    handle: &'a ContractHandle,
    issuer: &'a GasAdaptiveIssuer,
}

impl<'a> StakingPool<'a> {
    pub fn select(
        registry: &'a ContractRegistry,
        name: &str,
        issuer: &'a GasAdaptiveIssuer,
    ) -> Result<Self, ProtocolError> {
        let handle = registry.lookup_role(name, ContractRole::RewardPool)?;
        Ok(Self { handle, issuer })
    }

    pub fn for_bank(
        registry: &'a ContractRegistry,
        bank: &BankInfo,
        issuer: &'a GasAdaptiveIssuer,
    ) -> Result<Self, ProtocolError> {
        Self::select(registry, &bank.contract, issuer)
    }

    pub fn name(&self) -> &str {
        self.handle.name()
    }

    pub async fn earned(&self, account: Address) -> Result<U256, ProtocolError> {
        self.handle.read(IRewardPool::earnedCall { account }).await
    }

    pub async fn staked_balance(&self, account: Address) -> Result<U256, ProtocolError> {
        self.handle.read(IRewardPool::balanceOfCall { account }).await
    }

    pub async fn stake(&self, amount: U256) -> Result<PendingTransaction, ProtocolError> {
        self.issuer
            .submit(self.handle, IRewardPool::stakeCall { amount })
            .await
    }

    pub async fn unstake(&self, amount: U256) -> Result<PendingTransaction, ProtocolError> {
        self.issuer
            .submit(self.handle, IRewardPool::withdrawCall { amount })
            .await
    }

    pub async fn harvest(&self) -> Result<PendingTransaction, ProtocolError> {
        self.issuer
            .submit(self.handle, IRewardPool::getRewardCall {})
            .await
    }

    /// Harvest and withdraw the whole deposit.
    pub async fn exit(&self) -> Result<PendingTransaction, ProtocolError> {
        self.issuer.submit(self.handle, IRewardPool::exitCall {}).await
    }
}
