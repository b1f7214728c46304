//! Treasury epoch scheduling, seigniorage allocation and bond operations.
//!
//! Epoch values are derived from independent reads that may be served from
//! different blocks. `can_allocate` is a best-effort snapshot.

use alloy::primitives::U256;
use chrono::{DateTime, Utc};

use crate::chain::PendingTransaction;
use crate::contracts::ITreasury;
use crate::error::ProtocolError;
use crate::gas::GasAdaptiveIssuer;
use crate::registry::{ContractHandle, PROTOCOL_DECIMALS};
use crate::types::EpochWindow;
use crate::units::parse_units;

/// Convert an on-chain unix timestamp (seconds) to a `DateTime`.
pub fn timestamp_to_datetime(seconds: U256) -> Result<DateTime<Utc>, ProtocolError> {
    let secs = i64::try_from(seconds)
        .map_err(|_| ProtocolError::MalformedValue(format!("timestamp {seconds} out of range")))?;
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| ProtocolError::MalformedValue(format!("timestamp {secs} out of range")))
}

/// `previous_allocation = next_allocation - period`, unclamped.
pub fn allocation_window(next_epoch_point: U256, period: U256) -> Result<EpochWindow, ProtocolError> {
    let next = i64::try_from(next_epoch_point).map_err(|_| {
        ProtocolError::MalformedValue(format!("next epoch point {next_epoch_point} out of range"))
    })?;
    let period = i64::try_from(period)
        .map_err(|_| ProtocolError::MalformedValue(format!("period {period} out of range")))?;
    let previous = next.checked_sub(period).ok_or_else(|| {
        ProtocolError::MalformedValue(format!("epoch window {next} - {period} underflows"))
    })?;

    let at = |secs: i64| {
        DateTime::from_timestamp(secs, 0)
            .ok_or_else(|| ProtocolError::MalformedValue(format!("timestamp {secs} out of range")))
    };

    Ok(EpochWindow {
        previous_allocation: at(previous)?,
        next_allocation: at(next)?,
    })
}

/// True iff the start time has passed and the chain has not yet advanced
/// past the current epoch.
pub fn allocation_eligible(
    start_time: U256,
    current_epoch: U256,
    next_epoch: U256,
    now: DateTime<Utc>,
) -> bool {
    let now_ms = U256::from(now.timestamp_millis().max(0) as u64);
    let started = start_time
        .checked_mul(U256::from(1000u64))
        .is_some_and(|start_ms| start_ms < now_ms);
    started && current_epoch >= next_epoch
}

pub struct Treasury<'a> {
    handle: &'a ContractHandle,
    issuer: &'a GasAdaptiveIssuer,
}

impl<'a> Treasury<'a> {
    pub fn new(handle: &'a ContractHandle, issuer: &'a GasAdaptiveIssuer) -> Self {
        Self { handle, issuer }
    }

    pub fn handle(&self) -> &ContractHandle {
        self.handle
    }

    pub async fn start_time(&self) -> Result<U256, ProtocolError> {
        self.handle.read(ITreasury::getStartTimeCall {}).await
    }

    pub async fn current_epoch(&self) -> Result<U256, ProtocolError> {
        self.handle.read(ITreasury::getCurrentEpochCall {}).await
    }

    pub async fn next_epoch(&self) -> Result<U256, ProtocolError> {
        self.handle.read(ITreasury::getNextEpochCall {}).await
    }

    pub async fn period(&self) -> Result<U256, ProtocolError> {
        self.handle.read(ITreasury::getPeriodCall {}).await
    }

    pub async fn next_epoch_point(&self) -> Result<U256, ProtocolError> {
        self.handle.read(ITreasury::nextEpochPointCall {}).await
    }

    /// Previous and next seigniorage allocation times.
    pub async fn next_allocation_window(&self) -> Result<EpochWindow, ProtocolError> {
        let (next, period) = futures::try_join!(self.next_epoch_point(), self.period())?;
        allocation_window(next, period)
    }

    pub async fn can_allocate(&self) -> Result<bool, ProtocolError> {
        self.can_allocate_at(Utc::now()).await
    }

    pub async fn can_allocate_at(&self, now: DateTime<Utc>) -> Result<bool, ProtocolError> {
        let (start, current, next) =
            futures::try_join!(self.start_time(), self.current_epoch(), self.next_epoch())?;
        Ok(allocation_eligible(start, current, next, now))
    }

    /// Trigger the supply rebase for the current epoch.
    pub async fn allocate(&self) -> Result<PendingTransaction, ProtocolError> {
        self.issuer
            .submit(self.handle, ITreasury::allocateSeigniorageCall {})
            .await
    }

    /// Buy bonds with `amount` cash (human-readable).
    pub async fn buy_bonds(&self, amount: &str) -> Result<PendingTransaction, ProtocolError> {
        let amount = parse_units(amount, PROTOCOL_DECIMALS)?;
        self.issuer
            .submit(self.handle, ITreasury::buyBondsCall { amount })
            .await
    }

    /// Redeem `amount` bonds (human-readable) for cash.
    pub async fn redeem_bonds(&self, amount: &str) -> Result<PendingTransaction, ProtocolError> {
        let amount = parse_units(amount, PROTOCOL_DECIMALS)?;
        self.issuer
            .submit(self.handle, ITreasury::redeemBondsCall { amount })
            .await
    }
}
