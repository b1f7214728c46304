//! Deployment configuration consumed by the client.
//!
//! The configuration is plain data: logical contract names mapped to
//! addresses and roles, external tokens with their decimal counts, launch
//! timestamps, polling cadence and the gas-limit multiplier.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::registry::{LP_BOARDROOM, SEIGNIORAGE_ORACLE, SHARE_BOARDROOM, TREASURY};
use crate::types::{ContractRole, ProtocolToken};
use crate::units::MAX_DECIMALS;

/// A deployed contract: where it lives and which interface it speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    pub address: Address,
    pub role: ContractRole,
}

/// An external token as `[address, decimals]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalToken(pub Address, pub u8);

impl ExternalToken {
    pub fn address(&self) -> Address {
        self.0
    }

    pub fn decimals(&self) -> u8 {
        self.1
    }
}

/// Display symbols of the protocol tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSymbols {
    pub cash: String,
    pub share: String,
    pub bond: String,
    pub share_lp: String,
}

impl Default for TokenSymbols {
    fn default() -> Self {
        Self {
            cash: "CASH".into(),
            share: "SHARE".into(),
            bond: "BOND".into(),
            share_lp: "SHARE-LP".into(),
        }
    }
}

impl TokenSymbols {
    pub fn symbol_of(&self, token: ProtocolToken) -> &str {
        match token {
            ProtocolToken::Cash => &self.cash,
            ProtocolToken::Share => &self.share,
            ProtocolToken::Bond => &self.bond,
            ProtocolToken::ShareLp => &self.share_lp,
        }
    }
}

/// A reward pool ("bank") that accepts a deposit token and pays out rewards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankInfo {
    pub name: String,
    pub contract: String,
    pub deposit_token_name: String,
    pub earn_token_name: String,
    #[serde(default)]
    pub finished: bool,
    pub sort: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolConfig {
    pub chain_id: u64,
    pub rpc_url: String,
    pub deployments: BTreeMap<String, Deployment>,
    pub external_tokens: BTreeMap<String, ExternalToken>,
    /// Symbol (key of `external_tokens`) of the stable token prices are quoted in.
    pub reference_token: String,
    pub dex_factory: Address,
    #[serde(default)]
    pub symbols: TokenSymbols,
    pub base_launch_date: DateTime<Utc>,
    pub bond_launches_at: DateTime<Utc>,
    pub boardroom_launches_at: DateTime<Utc>,
    pub refresh_interval_ms: u64,
    pub gas_limit_multiplier: f64,
    #[serde(default)]
    pub banks: Vec<BankInfo>,
}

impl ProtocolConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ProtocolError> {
        let config: ProtocolConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProtocolError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ProtocolError::Config(format!("Cannot read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Check the invariants the client relies on.
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if !self.gas_limit_multiplier.is_finite() || self.gas_limit_multiplier < 1.0 {
            return Err(ProtocolError::Config(format!(
                "gas_limit_multiplier must be a finite value >= 1.0, got {}",
                self.gas_limit_multiplier
            )));
        }
        if self.refresh_interval_ms == 0 {
            return Err(ProtocolError::Config("refresh_interval_ms must be > 0".into()));
        }
        self.rpc_url
            .parse::<url::Url>()
            .map_err(|e| ProtocolError::Config(format!("Invalid RPC URL: {e}")))?;

        for token in ProtocolToken::ALL {
            self.require(token.deployment_name(), ContractRole::Token)?;
        }
        self.require(TREASURY, ContractRole::Treasury)?;
        self.require(SEIGNIORAGE_ORACLE, ContractRole::Oracle)?;
        self.require(SHARE_BOARDROOM, ContractRole::Boardroom)?;
        self.require(LP_BOARDROOM, ContractRole::Boardroom)?;

        for (symbol, token) in &self.external_tokens {
            if token.decimals() > MAX_DECIMALS {
                return Err(ProtocolError::Config(format!(
                    "external token {symbol} has {} decimals, max is {MAX_DECIMALS}",
                    token.decimals()
                )));
            }
        }
        if !self.external_tokens.contains_key(&self.reference_token) {
            return Err(ProtocolError::Config(format!(
                "reference token {} is not listed in external_tokens",
                self.reference_token
            )));
        }
        for bank in &self.banks {
            self.require(&bank.contract, ContractRole::RewardPool)?;
        }
        Ok(())
    }

    fn require(&self, name: &str, role: ContractRole) -> Result<(), ProtocolError> {
        match self.deployments.get(name) {
            None => Err(ProtocolError::Config(format!("missing deployment {name}"))),
            Some(d) if d.role != role => Err(ProtocolError::RoleMismatch {
                name: name.to_string(),
                expected: role.to_string(),
                actual: d.role.to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn reference(&self) -> Option<ExternalToken> {
        self.external_tokens.get(&self.reference_token).copied()
    }

    pub fn bond_launched(&self, now: DateTime<Utc>) -> bool {
        now >= self.bond_launches_at
    }

    pub fn boardroom_launched(&self, now: DateTime<Utc>) -> bool {
        now >= self.boardroom_launches_at
    }

    /// Bank definitions ordered for display.
    pub fn sorted_banks(&self) -> Vec<&BankInfo> {
        let mut banks: Vec<&BankInfo> = self.banks.iter().collect();
        banks.sort_by_key(|b| b.sort);
        banks
    }
}
