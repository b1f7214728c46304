use std::fmt;

use alloy::primitives::B256;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Price and supply snapshot for one token.
///
/// `price_in_reference` is `None` when no market price could be obtained;
/// it is never filled with a placeholder number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStat {
    pub price_in_reference: Option<String>,
    pub total_supply: String,
}

impl TokenStat {
    pub fn is_price_available(&self) -> bool {
        self.price_in_reference.is_some()
    }
}

/// Cash, share and bond stats fetched together for a dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub cash: TokenStat,
    pub share: TokenStat,
    pub bond: TokenStat,
}

/// Bounds of the current treasury epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpochWindow {
    pub previous_allocation: DateTime<Utc>,
    pub next_allocation: DateTime<Utc>,
}

/// Which boardroom contract a staking call targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardroomVersion {
    Latest,
    Lp,
    V1,
    V2,
}

impl BoardroomVersion {
    /// Logical deployment name of the boardroom serving this version.
    pub fn contract_name(&self) -> &'static str {
        match self {
            BoardroomVersion::Latest => crate::registry::SHARE_BOARDROOM,
            BoardroomVersion::Lp => crate::registry::LP_BOARDROOM,
            BoardroomVersion::V1 => crate::registry::BOARDROOM_V1,
            BoardroomVersion::V2 => crate::registry::BOARDROOM_V2,
        }
    }
}

impl fmt::Display for BoardroomVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            BoardroomVersion::Latest => "latest",
            BoardroomVersion::Lp => "lp",
            BoardroomVersion::V1 => "v1",
            BoardroomVersion::V2 => "v2",
        };
        f.write_str(tag)
    }
}

/// Interface a deployed contract implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractRole {
    Token,
    Treasury,
    Oracle,
    Boardroom,
    RewardPool,
    Pair,
}

impl fmt::Display for ContractRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContractRole::Token => "token",
            ContractRole::Treasury => "treasury",
            ContractRole::Oracle => "oracle",
            ContractRole::Boardroom => "boardroom",
            ContractRole::RewardPool => "reward_pool",
            ContractRole::Pair => "pair",
        };
        f.write_str(name)
    }
}

/// The protocol's own tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolToken {
    Cash,
    Share,
    Bond,
    ShareLp,
}

impl ProtocolToken {
    pub const ALL: [ProtocolToken; 4] = [
        ProtocolToken::Cash,
        ProtocolToken::Share,
        ProtocolToken::Bond,
        ProtocolToken::ShareLp,
    ];

    /// Logical deployment name of the token contract.
    pub fn deployment_name(&self) -> &'static str {
        match self {
            ProtocolToken::Cash => "Cash",
            ProtocolToken::Share => "Share",
            ProtocolToken::Bond => "Bond",
            ProtocolToken::ShareLp => "ShareLp",
        }
    }
}

/// Outcome of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionOutcome {
    pub tx_hash: B256,
    pub block_number: Option<u64>,
    pub gas_used: Option<u64>,
    pub success: bool,
}
