//! Price & stat queries for the cash, share and bond tokens.
//!
//! All queries are read-only and produce a fresh [`TokenStat`] per call.
//! A market price that cannot be routed is reported as unavailable; every
//! other read failure propagates.

use alloy::primitives::U256;
use tracing::warn;

use crate::contracts::{ISeigniorageOracle, ITreasury};
use crate::error::ProtocolError;
use crate::price_route::{PriceRoute, RouteToken};
use crate::registry::{ContractHandle, ContractRegistry, SEIGNIORAGE_ORACLE, TREASURY};
use crate::token::TokenAccessor;
use crate::types::{ContractRole, DashboardStats, ProtocolToken, TokenStat};
use crate::units::format_units;

/// Decimal places of the oracle's fixed-point prices.
pub const ORACLE_PRICE_DECIMALS: u8 = 18;

/// Bond price derived from the cash oracle price: `price^2 / 10^18`.
pub fn bond_price(oracle_price: U256) -> Result<U256, ProtocolError> {
    let scale = U256::from(10u64).pow(U256::from(ORACLE_PRICE_DECIMALS));
    oracle_price
        .checked_mul(oracle_price)
        .map(|squared| squared / scale)
        .ok_or_else(|| ProtocolError::MalformedValue(format!("oracle price {oracle_price} overflows")))
}

pub struct StatEngine<'a> {
    registry: &'a ContractRegistry,
    route: &'a dyn PriceRoute,
    reference: RouteToken,
}

impl<'a> StatEngine<'a> {
    pub fn new(registry: &'a ContractRegistry, route: &'a dyn PriceRoute, reference: RouteToken) -> Self {
        Self {
            registry,
            route,
            reference,
        }
    }

    pub fn reference(&self) -> &RouteToken {
        &self.reference
    }

    /// Live DEX price against the reference token, or `None` when the route
    /// lookup fails for any reason.
    pub async fn market_price(&self, token: &TokenAccessor) -> Option<String> {
        let route_token = RouteToken::new(token.address(), token.decimals(), token.symbol());
        match self.route.mid_price(&route_token, &self.reference).await {
            Ok(price) => Some(price.to_string()),
            Err(e) => {
                warn!("Failed to fetch token price of {}: {e}", token.symbol());
                None
            }
        }
    }

    /// Total supply plus live DEX price for `token`.
    pub async fn market_stat(&self, token: &TokenAccessor) -> Result<TokenStat, ProtocolError> {
        let (supply, price) = futures::join!(token.total_supply(), self.market_price(token));
        Ok(TokenStat {
            price_in_reference: price,
            total_supply: supply?,
        })
    }

    /// Total supply plus the seigniorage oracle's time-weighted price for
    /// one whole `token`, expressed in reference-token units.
    pub async fn oracle_stat(&self, token: ProtocolToken) -> Result<TokenStat, ProtocolError> {
        let accessor = self.registry.token(token)?;
        let oracle = self
            .registry
            .lookup_role(SEIGNIORAGE_ORACLE, ContractRole::Oracle)?;
        let one = U256::from(10u64).pow(U256::from(accessor.decimals()));

        let (price, supply) = futures::try_join!(
            oracle.read(ISeigniorageOracle::expectedPriceCall {
                token: accessor.address(),
                amountIn: one,
            }),
            accessor.total_supply(),
        )?;

        Ok(TokenStat {
            price_in_reference: Some(format_units(price, self.reference.decimals)?),
            total_supply: supply,
        })
    }

    pub async fn cash_stat(&self) -> Result<TokenStat, ProtocolError> {
        self.market_stat(self.registry.token(ProtocolToken::Cash)?).await
    }

    pub async fn share_stat(&self) -> Result<TokenStat, ProtocolError> {
        self.market_stat(self.registry.token(ProtocolToken::Share)?).await
    }

    /// Estimated cash price over the oracle's current TWAP window.
    pub async fn cash_stat_in_estimated_twap(&self) -> Result<TokenStat, ProtocolError> {
        self.oracle_stat(ProtocolToken::Cash).await
    }

    /// Cash price from the treasury's seigniorage oracle, 18-decimal fixed point.
    pub async fn cash_price_in_last_twap(&self) -> Result<U256, ProtocolError> {
        self.treasury()?
            .read(ITreasury::getSeigniorageOraclePriceCall {})
            .await
    }

    /// Cash price from the treasury's bond oracle, 18-decimal fixed point.
    pub async fn oracle_price_in_last_twap(&self) -> Result<U256, ProtocolError> {
        self.treasury()?.read(ITreasury::getOraclePriceCall {}).await
    }

    /// Bond stat. The price is derived from the treasury oracle price, not
    /// read from a market.
    pub async fn bond_stat(&self) -> Result<TokenStat, ProtocolError> {
        let bond = self.registry.token(ProtocolToken::Bond)?;
        let (cash_price, supply) =
            futures::try_join!(self.oracle_price_in_last_twap(), bond.total_supply())?;

        Ok(TokenStat {
            price_in_reference: Some(format_units(bond_price(cash_price)?, ORACLE_PRICE_DECIMALS)?),
            total_supply: supply,
        })
    }

    /// Cash, share and bond stats queried concurrently.
    pub async fn dashboard(&self) -> Result<DashboardStats, ProtocolError> {
        let (cash, share, bond) =
            futures::try_join!(self.cash_stat(), self.share_stat(), self.bond_stat())?;
        Ok(DashboardStats { cash, share, bond })
    }

    fn treasury(&self) -> Result<&'a ContractHandle, ProtocolError> {
        self.registry.lookup_role(TREASURY, ContractRole::Treasury)
    }
}
