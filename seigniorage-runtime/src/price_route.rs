//! Market prices from a Uniswap-V2-style DEX.
//!
//! A price route looks up the pair for (token, quote) through the factory,
//! reads its reserves and reports the spot mid-price of one `token`
//! expressed in `quote`, rounded to three significant digits.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::chain::{call_view, ChainBackend};
use crate::contracts::{IUniswapV2Factory, IUniswapV2Pair};
use crate::error::RouteError;

/// Fixed-point scale used while dividing reserves.
const PRICE_SCALE: u8 = 18;
const SIGNIFICANT_DIGITS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteToken {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
}

impl RouteToken {
    pub fn new(address: Address, decimals: u8, symbol: impl Into<String>) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.into(),
        }
    }
}

#[async_trait]
pub trait PriceRoute: Send + Sync {
    /// Spot mid-price of one `token` in units of `quote`.
    async fn mid_price(&self, token: &RouteToken, quote: &RouteToken) -> Result<Decimal, RouteError>;
}

pub struct UniswapV2Route {
    backend: Arc<dyn ChainBackend>,
    factory: Address,
}

impl UniswapV2Route {
    pub fn new(backend: Arc<dyn ChainBackend>, factory: Address) -> Self {
        Self { backend, factory }
    }
}

#[async_trait]
impl PriceRoute for UniswapV2Route {
    async fn mid_price(&self, token: &RouteToken, quote: &RouteToken) -> Result<Decimal, RouteError> {
        let backend = self.backend.as_ref();

        let pair = call_view(
            backend,
            self.factory,
            &IUniswapV2Factory::getPairCall {
                tokenA: token.address,
                tokenB: quote.address,
            },
        )
        .await?;
        if pair == Address::ZERO {
            return Err(RouteError::NoPair {
                base: token.symbol.clone(),
                quote: quote.symbol.clone(),
            });
        }

        let token0 = call_view(backend, pair, &IUniswapV2Pair::token0Call {}).await?;
        let reserves = call_view(backend, pair, &IUniswapV2Pair::getReservesCall {}).await?;
        let reserve0 = U256::from(reserves.reserve0);
        let reserve1 = U256::from(reserves.reserve1);

        let (reserve_token, reserve_quote) = if token0 == token.address {
            (reserve0, reserve1)
        } else {
            (reserve1, reserve0)
        };

        mid_price_from_reserves(reserve_token, token.decimals, reserve_quote, quote.decimals)
            .map_err(|e| match e {
                RouteError::InsufficientLiquidity(_) => {
                    RouteError::InsufficientLiquidity(format!("{}/{}", token.symbol, quote.symbol))
                }
                other => other,
            })
    }
}

/// Mid-price of the token whose reserve is `reserve_token`, in quote units.
pub fn mid_price_from_reserves(
    reserve_token: U256,
    token_decimals: u8,
    reserve_quote: U256,
    quote_decimals: u8,
) -> Result<Decimal, RouteError> {
    let empty = || RouteError::InsufficientLiquidity("empty reserves".into());
    if reserve_token.is_zero() || reserve_quote.is_zero() {
        return Err(empty());
    }

    let ten = U256::from(10u64);
    let out_of_range = || RouteError::InsufficientLiquidity("price out of range".into());

    let numerator = reserve_quote
        .checked_mul(ten.pow(U256::from(token_decimals)))
        .and_then(|n| n.checked_mul(ten.pow(U256::from(PRICE_SCALE))))
        .ok_or_else(out_of_range)?;
    let denominator = reserve_token
        .checked_mul(ten.pow(U256::from(quote_decimals)))
        .ok_or_else(out_of_range)?;

    let fixed = numerator / denominator;
    let mantissa = i128::try_from(fixed).map_err(|_| out_of_range())?;
    let price = Decimal::try_from_i128_with_scale(mantissa, PRICE_SCALE as u32)
        .map_err(|_| out_of_range())?;

    if price.is_zero() {
        return Err(empty());
    }

    Ok(price
        .round_sf_with_strategy(SIGNIFICANT_DIGITS, RoundingStrategy::MidpointAwayFromZero)
        .unwrap_or(price)
        .normalize())
}
