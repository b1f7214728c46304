//! Typed accessor for one ERC-20 token.
//!
//! The token's decimal count is authoritative for every conversion between
//! base units and human-readable strings. Reads are never cached.

use alloy::primitives::{Address, U256};

use crate::chain::PendingTransaction;
use crate::contracts::IERC20;
use crate::error::ProtocolError;
use crate::gas::GasAdaptiveIssuer;
use crate::registry::{Binding, ContractHandle};
use crate::types::ContractRole;
use crate::units::{display_balance, format_units, parse_units};

#[derive(Clone, Debug)]
pub struct TokenAccessor {
    handle: ContractHandle,
    symbol: String,
    decimals: u8,
}

impl TokenAccessor {
    pub fn new(symbol: String, address: Address, decimals: u8, binding: Binding) -> Self {
        Self {
            handle: ContractHandle::new(symbol.clone(), address, ContractRole::Token, binding),
            symbol,
            decimals,
        }
    }

    pub fn address(&self) -> Address {
        self.handle.address()
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn decimals(&self) -> u8 {
        self.decimals
    }

    pub fn handle(&self) -> &ContractHandle {
        &self.handle
    }

    /// Rebind this accessor only.
    pub fn connect(&mut self, binding: &Binding) {
        self.handle.connect(binding);
    }

    pub fn parse_amount(&self, amount: &str) -> Result<U256, ProtocolError> {
        parse_units(amount, self.decimals)
    }

    pub fn format_amount(&self, raw: U256) -> Result<String, ProtocolError> {
        format_units(raw, self.decimals)
    }

    pub async fn raw_balance_of(&self, account: Address) -> Result<U256, ProtocolError> {
        self.handle.read(IERC20::balanceOfCall { account }).await
    }

    pub async fn balance_of(&self, account: Address) -> Result<String, ProtocolError> {
        self.format_amount(self.raw_balance_of(account).await?)
    }

    /// Balance truncated to `fraction_digits` places for display.
    pub async fn display_balance_of(
        &self,
        account: Address,
        fraction_digits: u8,
    ) -> Result<String, ProtocolError> {
        display_balance(self.raw_balance_of(account).await?, self.decimals, fraction_digits)
    }

    pub async fn raw_total_supply(&self) -> Result<U256, ProtocolError> {
        self.handle.read(IERC20::totalSupplyCall {}).await
    }

    pub async fn total_supply(&self) -> Result<String, ProtocolError> {
        self.format_amount(self.raw_total_supply().await?)
    }

    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<String, ProtocolError> {
        let raw = self.handle.read(IERC20::allowanceCall { owner, spender }).await?;
        self.format_amount(raw)
    }

    /// Approve `spender` for `amount` (human-readable, in this token's units).
    pub async fn approve(
        &self,
        issuer: &GasAdaptiveIssuer,
        spender: Address,
        amount: &str,
    ) -> Result<PendingTransaction, ProtocolError> {
        let amount = self.parse_amount(amount)?;
        issuer
            .submit(&self.handle, IERC20::approveCall { spender, amount })
            .await
    }

    /// Approve `spender` for the maximum representable amount.
    pub async fn approve_unlimited(
        &self,
        issuer: &GasAdaptiveIssuer,
        spender: Address,
    ) -> Result<PendingTransaction, ProtocolError> {
        issuer
            .submit(
                &self.handle,
                IERC20::approveCall {
                    spender,
                    amount: U256::MAX,
                },
            )
            .await
    }
}
