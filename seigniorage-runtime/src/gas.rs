//! Gas-adaptive transaction submission.
//!
//! Every mutating call is dry-run first; the estimate is scaled by the
//! configured multiplier, truncated to an integer, and sent as an explicit
//! gas limit. A single attempt is made. Failures are returned unchanged.

use alloy::primitives::Bytes;
use alloy::sol_types::SolCall;
use tracing::{debug, info};

use crate::chain::PendingTransaction;
use crate::error::ProtocolError;
use crate::registry::{method_name, ContractHandle};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GasAdaptiveIssuer {
    multiplier: f64,
}

impl GasAdaptiveIssuer {
    pub fn new(multiplier: f64) -> Result<Self, ProtocolError> {
        if !multiplier.is_finite() || multiplier < 1.0 {
            return Err(ProtocolError::Config(format!(
                "gas limit multiplier must be a finite value >= 1.0, got {multiplier}"
            )));
        }
        Ok(Self { multiplier })
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Scale an estimate by the multiplier and truncate.
    ///
    /// The product is computed in `f64` and floored, not rounded.
    pub fn gas_limit(&self, estimate: u64) -> u64 {
        (estimate as f64 * self.multiplier).floor() as u64
    }

    /// Estimate, scale and submit `call` against `handle`.
    pub async fn submit<C>(
        &self,
        handle: &ContractHandle,
        call: C,
    ) -> Result<PendingTransaction, ProtocolError>
    where
        C: SolCall + Send + Sync,
    {
        let method = method_name::<C>();
        let from = handle
            .account()
            .ok_or_else(|| ProtocolError::unbound(format!("{}.{method}", handle.name())))?;

        let submission_error = |message: String| ProtocolError::TransactionSubmission {
            contract: handle.name().to_string(),
            method: method.to_string(),
            message,
        };

        let input = Bytes::from(call.abi_encode());
        let backend = handle.backend();

        let estimate = backend
            .estimate_gas(from, handle.address(), input.clone())
            .await
            .map_err(|e| submission_error(format!("Gas estimation failed: {e}")))?;
        let gas_limit = self.gas_limit(estimate);
        debug!("Gas multiplied for {}.{method}: {estimate} -> {gas_limit}", handle.name());

        let tx_hash = backend
            .send_transaction(from, handle.address(), input, gas_limit)
            .await
            .map_err(|e| submission_error(format!("Transaction send failed: {e}")))?;

        let pending = PendingTransaction::new(
            tx_hash,
            handle.name().to_string(),
            method,
            backend.clone(),
        );
        info!(
            "Submitted {}.{method}: tx={}, gas_limit={gas_limit}",
            handle.name(),
            pending.tx_hash_hex()
        );
        Ok(pending)
    }
}
