//! Solidity bindings for every contract role the client talks to.
//!
//! Uses alloy's `sol!` macro to generate type-safe ABI encoders/decoders.
//! Calls are encoded here and dispatched through [`crate::chain::ChainBackend`],
//! so no binding carries its own provider.

use alloy::sol;

sol! {
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
    }

    interface ITreasury {
        function getStartTime() external view returns (uint256);
        function getPeriod() external view returns (uint256);
        function nextEpochPoint() external view returns (uint256);
        function getCurrentEpoch() external view returns (uint256);
        function getNextEpoch() external view returns (uint256);
        function getOraclePrice() external view returns (uint256);
        function getSeigniorageOraclePrice() external view returns (uint256);
        function allocateSeigniorage() external;
        function buyBonds(uint256 amount) external;
        function redeemBonds(uint256 amount) external;
    }

    interface ISeigniorageOracle {
        function expectedPrice(address token, uint256 amountIn) external view returns (uint256);
    }

    interface IBoardroom {
        function stake(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function claimReward() external;
        function exit() external;
        function balanceOf(address account) external view returns (uint256);
        function getShareOf(address account) external view returns (uint256);
        function earned(address account) external view returns (uint256);
        function canWithdraw(address account) external view returns (bool);
        function getCanWithdrawTime(address account) external view returns (uint256);
    }

    interface IRewardPool {
        function stake(uint256 amount) external;
        function withdraw(uint256 amount) external;
        function getReward() external;
        function exit() external;
        function earned(address account) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
    }

    interface IUniswapV2Factory {
        function getPair(address tokenA, address tokenB) external view returns (address pair);
    }

    interface IUniswapV2Pair {
        function token0() external view returns (address);
        function token1() external view returns (address);
        function getReserves() external view returns (uint112 reserve0, uint112 reserve1, uint32 blockTimestampLast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolCall;

    #[test]
    fn test_selectors_are_distinct_per_role() {
        assert_ne!(
            IBoardroom::withdrawCall::SELECTOR,
            IBoardroom::claimRewardCall::SELECTOR
        );
        assert_ne!(IRewardPool::getRewardCall::SELECTOR, IBoardroom::claimRewardCall::SELECTOR);
        // stake(uint256) shares a selector between boardrooms and reward pools.
        assert_eq!(IBoardroom::stakeCall::SELECTOR, IRewardPool::stakeCall::SELECTOR);
    }

    #[test]
    fn test_encode_approve() {
        let call = IERC20::approveCall {
            spender: Address::repeat_byte(0x11),
            amount: U256::from(1_000u64),
        };
        let data = call.abi_encode();
        assert_eq!(&data[..4], IERC20::approveCall::SELECTOR.as_slice());
        assert_eq!(data.len(), 4 + 32 * 2);
    }
}
