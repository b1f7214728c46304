mod common;

use alloy::primitives::U256;
use alloy::sol_types::SolCall;
use common::*;
use seigniorage_runtime::contracts::{IBoardroom, IERC20, IRewardPool};
use seigniorage_runtime::{BoardroomVersion, ProtocolError, ProtocolToken};

#[tokio::test]
async fn test_boardroom_stake_and_withdraw() {
    let chain = MockChain::new();
    chain.estimate::<IBoardroom::stakeCall>(SHARE_BOARDROOM, 100_000);
    let mut client = client(&chain);
    client.bind_signer(signer()).unwrap();

    let boardroom = client.boardroom().unwrap();
    assert_eq!(boardroom.version(), BoardroomVersion::Latest);
    boardroom.stake("1.5").await.unwrap();
    boardroom.withdraw("0.5").await.unwrap();

    let sent = chain.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().all(|tx| tx.to == SHARE_BOARDROOM));

    let stake = IBoardroom::stakeCall::abi_decode(&sent[0].input).unwrap();
    assert_eq!(stake.amount, wad(3) / U256::from(2u64));
    assert_eq!(sent[0].gas_limit, 110_000);

    let withdraw = IBoardroom::withdrawCall::abi_decode(&sent[1].input).unwrap();
    assert_eq!(withdraw.amount, wad(1) / U256::from(2u64));
}

#[tokio::test]
async fn test_boardroom_harvest_and_exit() {
    let chain = MockChain::new();
    let mut client = client(&chain);
    client.bind_signer(signer()).unwrap();

    let lp = client.lp_boardroom().unwrap();
    assert_eq!(lp.version(), BoardroomVersion::Lp);
    let harvest = lp.harvest().await.unwrap();
    assert_eq!(harvest.method(), "claimReward");
    let exit = lp.exit().await.unwrap();
    assert_eq!(exit.method(), "exit");

    let selectors: Vec<_> = chain.sent().iter().map(|tx| (tx.to, tx.selector)).collect();
    assert_eq!(
        selectors,
        vec![
            (LP_BOARDROOM, IBoardroom::claimRewardCall::SELECTOR),
            (LP_BOARDROOM, IBoardroom::exitCall::SELECTOR),
        ]
    );
}

#[tokio::test]
async fn test_boardroom_reads() {
    let chain = MockChain::new();
    chain.on::<IBoardroom::earnedCall, _>(SHARE_BOARDROOM, wad(4));
    chain.on::<IBoardroom::balanceOfCall, _>(SHARE_BOARDROOM, wad(10));
    chain.on::<IBoardroom::canWithdrawCall, _>(SHARE_BOARDROOM, false);
    chain.on::<IBoardroom::getCanWithdrawTimeCall, _>(SHARE_BOARDROOM, U256::from(1_607_644_800u64));
    let mut client = client(&chain);
    let identity = signer();
    let account = identity.address();
    client.bind_signer(identity).unwrap();

    let boardroom = client.boardroom().unwrap();
    assert_eq!(boardroom.earned(account).await.unwrap(), wad(4));
    assert_eq!(boardroom.staked_balance(account).await.unwrap(), wad(10));
    assert!(!boardroom.can_withdraw(account).await.unwrap());
    assert_eq!(
        boardroom.withdraw_unlock_time(account).await.unwrap().timestamp(),
        1_607_644_800
    );
}

#[tokio::test]
async fn test_bank_operations_use_gas_adaptation() {
    let chain = MockChain::new();
    chain.estimate::<IRewardPool::stakeCall>(CASH_LP_POOL, 100_000);
    chain.estimate::<IRewardPool::getRewardCall>(CASH_LP_POOL, 40_000);
    let mut client = client(&chain);
    client.bind_signer(signer()).unwrap();

    let banks = client.banks();
    assert_eq!(banks.len(), 1);
    let pool = client.pool(&banks[0].contract).unwrap();
    assert_eq!(pool.name(), "CashLpPool");

    pool.stake(wad(2)).await.unwrap();
    pool.unstake(wad(1)).await.unwrap();
    pool.harvest().await.unwrap();
    pool.exit().await.unwrap();

    let sent = chain.sent();
    let gas: Vec<u64> = sent.iter().map(|tx| tx.gas_limit).collect();
    assert_eq!(gas, vec![110_000, 55_000, 44_000, 55_000]);
    assert_eq!(sent[1].selector, IRewardPool::withdrawCall::SELECTOR);
    assert_eq!(sent[2].selector, IRewardPool::getRewardCall::SELECTOR);
}

#[tokio::test]
async fn test_bank_reads_propagate_errors() {
    let chain = MockChain::new();
    chain.on::<IRewardPool::earnedCall, _>(CASH_LP_POOL, wad(9));
    chain.fail::<IRewardPool::balanceOfCall>(CASH_LP_POOL, "execution reverted");
    let client = client(&chain);
    let account = signer().address();

    let pool = client.pool("CashLpPool").unwrap();
    assert_eq!(pool.earned(account).await.unwrap(), wad(9));
    assert!(matches!(
        pool.staked_balance(account).await,
        Err(ProtocolError::RemoteRead { .. })
    ));
}

#[tokio::test]
async fn test_pool_lookup_checks_role() {
    let chain = MockChain::new();
    let client = client(&chain);

    assert!(matches!(
        client.pool("Treasury").err().unwrap(),
        ProtocolError::RoleMismatch { .. }
    ));
    assert!(matches!(
        client.pool("NoSuchPool").err().unwrap(),
        ProtocolError::UnknownContract(_)
    ));
}

#[tokio::test]
async fn test_token_approve_and_balances() {
    let chain = MockChain::new();
    chain.estimate::<IERC20::approveCall>(SHARE, 100_000);
    chain.on::<IERC20::balanceOfCall, _>(SHARE, U256::from(1_450_000_000_000_000_000u128));
    chain.on::<IERC20::allowanceCall, _>(SHARE, U256::MAX);
    chain.on::<IERC20::balanceOfCall, _>(HUSD, U256::from(250_000_000u64));
    let mut client = client(&chain);
    let identity = signer();
    let account = identity.address();
    client.bind_signer(identity).unwrap();

    let share = client.token(ProtocolToken::Share).unwrap();
    assert_eq!(share.symbol(), "GOS");
    assert_eq!(share.balance_of(account).await.unwrap(), "1.45");

    share
        .approve(client.issuer(), SHARE_BOARDROOM, "100")
        .await
        .unwrap();
    share
        .approve_unlimited(client.issuer(), SHARE_BOARDROOM)
        .await
        .unwrap();

    let sent = chain.sent();
    let limited = IERC20::approveCall::abi_decode(&sent[0].input).unwrap();
    assert_eq!(limited.spender, SHARE_BOARDROOM);
    assert_eq!(limited.amount, wad(100));
    assert_eq!(sent[0].gas_limit, 110_000);
    let unlimited = IERC20::approveCall::abi_decode(&sent[1].input).unwrap();
    assert_eq!(unlimited.amount, U256::MAX);

    assert!(share.allowance(account, SHARE_BOARDROOM).await.is_ok());

    let husd = client.external_token("HUSD").unwrap();
    assert_eq!(husd.decimals(), 8);
    assert_eq!(husd.balance_of(account).await.unwrap(), "2.5");
    assert_eq!(husd.display_balance_of(account, 4).await.unwrap(), "2.5000");
    assert_eq!(share.display_balance_of(account, 1).await.unwrap(), "1.4");
}

#[tokio::test]
async fn test_unknown_external_token() {
    let chain = MockChain::new();
    let client = client(&chain);

    assert!(matches!(
        client.external_token("USDT"),
        Err(ProtocolError::UnknownToken(_))
    ));
}
