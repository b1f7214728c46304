use seigniorage_runtime::chain::SigningIdentity;
use seigniorage_runtime::config::ProtocolConfig;
use seigniorage_runtime::{ProtocolError, ProtocolToken, SeigniorageClient};

/// Fraction digits shown for wallet balances.
const BALANCE_DIGITS: u8 = 4;

fn setup_log() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};
    if tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .is_err()
    {}
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

#[tokio::main]
async fn main() -> Result<(), ProtocolError> {
    setup_log();

    let config_path =
        std::env::var("SEIGNIORAGE_CONFIG").unwrap_or_else(|_| "seigniorage.json".to_string());
    let mut config = ProtocolConfig::from_file(&config_path)?;
    if let Ok(rpc_url) = std::env::var("RPC_URL") {
        config = config.with_rpc_url(rpc_url);
    }
    let auto_allocate = env_flag("AUTO_ALLOCATE");

    tracing::info!(
        "Seigniorage monitor: config={config_path}, chain_id={}, rpc={}, refresh={}ms",
        config.chain_id,
        config.rpc_url,
        config.refresh_interval_ms,
    );

    let interval_period = config.refresh_interval();
    let mut client = SeigniorageClient::connect(config)?;

    if let Ok(key) = std::env::var("PRIVATE_KEY") {
        let signer = SigningIdentity::from_private_key(&key)?;
        let version = client.bind_signer_with_legacy_probe(signer).await?;
        tracing::info!(
            "Wallet unlocked: account={:?}, boardroom={version}",
            client.account()
        );
    } else if auto_allocate {
        tracing::warn!("AUTO_ALLOCATE is set but PRIVATE_KEY is not; running read-only");
    }

    let mut interval = tokio::time::interval(interval_period);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = poll_once(&client, auto_allocate).await {
                    tracing::error!("Poll failed: {e}");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn poll_once(client: &SeigniorageClient, auto_allocate: bool) -> Result<(), ProtocolError> {
    let stats = client.stats();
    let dashboard = stats.dashboard().await?;
    println!("{}", serde_json::to_string(&dashboard)?);

    if let Some(account) = client.account() {
        let mut balances = Vec::new();
        for token in ProtocolToken::ALL {
            let accessor = client.token(token)?;
            let balance = accessor.display_balance_of(account, BALANCE_DIGITS).await?;
            balances.push(format!("{}={balance}", accessor.symbol()));
        }
        tracing::info!("Wallet {account}: {}", balances.join(", "));
    }

    let treasury = client.treasury()?;
    let window = treasury.next_allocation_window().await?;
    tracing::info!(
        "Epoch window: previous={}, next={}",
        window.previous_allocation,
        window.next_allocation
    );

    if !treasury.can_allocate().await? {
        return Ok(());
    }
    tracing::info!("Seigniorage allocation is open");

    if auto_allocate && client.is_unlocked() {
        let pending = treasury.allocate().await?;
        let outcome = pending.confirm().await?;
        tracing::info!(
            "Allocation mined: tx={}, block={:?}, success={}",
            outcome.tx_hash,
            outcome.block_number,
            outcome.success
        );
    }
    Ok(())
}
