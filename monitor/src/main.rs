// earn-staking-monitor: polls earn-staking pools (and optionally one wallet's
// positions), logs what changed, and persists the latest snapshot as JSON.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use earn_staking_sdk::{
    constants::EARN_STAKING_PROGRAM_ID, AccountSource, GlobalConfig, RetryPolicy,
    RpcAccountSource, StakeAccount, StakingClient, StakingPool, StakingSdkError,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};

// ── Snapshot Persistence ────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
struct Snapshot {
    taken_at: i64,
    global: Option<GlobalSnapshot>,
    pools: Vec<PoolSnapshot>,
    positions: Vec<PositionSnapshot>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct GlobalSnapshot {
    authority: String,
    earn_wallet: String,
    total_pools: u64,
    total_staked_value: u64,
    total_rewards_distributed: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct PoolSnapshot {
    address: String,
    mint: String,
    agent_wallet: String,
    total_staked: u64,
    staker_count: u32,
    rewards_available: u64,
    rewards_distributed: u64,
    /// u128 accumulator as a decimal string; JSON numbers lose precision past 2^53.
    reward_per_token_stored: String,
    min_stake_amount: u64,
    cooldown_seconds: u32,
    paused: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
struct PositionSnapshot {
    address: String,
    pool: String,
    amount: u64,
    pending_rewards: u64,
    unstake_amount: u64,
    unstake_ready_at: Option<i64>,
    can_unstake: bool,
}

impl Snapshot {
    /// True when any account state changed; the poll time is ignored.
    fn differs_from(&self, other: &Snapshot) -> bool {
        self.global != other.global
            || self.pools != other.pools
            || self.positions != other.positions
    }

    fn load(path: &PathBuf) -> Self {
        match fs::read_to_string(path) {
            Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
                warn!(
                    "[SNAPSHOT] Ignoring unreadable {}: {}. Starting fresh.",
                    path.display(),
                    e
                );
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    fn save(&self, path: &PathBuf) {
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(path, json) {
                    warn!("[SNAPSHOT] Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => warn!("[SNAPSHOT] Failed to encode snapshot: {}", e),
        }
    }
}

impl From<&GlobalConfig> for GlobalSnapshot {
    fn from(config: &GlobalConfig) -> Self {
        Self {
            authority: config.authority.to_string(),
            earn_wallet: config.earn_wallet.to_string(),
            total_pools: config.total_pools,
            total_staked_value: config.total_staked_value,
            total_rewards_distributed: config.total_rewards_distributed,
        }
    }
}

impl PoolSnapshot {
    fn new(address: &Pubkey, pool: &StakingPool) -> Self {
        Self {
            address: address.to_string(),
            mint: pool.mint.to_string(),
            agent_wallet: pool.agent_wallet.to_string(),
            total_staked: pool.total_staked,
            staker_count: pool.staker_count,
            rewards_available: pool.rewards_available,
            rewards_distributed: pool.rewards_distributed,
            reward_per_token_stored: pool.reward_per_token_stored.to_string(),
            min_stake_amount: pool.min_stake_amount,
            cooldown_seconds: pool.cooldown_seconds,
            paused: pool.paused,
        }
    }
}

impl PositionSnapshot {
    fn new(address: &Pubkey, stake: &StakeAccount, pool: Option<&StakingPool>, now: i64) -> Self {
        let cooldown = pool.map(|p| p.cooldown_seconds).unwrap_or(0);
        Self {
            address: address.to_string(),
            pool: stake.pool.to_string(),
            amount: stake.amount,
            pending_rewards: pool
                .map(|p| stake.pending_rewards(p))
                .unwrap_or(stake.rewards_earned),
            unstake_amount: stake.unstake_amount,
            unstake_ready_at: stake.unstake_ready_at(cooldown),
            can_unstake: stake.can_unstake(cooldown, now),
        }
    }
}

// ── Config ──────────────────────────────────────────────────────────────────

struct MonitorConfig {
    rpc_url: String,
    program_id: Pubkey,
    watch_owner: Option<Pubkey>,
    poll_interval_ms: u64,
    rpc_timeout_ms: u64,
    max_retries: u32,
    snapshot_file: PathBuf,
}

impl MonitorConfig {
    fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let rpc_url = var("RPC_URL").unwrap_or_else(|| "http://localhost:8899".to_string());

        let program_id = match var("EARN_STAKING_PROGRAM") {
            Some(s) => {
                Pubkey::from_str(&s).map_err(|e| format!("Invalid EARN_STAKING_PROGRAM: {}", e))?
            }
            None => EARN_STAKING_PROGRAM_ID,
        };

        let watch_owner = var("WATCH_OWNER")
            .map(|s| Pubkey::from_str(&s).map_err(|e| format!("Invalid WATCH_OWNER: {}", e)))
            .transpose()?;

        let poll_interval_ms: u64 = var("POLL_INTERVAL_MS")
            .unwrap_or_else(|| "5000".to_string())
            .parse()
            .map_err(|e| format!("Invalid POLL_INTERVAL_MS: {}", e))?;

        let rpc_timeout_ms: u64 = var("RPC_TIMEOUT_MS")
            .unwrap_or_else(|| "30000".to_string())
            .parse()
            .map_err(|e| format!("Invalid RPC_TIMEOUT_MS: {}", e))?;

        let max_retries: u32 = var("MAX_RETRIES")
            .unwrap_or_else(|| "3".to_string())
            .parse()
            .map_err(|e| format!("Invalid MAX_RETRIES: {}", e))?;

        let snapshot_file = PathBuf::from(
            var("SNAPSHOT_FILE").unwrap_or_else(|| "staking_snapshot.json".to_string()),
        );

        Ok(Self {
            rpc_url,
            program_id,
            watch_owner,
            poll_interval_ms,
            rpc_timeout_ms,
            max_retries,
            snapshot_file,
        })
    }
}

// ── Polling ─────────────────────────────────────────────────────────────────

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

async fn poll_once<S: AccountSource>(
    client: &StakingClient<S>,
    watch_owner: Option<&Pubkey>,
    now: i64,
) -> Result<Snapshot, StakingSdkError> {
    let global = client.get_global_config().await?;
    let mut pools = client.get_pools().await?;
    pools.sort_by_key(|(address, _)| *address);

    let positions = match watch_owner {
        Some(owner) => {
            let by_address: HashMap<Pubkey, &StakingPool> =
                pools.iter().map(|(address, pool)| (*address, pool)).collect();
            let mut stakes = client.get_stake_accounts_for_owner(owner).await?;
            stakes.sort_by_key(|(address, _)| *address);
            stakes
                .iter()
                .map(|(address, stake)| {
                    PositionSnapshot::new(address, stake, by_address.get(&stake.pool).copied(), now)
                })
                .collect()
        }
        None => Vec::new(),
    };

    Ok(Snapshot {
        taken_at: now,
        global: global.as_ref().map(GlobalSnapshot::from),
        pools: pools
            .iter()
            .map(|(address, pool)| PoolSnapshot::new(address, pool))
            .collect(),
        positions,
    })
}

/// Human-readable lines for every pool that appeared or moved since `previous`.
fn diff_pools(previous: &[PoolSnapshot], current: &[PoolSnapshot]) -> Vec<String> {
    let before: HashMap<&str, &PoolSnapshot> =
        previous.iter().map(|p| (p.address.as_str(), p)).collect();
    let mut lines = Vec::new();

    for pool in current {
        match before.get(pool.address.as_str()) {
            None => lines.push(format!(
                "NEW POOL: mint={} staked={} stakers={}",
                pool.mint, pool.total_staked, pool.staker_count
            )),
            Some(old) => {
                if old.total_staked != pool.total_staked || old.staker_count != pool.staker_count {
                    lines.push(format!(
                        "STAKE CHANGE: mint={} staked={}->{} stakers={}->{}",
                        pool.mint,
                        old.total_staked,
                        pool.total_staked,
                        old.staker_count,
                        pool.staker_count
                    ));
                }
                if old.rewards_available != pool.rewards_available {
                    lines.push(format!(
                        "REWARDS CHANGE: mint={} available={}->{} distributed={}->{}",
                        pool.mint,
                        old.rewards_available,
                        pool.rewards_available,
                        old.rewards_distributed,
                        pool.rewards_distributed
                    ));
                }
                if old.paused != pool.paused {
                    lines.push(format!("PAUSE CHANGE: mint={} paused={}", pool.mint, pool.paused));
                }
            }
        }
    }
    lines
}

// ── Main Loop ───────────────────────────────────────────────────────────────

async fn run_monitor(config: MonitorConfig) -> Result<(), StakingSdkError> {
    let source = RpcAccountSource::new(
        config.rpc_url.clone(),
        Duration::from_millis(config.rpc_timeout_ms),
        CommitmentConfig::confirmed(),
    );
    let client = StakingClient::new(source, config.program_id)
        .with_retry(RetryPolicy::with_attempts(config.max_retries.max(1)));

    info!("=== Earn Staking Monitor ===");
    info!("RPC:             {}", config.rpc_url);
    info!("Program:         {}", config.program_id);
    info!("Poll Interval:   {}ms", config.poll_interval_ms);
    info!("RPC Timeout:     {}ms", config.rpc_timeout_ms);
    info!("Snapshot File:   {}", config.snapshot_file.display());
    if let Some(owner) = &config.watch_owner {
        info!("Watching Owner:  {}", owner);
    }

    let global = client.verify_deployment().await?;
    info!(
        "[STARTUP] Global config OK: authority={} pools={}",
        global.authority, global.total_pools
    );

    let mut last = Snapshot::load(&config.snapshot_file);

    loop {
        match poll_once(&client, config.watch_owner.as_ref(), unix_now()).await {
            Ok(snapshot) => {
                for line in diff_pools(&last.pools, &snapshot.pools) {
                    info!("[POOLS] {}", line);
                }
                for position in &snapshot.positions {
                    info!(
                        "[STAKES] {} amount={} pending_rewards={} can_unstake={}",
                        position.pool, position.amount, position.pending_rewards, position.can_unstake
                    );
                }
                if snapshot.differs_from(&last) {
                    snapshot.save(&config.snapshot_file);
                }
                last = snapshot;
            }
            Err(e) => error!("[POLL] Error reading program accounts: {}", e),
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)) => {}
        }
    }

    info!("[SHUTDOWN] Saving snapshot...");
    last.save(&config.snapshot_file);
    info!("[SHUTDOWN] Monitor stopped.");
    Ok(())
}

// ── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    solana_logger::setup_with_default("info");

    let config = match MonitorConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!();
            eprintln!("Optional environment variables:");
            eprintln!("  RPC_URL               Solana RPC URL (default: http://localhost:8899)");
            eprintln!("  EARN_STAKING_PROGRAM  earn-staking program ID");
            eprintln!("  WATCH_OWNER           Wallet whose stake accounts to report");
            eprintln!("  POLL_INTERVAL_MS      Polling interval in ms (default: 5000)");
            eprintln!("  RPC_TIMEOUT_MS        Per-request RPC timeout in ms (default: 30000)");
            eprintln!("  MAX_RETRIES           Attempts per read (default: 3)");
            eprintln!("  SNAPSHOT_FILE         Snapshot path (default: staking_snapshot.json)");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_monitor(config).await {
        error!("Monitor failed: {}", e);
        std::process::exit(1);
    }
}
