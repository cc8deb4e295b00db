//! Read path: fetch and decode program accounts over RPC.
//!
//! `StakingClient` is a plain value: build one at startup and pass it to
//! whoever needs it. Transport sits behind [`AccountSource`] so tests (and
//! callers with their own caching layer) can supply accounts without a node.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};
use solana_client::{
    nonblocking::rpc_client::RpcClient,
    rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig},
    rpc_filter::{Memcmp, RpcFilterType},
};
use solana_sdk::{account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey};

use crate::constants::{DISCRIMINATOR_LEN, EARN_STAKING_PROGRAM_ID};
use crate::error::{Result, StakingSdkError};
use crate::pda::{find_global_config, find_stake_account, find_staking_pool};
use crate::state::{
    layout::STAKE_ACCOUNT_POOL_OFFSET, GlobalConfig, OwnedAccount, StakeAccount, StakingAccount,
    StakingPool,
};

// ── Transport ───────────────────────────────────────────────────────────────

/// Where raw accounts come from.
pub trait AccountSource {
    /// Fetch one account; `Ok(None)` when nothing lives at `address`.
    fn fetch_account(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = Result<Option<Account>>> + Send;

    /// Every account owned by `program_id` matching all `filters`.
    fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> impl Future<Output = Result<Vec<(Pubkey, Account)>>> + Send;
}

/// JSON-RPC transport backed by the nonblocking Solana client.
pub struct RpcAccountSource {
    rpc: RpcClient,
}

impl RpcAccountSource {
    /// Every request is bounded by `timeout`; no request is retried here.
    pub fn new(url: impl Into<String>, timeout: Duration, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_timeout_and_commitment(url.into(), timeout, commitment),
        }
    }

    pub fn from_client(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    pub fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

impl AccountSource for RpcAccountSource {
    async fn fetch_account(&self, address: &Pubkey) -> Result<Option<Account>> {
        let response = self
            .rpc
            .get_account_with_commitment(address, self.rpc.commitment())
            .await?;
        Ok(response.value)
    }

    async fn fetch_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: Vec<RpcFilterType>,
    ) -> Result<Vec<(Pubkey, Account)>> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters),
            account_config: RpcAccountInfoConfig {
                commitment: Some(self.rpc.commitment()),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        Ok(self
            .rpc
            .get_program_accounts_with_config(program_id, config)
            .await?)
    }
}

// ── Retry ───────────────────────────────────────────────────────────────────

/// Backoff for idempotent reads. Never applied to writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first; 1 disables retries.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    pub const fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
        }
    }

    /// Delay before retry number `attempt` (1-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    "[RETRY] {} attempt {}/{} failed: {}. Retrying in {}ms...",
                    what,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ── Filters ─────────────────────────────────────────────────────────────────

/// Match accounts whose first 8 bytes are `T`'s discriminator.
pub fn discriminator_filter<T: StakingAccount>() -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(0, T::DISCRIMINATOR.to_vec()))
}

/// Match accounts whose owner field equals `owner`.
pub fn owner_filter<T: OwnedAccount>(owner: &Pubkey) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
        T::OWNER_OFFSET,
        owner.to_bytes().to_vec(),
    ))
}

/// Match stake accounts belonging to `pool`.
pub fn pool_filter(pool: &Pubkey) -> RpcFilterType {
    RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
        STAKE_ACCOUNT_POOL_OFFSET,
        pool.to_bytes().to_vec(),
    ))
}

// ── Client ──────────────────────────────────────────────────────────────────

pub struct StakingClient<S = RpcAccountSource> {
    source: S,
    program_id: Pubkey,
    retry: RetryPolicy,
}

impl StakingClient<RpcAccountSource> {
    /// Client for the default program id over JSON-RPC.
    pub fn new_rpc(url: impl Into<String>, timeout: Duration) -> Self {
        Self::new(
            RpcAccountSource::new(url, timeout, CommitmentConfig::confirmed()),
            EARN_STAKING_PROGRAM_ID,
        )
    }
}

impl<S: AccountSource> StakingClient<S> {
    pub fn new(source: S, program_id: Pubkey) -> Self {
        Self {
            source,
            program_id,
            retry: RetryPolicy::none(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn program_id(&self) -> &Pubkey {
        &self.program_id
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch and decode one account.
    ///
    /// `None` when the address is empty, owned by another program, or holds
    /// a different account type.
    pub async fn get_account<T: StakingAccount>(&self, address: &Pubkey) -> Result<Option<T>> {
        let account = with_retry(self.retry, "getAccountInfo", || {
            self.source.fetch_account(address)
        })
        .await?;

        let Some(account) = account else {
            debug!("{} {} not found", T::KIND.name(), address);
            return Ok(None);
        };
        if account.owner != self.program_id {
            debug!(
                "{} {} owned by {}, expected {}",
                T::KIND.name(),
                address,
                account.owner,
                self.program_id
            );
            return Ok(None);
        }
        Ok(T::decode(&account.data))
    }

    /// Every account of type `T` in the program.
    pub async fn get_all_by_type<T: StakingAccount>(&self) -> Result<Vec<(Pubkey, T)>> {
        self.scan(vec![discriminator_filter::<T>()]).await
    }

    /// Every account of type `T` whose owner field equals `owner`.
    pub async fn get_all_by_owner<T: OwnedAccount>(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<(Pubkey, T)>> {
        self.scan(vec![discriminator_filter::<T>(), owner_filter::<T>(owner)])
            .await
    }

    async fn scan<T: StakingAccount>(&self, filters: Vec<RpcFilterType>) -> Result<Vec<(Pubkey, T)>> {
        debug!(
            "getProgramAccounts {} for {} with {} filters",
            self.program_id,
            T::KIND.name(),
            filters.len()
        );
        let accounts = with_retry(self.retry, "getProgramAccounts", || {
            self.source
                .fetch_program_accounts(&self.program_id, filters.clone())
        })
        .await?;

        let total = accounts.len();
        let decoded: Vec<(Pubkey, T)> = accounts
            .into_iter()
            .filter_map(|(address, account)| T::decode(&account.data).map(|t| (address, t)))
            .collect();
        if decoded.len() != total {
            debug!(
                "skipped {} accounts that did not decode as {}",
                total - decoded.len(),
                T::KIND.name()
            );
        }
        Ok(decoded)
    }

    // ── Convenience ─────────────────────────────────────────────────────

    pub async fn get_global_config(&self) -> Result<Option<GlobalConfig>> {
        let (address, _) = find_global_config(&self.program_id);
        self.get_account(&address).await
    }

    pub async fn get_pool(&self, mint: &Pubkey) -> Result<Option<StakingPool>> {
        let (address, _) = find_staking_pool(&self.program_id, mint);
        self.get_account(&address).await
    }

    pub async fn get_stake_account(
        &self,
        pool: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Option<StakeAccount>> {
        let (address, _) = find_stake_account(&self.program_id, pool, owner);
        self.get_account(&address).await
    }

    pub async fn get_pools(&self) -> Result<Vec<(Pubkey, StakingPool)>> {
        self.get_all_by_type().await
    }

    pub async fn get_stake_accounts_for_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<(Pubkey, StakeAccount)>> {
        self.get_all_by_owner(owner).await
    }

    /// Every position in `pool`, e.g. for a crank walking its stakers.
    pub async fn get_stake_accounts_for_pool(
        &self,
        pool: &Pubkey,
    ) -> Result<Vec<(Pubkey, StakeAccount)>> {
        self.scan(vec![
            discriminator_filter::<StakeAccount>(),
            pool_filter(pool),
        ])
        .await
    }

    /// Startup self-check: the global config PDA must exist and decode with
    /// the shipped discriminator. Catches a wrong program id, wrong cluster,
    /// or a redeployed program with different account tags.
    pub async fn verify_deployment(&self) -> Result<GlobalConfig> {
        let (address, _) = find_global_config(&self.program_id);
        self.get_account::<GlobalConfig>(&address)
            .await?
            .ok_or(StakingSdkError::DeploymentMismatch(address))
    }
}

// Offsets used by the filters above must stay inside the decoded prefix.
const _: () = assert!(StakeAccount::OWNER_OFFSET == DISCRIMINATOR_LEN);
const _: () = assert!(STAKE_ACCOUNT_POOL_OFFSET + 32 <= StakeAccount::DATA_LEN);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(1_000),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(4), Duration::from_millis(800));
        assert_eq!(policy.backoff(5), Duration::from_millis(1_000));
        assert_eq!(policy.backoff(64), Duration::from_millis(1_000));
    }

    #[test]
    fn test_default_policy_does_not_retry() {
        assert_eq!(RetryPolicy::default().max_attempts, 1);
    }

    #[test]
    fn test_owner_filter_targets_offset_eight() {
        let owner = Pubkey::new_unique();
        assert_eq!(
            owner_filter::<StakeAccount>(&owner),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(8, owner.to_bytes().to_vec()))
        );
    }

    #[test]
    fn test_discriminator_filter_targets_offset_zero() {
        assert_eq!(
            discriminator_filter::<StakingPool>(),
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(
                0,
                StakingPool::DISCRIMINATOR.to_vec()
            ))
        );
    }
}
