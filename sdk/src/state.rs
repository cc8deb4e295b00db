//! Account codec for `GlobalConfig`, `StakingPool` and `StakeAccount`.
//!
//! Account data is the 8-byte discriminator followed by the Borsh encoding
//! of the struct's fields in declaration order, then 32 reserved bytes. The
//! decoder ignores the reserved block (and anything else past the fields);
//! the reference encoder writes it as zeroes.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::constants::{DISCRIMINATOR_LEN, RESERVED_LEN, REWARD_PRECISION};
use crate::discriminator::{AccountKind, Discriminator};
use crate::error::Result;

// ── Layout ──────────────────────────────────────────────────────────────────

pub mod layout {
    //! Byte offsets of every field, including the 8-byte discriminator.
    //! Used for memcmp filters; decoding goes through Borsh.

    pub const PUBKEY_LEN: usize = 32;
    pub const GLOBAL_CONFIG_AUTHORITY_OFFSET: usize = 8;
    pub const GLOBAL_CONFIG_EARN_WALLET_OFFSET: usize = 40;
    pub const GLOBAL_CONFIG_TOTAL_POOLS_OFFSET: usize = 72;
    pub const GLOBAL_CONFIG_TOTAL_STAKED_VALUE_OFFSET: usize = 80;
    pub const GLOBAL_CONFIG_TOTAL_REWARDS_DISTRIBUTED_OFFSET: usize = 88;
    pub const GLOBAL_CONFIG_BUMP_OFFSET: usize = 96;
    pub const GLOBAL_CONFIG_DATA_LEN: usize = 97;

    pub const STAKING_POOL_MINT_OFFSET: usize = 8;
    pub const STAKING_POOL_AGENT_WALLET_OFFSET: usize = 40;
    pub const STAKING_POOL_TOTAL_STAKED_OFFSET: usize = 72;
    pub const STAKING_POOL_STAKER_COUNT_OFFSET: usize = 80;
    pub const STAKING_POOL_REWARDS_AVAILABLE_OFFSET: usize = 84;
    pub const STAKING_POOL_REWARDS_DISTRIBUTED_OFFSET: usize = 92;
    pub const STAKING_POOL_REWARD_PER_TOKEN_STORED_OFFSET: usize = 100;
    pub const STAKING_POOL_LAST_UPDATE_TIME_OFFSET: usize = 116;
    pub const STAKING_POOL_MIN_STAKE_AMOUNT_OFFSET: usize = 124;
    pub const STAKING_POOL_COOLDOWN_SECONDS_OFFSET: usize = 132;
    pub const STAKING_POOL_CREATED_AT_OFFSET: usize = 136;
    pub const STAKING_POOL_PAUSED_OFFSET: usize = 144;
    pub const STAKING_POOL_BUMP_OFFSET: usize = 145;
    pub const STAKING_POOL_DATA_LEN: usize = 146;

    pub const STAKE_ACCOUNT_OWNER_OFFSET: usize = 8;
    pub const STAKE_ACCOUNT_POOL_OFFSET: usize = 40;
    pub const STAKE_ACCOUNT_AMOUNT_OFFSET: usize = 72;
    pub const STAKE_ACCOUNT_REWARD_PER_TOKEN_PAID_OFFSET: usize = 80;
    pub const STAKE_ACCOUNT_REWARDS_EARNED_OFFSET: usize = 96;
    pub const STAKE_ACCOUNT_STAKED_AT_OFFSET: usize = 104;
    pub const STAKE_ACCOUNT_LAST_CLAIM_AT_OFFSET: usize = 112;
    pub const STAKE_ACCOUNT_UNSTAKE_REQUESTED_AT_OFFSET: usize = 120;
    pub const STAKE_ACCOUNT_UNSTAKE_AMOUNT_OFFSET: usize = 128;
    pub const STAKE_ACCOUNT_BUMP_OFFSET: usize = 136;
    pub const STAKE_ACCOUNT_DATA_LEN: usize = 137;
}

use layout::*;

// ── Codec Trait ─────────────────────────────────────────────────────────────

/// A discriminator-tagged, fixed-layout account owned by the staking program.
pub trait StakingAccount: Sized {
    const KIND: AccountKind;
    const DISCRIMINATOR: Discriminator = Self::KIND.discriminator();
    /// Bytes read by `decode`: discriminator plus fields.
    const DATA_LEN: usize;
    /// Bytes the program allocates: `DATA_LEN` plus the reserved block.
    const SPACE: usize = Self::DATA_LEN + RESERVED_LEN;

    /// Decode from raw account data, `None` on short data or foreign tag.
    fn decode(data: &[u8]) -> Option<Self>;

    /// Reference encoder producing a full `SPACE`-sized buffer.
    fn encode(&self) -> Result<Vec<u8>>;
}

/// Accounts that can be filtered program-wide by an owning wallet.
pub trait OwnedAccount: StakingAccount {
    /// Byte offset of the owner's 32 raw bytes within the account data.
    const OWNER_OFFSET: usize;
}

fn has_tag(data: &[u8], discriminator: &Discriminator) -> bool {
    data.get(..DISCRIMINATOR_LEN) == Some(discriminator.as_slice())
}

/// Check length and tag, then Borsh-decode the body. Unlike `try_from_slice`
/// this leaves trailing bytes unread.
fn decode_body<T: StakingAccount, B: BorshDeserialize>(data: &[u8]) -> Option<B> {
    if data.len() < T::DATA_LEN || !has_tag(data, &T::DISCRIMINATOR) {
        return None;
    }
    B::deserialize(&mut &data[DISCRIMINATOR_LEN..]).ok()
}

fn encode_body<T: StakingAccount, B: BorshSerialize>(body: &B) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(T::SPACE);
    data.extend_from_slice(&T::DISCRIMINATOR);
    body.serialize(&mut data)?;
    data.extend_from_slice(&[0u8; RESERVED_LEN]);
    Ok(data)
}

/// Decode `data` as `T`, the generic form of `T::decode`.
pub fn decode_account<T: StakingAccount>(data: &[u8]) -> Option<T> {
    T::decode(data)
}

// ── GlobalConfig ────────────────────────────────────────────────────────────

/// Protocol-wide singleton. PDA: `["global-config"]`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfig {
    pub authority: Pubkey,
    pub earn_wallet: Pubkey,
    pub total_pools: u64,
    pub total_staked_value: u64,
    pub total_rewards_distributed: u64,
    pub bump: u8,
}

impl StakingAccount for GlobalConfig {
    const KIND: AccountKind = AccountKind::GlobalConfig;
    const DATA_LEN: usize = GLOBAL_CONFIG_DATA_LEN;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_body::<Self, Self>(data)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        encode_body::<Self, Self>(self)
    }
}

// ── StakingPool ─────────────────────────────────────────────────────────────

/// Per-mint staking pool. PDA: `["staking-pool", mint]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StakingPool {
    pub mint: Pubkey,
    /// Agent wallet (creator of the token).
    pub agent_wallet: Pubkey,
    pub total_staked: u64,
    pub staker_count: u32,
    /// SOL rewards available for distribution (lamports).
    pub rewards_available: u64,
    pub rewards_distributed: u64,
    /// Accumulated reward per token, scaled by [`REWARD_PRECISION`].
    pub reward_per_token_stored: u128,
    pub last_update_time: i64,
    pub min_stake_amount: u64,
    /// Unstake delay; 0 means unstake is immediate.
    pub cooldown_seconds: u32,
    pub created_at: i64,
    pub paused: bool,
    pub bump: u8,
}

/// On-chain image of [`StakingPool`]. `paused` stays a raw byte so any
/// nonzero value reads as true, where Borsh's `bool` rejects values above 1.
#[derive(BorshSerialize, BorshDeserialize)]
struct StakingPoolData {
    mint: Pubkey,
    agent_wallet: Pubkey,
    total_staked: u64,
    staker_count: u32,
    rewards_available: u64,
    rewards_distributed: u64,
    reward_per_token_stored: u128,
    last_update_time: i64,
    min_stake_amount: u64,
    cooldown_seconds: u32,
    created_at: i64,
    paused: u8,
    bump: u8,
}

impl StakingPoolData {
    fn into_pool(self) -> StakingPool {
        StakingPool {
            mint: self.mint,
            agent_wallet: self.agent_wallet,
            total_staked: self.total_staked,
            staker_count: self.staker_count,
            rewards_available: self.rewards_available,
            rewards_distributed: self.rewards_distributed,
            reward_per_token_stored: self.reward_per_token_stored,
            last_update_time: self.last_update_time,
            min_stake_amount: self.min_stake_amount,
            cooldown_seconds: self.cooldown_seconds,
            created_at: self.created_at,
            paused: self.paused != 0,
            bump: self.bump,
        }
    }

    fn from_pool(pool: &StakingPool) -> Self {
        Self {
            mint: pool.mint,
            agent_wallet: pool.agent_wallet,
            total_staked: pool.total_staked,
            staker_count: pool.staker_count,
            rewards_available: pool.rewards_available,
            rewards_distributed: pool.rewards_distributed,
            reward_per_token_stored: pool.reward_per_token_stored,
            last_update_time: pool.last_update_time,
            min_stake_amount: pool.min_stake_amount,
            cooldown_seconds: pool.cooldown_seconds,
            created_at: pool.created_at,
            paused: pool.paused as u8,
            bump: pool.bump,
        }
    }
}

impl StakingAccount for StakingPool {
    const KIND: AccountKind = AccountKind::StakingPool;
    const DATA_LEN: usize = STAKING_POOL_DATA_LEN;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_body::<Self, StakingPoolData>(data).map(StakingPoolData::into_pool)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        encode_body::<Self, _>(&StakingPoolData::from_pool(self))
    }
}

impl StakingPool {
    /// Rewards owed on `stake_amount` since the accumulator read `paid`.
    ///
    /// earned = stake_amount * (reward_per_token_stored - paid) / 1e18
    pub fn earned(&self, stake_amount: u64, paid: u128) -> u64 {
        let delta = self.reward_per_token_stored.saturating_sub(paid);
        // Truncating cast, same as the program
        ((stake_amount as u128).saturating_mul(delta) / REWARD_PRECISION) as u64
    }

    /// Accumulator increase a `deposit_rewards(amount)` call would apply.
    pub fn reward_increase_for_deposit(&self, amount: u64) -> u128 {
        if self.total_staked == 0 {
            return 0;
        }
        (amount as u128).saturating_mul(REWARD_PRECISION) / self.total_staked as u128
    }

    pub fn is_accepting_stakes(&self) -> bool {
        !self.paused
    }
}

// ── StakeAccount ────────────────────────────────────────────────────────────

/// One user's position in one pool. PDA: `["stake-account", pool, owner]`.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct StakeAccount {
    pub owner: Pubkey,
    pub pool: Pubkey,
    pub amount: u64,
    /// Snapshot of the pool accumulator at the last checkpoint.
    pub reward_per_token_paid: u128,
    pub rewards_earned: u64,
    pub staked_at: i64,
    pub last_claim_at: i64,
    /// 0 when no unstake request is pending.
    pub unstake_requested_at: i64,
    pub unstake_amount: u64,
    pub bump: u8,
}

impl StakingAccount for StakeAccount {
    const KIND: AccountKind = AccountKind::StakeAccount;
    const DATA_LEN: usize = STAKE_ACCOUNT_DATA_LEN;

    fn decode(data: &[u8]) -> Option<Self> {
        decode_body::<Self, Self>(data)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        encode_body::<Self, Self>(self)
    }
}

impl OwnedAccount for StakeAccount {
    const OWNER_OFFSET: usize = STAKE_ACCOUNT_OWNER_OFFSET;
}

impl StakeAccount {
    /// Unclaimed rewards plus what accrued since the last checkpoint.
    pub fn pending_rewards(&self, pool: &StakingPool) -> u64 {
        self.rewards_earned
            .saturating_add(pool.earned(self.amount, self.reward_per_token_paid))
    }

    pub fn has_pending_unstake(&self) -> bool {
        self.unstake_requested_at != 0
    }

    /// Earliest timestamp at which `unstake` passes the cooldown check.
    pub fn unstake_ready_at(&self, cooldown_seconds: u32) -> Option<i64> {
        if cooldown_seconds == 0 {
            return Some(0);
        }
        if !self.has_pending_unstake() {
            return None;
        }
        self.unstake_requested_at.checked_add(cooldown_seconds as i64)
    }

    /// Same rule the program applies before an `unstake`.
    pub fn can_unstake(&self, cooldown_seconds: u32, now: i64) -> bool {
        match self.unstake_ready_at(cooldown_seconds) {
            Some(ready_at) => now >= ready_at,
            None => false,
        }
    }
}

// ── Any Account ─────────────────────────────────────────────────────────────

/// Any program account, identified by its discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedAccount {
    GlobalConfig(GlobalConfig),
    StakingPool(StakingPool),
    StakeAccount(StakeAccount),
}

impl DecodedAccount {
    pub fn decode(data: &[u8]) -> Option<Self> {
        match AccountKind::from_discriminator(data)? {
            AccountKind::GlobalConfig => GlobalConfig::decode(data).map(Self::GlobalConfig),
            AccountKind::StakingPool => StakingPool::decode(data).map(Self::StakingPool),
            AccountKind::StakeAccount => StakeAccount::decode(data).map(Self::StakeAccount),
        }
    }

    pub fn kind(&self) -> AccountKind {
        match self {
            DecodedAccount::GlobalConfig(_) => AccountKind::GlobalConfig,
            DecodedAccount::StakingPool(_) => AccountKind::StakingPool,
            DecodedAccount::StakeAccount(_) => AccountKind::StakeAccount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_match_program() {
        // 8 + 32 + 32 + 8 + 8 + 8 + 1 + 32
        assert_eq!(GlobalConfig::SPACE, 129);
        // 8 + 32 + 32 + 8 + 4 + 8 + 8 + 16 + 8 + 8 + 4 + 8 + 1 + 1 + 32
        assert_eq!(StakingPool::SPACE, 178);
        // 8 + 32 + 32 + 8 + 16 + 8 + 8 + 8 + 8 + 8 + 1 + 32
        assert_eq!(StakeAccount::SPACE, 169);
    }

    #[test]
    fn test_encode_writes_full_space() {
        assert_eq!(GlobalConfig::default().encode().unwrap().len(), GlobalConfig::SPACE);
        assert_eq!(StakingPool::default().encode().unwrap().len(), StakingPool::SPACE);
        assert_eq!(StakeAccount::default().encode().unwrap().len(), StakeAccount::SPACE);
    }

    #[test]
    fn test_offsets_land_on_fields() {
        let pool = StakingPool {
            staker_count: 0xAABBCCDD,
            cooldown_seconds: 86_400,
            paused: true,
            bump: 254,
            ..Default::default()
        };
        let data = pool.encode().unwrap();
        let at = |o: usize| u32::from_le_bytes(data[o..o + 4].try_into().unwrap());
        assert_eq!(at(STAKING_POOL_STAKER_COUNT_OFFSET), 0xAABBCCDD);
        assert_eq!(at(STAKING_POOL_COOLDOWN_SECONDS_OFFSET), 86_400);
        assert_eq!(data[STAKING_POOL_PAUSED_OFFSET], 1);
        assert_eq!(data[STAKING_POOL_BUMP_OFFSET], 254);
    }

    #[test]
    fn test_layout_offsets_match_borsh_encoding() {
        let config = GlobalConfig {
            earn_wallet: Pubkey::new_from_array([3; 32]),
            total_rewards_distributed: 0x0102_0304,
            bump: 200,
            ..Default::default()
        };
        let data = config.encode().unwrap();
        assert_eq!(data[GLOBAL_CONFIG_EARN_WALLET_OFFSET..][..PUBKEY_LEN], [3; 32]);
        assert_eq!(
            data[GLOBAL_CONFIG_TOTAL_REWARDS_DISTRIBUTED_OFFSET..][..8],
            0x0102_0304u64.to_le_bytes()
        );
        assert_eq!(data[GLOBAL_CONFIG_BUMP_OFFSET], 200);

        let pool = StakingPool {
            reward_per_token_stored: u128::MAX - 5,
            last_update_time: -7,
            created_at: 1_700_000_000,
            ..Default::default()
        };
        let data = pool.encode().unwrap();
        assert_eq!(
            data[STAKING_POOL_REWARD_PER_TOKEN_STORED_OFFSET..][..16],
            (u128::MAX - 5).to_le_bytes()
        );
        assert_eq!(data[STAKING_POOL_LAST_UPDATE_TIME_OFFSET..][..8], (-7i64).to_le_bytes());
        assert_eq!(
            data[STAKING_POOL_CREATED_AT_OFFSET..][..8],
            1_700_000_000i64.to_le_bytes()
        );

        let stake = StakeAccount {
            pool: Pubkey::new_from_array([5; 32]),
            unstake_amount: 42,
            bump: 9,
            ..Default::default()
        };
        let data = stake.encode().unwrap();
        assert_eq!(data[STAKE_ACCOUNT_POOL_OFFSET..][..PUBKEY_LEN], [5; 32]);
        assert_eq!(data[STAKE_ACCOUNT_UNSTAKE_AMOUNT_OFFSET..][..8], 42u64.to_le_bytes());
        assert_eq!(data[STAKE_ACCOUNT_BUMP_OFFSET], 9);
    }

    #[test]
    fn test_pool_paused_accepts_any_nonzero_byte() {
        let pool = StakingPool {
            bump: 255,
            ..Default::default()
        };
        let mut data = pool.encode().unwrap();
        data[STAKING_POOL_PAUSED_OFFSET] = 0x80;
        data.extend_from_slice(&[0xEE; 40]);
        let decoded = StakingPool::decode(&data).unwrap();
        assert!(decoded.paused);
        assert_eq!(decoded.bump, 255);
    }

    #[test]
    fn test_earned_scales_by_precision() {
        let pool = StakingPool {
            reward_per_token_stored: 3 * REWARD_PRECISION,
            ..Default::default()
        };
        assert_eq!(pool.earned(1_000, REWARD_PRECISION), 2_000);
        // Paid ahead of stored never underflows
        assert_eq!(pool.earned(1_000, 5 * REWARD_PRECISION), 0);
    }

    #[test]
    fn test_reward_increase_for_deposit() {
        let mut pool = StakingPool::default();
        assert_eq!(pool.reward_increase_for_deposit(1_000), 0);
        pool.total_staked = 500;
        assert_eq!(pool.reward_increase_for_deposit(1_000), 2 * REWARD_PRECISION);
    }

    #[test]
    fn test_cooldown_rules() {
        let mut stake = StakeAccount::default();
        assert!(stake.can_unstake(0, 0));
        assert!(!stake.can_unstake(3_600, 1_700_000_000));
        assert_eq!(stake.unstake_ready_at(3_600), None);

        stake.unstake_requested_at = 1_700_000_000;
        assert_eq!(stake.unstake_ready_at(3_600), Some(1_700_003_600));
        assert!(!stake.can_unstake(3_600, 1_700_003_599));
        assert!(stake.can_unstake(3_600, 1_700_003_600));
    }

    #[test]
    fn test_pending_rewards_adds_unclaimed() {
        let pool = StakingPool {
            reward_per_token_stored: 2 * REWARD_PRECISION,
            ..Default::default()
        };
        let stake = StakeAccount {
            amount: 10,
            reward_per_token_paid: REWARD_PRECISION,
            rewards_earned: 5,
            ..Default::default()
        };
        assert_eq!(stake.pending_rewards(&pool), 15);
    }
}
