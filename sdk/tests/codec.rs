// Account codec: round trips, rejection, and wide-integer handling.

use earn_staking_sdk::constants::REWARD_PRECISION;
use earn_staking_sdk::discriminator::*;
use earn_staking_sdk::state::layout::*;
use earn_staking_sdk::*;
use solana_program::pubkey::Pubkey;

fn sample_pool() -> StakingPool {
    StakingPool {
        mint: Pubkey::new_unique(),
        agent_wallet: Pubkey::new_unique(),
        total_staked: 42_000_000_000,
        staker_count: 17,
        rewards_available: 3_500_000_000,
        rewards_distributed: 1_250_000_000,
        // Above 2^64: must survive without truncation
        reward_per_token_stored: 123_456_789 * REWARD_PRECISION + 987_654_321,
        last_update_time: 1_700_000_123,
        min_stake_amount: 1_000_000,
        cooldown_seconds: 604_800,
        created_at: 1_699_000_000,
        paused: false,
        bump: 254,
    }
}

fn sample_stake(pool: Pubkey, owner: Pubkey) -> StakeAccount {
    StakeAccount {
        owner,
        pool,
        amount: 5_000_000,
        reward_per_token_paid: u128::MAX - 1,
        rewards_earned: 77,
        staked_at: 1_700_000_000,
        last_claim_at: 0,
        unstake_requested_at: 1_700_100_000,
        unstake_amount: 2_500_000,
        bump: 251,
    }
}

#[test]
fn test_global_config_round_trip() {
    let config = GlobalConfig {
        authority: Pubkey::new_unique(),
        earn_wallet: Pubkey::new_unique(),
        total_pools: 12,
        total_staked_value: 9_000_000_000,
        total_rewards_distributed: 450_000_000,
        bump: 253,
    };
    let data = config.encode().unwrap();
    assert_eq!(&data[..8], &GLOBAL_CONFIG_DISCRIMINATOR);
    assert_eq!(GlobalConfig::decode(&data), Some(config));
}

#[test]
fn test_staking_pool_round_trip() {
    let pool = sample_pool();
    let decoded = StakingPool::decode(&pool.encode().unwrap()).unwrap();
    assert_eq!(decoded.reward_per_token_stored, pool.reward_per_token_stored);
    assert_eq!(decoded, pool);
}

#[test]
fn test_stake_account_round_trip() {
    let stake = sample_stake(Pubkey::new_unique(), Pubkey::new_unique());
    assert_eq!(decode_account::<StakeAccount>(&stake.encode().unwrap()), Some(stake));
}

#[test]
fn test_wrong_type_is_rejected() {
    let pool_data = sample_pool().encode().unwrap();
    // StakingPool is longer than StakeAccount, so only the tag can reject it
    assert!(pool_data.len() > StakeAccount::DATA_LEN);
    assert_eq!(StakeAccount::decode(&pool_data), None);
    assert_eq!(GlobalConfig::decode(&pool_data), None);
}

#[test]
fn test_short_buffers_are_rejected() {
    let data = sample_pool().encode().unwrap();
    assert_eq!(StakingPool::decode(&data[..STAKING_POOL_DATA_LEN - 1]), None);
    assert_eq!(StakingPool::decode(&data[..7]), None);
    assert_eq!(StakingPool::decode(&[]), None);
}

#[test]
fn test_reserved_and_trailing_bytes_ignored() {
    let pool = sample_pool();
    let mut data = pool.encode().unwrap();
    data[STAKING_POOL_DATA_LEN..].fill(0xFF);
    data.extend_from_slice(&[0xAB; 64]);
    assert_eq!(StakingPool::decode(&data), Some(pool.clone()));
    // Exactly the field prefix is enough
    assert_eq!(StakingPool::decode(&data[..STAKING_POOL_DATA_LEN]), Some(pool));
}

#[test]
fn test_u128_low_high_combination() {
    let mut data = sample_pool().encode().unwrap();
    let o = STAKING_POOL_REWARD_PER_TOKEN_STORED_OFFSET;
    data[o..o + 8].copy_from_slice(&u64::MAX.to_le_bytes());
    data[o + 8..o + 16].copy_from_slice(&1u64.to_le_bytes());

    let pool = StakingPool::decode(&data).unwrap();
    let expected: u128 = (1u128 << 64) + (u64::MAX as u128);
    assert_eq!(pool.reward_per_token_stored, expected);
    assert_ne!(pool.reward_per_token_stored, u64::MAX as u128);
}

#[test]
fn test_any_nonzero_byte_is_paused() {
    let mut data = sample_pool().encode().unwrap();
    for byte in [1u8, 2, 0x80, 0xFF] {
        data[STAKING_POOL_PAUSED_OFFSET] = byte;
        assert!(StakingPool::decode(&data).unwrap().paused);
    }
    data[STAKING_POOL_PAUSED_OFFSET] = 0;
    assert!(!StakingPool::decode(&data).unwrap().paused);
}

#[test]
fn test_negative_timestamps_decode() {
    let mut stake = sample_stake(Pubkey::new_unique(), Pubkey::new_unique());
    stake.last_claim_at = -1;
    stake.staked_at = i64::MIN;
    assert_eq!(StakeAccount::decode(&stake.encode().unwrap()), Some(stake));
}

#[test]
fn test_owner_sits_at_offset_eight() {
    let owner = Pubkey::new_unique();
    let data = sample_stake(Pubkey::new_unique(), owner).encode().unwrap();
    assert_eq!(StakeAccount::OWNER_OFFSET, 8);
    assert_eq!(&data[8..40], owner.as_ref());
}

#[test]
fn test_decoded_account_dispatch() {
    let pool = sample_pool();
    match DecodedAccount::decode(&pool.encode().unwrap()) {
        Some(DecodedAccount::StakingPool(p)) => assert_eq!(p, pool),
        other => panic!("unexpected {:?}", other),
    }

    let stake = sample_stake(Pubkey::new_unique(), Pubkey::new_unique());
    let decoded = DecodedAccount::decode(&stake.encode().unwrap()).unwrap();
    assert_eq!(decoded.kind(), AccountKind::StakeAccount);

    let mut unknown = stake.encode().unwrap();
    unknown[0] ^= 0xFF;
    assert_eq!(DecodedAccount::decode(&unknown), None);
}
