//! Earn staking program ID, PDA seeds, and reward math constants.

use solana_program::pubkey::Pubkey;

// ── Program IDs ─────────────────────────────────────────────────────────────

/// Earn staking program: universal staking for tokens launched via Earn Protocol.
pub const EARN_STAKING_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("EarnStak111111111111111111111111111111111111");

/// System program, passed to every handler that may allocate or move lamports.
pub const SYSTEM_PROGRAM_ID: Pubkey = solana_program::system_program::ID;

/// SPL Token program, used by stake/unstake transfers.
pub const TOKEN_PROGRAM_ID: Pubkey = spl_token::ID;

// ── PDA Seeds ───────────────────────────────────────────────────────────────

pub const GLOBAL_CONFIG_SEED: &[u8] = b"global-config";
pub const STAKING_POOL_SEED: &[u8] = b"staking-pool";
pub const STAKE_ACCOUNT_SEED: &[u8] = b"stake-account";
pub const POOL_TOKEN_ACCOUNT_SEED: &[u8] = b"pool-token-account";
pub const REWARDS_VAULT_SEED: &[u8] = b"rewards-vault";
pub const POOL_AUTHORITY_SEED: &[u8] = b"pool-authority";

// ── Reward Math ─────────────────────────────────────────────────────────────

/// Scale of `reward_per_token_stored` / `reward_per_token_paid` (1e18).
pub const REWARD_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Length of the Anchor discriminator prefixed to accounts and instruction data.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Trailing reserved block allocated after every account's fields.
pub const RESERVED_LEN: usize = 32;
