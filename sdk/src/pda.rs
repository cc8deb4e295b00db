//! Program-derived addresses of the earn staking program.
//!
//! Every finder takes the program id explicitly so one binary can talk to
//! several deployments (devnet, mainnet, a local validator).

use solana_program::pubkey::Pubkey;

use crate::constants::*;
use crate::error::{Result, StakingSdkError};

/// Derive a PDA from `seeds`, searching bumps from 255 down to 0.
///
/// Unlike the `find_*` helpers this never panics; an exhausted search is
/// reported as [`StakingSdkError::DerivationExhausted`].
pub fn derive_address(seeds: &[&[u8]], program_id: &Pubkey) -> Result<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        StakingSdkError::DerivationExhausted {
            seeds: seeds.iter().map(|s| s.to_vec()).collect(),
        }
    })
}

// ── PDA Helpers ─────────────────────────────────────────────────────────────

pub fn find_global_config(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED], program_id)
}

pub fn find_staking_pool(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STAKING_POOL_SEED, mint.as_ref()], program_id)
}

pub fn find_stake_account(program_id: &Pubkey, pool: &Pubkey, owner: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[STAKE_ACCOUNT_SEED, pool.as_ref(), owner.as_ref()],
        program_id,
    )
}

pub fn find_pool_token_account(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_TOKEN_ACCOUNT_SEED, pool.as_ref()], program_id)
}

/// SOL vault that pays out `claim_rewards`.
pub fn find_rewards_vault(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[REWARDS_VAULT_SEED, pool.as_ref()], program_id)
}

/// Signer for transfers out of the pool token account.
pub fn find_pool_authority(program_id: &Pubkey, pool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[POOL_AUTHORITY_SEED, pool.as_ref()], program_id)
}

/// The user's associated token account for `mint` under the SPL Token program.
pub fn find_user_token_account(user: &Pubkey, mint: &Pubkey) -> Pubkey {
    spl_associated_token_account::get_associated_token_address(user, mint)
}
