//! Earn staking instruction builders.
//!
//! Instruction data is the handler's 8-byte discriminator followed by its
//! Borsh-encoded arguments: no padding, no length prefix. Account order and
//! signer/writable flags must match the handler's `Accounts` struct exactly.
//!
//! Instructions:
//!   initialize(bump: u8)
//!   create_pool(min_stake_amount: u64, cooldown_seconds: u32)
//!   stake(amount: u64)
//!   unstake(amount: u64)
//!   request_unstake(amount: u64)
//!   cancel_unstake()
//!   claim_rewards()
//!   deposit_rewards(amount: u64)
//!   update_rewards()

use borsh::BorshSerialize;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
};

use crate::constants::*;
use crate::discriminator::InstructionKind;
use crate::error::{Result, StakingSdkError};
use crate::pda::*;

// ── Param Structs (exact Borsh match to program) ────────────────────────────

#[derive(BorshSerialize)]
pub struct InitializeArgs {
    pub bump: u8,
}

#[derive(BorshSerialize)]
pub struct CreatePoolArgs {
    pub min_stake_amount: u64,
    pub cooldown_seconds: u32,
}

#[derive(BorshSerialize)]
pub struct AmountArgs {
    pub amount: u64,
}

/// A fully-typed call to one of the program's handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StakingInstruction {
    Initialize { bump: u8 },
    CreatePool { min_stake_amount: u64, cooldown_seconds: u32 },
    Stake { amount: u64 },
    Unstake { amount: u64 },
    RequestUnstake { amount: u64 },
    CancelUnstake,
    ClaimRewards,
    DepositRewards { amount: u64 },
    UpdateRewards,
}

impl StakingInstruction {
    pub fn kind(&self) -> InstructionKind {
        match self {
            StakingInstruction::Initialize { .. } => InstructionKind::Initialize,
            StakingInstruction::CreatePool { .. } => InstructionKind::CreatePool,
            StakingInstruction::Stake { .. } => InstructionKind::Stake,
            StakingInstruction::Unstake { .. } => InstructionKind::Unstake,
            StakingInstruction::RequestUnstake { .. } => InstructionKind::RequestUnstake,
            StakingInstruction::CancelUnstake => InstructionKind::CancelUnstake,
            StakingInstruction::ClaimRewards => InstructionKind::ClaimRewards,
            StakingInstruction::DepositRewards { .. } => InstructionKind::DepositRewards,
            StakingInstruction::UpdateRewards => InstructionKind::UpdateRewards,
        }
    }

    /// Encode as instruction data: discriminator followed by the arguments.
    pub fn pack(&self) -> Result<Vec<u8>> {
        let mut data = self.kind().discriminator().to_vec();
        match *self {
            StakingInstruction::Initialize { bump } => {
                InitializeArgs { bump }.serialize(&mut data)?;
            }
            StakingInstruction::CreatePool {
                min_stake_amount,
                cooldown_seconds,
            } => {
                CreatePoolArgs {
                    min_stake_amount,
                    cooldown_seconds,
                }
                .serialize(&mut data)?;
            }
            StakingInstruction::Stake { amount }
            | StakingInstruction::Unstake { amount }
            | StakingInstruction::RequestUnstake { amount }
            | StakingInstruction::DepositRewards { amount } => {
                AmountArgs { amount }.serialize(&mut data)?;
            }
            StakingInstruction::CancelUnstake
            | StakingInstruction::ClaimRewards
            | StakingInstruction::UpdateRewards => {}
        }
        Ok(data)
    }
}

// ── Domain Checks ───────────────────────────────────────────────────────────
//
// The builders take the program's own integer widths. Callers holding wider
// values (UI input parsed as u128, config read as u64) narrow them here first
// and get `ValueOutOfRange` instead of a silent `as` truncation:
//
//   let amount = checked_u64("amount", parsed)?;
//   let ix = create_stake_instruction(&program_id, &user, &mint, &ata, amount)?;

/// Narrow a caller-supplied amount to the program's `u64` width.
pub fn checked_u64(field: &'static str, value: u128) -> Result<u64> {
    u64::try_from(value).map_err(|_| StakingSdkError::ValueOutOfRange {
        field,
        value,
        max: u64::MAX as u128,
    })
}

/// Narrow a caller-supplied value to the program's `u32` width.
pub fn checked_u32(field: &'static str, value: u64) -> Result<u32> {
    u32::try_from(value).map_err(|_| StakingSdkError::ValueOutOfRange {
        field,
        value: value as u128,
        max: u32::MAX as u128,
    })
}

fn instruction(
    program_id: &Pubkey,
    ix: StakingInstruction,
    accounts: Vec<AccountMeta>,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: ix.pack()?,
    })
}

// ── Instruction Builders ────────────────────────────────────────────────────

/// Initialize the global config (one-time admin setup).
///
/// Accounts:
///   0. `[writable]` global_config PDA
///   1. `[signer, writable]` authority (payer)
///   2. `[]` earn_wallet
///   3. `[]` system_program
pub fn create_initialize_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    earn_wallet: &Pubkey,
) -> Result<Instruction> {
    let (config_pda, bump) = find_global_config(program_id);

    instruction(
        program_id,
        StakingInstruction::Initialize { bump },
        vec![
            AccountMeta::new(config_pda, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(*earn_wallet, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
    )
}

/// Create a staking pool for `mint`.
///
/// Accounts:
///   0. `[writable]` global_config PDA
///   1. `[writable]` staking_pool PDA (seeds: ["staking-pool", mint])
///   2. `[]` mint
///   3. `[]` agent_wallet
///   4. `[signer, writable]` authority (payer)
///   5. `[]` system_program
pub fn create_create_pool_instruction(
    program_id: &Pubkey,
    authority: &Pubkey,
    mint: &Pubkey,
    agent_wallet: &Pubkey,
    min_stake_amount: u64,
    cooldown_seconds: u32,
) -> Result<Instruction> {
    let (config_pda, _) = find_global_config(program_id);
    let (pool_pda, _) = find_staking_pool(program_id, mint);

    instruction(
        program_id,
        StakingInstruction::CreatePool {
            min_stake_amount,
            cooldown_seconds,
        },
        vec![
            AccountMeta::new(config_pda, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(*agent_wallet, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
    )
}

/// Stake `amount` tokens; the stake account is created on first stake.
///
/// Accounts:
///   0. `[writable]` staking_pool PDA
///   1. `[writable]` stake_account PDA (seeds: ["stake-account", pool, user])
///   2. `[writable]` user token account
///   3. `[writable]` pool token account PDA (seeds: ["pool-token-account", pool])
///   4. `[signer, writable]` user (payer)
///   5. `[]` token_program
///   6. `[]` system_program
pub fn create_stake_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    mint: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    let (pool_pda, _) = find_staking_pool(program_id, mint);
    let (stake_pda, _) = find_stake_account(program_id, &pool_pda, user);
    let (pool_token, _) = find_pool_token_account(program_id, &pool_pda);

    instruction(
        program_id,
        StakingInstruction::Stake { amount },
        vec![
            AccountMeta::new(pool_pda, false),
            AccountMeta::new(stake_pda, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(pool_token, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
    )
}

/// Unstake `amount` tokens. With a cooldown, `request_unstake` must come first.
///
/// Accounts:
///   0. `[writable]` staking_pool PDA
///   1. `[writable]` stake_account PDA
///   2. `[writable]` user token account
///   3. `[writable]` pool token account PDA
///   4. `[]` pool_authority PDA (seeds: ["pool-authority", pool])
///   5. `[signer, writable]` user
///   6. `[]` token_program
pub fn create_unstake_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    mint: &Pubkey,
    user_token_account: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    let (pool_pda, _) = find_staking_pool(program_id, mint);
    let (stake_pda, _) = find_stake_account(program_id, &pool_pda, user);
    let (pool_token, _) = find_pool_token_account(program_id, &pool_pda);
    let (pool_authority, _) = find_pool_authority(program_id, &pool_pda);

    instruction(
        program_id,
        StakingInstruction::Unstake { amount },
        vec![
            AccountMeta::new(pool_pda, false),
            AccountMeta::new(stake_pda, false),
            AccountMeta::new(*user_token_account, false),
            AccountMeta::new(pool_token, false),
            AccountMeta::new_readonly(pool_authority, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
    )
}

/// Start the cooldown for unstaking `amount`.
///
/// Accounts:
///   0. `[]` staking_pool PDA
///   1. `[writable]` stake_account PDA
///   2. `[signer]` user
pub fn create_request_unstake_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    instruction(
        program_id,
        StakingInstruction::RequestUnstake { amount },
        unstake_request_accounts(program_id, user, mint),
    )
}

/// Cancel a pending unstake request.
///
/// Accounts: same as `request_unstake`.
pub fn create_cancel_unstake_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction> {
    instruction(
        program_id,
        StakingInstruction::CancelUnstake,
        unstake_request_accounts(program_id, user, mint),
    )
}

fn unstake_request_accounts(program_id: &Pubkey, user: &Pubkey, mint: &Pubkey) -> Vec<AccountMeta> {
    let (pool_pda, _) = find_staking_pool(program_id, mint);
    let (stake_pda, _) = find_stake_account(program_id, &pool_pda, user);
    vec![
        AccountMeta::new_readonly(pool_pda, false),
        AccountMeta::new(stake_pda, false),
        AccountMeta::new_readonly(*user, true),
    ]
}

/// Claim accumulated SOL rewards from the pool's rewards vault.
///
/// Accounts:
///   0. `[writable]` global_config PDA
///   1. `[writable]` staking_pool PDA
///   2. `[writable]` stake_account PDA
///   3. `[writable]` rewards_vault PDA (seeds: ["rewards-vault", pool])
///   4. `[signer, writable]` user
///   5. `[]` system_program
pub fn create_claim_rewards_instruction(
    program_id: &Pubkey,
    user: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction> {
    let (config_pda, _) = find_global_config(program_id);
    let (pool_pda, _) = find_staking_pool(program_id, mint);
    let (stake_pda, _) = find_stake_account(program_id, &pool_pda, user);
    let (vault_pda, _) = find_rewards_vault(program_id, &pool_pda);

    instruction(
        program_id,
        StakingInstruction::ClaimRewards,
        vec![
            AccountMeta::new(config_pda, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new(stake_pda, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new(*user, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
    )
}

/// Move `amount` lamports from `depositor` into the pool's rewards vault
/// and bump the pool accumulator (the fee crank's entry point).
///
/// Accounts:
///   0. `[]` global_config PDA
///   1. `[writable]` staking_pool PDA
///   2. `[writable]` rewards_vault PDA
///   3. `[signer, writable]` depositor
///   4. `[]` system_program
pub fn create_deposit_rewards_instruction(
    program_id: &Pubkey,
    depositor: &Pubkey,
    mint: &Pubkey,
    amount: u64,
) -> Result<Instruction> {
    let (config_pda, _) = find_global_config(program_id);
    let (pool_pda, _) = find_staking_pool(program_id, mint);
    let (vault_pda, _) = find_rewards_vault(program_id, &pool_pda);

    instruction(
        program_id,
        StakingInstruction::DepositRewards { amount },
        vec![
            AccountMeta::new_readonly(config_pda, false),
            AccountMeta::new(pool_pda, false),
            AccountMeta::new(vault_pda, false),
            AccountMeta::new(*depositor, true),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        ],
    )
}

/// Permissionless pool timestamp refresh.
///
/// Accounts:
///   0. `[writable]` staking_pool PDA
pub fn create_update_rewards_instruction(program_id: &Pubkey, mint: &Pubkey) -> Result<Instruction> {
    let (pool_pda, _) = find_staking_pool(program_id, mint);

    instruction(
        program_id,
        StakingInstruction::UpdateRewards,
        vec![AccountMeta::new(pool_pda, false)],
    )
}
