//! Discriminator registry.
//!
//! The deployed program is an Anchor program: accounts are tagged with
//! `sha256("account:<Name>")[..8]` and instruction data with
//! `sha256("global:<name>")[..8]`. The tags are fixed contract data and are
//! shipped here as literals; they are never recomputed at runtime.

use crate::constants::DISCRIMINATOR_LEN;

pub type Discriminator = [u8; DISCRIMINATOR_LEN];

// ── Account Discriminators ──────────────────────────────────────────────────

pub const GLOBAL_CONFIG_DISCRIMINATOR: Discriminator = [149, 8, 156, 202, 160, 252, 176, 217];
pub const STAKING_POOL_DISCRIMINATOR: Discriminator = [203, 19, 214, 220, 220, 154, 24, 102];
pub const STAKE_ACCOUNT_DISCRIMINATOR: Discriminator = [80, 158, 67, 124, 50, 189, 192, 255];

// ── Instruction Discriminators ──────────────────────────────────────────────

pub const IX_INITIALIZE: Discriminator = [175, 175, 109, 31, 13, 152, 155, 237];
pub const IX_CREATE_POOL: Discriminator = [233, 146, 209, 142, 207, 104, 64, 188];
pub const IX_STAKE: Discriminator = [206, 176, 202, 18, 200, 209, 179, 108];
pub const IX_UNSTAKE: Discriminator = [90, 95, 107, 42, 205, 124, 50, 225];
pub const IX_REQUEST_UNSTAKE: Discriminator = [44, 154, 110, 253, 160, 202, 54, 34];
pub const IX_CANCEL_UNSTAKE: Discriminator = [64, 65, 53, 227, 125, 153, 3, 167];
pub const IX_CLAIM_REWARDS: Discriminator = [4, 144, 132, 71, 116, 23, 151, 80];
pub const IX_DEPOSIT_REWARDS: Discriminator = [52, 249, 112, 72, 206, 161, 196, 1];
pub const IX_UPDATE_REWARDS: Discriminator = [188, 38, 124, 42, 87, 77, 176, 90];

/// Account types owned by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    GlobalConfig,
    StakingPool,
    StakeAccount,
}

impl AccountKind {
    pub const ALL: [AccountKind; 3] = [
        AccountKind::GlobalConfig,
        AccountKind::StakingPool,
        AccountKind::StakeAccount,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            AccountKind::GlobalConfig => "GlobalConfig",
            AccountKind::StakingPool => "StakingPool",
            AccountKind::StakeAccount => "StakeAccount",
        }
    }

    pub const fn discriminator(self) -> Discriminator {
        match self {
            AccountKind::GlobalConfig => GLOBAL_CONFIG_DISCRIMINATOR,
            AccountKind::StakingPool => STAKING_POOL_DISCRIMINATOR,
            AccountKind::StakeAccount => STAKE_ACCOUNT_DISCRIMINATOR,
        }
    }

    /// Identify an account from the leading bytes of its data.
    pub fn from_discriminator(data: &[u8]) -> Option<Self> {
        let tag = data.get(..DISCRIMINATOR_LEN)?;
        Self::ALL.into_iter().find(|k| k.discriminator() == tag)
    }
}

/// Instruction handlers exposed by the program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    Initialize,
    CreatePool,
    Stake,
    Unstake,
    RequestUnstake,
    CancelUnstake,
    ClaimRewards,
    DepositRewards,
    UpdateRewards,
}

impl InstructionKind {
    pub const ALL: [InstructionKind; 9] = [
        InstructionKind::Initialize,
        InstructionKind::CreatePool,
        InstructionKind::Stake,
        InstructionKind::Unstake,
        InstructionKind::RequestUnstake,
        InstructionKind::CancelUnstake,
        InstructionKind::ClaimRewards,
        InstructionKind::DepositRewards,
        InstructionKind::UpdateRewards,
    ];

    /// Handler name as declared in the program.
    pub const fn name(self) -> &'static str {
        match self {
            InstructionKind::Initialize => "initialize",
            InstructionKind::CreatePool => "create_pool",
            InstructionKind::Stake => "stake",
            InstructionKind::Unstake => "unstake",
            InstructionKind::RequestUnstake => "request_unstake",
            InstructionKind::CancelUnstake => "cancel_unstake",
            InstructionKind::ClaimRewards => "claim_rewards",
            InstructionKind::DepositRewards => "deposit_rewards",
            InstructionKind::UpdateRewards => "update_rewards",
        }
    }

    pub const fn discriminator(self) -> Discriminator {
        match self {
            InstructionKind::Initialize => IX_INITIALIZE,
            InstructionKind::CreatePool => IX_CREATE_POOL,
            InstructionKind::Stake => IX_STAKE,
            InstructionKind::Unstake => IX_UNSTAKE,
            InstructionKind::RequestUnstake => IX_REQUEST_UNSTAKE,
            InstructionKind::CancelUnstake => IX_CANCEL_UNSTAKE,
            InstructionKind::ClaimRewards => IX_CLAIM_REWARDS,
            InstructionKind::DepositRewards => IX_DEPOSIT_REWARDS,
            InstructionKind::UpdateRewards => IX_UPDATE_REWARDS,
        }
    }

    pub fn from_discriminator(data: &[u8]) -> Option<Self> {
        let tag = data.get(..DISCRIMINATOR_LEN)?;
        Self::ALL.into_iter().find(|k| k.discriminator() == tag)
    }
}

/// Look up a tag by semantic name: `"StakingPool"`, `"stake"`, ...
pub fn lookup(name: &str) -> Option<Discriminator> {
    AccountKind::ALL
        .into_iter()
        .find(|k| k.name() == name)
        .map(AccountKind::discriminator)
        .or_else(|| {
            InstructionKind::ALL
                .into_iter()
                .find(|k| k.name() == name)
                .map(InstructionKind::discriminator)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_tags_unique() {
        let mut seen = HashSet::new();
        for k in AccountKind::ALL {
            assert!(seen.insert(k.discriminator()), "duplicate tag for {}", k.name());
        }
        for k in InstructionKind::ALL {
            assert!(seen.insert(k.discriminator()), "duplicate tag for {}", k.name());
        }
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(lookup("StakingPool"), Some(STAKING_POOL_DISCRIMINATOR));
        assert_eq!(lookup("claim_rewards"), Some(IX_CLAIM_REWARDS));
        assert_eq!(lookup("stakingpool"), None);
        assert_eq!(lookup(""), None);
    }

    #[test]
    fn test_from_discriminator() {
        let mut data = STAKE_ACCOUNT_DISCRIMINATOR.to_vec();
        data.extend_from_slice(&[0u8; 16]);
        assert_eq!(AccountKind::from_discriminator(&data), Some(AccountKind::StakeAccount));
        assert_eq!(AccountKind::from_discriminator(&data[..7]), None);
        assert_eq!(InstructionKind::from_discriminator(&IX_STAKE), Some(InstructionKind::Stake));
        assert_eq!(InstructionKind::from_discriminator(&[0u8; 8]), None);
    }
}
