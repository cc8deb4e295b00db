//! Earn Staking SDK: PDA helpers, account codec, instruction builders and an
//! RPC read client for the earn-staking program.

pub mod constants;
pub mod error;
pub mod pda;
pub mod discriminator;
pub mod state;
pub mod instruction;
pub mod client;
pub mod transaction;

pub use client::{AccountSource, RetryPolicy, RpcAccountSource, StakingClient};
pub use error::{Result, StakingSdkError};
pub use state::{
    decode_account, DecodedAccount, GlobalConfig, OwnedAccount, StakeAccount, StakingAccount,
    StakingPool,
};
pub use transaction::{build_transaction, serialize_transaction};
