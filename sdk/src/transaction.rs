//! Unsigned transaction assembly.
//!
//! The result has no fee payer, a default blockhash and empty signature
//! slots; the key holder fills those in at submission time.

use solana_sdk::{instruction::Instruction, message::Message, transaction::Transaction};

use crate::error::{Result, StakingSdkError};

/// Compose `instructions`, in order, into one unsigned transaction.
pub fn build_transaction(instructions: &[Instruction]) -> Result<Transaction> {
    if instructions.is_empty() {
        return Err(StakingSdkError::EmptyTransaction);
    }
    Ok(Transaction::new_unsigned(Message::new(instructions, None)))
}

/// Wire encoding (bincode) of a transaction, signed or not.
pub fn serialize_transaction(tx: &Transaction) -> Result<Vec<u8>> {
    Ok(bincode::serialize(tx)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::{instruction::AccountMeta, pubkey::Pubkey, signature::Signature};

    fn noop(program_id: Pubkey, signer: Pubkey) -> Instruction {
        Instruction {
            program_id,
            accounts: vec![AccountMeta::new(signer, true)],
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn test_empty_rejected() {
        assert!(matches!(
            build_transaction(&[]),
            Err(StakingSdkError::EmptyTransaction)
        ));
    }

    #[test]
    fn test_unsigned_shell() {
        let program = Pubkey::new_unique();
        let signer = Pubkey::new_unique();
        let tx = build_transaction(&[noop(program, signer), noop(program, signer)]).unwrap();

        assert_eq!(tx.message.instructions.len(), 2);
        assert_eq!(tx.message.header.num_required_signatures, 1);
        assert_eq!(tx.signatures, vec![Signature::default()]);
        assert_eq!(tx.message.recent_blockhash, Default::default());
        assert!(!tx.is_signed());
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let program = Pubkey::new_unique();
        let signer = Pubkey::new_unique();
        let tx = build_transaction(&[noop(program, signer)]).unwrap();
        let a = serialize_transaction(&tx).unwrap();
        let b = serialize_transaction(&tx).unwrap();
        assert_eq!(a, b);
        let back: Transaction = bincode::deserialize(&a).unwrap();
        assert_eq!(back, tx);
    }
}
