use crate::core::errors::transaction_errors::TransactionError;
use alloy_primitives::{keccak256, Address as EvmAddress, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

/// An EVM transaction sent through a Kakarot account.
///
/// `to == None` deploys the program whose artifact id is `data`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvmTransaction {
    pub chain_id: u64,
    pub nonce: u64,
    pub to: Option<EvmAddress>,
    pub value: U256,
    pub data: Bytes,
    /// Maximum fee, in fee token wei, the sender pays for inclusion.
    pub max_fee: u128,
}

impl EvmTransaction {
    /// Hash the sender signs.
    pub fn signing_hash(&self) -> B256 {
        let encoded = (
            self.chain_id,
            self.nonce,
            self.to.is_none(),
            self.to.unwrap_or_default(),
            self.value,
            self.max_fee,
            self.data.clone(),
        )
            .abi_encode();
        keccak256(encoded)
    }

    pub fn sign(self, private_key: &SigningKey) -> Result<SignedTransaction, TransactionError> {
        let (signature, recovery_id) = private_key
            .sign_prehash_recoverable(self.signing_hash().as_slice())
            .map_err(|err| TransactionError::InvalidSignature(err.to_string()))?;
        Ok(SignedTransaction {
            transaction: self,
            signature,
            recovery_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: EvmTransaction,
    signature: Signature,
    recovery_id: RecoveryId,
}

impl SignedTransaction {
    pub fn transaction(&self) -> &EvmTransaction {
        &self.transaction
    }

    /// Address of the key that signed the transaction.
    pub fn recover_signer(&self) -> Result<EvmAddress, TransactionError> {
        let verifying_key = VerifyingKey::recover_from_prehash(
            self.transaction.signing_hash().as_slice(),
            &self.signature,
            self.recovery_id,
        )
        .map_err(|err| TransactionError::InvalidSignature(err.to_string()))?;
        Ok(EvmAddress::from_public_key(&verifying_key))
    }

    pub fn hash(&self) -> B256 {
        let mut payload = self.transaction.signing_hash().to_vec();
        payload.extend_from_slice(&self.signature.to_bytes());
        payload.push(self.recovery_id.to_byte());
        keccak256(payload)
    }
}
