use super::{read_u256, write_u256};
use crate::{
    core::errors::kakarot_errors::KakarotError,
    definitions::constants::{ERC20_BALANCES, ERC20_TOTAL_SUPPLY},
    state::state_api::{State, StateReader},
    utils::{join_u256, split_u256, Address},
    Felt252,
};
use alloy_primitives::U256;
use tracing::debug;

/// The ERC20 used as native token of the EVM and to pay fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeToken {
    address: Address,
}

impl FeeToken {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn balance_of<S: StateReader + ?Sized>(
        &self,
        state: &S,
        account: Address,
    ) -> Result<U256, KakarotError> {
        Ok(read_u256(state, self.address, ERC20_BALANCES, &[account.0])?)
    }

    pub fn total_supply<S: StateReader + ?Sized>(&self, state: &S) -> Result<U256, KakarotError> {
        Ok(read_u256(state, self.address, ERC20_TOTAL_SUPPLY, &[])?)
    }

    pub fn transfer<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        sender: Address,
        recipient: Address,
        amount: U256,
    ) -> Result<(), KakarotError> {
        if amount.is_zero() || sender == recipient {
            return Ok(());
        }

        let sender_balance = self.balance_of(state, sender)?;
        let Some(remaining) = sender_balance.checked_sub(amount) else {
            return Err(KakarotError::InsufficientBalance {
                address: sender,
                balance: sender_balance,
                amount,
            });
        };
        let recipient_balance = self.balance_of(state, recipient)?;

        write_u256(state, self.address, ERC20_BALANCES, &[sender.0], remaining)?;
        write_u256(
            state,
            self.address,
            ERC20_BALANCES,
            &[recipient.0],
            recipient_balance.saturating_add(amount),
        )?;
        debug!(%sender, %recipient, %amount, "fee token transfer");
        Ok(())
    }

    /// Creates `amount` new tokens, only used at genesis.
    pub fn mint<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        recipient: Address,
        amount: U256,
    ) -> Result<(), KakarotError> {
        let balance = self.balance_of(state, recipient)?;
        let supply = self.total_supply(state)?;
        write_u256(
            state,
            self.address,
            ERC20_BALANCES,
            &[recipient.0],
            balance.saturating_add(amount),
        )?;
        write_u256(
            state,
            self.address,
            ERC20_TOTAL_SUPPLY,
            &[],
            supply.saturating_add(amount),
        )?;
        Ok(())
    }

    /// External entry points, as reached by an `invoke` on the token.
    pub fn execute<S: StateReader + State + ?Sized>(
        &self,
        state: &mut S,
        caller: Address,
        entry_point: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, KakarotError> {
        match entry_point {
            "transfer" => {
                let [recipient, low, high] = expect_calldata(entry_point, calldata)?;
                let amount = parse_u256(entry_point, &low, &high)?;
                self.transfer(state, caller, Address(recipient), amount)?;
                Ok(vec![Felt252::ONE])
            }
            _ => self.view(state, entry_point, calldata),
        }
    }

    pub fn view<S: StateReader + ?Sized>(
        &self,
        state: &S,
        entry_point: &str,
        calldata: &[Felt252],
    ) -> Result<Vec<Felt252>, KakarotError> {
        match entry_point {
            "balanceOf" => {
                let [account] = expect_calldata(entry_point, calldata)?;
                Ok(split_u256(self.balance_of(state, Address(account))?).to_vec())
            }
            "totalSupply" => {
                expect_calldata::<0>(entry_point, calldata)?;
                Ok(split_u256(self.total_supply(state)?).to_vec())
            }
            _ => Err(KakarotError::EntryPointNotFound(entry_point.to_string())),
        }
    }
}

pub(crate) fn expect_calldata<const N: usize>(
    entry_point: &str,
    calldata: &[Felt252],
) -> Result<[Felt252; N], KakarotError> {
    <[Felt252; N]>::try_from(calldata).map_err(|_| KakarotError::InvalidCalldata {
        entry_point: entry_point.to_string(),
        expected: N,
        actual: calldata.len(),
    })
}

fn parse_u256(entry_point: &str, low: &Felt252, high: &Felt252) -> Result<U256, KakarotError> {
    join_u256(low, high).ok_or_else(|| KakarotError::InvalidCalldata {
        entry_point: entry_point.to_string(),
        expected: 3,
        actual: 3,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        state::{cached_state::CachedState, in_memory_state_reader::InMemoryStateReader},
        utils::ClassHash,
    };
    use assert_matches::assert_matches;

    fn token_state(token: Address) -> InMemoryStateReader {
        let mut state_reader = InMemoryStateReader::default();
        state_reader
            .address_to_class_hash_mut()
            .insert(token, ClassHash([7; 32]));
        state_reader
    }

    #[test]
    fn mint_then_transfer() {
        let token = FeeToken::new(Address(100u64.into()));
        let state_reader = token_state(token.address());
        let mut state = CachedState::new(&state_reader);
        let (alice, bob) = (Address(1u64.into()), Address(2u64.into()));

        token.mint(&mut state, alice, U256::from(50u64)).unwrap();
        token
            .execute(
                &mut state,
                alice,
                "transfer",
                &[bob.0, Felt252::from(20u64), Felt252::ZERO],
            )
            .unwrap();

        assert_eq!(token.balance_of(&state, alice).unwrap(), U256::from(30u64));
        assert_eq!(token.balance_of(&state, bob).unwrap(), U256::from(20u64));
        assert_eq!(token.total_supply(&state).unwrap(), U256::from(50u64));
        assert_eq!(
            token.view(&state, "balanceOf", &[bob.0]).unwrap(),
            vec![Felt252::from(20u64), Felt252::ZERO]
        );
    }

    #[test]
    fn transfer_more_than_balance_fails() {
        let token = FeeToken::new(Address(100u64.into()));
        let state_reader = token_state(token.address());
        let mut state = CachedState::new(&state_reader);

        assert_matches!(
            token.transfer(
                &mut state,
                Address(1u64.into()),
                Address(2u64.into()),
                U256::from(1u64)
            ),
            Err(KakarotError::InsufficientBalance { .. })
        );
    }

    #[test]
    fn wrong_calldata_length() {
        let token = FeeToken::new(Address(100u64.into()));
        let state_reader = token_state(token.address());

        assert_matches!(
            token.view(&state_reader, "balanceOf", &[]),
            Err(KakarotError::InvalidCalldata { expected: 1, actual: 0, .. })
        );
        assert_matches!(
            token.view(&state_reader, "approve", &[]),
            Err(KakarotError::EntryPointNotFound(_))
        );
    }
}
