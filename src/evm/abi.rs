//! Solidity interfaces of the `PlainOpcodes` programs.

use alloy_sol_types::sol;

sol! {
    interface ICounter {
        function count() external view returns (uint256);
        function inc() external;
        function dec() external;
        function reset() external;
    }

    interface ICaller {
        function call(address target, bytes calldata payload) external returns (bool, bytes memory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::evm_selector;
    use alloy_sol_types::SolCall;

    #[test]
    fn selectors_match_signatures() {
        assert_eq!(ICounter::incCall::SELECTOR, evm_selector("inc()"));
        assert_eq!(ICounter::countCall::SELECTOR, evm_selector("count()"));
        assert_eq!(ICounter::decCall::SELECTOR, evm_selector("dec()"));
        assert_eq!(
            ICaller::callCall::SELECTOR,
            evm_selector("call(address,bytes)")
        );
    }
}
