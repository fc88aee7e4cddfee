mod account_upgrade;
mod contract_upgrade;
mod transactions;

use kakarot_e2e::testing::{init_tracing, TestContext};
use std::sync::{Mutex, MutexGuard};

/// Locks a context shared by the tests of one module.
///
/// A test that panicked while holding the lock already reset the registry on
/// unwind, so the poisoned context is still usable.
pub fn lock(context: &'static Mutex<TestContext>) -> MutexGuard<'static, TestContext> {
    init_tracing();
    context
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A context of its own, for tests that need accounts nobody else touched.
pub fn fresh_context() -> TestContext {
    init_tracing();
    TestContext::new().unwrap()
}
