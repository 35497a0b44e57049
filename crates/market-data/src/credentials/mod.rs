//! Quota-aware rotation over a pool of provider API keys.
//!
//! Free-tier keys come with a daily call budget. The rotator hands out the
//! active key until its call counter passes the soft limit, then moves to the
//! next key in the pool. Once the last key is spent the rotator is exhausted
//! for the rest of the process: it never wraps around and never resets.
//!
//! The rotator does no I/O. Callers report each upstream call with
//! [`CredentialRotator::record_call`].

use std::sync::{Mutex, MutexGuard};

use log::{debug, error, warn};

/// Default per-key budget before rotating (Alpha Vantage allows 500 calls a day).
pub const DEFAULT_SOFT_LIMIT: u32 = 450;

/// A provider key and its usage within this run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub key: String,
    pub call_count: u32,
    pub soft_limit: u32,
}

impl Credential {
    pub fn new(key: impl Into<String>, soft_limit: u32) -> Self {
        Self {
            key: key.into(),
            call_count: 0,
            soft_limit,
        }
    }

    fn within_budget(&self) -> bool {
        self.call_count <= self.soft_limit
    }
}

/// The credential currently handed out, identified by its pool position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveCredential {
    index: usize,
    key: String,
}

impl ActiveCredential {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

/// Result of [`CredentialRotator::current`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSlot {
    Active(ActiveCredential),
    /// Every key has been used past its soft limit. Terminal for this run.
    Exhausted,
}

#[derive(Debug)]
struct RotatorState {
    pool: Vec<Credential>,
    cursor: usize,
}

/// Hands out credentials from an ordered pool, rotating on budget exhaustion.
///
/// Thread-safe; one rotator is shared by every fetch against its provider.
pub struct CredentialRotator {
    provider: &'static str,
    state: Mutex<RotatorState>,
}

impl CredentialRotator {
    /// Build a rotator over `keys` in order, each with the same soft limit.
    pub fn new<I, K>(provider: &'static str, keys: I, soft_limit: u32) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let pool = keys
            .into_iter()
            .map(|k| Credential::new(k, soft_limit))
            .collect::<Vec<_>>();
        debug!("{}: credential pool of {} key(s)", provider, pool.len());
        Self::with_pool(provider, pool)
    }

    /// Build a rotator from pre-built credentials.
    pub fn with_pool(provider: &'static str, pool: Vec<Credential>) -> Self {
        Self {
            provider,
            state: Mutex::new(RotatorState { pool, cursor: 0 }),
        }
    }

    /// Lock the state mutex, recovering from poison if necessary.
    ///
    /// A panic while holding the lock can at worst leave a counter one short.
    fn lock_state(&self) -> MutexGuard<'_, RotatorState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("Credential rotator mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    /// Return the credential to use for the next upstream call.
    ///
    /// Advances past the active credential once its call count exceeds the
    /// soft limit. Returns [`CredentialSlot::Exhausted`] once the pool is spent.
    pub fn current(&self) -> CredentialSlot {
        let mut state = self.lock_state();

        let Some(active) = state.pool.get(state.cursor) else {
            return CredentialSlot::Exhausted;
        };

        if !active.within_budget() {
            state.cursor += 1;
            if state.cursor < state.pool.len() {
                warn!(
                    "{}: key #{} reached its soft limit, rotating to key #{}",
                    self.provider,
                    state.cursor - 1,
                    state.cursor
                );
            } else {
                error!("{}: all API keys exhausted", self.provider);
                return CredentialSlot::Exhausted;
            }
        }

        let index = state.cursor;
        CredentialSlot::Active(ActiveCredential {
            index,
            key: state.pool[index].key.clone(),
        })
    }

    /// Attribute one upstream call to `credential`.
    pub fn record_call(&self, credential: &ActiveCredential) {
        let mut state = self.lock_state();
        if let Some(entry) = state.pool.get_mut(credential.index) {
            entry.call_count = entry.call_count.saturating_add(1);
        }
    }

    /// Calls attributed so far to the credential at `index`.
    pub fn call_count(&self, index: usize) -> Option<u32> {
        self.lock_state().pool.get(index).map(|c| c.call_count)
    }

    pub fn is_exhausted(&self) -> bool {
        let state = self.lock_state();
        state.cursor >= state.pool.len()
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }
}
