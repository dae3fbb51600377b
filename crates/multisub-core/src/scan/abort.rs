//! Cancellation of a running multi-pair replace.
//!
//! The caller keeps one clone and the scan driver another. The driver calls
//! `check` before decoding each match; once the flag trips, planning stops with
//! `Error::Aborted` and the partial plan is dropped, so no pair is ever applied
//! to only part of the text.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{Error, Result};

/// Shared "stop scanning" request. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct AbortFlag(Arc<AtomicBool>);

impl AbortFlag {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Stays set for the lifetime of the flag.
    #[inline]
    pub fn abort(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// `Err(Error::Aborted)` once cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<()> {
        if self.is_aborted() {
            return Err(Error::Aborted);
        }
        Ok(())
    }
}
