//! Access gate
//!
//! A single non-reentrant lock held from open to close. Acquiring never
//! blocks: a second opener gets [`Error::Busy`] straight away. The guard
//! is the only way to reach the protected state, and dropping it is the
//! only way back to the free state, so a holder can release exactly once.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, TryLockError};

use crate::error::{Error, Result};

/// Observable state of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    /// No instance is open
    Free,
    /// One instance holds the gate
    Held,
}

/// Single-holder lock around `T`
pub struct AccessGate<T> {
    inner: Mutex<T>,
}

impl<T> AccessGate<T> {
    /// Wrap `value`; the gate starts free
    pub fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Try to take the gate without waiting
    pub fn try_acquire(&self) -> Result<GateGuard<'_, T>> {
        match self.inner.try_lock() {
            Ok(guard) => Ok(GateGuard { guard }),
            Err(TryLockError::WouldBlock) => Err(Error::Busy),
            // A holder that panicked still released the gate on unwind.
            Err(TryLockError::Poisoned(poisoned)) => {
                log::warn!("gate: previous holder panicked, recovering");
                self.inner.clear_poison();
                Ok(GateGuard {
                    guard: poisoned.into_inner(),
                })
            }
        }
    }

    /// Current state, as seen at the moment of the call
    pub fn state(&self) -> GateState {
        match self.inner.try_lock() {
            Err(TryLockError::WouldBlock) => GateState::Held,
            _ => GateState::Free,
        }
    }

    /// Consume the gate and return the protected value
    pub fn into_inner(self) -> T {
        self.inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Proof of holding the gate; releases it on drop
pub struct GateGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<T> Deref for GateGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for GateGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_is_busy() {
        let gate = AccessGate::new(0u32);
        let held = gate.try_acquire().unwrap();
        assert_eq!(gate.state(), GateState::Held);
        assert_eq!(gate.try_acquire().err(), Some(Error::Busy));
        drop(held);
        assert_eq!(gate.state(), GateState::Free);
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn test_guard_gives_access() {
        let gate = AccessGate::new(Vec::new());
        {
            let mut held = gate.try_acquire().unwrap();
            held.push(1u8);
        }
        assert_eq!(gate.into_inner(), vec![1u8]);
    }

    #[test]
    fn test_busy_across_threads() {
        let gate = AccessGate::new(());
        let _held = gate.try_acquire().unwrap();
        std::thread::scope(|s| {
            let result = s.spawn(|| gate.try_acquire().map(|_| ())).join().unwrap();
            assert_eq!(result, Err(Error::Busy));
        });
    }

    #[test]
    fn test_recovers_after_panicking_holder() {
        let gate = AccessGate::new(5u32);
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = gate.try_acquire().unwrap();
            panic!("holder crashed");
        }));
        assert_eq!(*gate.try_acquire().unwrap(), 5);
    }
}
