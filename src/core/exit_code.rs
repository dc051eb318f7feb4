// src/core/exit_code.rs

use lazy_static::lazy_static;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

lazy_static! {
    static ref PROCESS_EXIT_CODE: ExitCodeCell = ExitCodeCell::new();
}

/// A shared exit code that can only move away from zero once.
///
/// The parser records failures here instead of terminating the process; the
/// embedding program decides when to exit (usually by returning
/// [`ExitCodeCell::to_exit_code`] from `main`).
#[derive(Debug, Clone, Default)]
pub struct ExitCodeCell(Arc<AtomicI32>);

impl ExitCodeCell {
    /// A fresh, unset cell. Useful for tests and embedded parsers.
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell shared by the whole process.
    pub fn process() -> Self {
        PROCESS_EXIT_CODE.clone()
    }

    pub fn get(&self) -> i32 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.get() != 0
    }

    /// Stores `code` unless a non-zero code was stored before.
    /// Returns `true` if `code` was stored.
    pub fn set_if_unset(&self, code: i32) -> bool {
        self.0
            .compare_exchange(0, code, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Converts the stored code into a process exit code. Codes outside `0..=255` become 1.
    pub fn to_exit_code(&self) -> ExitCode {
        ExitCode::from(u8::try_from(self.get()).unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_nonzero_code_wins() {
        let cell = ExitCodeCell::new();
        assert!(!cell.is_set());

        assert!(cell.set_if_unset(2));
        assert!(!cell.set_if_unset(1));
        assert_eq!(cell.get(), 2);
    }

    #[test]
    fn test_clones_share_the_same_code() {
        let cell = ExitCodeCell::new();
        let other = cell.clone();
        other.set_if_unset(3);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn test_zero_does_not_count_as_set() {
        let cell = ExitCodeCell::new();
        assert!(cell.set_if_unset(0));
        assert!(!cell.is_set());
        assert!(cell.set_if_unset(1));
        assert_eq!(cell.get(), 1);
    }
}
