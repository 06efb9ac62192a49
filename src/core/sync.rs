//! Synchronization utilities for robust lock handling
//!
//! Converts lock poisoning into the caller's error type so that a panic on
//! a callback thread surfaces as an ordinary error instead of a second panic.

use std::sync::{LockResult, PoisonError, RwLockWriteGuard};

/// Handle poisoned mutex cases with consistent error handling
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use adpipeline::core::sync::handle_mutex_poison;
/// use adpipeline::point::api::PointError;
///
/// let mutex = Mutex::new(42);
/// let guard = handle_mutex_poison(mutex.lock(), |msg| PointError::Disconnected {
///     name: "XF:DET:cam1:Acquire".to_string(),
///     reason: msg,
/// })
/// .unwrap();
/// assert_eq!(*guard, 42);
/// ```
pub fn handle_mutex_poison<T, E>(
    result: LockResult<T>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<T, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned). PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Handle poisoned RwLock write operations with consistent error handling
pub fn handle_rwlock_write<T, E>(
    result: LockResult<RwLockWriteGuard<T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (RwLock write poisoned). PoisonError: {:?}",
            poison_err
        ))
    })
}

/// Take the guard out of a poisoned lock.
///
/// For state that stays consistent even if a holder panicked (flags,
/// whole-value replacements).
pub fn recover_lock<T>(result: LockResult<T>) -> T {
    result.unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex, RwLock};
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct TestError {
        message: String,
    }

    #[test]
    fn test_handle_mutex_poison_success() {
        let mutex = Arc::new(Mutex::new(42));
        let result = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg });

        assert_eq!(*result.unwrap(), 42);
    }

    #[test]
    fn test_handle_mutex_poison_with_poisoned_mutex() {
        let mutex = Arc::new(Mutex::new(42));
        let mutex_clone = Arc::clone(&mutex);

        let _ = thread::spawn(move || {
            let _guard = mutex_clone.lock().unwrap();
            panic!("Intentional panic to poison mutex");
        })
        .join();

        let result = handle_mutex_poison(mutex.lock(), |msg| TestError { message: msg });

        let error = result.unwrap_err();
        assert!(error.message.contains("mutex poisoned"));
    }

    #[test]
    fn test_handle_rwlock_write_with_poisoned_lock() {
        let lock = Arc::new(RwLock::new(vec![1]));
        let lock_clone = Arc::clone(&lock);

        let _ = thread::spawn(move || {
            let _guard = lock_clone.write().unwrap();
            panic!("Intentional panic to poison rwlock");
        })
        .join();

        let write = handle_rwlock_write(lock.write(), |msg| TestError { message: msg });
        assert!(write.unwrap_err().message.contains("write poisoned"));
    }

    #[test]
    fn test_recover_lock_after_poison() {
        let mutex = Arc::new(Mutex::new(7));
        let poisoner = Arc::clone(&mutex);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(*recover_lock(mutex.lock()), 7);
    }
}
