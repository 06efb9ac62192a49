//! Bounded polling for async conditions
//!
//! Used wherever a caller must block until the remote side converges
//! (readbacks settling after a staged write, type reports appearing).

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Deadline and poll interval for a bounded wait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollPolicy {
    pub deadline: Duration,
    pub interval: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            deadline: Duration::from_secs(2),
            interval: Duration::from_millis(20),
        }
    }
}

/// Repeatedly run `probe` until it yields a value or the deadline passes.
///
/// `probe` returns `Ok(Some(_))` when the condition holds, `Ok(None)` to keep
/// waiting, and `Err(_)` to abort immediately. The probe always runs at least
/// once. `Ok(None)` from this function means the deadline was exceeded.
pub async fn poll_until<F, Fut, T, E>(
    operation_name: &str,
    policy: PollPolicy,
    mut probe: F,
) -> Result<Option<T>, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let started = Instant::now();
    let mut attempts = 0usize;

    loop {
        attempts += 1;
        if let Some(value) = probe().await? {
            return Ok(Some(value));
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.deadline {
            log::debug!(
                "'{}' did not settle after {} attempts in {:?}",
                operation_name,
                attempts,
                elapsed
            );
            return Ok(None);
        }

        let remaining = policy.deadline - elapsed;
        sleep(policy.interval.min(remaining)).await;
    }
}
