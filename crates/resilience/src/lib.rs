//! Circuit breaker — failure isolation for outbound calls.
//!
//! A classic three-state breaker: CLOSED passes calls through and counts
//! failures; reaching the threshold trips to OPEN, which rejects calls
//! without attempting them; after the recovery timeout a single trial
//! call is allowed (HALF_OPEN) and its result decides whether the
//! circuit closes again or re-opens.
//!
//! One breaker instance is meant to be shared by every caller of the
//! dependency it guards: a provider outage trips it for all of them at
//! once. Construct it explicitly and inject it — there are no globals.

use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// The observable state of a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Circuit {
    /// Normal operation, calls pass through.
    Closed,
    /// Tripped, calls are rejected without being attempted.
    Open,
    /// Recovery trial, a single call is allowed through.
    HalfOpen,
}

/// Error returned by [`CircuitBreaker::call`].
#[derive(Debug, Error)]
pub enum BreakerError<E> {
    /// The circuit is open; the wrapped call was never attempted.
    #[error("circuit breaker is open; call rejected")]
    Open,

    /// The wrapped call was attempted and failed.
    #[error(transparent)]
    Service(E),
}

/// Internal mutable state, guarded by a single lock.
///
/// The lock is only held for bookkeeping before and after the wrapped
/// call, never across an `.await`.
struct BreakerState {
    circuit: Circuit,
    failure_count: u32,
    last_failure: Option<Instant>,
    /// Whether the single HALF_OPEN trial call is currently in flight.
    trial_in_flight: bool,
}

/// A three-state circuit breaker around any fallible async call.
pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery_timeout: Duration,
    state: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
    pub const DEFAULT_RECOVERY_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a breaker with the given trip threshold and cooldown.
    pub fn new(failure_threshold: u32, recovery_timeout: Duration) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            state: Mutex::new(BreakerState {
                circuit: Circuit::Closed,
                failure_count: 0,
                last_failure: None,
                trial_in_flight: false,
            }),
        }
    }

    /// The current circuit state.
    pub fn circuit(&self) -> Circuit {
        self.lock().circuit
    }

    /// The current consecutive-failure count.
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    /// Run `fut` through the breaker.
    ///
    /// When the circuit is OPEN and the recovery timeout has not yet
    /// elapsed, the future is dropped without being polled and
    /// [`BreakerError::Open`] is returned. When the timeout has elapsed
    /// the circuit moves to HALF_OPEN and exactly one caller gets to
    /// attempt the trial; concurrent callers are rejected with `Open`
    /// until the trial resolves.
    pub async fn call<T, E, F>(&self, fut: F) -> Result<T, BreakerError<E>>
    where
        F: Future<Output = Result<T, E>>,
    {
        self.admit()?;

        match fut.await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            }
            Err(e) => {
                self.record_failure();
                Err(BreakerError::Service(e))
            }
        }
    }

    /// Decide whether a call may proceed, updating state accordingly.
    fn admit<E>(&self) -> Result<(), BreakerError<E>> {
        let mut state = self.lock();
        match state.circuit {
            Circuit::Closed => Ok(()),
            Circuit::Open => {
                let elapsed = state
                    .last_failure
                    .map(|t| t.elapsed() >= self.recovery_timeout)
                    .unwrap_or(true);
                if elapsed {
                    debug!("Recovery timeout elapsed, entering half-open trial");
                    state.circuit = Circuit::HalfOpen;
                    state.trial_in_flight = true;
                    Ok(())
                } else {
                    Err(BreakerError::Open)
                }
            }
            Circuit::HalfOpen => {
                // Only one trial call at a time.
                if state.trial_in_flight {
                    Err(BreakerError::Open)
                } else {
                    state.trial_in_flight = true;
                    Ok(())
                }
            }
        }
    }

    fn record_success(&self) {
        let mut state = self.lock();
        if state.circuit != Circuit::Closed {
            debug!("Trial call succeeded, closing circuit");
        }
        state.circuit = Circuit::Closed;
        state.failure_count = 0;
        state.last_failure = None;
        state.trial_in_flight = false;
    }

    fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());
        state.trial_in_flight = false;

        let tripped = match state.circuit {
            // A failed trial re-opens immediately.
            Circuit::HalfOpen => true,
            _ => state.failure_count >= self.failure_threshold,
        };
        if tripped && state.circuit != Circuit::Open {
            warn!(
                failures = state.failure_count,
                "Failure threshold reached, circuit is now open"
            );
        }
        if tripped {
            state.circuit = Circuit::Open;
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_FAILURE_THRESHOLD,
            Self::DEFAULT_RECOVERY_TIMEOUT,
        )
    }
}
