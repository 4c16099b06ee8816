//! Simulated device link: fixed latency, Bernoulli acknowledgment.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use robo_core::{ControlAction, Tablet};
use tracing::debug;

use crate::application::ports::DeviceLink;

/// Default round-trip latency.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1500);
/// Default probability that the tablet acknowledges an action.
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.9;

/// Seeded coin used to draw acknowledgments.
///
/// With a fixed seed the sequence of outcomes is reproducible.
pub struct OutcomeSampler {
    inner: Mutex<ChaCha8Rng>,
}

impl OutcomeSampler {
    /// Seeds from `seed`, or from OS entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            inner: Mutex::new(rng),
        }
    }

    /// Draws `true` with probability `p` (clamped to 0.0..=1.0).
    pub fn succeeds(&self, p: f64) -> bool {
        if p.is_nan() || p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        let mut rng = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_bool(p)
    }
}

impl std::fmt::Debug for OutcomeSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutcomeSampler")
            .field("inner", &"<Mutex<ChaCha8Rng>>")
            .finish()
    }
}

/// Pretends to deliver actions to the tablet.
#[derive(Debug)]
pub struct SimulatedDeviceLink {
    latency: Duration,
    success_probability: f64,
    sampler: OutcomeSampler,
}

impl SimulatedDeviceLink {
    pub fn new(latency: Duration, success_probability: f64, seed: Option<u64>) -> Self {
        Self {
            latency,
            success_probability: success_probability.clamp(0.0, 1.0),
            sampler: OutcomeSampler::new(seed),
        }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn success_probability(&self) -> f64 {
        self.success_probability
    }
}

impl Default for SimulatedDeviceLink {
    fn default() -> Self {
        Self::new(DEFAULT_LATENCY, DEFAULT_SUCCESS_PROBABILITY, None)
    }
}

#[async_trait]
impl DeviceLink for SimulatedDeviceLink {
    async fn send(&self, tablet: &Tablet, action: ControlAction) -> bool {
        tokio::time::sleep(self.latency).await;
        let acknowledged = self.sampler.succeeds(self.success_probability);
        debug!(
            "simulated {} to {} ({}): acknowledged={acknowledged}",
            action, tablet.id, tablet.ip_address
        );
        acknowledged
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
