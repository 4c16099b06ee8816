//! Device link implementations.
//!
//! There is no real control channel to the tablets yet.  [`simulated`]
//! stands in for one: it waits a fixed latency and then reports a random
//! acknowledgment.  [`mock::ScriptedDeviceLink`] lets tests choose each
//! acknowledgment and inspect what was sent.

pub mod mock;
pub mod simulated;

pub use simulated::SimulatedDeviceLink;
