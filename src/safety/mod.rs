// src/safety/mod.rs
// Crisis detection and the timed lockout it arms.

pub mod gate;
pub mod lockout;

pub use gate::{SafetyGate, SafetyVerdict, CRISIS_PHRASES, CRISIS_REFERRAL_MESSAGE};
pub use lockout::{LockoutClock, LockoutKey, LockoutState, LockoutStatus, LOCKOUT_DURATION_MS};
