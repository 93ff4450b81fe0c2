// SPDX-License-Identifier: GPL-3.0-only

//! Delayed-action scheduling for the input session.
//!
//! Everything time-driven in the keyboard core goes through one
//! [`TimerScheduler`]: key repeat, long-press detection, modifier
//! double-tap windows, the typing-idle timer, batch-input updates during
//! gestures, and preview dismissals. Timers are keyed by a composite
//! (category, identity) slot so concurrent pointers and modifier kinds
//! never cross-talk.
//!
//! The scheduler fires into two collaborator traits, [`DrawingHandle`] and
//! [`PointerHandler`]; see `hooks`. It holds no clock of its own — callers
//! pass the current instant in, and the event-queue driver in
//! [`crate::dispatch`] decides when to advance it.

pub mod hooks;
pub mod scheduler;

pub use hooks::{DrawingHandle, PointerHandler, PointerId};
pub use scheduler::TimerScheduler;
