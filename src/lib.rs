// SPDX-License-Identifier: GPL-3.0-only

//! Softboard - key event timing and modifier state engine for a soft keyboard
//!
//! This crate decides, for every press on a soft keyboard key, which
//! higher-level gesture the press is becoming — tap, repeat, long press,
//! double tap — and tracks the latched/locked state of the modifier keys
//! (Shift, Ctrl, Alt, Meta, Fn) across sequences of presses.
//!
//! # Architecture
//!
//! Two state machines interact:
//!
//! 1. **Per-modifier latch machines** (`input::modifier_state`): each
//!    modifier walks Disabled / Enabled / Locked / LockToggled / Prefixed
//!    under toggle, lock, and prefix intents.
//!
//! 2. **Timer scheduler** (`timer::scheduler`): one associative set of
//!    pending delayed actions keyed by (category, identity), so repeat,
//!    long-press, double-tap, typing-idle, batch-update, and preview
//!    timers for concurrent pointers and modifier kinds never cross-talk.
//!
//! The [`InputSession`] glue owns both for one keyboard session and routes
//! raw events between them; the [`dispatch`] driver serializes commands and
//! timer expiry onto a single task. Rendering and pointer tracking stay
//! behind the [`DrawingHandle`] and [`PointerHandler`] traits — this crate
//! draws nothing and reads no hardware.
//!
//! # Modules
//!
//! - `config`: timing parameters with serde JSON loading
//! - `dispatch`: serialized command-queue driver on tokio
//! - `input`: key codes, the modifier registry, the latch state machines
//! - `session`: the per-session glue owning timers and modifier states
//! - `settings`: centralized timing defaults
//! - `timer`: the timer scheduler and its collaborator traits

pub mod config;
pub mod dispatch;
pub mod input;
pub mod session;
pub mod settings;
pub mod timer;

pub use crate::config::{ConfigError, TimingConfig};
pub use crate::dispatch::{SessionCommand, SessionDriver};
pub use crate::input::{Key, Modifier, ModifierState, ModifierStates};
pub use crate::session::{InputSession, ModifierGesture};
pub use crate::timer::{DrawingHandle, PointerHandler, PointerId, TimerScheduler};

// ============================================================================
// Integration Tests
// ============================================================================
