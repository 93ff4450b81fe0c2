// SPDX-License-Identifier: GPL-3.0-only

//! Input classification for the timing core.
//!
//! This module holds the pieces that decide *what* was pressed, independent
//! of *when*:
//!
//! - **Key codes** (`keycode`): printable and sentinel codes plus the
//!   read-only [`Key`] descriptor handed in by the pointer collaborator.
//! - **Modifier registry** (`modifier`): the closed [`Modifier`] enum with
//!   O(1) lookup from primary or lock key codes.
//! - **Modifier state machines** (`modifier_state`): one five-state
//!   latch/lock machine per modifier, plus the session-owned set.

pub mod keycode;
pub mod modifier;
pub mod modifier_state;

pub use keycode::Key;
pub use modifier::Modifier;
pub use modifier_state::{ModifierState, ModifierStates};
