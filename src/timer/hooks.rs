// SPDX-License-Identifier: GPL-3.0-only

//! Collaborator interfaces the scheduler fires into.
//!
//! The timing core owns no rendering and no pointer tracking. When a timer
//! expires, the scheduler calls exactly one method on one of these traits;
//! the implementations live with the keyboard view and the touch handling
//! code. Both are in-process contracts with no wire format.

use crate::input::Key;
use std::time::Instant;

/// Identifies one simultaneous touch contact.
pub type PointerId = u32;

/// Rendering/animation collaborator.
///
/// The session may outlive its renderer during teardown, so the scheduler
/// always receives this as an `Option` and treats `None` as "drop the
/// callback" rather than an error.
pub trait DrawingHandle {
    /// Restore full key visibility after a typing session ends.
    fn fade_in(&mut self);

    /// Dim keys that are irrelevant while the user is actively typing.
    fn fade_out(&mut self);

    /// Remove the popup preview of a released key.
    fn dismiss_key_preview(&mut self, key: &Key);

    /// Remove the floating gesture trail preview.
    fn dismiss_gesture_preview(&mut self);
}

/// Pointer/key collaborator. Queried for the key under a pointer and
/// notified of expired per-pointer timers.
pub trait PointerHandler {
    /// The key currently under `pointer`, if any.
    fn current_key(&self, pointer: PointerId) -> Option<Key>;

    /// A key repeat timer fired. `repeat_count` starts at 1; re-arming the
    /// next repetition is the collaborator's decision.
    fn on_key_repeated(&mut self, pointer: PointerId, code: i32, repeat_count: u32);

    /// A long-press timer fired for `pointer`.
    fn on_long_pressed(&mut self, pointer: PointerId);

    /// A batch-input update timer fired while `pointer` is holding still.
    fn on_batch_input_update(&mut self, pointer: PointerId, timestamp: Instant);
}
