// SPDX-License-Identifier: GPL-3.0-only

//! The timer scheduler: one associative set of pending delayed actions.
//!
//! Every delayed action of the input session lives here — key repeat,
//! long-press detection (generic and per modifier kind), the double-tap
//! windows of the modifier keys, the typing-idle timer, the self-repeating
//! batch-input update, and the two preview dismissals. Each pending timer
//! is keyed by a composite (category, identity) slot, so timers for
//! different pointers or modifier kinds never interfere.
//!
//! The scheduler never reads a clock. Arm operations take `now` from the
//! caller and [`TimerScheduler::advance`] fires everything due at the given
//! instant, which keeps the whole component deterministic under test and
//! leaves the choice of time source to the event-queue driver.

use crate::input::keycode;
use crate::input::{Key, Modifier};
use crate::timer::hooks::{DrawingHandle, PointerHandler, PointerId};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Composite (category, identity) key of one pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum TimerSlot {
    /// Global typing-idle timer. Its presence is the "user is typing" flag.
    TypingIdle,
    /// Key repeat for one pointer.
    KeyRepeat(PointerId),
    /// Generic long-press for one pointer holding a non-modifier key.
    LongPress(PointerId),
    /// Long-press of a modifier key, keyed by kind and pointer so it can be
    /// canceled either per pointer or globally per kind.
    LongPressModifier(Modifier, PointerId),
    /// Double-tap window of a modifier kind. Global, not pointer-scoped.
    DoubleTapModifier(Modifier),
    /// Self-repeating batch-input update for one gesturing pointer.
    UpdateBatchInput(PointerId),
    /// Delayed dismissal of the preview popup of one key, keyed by code.
    DismissKeyPreview(i32),
    /// Delayed dismissal of the floating gesture preview.
    DismissGesturePreview,
}

#[derive(Debug, Clone)]
enum TimerPayload {
    None,
    Repeat { code: i32, repeat_count: u32 },
    Batch { interval: Duration },
    Preview { key: Key },
}

#[derive(Debug, Clone)]
struct PendingTimer {
    deadline: Instant,
    /// Arm-order tiebreaker for timers sharing a deadline.
    seq: u64,
    payload: TimerPayload,
}

/// Priority-ordered set of pending timers, keyed by (category, identity).
///
/// At most one timer exists per slot; arming a slot replaces whatever was
/// pending there. Canceling an absent slot is a harmless no-op. All
/// mutation happens on the single session task, so a cancel is immediate
/// and a timer already popped for dispatch is past canceling.
#[derive(Debug, Default)]
pub struct TimerScheduler {
    pending: BTreeMap<TimerSlot, PendingTimer>,
    next_seq: u64,
}

impl TimerScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, slot: TimerSlot, deadline: Instant, payload: TimerPayload) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert(slot, PendingTimer { deadline, seq, payload });
    }

    // ------------------------------------------------------------------
    // Key repeat
    // ------------------------------------------------------------------

    /// Arms the repeat timer of `pointer` for its current key.
    ///
    /// No-op when the pointer has no current key or `delay` is zero (key
    /// repeat disabled). Replaces a pending repeat timer for the same
    /// pointer. On expiry the collaborator receives the key code and
    /// `repeat_count`; scheduling the next repetition is its decision.
    pub fn arm_key_repeat(
        &mut self,
        now: Instant,
        pointer: PointerId,
        key: Option<&Key>,
        repeat_count: u32,
        delay: Duration,
    ) {
        let Some(key) = key else { return };
        if delay.is_zero() {
            return;
        }
        tracing::trace!("arm key repeat: pointer={pointer} code={} count={repeat_count}", key.code());
        self.insert(
            TimerSlot::KeyRepeat(pointer),
            now + delay,
            TimerPayload::Repeat { code: key.code(), repeat_count },
        );
    }

    /// Cancels the repeat timer of one pointer.
    pub fn cancel_key_repeat(&mut self, pointer: PointerId) {
        self.pending.remove(&TimerSlot::KeyRepeat(pointer));
    }

    /// Cancels the repeat timers of all pointers.
    pub fn cancel_all_key_repeats(&mut self) {
        self.pending
            .retain(|slot, _| !matches!(slot, TimerSlot::KeyRepeat(_)));
    }

    /// Whether any pointer currently has a repeat timer pending.
    #[must_use]
    pub fn is_in_key_repeat(&self) -> bool {
        self.pending
            .keys()
            .any(|slot| matches!(slot, TimerSlot::KeyRepeat(_)))
    }

    // ------------------------------------------------------------------
    // Long press
    // ------------------------------------------------------------------

    /// Arms the long-press timer of `pointer` for its current key.
    ///
    /// A key whose code resolves to a modifier kind gets that kind's
    /// dedicated category, so a competing key press can invalidate modifier
    /// long-press detection without touching ordinary keys. All other keys
    /// share the generic per-pointer category. No-op when the pointer has
    /// no current key.
    pub fn arm_long_press(
        &mut self,
        now: Instant,
        pointer: PointerId,
        key: Option<&Key>,
        delay: Duration,
    ) {
        let Some(key) = key else { return };
        let slot = match Modifier::from_key_code(key.code()) {
            Some(kind) => TimerSlot::LongPressModifier(kind, pointer),
            None => TimerSlot::LongPress(pointer),
        };
        tracing::trace!("arm long press: pointer={pointer} slot={slot:?}");
        self.insert(slot, now + delay, TimerPayload::None);
    }

    /// Cancels every long-press timer of one pointer: the generic category
    /// and each modifier-specific category.
    pub fn cancel_long_press(&mut self, pointer: PointerId) {
        self.pending.remove(&TimerSlot::LongPress(pointer));
        for kind in Modifier::ALL {
            self.pending.remove(&TimerSlot::LongPressModifier(kind, pointer));
        }
    }

    /// Cancels the long-press timers of one modifier kind across all
    /// pointers. Used when a competing key press must invalidate pending
    /// modifier long-press detection regardless of which pointer armed it.
    pub fn cancel_long_press_for_modifier(&mut self, kind: Modifier) {
        self.pending
            .retain(|slot, _| !matches!(slot, TimerSlot::LongPressModifier(k, _) if *k == kind));
    }

    /// Cancels all long-press timers, generic and modifier-specific.
    pub fn cancel_all_long_press(&mut self) {
        self.pending.retain(|slot, _| {
            !matches!(
                slot,
                TimerSlot::LongPress(_) | TimerSlot::LongPressModifier(_, _)
            )
        });
    }

    // ------------------------------------------------------------------
    // Double tap
    // ------------------------------------------------------------------

    /// Opens the double-tap window of a modifier kind.
    ///
    /// The window is global rather than pointer-scoped. Expiry is silent:
    /// the timer only exists to make [`Self::is_double_tap_pending`] answer
    /// "was there a recent first tap", no callback fires.
    pub fn arm_double_tap(&mut self, now: Instant, kind: Modifier, window: Duration) {
        tracing::trace!("arm double tap: {}", kind.label());
        self.insert(TimerSlot::DoubleTapModifier(kind), now + window, TimerPayload::None);
    }

    /// Closes the double-tap window of a modifier kind.
    pub fn cancel_double_tap(&mut self, kind: Modifier) {
        self.pending.remove(&TimerSlot::DoubleTapModifier(kind));
    }

    /// Whether the double-tap window of `kind` is still open.
    #[must_use]
    pub fn is_double_tap_pending(&self, kind: Modifier) -> bool {
        self.pending.contains_key(&TimerSlot::DoubleTapModifier(kind))
    }

    // ------------------------------------------------------------------
    // Typing idle
    // ------------------------------------------------------------------

    /// Registers a typed key with the typing-idle timer.
    ///
    /// Modifier keys and keys showing an alt code while typing leave the
    /// timer untouched. Any other key cancels the running idle timer, then:
    /// space and enter end the typing session immediately (one `fade_in`
    /// if a session was active, no re-arm); everything else re-arms the
    /// timer for `delay` and emits `fade_out` when this press started the
    /// session. With no renderer attached nothing is re-armed.
    pub fn arm_typing_idle(
        &mut self,
        now: Instant,
        typed_key: &Key,
        delay: Duration,
        renderer: Option<&mut dyn DrawingHandle>,
    ) {
        if typed_key.is_modifier() || typed_key.has_alt_code_while_typing() {
            return;
        }
        let was_typing = self.is_typing_active();
        self.pending.remove(&TimerSlot::TypingIdle);
        let Some(renderer) = renderer else { return };

        let code = typed_key.code();
        if code == keycode::CODE_SPACE || code == keycode::CODE_ENTER {
            if was_typing {
                renderer.fade_in();
            }
            return;
        }

        self.insert(TimerSlot::TypingIdle, now + delay, TimerPayload::None);
        if !was_typing {
            renderer.fade_out();
        }
    }

    /// Whether a typing session is active. The armed idle timer is the flag.
    #[must_use]
    pub fn is_typing_active(&self) -> bool {
        self.pending.contains_key(&TimerSlot::TypingIdle)
    }

    // ------------------------------------------------------------------
    // Batch input
    // ------------------------------------------------------------------

    /// Arms the self-repeating batch-input update timer of a gesturing
    /// pointer. No-op when `interval` is zero (gesture updates disabled).
    /// Replaces a pending update timer for the same pointer. The timer
    /// re-arms itself on every expiry until explicitly canceled.
    pub fn arm_batch_input_update(&mut self, now: Instant, pointer: PointerId, interval: Duration) {
        if interval.is_zero() {
            return;
        }
        self.insert(
            TimerSlot::UpdateBatchInput(pointer),
            now + interval,
            TimerPayload::Batch { interval },
        );
    }

    /// Stops the batch-input updates of one pointer.
    pub fn cancel_batch_input_update(&mut self, pointer: PointerId) {
        self.pending.remove(&TimerSlot::UpdateBatchInput(pointer));
    }

    /// Stops the batch-input updates of all pointers.
    pub fn cancel_all_batch_input_updates(&mut self) {
        self.pending
            .retain(|slot, _| !matches!(slot, TimerSlot::UpdateBatchInput(_)));
    }

    // ------------------------------------------------------------------
    // Preview dismissal
    // ------------------------------------------------------------------

    /// Schedules dismissal of the preview popup of `key` after `delay`.
    pub fn post_dismiss_key_preview(&mut self, now: Instant, key: &Key, delay: Duration) {
        self.insert(
            TimerSlot::DismissKeyPreview(key.code()),
            now + delay,
            TimerPayload::Preview { key: *key },
        );
    }

    /// Schedules dismissal of the floating gesture preview after `delay`.
    pub fn post_dismiss_gesture_preview(&mut self, now: Instant, delay: Duration) {
        self.insert(TimerSlot::DismissGesturePreview, now + delay, TimerPayload::None);
    }

    // ------------------------------------------------------------------
    // Bulk cancellation
    // ------------------------------------------------------------------

    /// Cancels the repeat and long-press timers of one pointer, for when
    /// the pointer leaves the key or the touch is canceled.
    pub fn cancel_all_timers_for_pointer(&mut self, pointer: PointerId) {
        self.cancel_key_repeat(pointer);
        self.cancel_long_press(pointer);
    }

    /// Cancels all repeat and long-press timers across all pointers.
    pub fn cancel_all_key_timers(&mut self) {
        self.cancel_all_key_repeats();
        self.cancel_all_long_press();
    }

    /// Cancels every pending timer of every category. Invoked on full
    /// input-session teardown so nothing fires into a dead collaborator.
    pub fn cancel_everything(&mut self) {
        tracing::debug!("canceling all pending timers ({})", self.pending.len());
        self.pending.clear();
    }

    // ------------------------------------------------------------------
    // Introspection and firing
    // ------------------------------------------------------------------

    /// The earliest pending deadline, if any timer is armed.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|t| t.deadline).min()
    }

    /// Number of pending timers across all categories.
    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.pending.len()
    }

    fn pop_due(&mut self, now: Instant) -> Option<(TimerSlot, PendingTimer)> {
        let slot = self
            .pending
            .iter()
            .filter(|(_, timer)| timer.deadline <= now)
            .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
            .map(|(slot, _)| *slot)?;
        let timer = self.pending.remove(&slot)?;
        Some((slot, timer))
    }

    /// Fires every timer due at `now`, in deadline order (arm order breaks
    /// ties). Each fired timer invokes exactly one collaborator callback;
    /// a timer canceled by an earlier fire in the same call never fires.
    /// Rendering callbacks are dropped when `renderer` is `None`.
    ///
    /// Returns the number of timers that expired.
    pub fn advance(
        &mut self,
        now: Instant,
        pointers: &mut dyn PointerHandler,
        mut renderer: Option<&mut dyn DrawingHandle>,
    ) -> usize {
        let mut expired = 0;
        while let Some((slot, timer)) = self.pop_due(now) {
            expired += 1;
            tracing::trace!("timer expired: {slot:?}");
            match slot {
                TimerSlot::TypingIdle => {
                    if let Some(renderer) = renderer.as_deref_mut() {
                        renderer.fade_in();
                    }
                }
                TimerSlot::KeyRepeat(pointer) => {
                    if let TimerPayload::Repeat { code, repeat_count } = timer.payload {
                        pointers.on_key_repeated(pointer, code, repeat_count);
                    }
                }
                TimerSlot::LongPress(pointer) | TimerSlot::LongPressModifier(_, pointer) => {
                    // A confirmed long press consumes every other pending
                    // long-press timer of the same pointer.
                    self.cancel_long_press(pointer);
                    pointers.on_long_pressed(pointer);
                }
                TimerSlot::DoubleTapModifier(_) => {
                    // The window closed with no second tap. No callback.
                }
                TimerSlot::UpdateBatchInput(pointer) => {
                    pointers.on_batch_input_update(pointer, now);
                    if let TimerPayload::Batch { interval } = timer.payload {
                        self.insert(slot, now + interval, TimerPayload::Batch { interval });
                    }
                }
                TimerSlot::DismissKeyPreview(_) => {
                    if let (Some(renderer), TimerPayload::Preview { key }) =
                        (renderer.as_deref_mut(), timer.payload)
                    {
                        renderer.dismiss_key_preview(&key);
                    }
                }
                TimerSlot::DismissGesturePreview => {
                    if let Some(renderer) = renderer.as_deref_mut() {
                        renderer.dismiss_gesture_preview();
                    }
                }
            }
        }
        expired
    }
}
