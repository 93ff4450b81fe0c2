// SPDX-License-Identifier: GPL-3.0-only

//! Event dispatch glue: routing raw input events into the state machines
//! and the timer scheduler.
//!
//! [`InputSession`] is the owning context of the timing core. It holds the
//! [`TimerScheduler`] and the [`ModifierStates`] for exactly one keyboard
//! session; tearing the session down cancels every pending timer so
//! nothing can fire into a dead collaborator.
//!
//! The session implements *mechanism*, not product policy. Which gesture a
//! modifier release constitutes — plain tap, confirmed long press, sticky
//! press — is decided by the caller (using the long-press callback and the
//! double-tap query) and handed in as a [`ModifierGesture`]; the session
//! then applies the matching state-machine primitive.

use crate::config::TimingConfig;
use crate::input::{Key, Modifier, ModifierStates};
use crate::timer::{DrawingHandle, PointerHandler, PointerId, TimerScheduler};
use std::time::Instant;

/// How the product policy classified a modifier key release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierGesture {
    /// A plain tap: flip the toggled state.
    Tap,
    /// A confirmed long press: flip the locked state.
    LongPress,
    /// A sticky press: flip the prefixed state.
    Sticky,
}

/// The keyboard session's input timing context.
///
/// Owns the timer scheduler and the modifier state machines together, so
/// both share the session's lifetime.
#[derive(Debug)]
pub struct InputSession {
    config: TimingConfig,
    timers: TimerScheduler,
    modifiers: ModifierStates,
}

impl InputSession {
    /// Creates a session with every modifier disabled and no timers armed.
    #[must_use]
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            timers: TimerScheduler::new(),
            modifiers: ModifierStates::new(),
        }
    }

    /// The session's timing configuration.
    #[must_use]
    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// The timer scheduler.
    #[must_use]
    pub fn timers(&self) -> &TimerScheduler {
        &self.timers
    }

    /// Mutable access to the timer scheduler, for callers driving timer
    /// categories directly.
    #[must_use]
    pub fn timers_mut(&mut self) -> &mut TimerScheduler {
        &mut self.timers
    }

    /// The modifier state machines.
    #[must_use]
    pub fn modifiers(&self) -> &ModifierStates {
        &self.modifiers
    }

    /// Mutable access to the modifier state machines.
    #[must_use]
    pub fn modifiers_mut(&mut self) -> &mut ModifierStates {
        &mut self.modifiers
    }

    /// Handles a pointer landing on a key.
    ///
    /// A press competes with every *other* modifier's pending long-press
    /// detection: those timers are canceled across all pointers. The
    /// pressed key then gets its own long-press timer, routed to the
    /// modifier-specific category when the key is a modifier.
    pub fn on_key_pressed(&mut self, now: Instant, pointer: PointerId, pointers: &dyn PointerHandler) {
        let key = pointers.current_key(pointer);
        if let Some(key) = key {
            let pressed = Modifier::from_key_code(key.code());
            for kind in Modifier::ALL {
                if Some(kind) != pressed {
                    self.timers.cancel_long_press_for_modifier(kind);
                }
            }
        }
        self.timers
            .arm_long_press(now, pointer, key.as_ref(), self.config.long_press_timeout());
    }

    /// Arms the next key repetition for a pointer holding a repeatable key.
    ///
    /// The first repetition (`repeat_count` 1) waits for the start delay;
    /// later ones use the repeat interval. The collaborator calls this
    /// again from its repeat callback to keep the key repeating.
    pub fn arm_key_repeat(
        &mut self,
        now: Instant,
        pointer: PointerId,
        pointers: &dyn PointerHandler,
        repeat_count: u32,
    ) {
        let delay = if repeat_count == 1 {
            self.config.key_repeat_start_delay()
        } else {
            self.config.key_repeat_interval()
        };
        let key = pointers.current_key(pointer);
        self.timers
            .arm_key_repeat(now, pointer, key.as_ref(), repeat_count, delay);
    }

    /// Handles a pointer leaving its key: the pointer's repeat and
    /// long-press timers are canceled.
    pub fn on_key_released(&mut self, pointer: PointerId) {
        self.timers.cancel_all_timers_for_pointer(pointer);
    }

    /// Handles a modifier key press against the double-tap window.
    ///
    /// Returns `true` when this press is the second tap of a double tap
    /// (the window was open; it is consumed). Otherwise opens the window
    /// and returns `false`.
    pub fn on_modifier_pressed(&mut self, now: Instant, kind: Modifier) -> bool {
        if self.timers.is_double_tap_pending(kind) {
            self.timers.cancel_double_tap(kind);
            return true;
        }
        self.timers
            .arm_double_tap(now, kind, self.config.double_tap_window());
        false
    }

    /// Applies the state-machine transition for a classified modifier
    /// release.
    pub fn on_modifier_released(&mut self, kind: Modifier, gesture: ModifierGesture) {
        let state = self.modifiers.state_mut(kind);
        match gesture {
            ModifierGesture::Tap => {
                let toggled = state.is_toggled_only() || state.is_lock_toggled();
                state.set_toggled(!toggled);
            }
            ModifierGesture::LongPress => {
                let locked = state.is_locked();
                state.set_locked(!locked);
            }
            ModifierGesture::Sticky => {
                let prefixed = state.is_prefixed();
                state.set_prefixed(!prefixed);
            }
        }
    }

    /// Registers a committed (typed) key with the typing-idle timer.
    pub fn on_key_typed(
        &mut self,
        now: Instant,
        key: &Key,
        renderer: Option<&mut dyn DrawingHandle>,
    ) {
        self.timers
            .arm_typing_idle(now, key, self.config.ignore_alt_code_key_timeout(), renderer);
    }

    /// A gesturing pointer stopped moving: start periodic batch updates.
    pub fn on_gesture_hold(&mut self, now: Instant, pointer: PointerId) {
        self.timers
            .arm_batch_input_update(now, pointer, self.config.gesture_update_interval());
    }

    /// A gesturing pointer resumed moving or ended its gesture: stop the
    /// periodic batch updates.
    pub fn on_gesture_moved(&mut self, pointer: PointerId) {
        self.timers.cancel_batch_input_update(pointer);
    }

    /// Schedules dismissal of a released key's preview popup.
    pub fn schedule_key_preview_dismissal(&mut self, now: Instant, key: &Key) {
        self.timers
            .post_dismiss_key_preview(now, key, self.config.key_preview_dismiss_delay());
    }

    /// Schedules dismissal of the floating gesture preview.
    pub fn schedule_gesture_preview_dismissal(&mut self, now: Instant) {
        self.timers
            .post_dismiss_gesture_preview(now, self.config.gesture_preview_dismiss_delay());
    }

    /// Whether a typing session is active.
    #[must_use]
    pub fn is_typing_active(&self) -> bool {
        self.timers.is_typing_active()
    }

    /// Whether the double-tap window of `kind` is open.
    #[must_use]
    pub fn is_double_tap_pending(&self, kind: Modifier) -> bool {
        self.timers.is_double_tap_pending(kind)
    }

    /// Fires every timer due at `now`. See [`TimerScheduler::advance`].
    pub fn advance(
        &mut self,
        now: Instant,
        pointers: &mut dyn PointerHandler,
        renderer: Option<&mut dyn DrawingHandle>,
    ) -> usize {
        self.timers.advance(now, pointers, renderer)
    }

    /// Tears the session down: cancels every pending timer and disables
    /// every modifier.
    pub fn teardown(&mut self) {
        tracing::debug!("input session teardown");
        self.timers.cancel_everything();
        self.modifiers.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::keycode;
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Default)]
    struct StubPointers {
        keys: HashMap<PointerId, Key>,
        long_presses: Vec<PointerId>,
        repeats: Vec<(PointerId, i32, u32)>,
    }

    impl StubPointers {
        fn with_key(pointer: PointerId, key: Key) -> Self {
            let mut stub = Self::default();
            stub.keys.insert(pointer, key);
            stub
        }
    }

    impl PointerHandler for StubPointers {
        fn current_key(&self, pointer: PointerId) -> Option<Key> {
            self.keys.get(&pointer).copied()
        }

        fn on_key_repeated(&mut self, pointer: PointerId, code: i32, repeat_count: u32) {
            self.repeats.push((pointer, code, repeat_count));
        }

        fn on_long_pressed(&mut self, pointer: PointerId) {
            self.long_presses.push(pointer);
        }

        fn on_batch_input_update(&mut self, _pointer: PointerId, _timestamp: Instant) {}
    }

    fn session() -> InputSession {
        InputSession::new(TimingConfig::default())
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_tap_gesture_walks_toggle_states() {
        let mut session = session();

        session.on_modifier_released(Modifier::Shift, ModifierGesture::Tap);
        assert!(session.modifiers().state(Modifier::Shift).is_toggled_only());

        session.on_modifier_released(Modifier::Shift, ModifierGesture::Tap);
        assert!(session.modifiers().state(Modifier::Shift).is_disabled());
    }

    #[test]
    fn test_tap_gesture_suspends_and_resumes_a_lock() {
        let mut session = session();
        session.on_modifier_released(Modifier::Ctrl, ModifierGesture::LongPress);
        assert!(session.modifiers().state(Modifier::Ctrl).is_locked());

        session.on_modifier_released(Modifier::Ctrl, ModifierGesture::Tap);
        assert!(session.modifiers().state(Modifier::Ctrl).is_lock_toggled());

        session.on_modifier_released(Modifier::Ctrl, ModifierGesture::Tap);
        assert!(session.modifiers().state(Modifier::Ctrl).is_locked());
        assert!(!session.modifiers().state(Modifier::Ctrl).is_lock_toggled());
    }

    #[test]
    fn test_long_press_gesture_locks_and_unlocks() {
        let mut session = session();
        session.on_modifier_released(Modifier::Alt, ModifierGesture::LongPress);
        assert!(session.modifiers().state(Modifier::Alt).is_locked());

        session.on_modifier_released(Modifier::Alt, ModifierGesture::LongPress);
        assert!(session.modifiers().state(Modifier::Alt).is_disabled());
    }

    #[test]
    fn test_sticky_gesture_prefixes() {
        let mut session = session();
        session.on_modifier_released(Modifier::Meta, ModifierGesture::Sticky);
        assert!(session.modifiers().state(Modifier::Meta).is_prefixed());

        session.on_modifier_released(Modifier::Meta, ModifierGesture::Sticky);
        assert!(session.modifiers().state(Modifier::Meta).is_disabled());
    }

    #[test]
    fn test_competing_press_cancels_other_modifier_long_press() {
        let mut session = session();
        let t0 = Instant::now();
        let shift = StubPointers::with_key(1, Key::modifier(keycode::CODE_SHIFT));
        let letter = StubPointers::with_key(2, Key::new('a' as i32));

        session.on_key_pressed(t0, 1, &shift);
        assert_eq!(session.timers().pending_timers(), 1);

        // A second pointer pressing a plain key invalidates Shift's pending
        // long-press detection but arms its own generic timer.
        session.on_key_pressed(t0, 2, &letter);
        assert_eq!(session.timers().pending_timers(), 1);

        let mut pointers = letter;
        session.advance(t0 + ms(300), &mut pointers, None);
        assert_eq!(pointers.long_presses, vec![2]);
    }

    #[test]
    fn test_own_long_press_survives_own_press() {
        let mut session = session();
        let t0 = Instant::now();
        let shift = StubPointers::with_key(1, Key::modifier(keycode::CODE_SHIFT));

        session.on_key_pressed(t0, 1, &shift);

        let mut pointers = shift;
        session.advance(t0 + ms(300), &mut pointers, None);
        assert_eq!(pointers.long_presses, vec![1]);
    }

    #[test]
    fn test_repeat_delay_depends_on_repeat_count() {
        let mut session = session();
        let t0 = Instant::now();
        let letter = StubPointers::with_key(1, Key::new('a' as i32));

        session.arm_key_repeat(t0, 1, &letter, 1);
        assert_eq!(
            session.timers().next_deadline(),
            Some(t0 + session.config().key_repeat_start_delay())
        );

        session.arm_key_repeat(t0, 1, &letter, 2);
        assert_eq!(
            session.timers().next_deadline(),
            Some(t0 + session.config().key_repeat_interval())
        );
    }

    #[test]
    fn test_double_tap_detection_within_window() {
        let mut session = session();
        let t0 = Instant::now();

        assert!(!session.on_modifier_pressed(t0, Modifier::Shift));
        assert!(session.is_double_tap_pending(Modifier::Shift));

        // Second tap inside the window is a double tap and consumes it.
        assert!(session.on_modifier_pressed(t0 + ms(100), Modifier::Shift));
        assert!(!session.is_double_tap_pending(Modifier::Shift));
    }

    #[test]
    fn test_double_tap_window_expires_between_taps() {
        let mut session = session();
        let t0 = Instant::now();
        let mut pointers = StubPointers::default();

        assert!(!session.on_modifier_pressed(t0, Modifier::Shift));
        session.advance(t0 + ms(300), &mut pointers, None);

        // The window elapsed, so the next press opens a fresh one.
        assert!(!session.on_modifier_pressed(t0 + ms(400), Modifier::Shift));
    }

    #[test]
    fn test_release_cancels_pointer_timers_only() {
        let mut session = session();
        let t0 = Instant::now();
        let letter = StubPointers::with_key(1, Key::new('a' as i32));
        let other = StubPointers::with_key(2, Key::new('b' as i32));

        session.on_key_pressed(t0, 1, &letter);
        session.arm_key_repeat(t0, 1, &letter, 1);
        session.on_key_pressed(t0, 2, &other);
        assert_eq!(session.timers().pending_timers(), 3);

        session.on_key_released(1);
        assert_eq!(session.timers().pending_timers(), 1);
    }

    #[test]
    fn test_teardown_clears_timers_and_modifiers() {
        let mut session = session();
        let t0 = Instant::now();
        let letter = StubPointers::with_key(1, Key::new('a' as i32));

        session.on_key_pressed(t0, 1, &letter);
        session.on_modifier_pressed(t0, Modifier::Fn);
        session.on_modifier_released(Modifier::Fn, ModifierGesture::LongPress);
        session.schedule_gesture_preview_dismissal(t0);

        session.teardown();
        assert_eq!(session.timers().pending_timers(), 0);
        assert!(session.modifiers().state(Modifier::Fn).is_disabled());
    }
}
