// SPDX-License-Identifier: GPL-3.0-only

//! Serialized event-queue driver for the input session.
//!
//! The concurrency model of the timing core is one logical owner task: all
//! scheduler and state-machine calls happen on it, and timer expiry is
//! injected as an event on the same queue as raw input — a firing callback
//! can never race an in-flight arm or cancel. This module provides that
//! queue: input arrives as [`SessionCommand`]s over a channel, and the
//! driver sleeps on the scheduler's next deadline in between, advancing
//! the session when the deadline is reached.
//!
//! Dropping the command sender (or sending [`SessionCommand::Shutdown`])
//! ends the loop; the driver tears the session down before returning, so
//! no timer can outlive the collaborators.

use crate::input::{Key, Modifier};
use crate::session::{InputSession, ModifierGesture};
use crate::timer::{DrawingHandle, PointerHandler, PointerId};
use futures::StreamExt;
use futures::channel::mpsc;
use std::time::Instant;

/// One input event queued to the session task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// A pointer landed on a key.
    KeyPressed { pointer: PointerId },
    /// A pointer holds a repeatable key; arm the next repetition.
    RepeatKeyHeld { pointer: PointerId, repeat_count: u32 },
    /// A pointer left its key.
    KeyReleased { pointer: PointerId },
    /// A modifier key went down; checks the double-tap window.
    ModifierPressed { kind: Modifier },
    /// A modifier key release, already classified by the product policy.
    ModifierReleased {
        kind: Modifier,
        gesture: ModifierGesture,
    },
    /// A key was committed to the editor.
    KeyTyped { key: Key },
    /// A gesturing pointer stopped moving.
    GestureHold { pointer: PointerId },
    /// A gesturing pointer resumed moving or finished.
    GestureMoved { pointer: PointerId },
    /// Schedule dismissal of a released key's preview popup.
    DismissKeyPreview { key: Key },
    /// Schedule dismissal of the floating gesture preview.
    DismissGesturePreview,
    /// Tear the session down and end the driver loop.
    Shutdown,
}

/// Creates the command channel for a session driver.
#[must_use]
pub fn command_channel(capacity: usize) -> (mpsc::Sender<SessionCommand>, mpsc::Receiver<SessionCommand>) {
    mpsc::channel(capacity)
}

/// Owns an [`InputSession`] and its collaborators and serializes all
/// access to them on one task.
pub struct SessionDriver<P, D> {
    session: InputSession,
    pointers: P,
    renderer: Option<D>,
    commands: mpsc::Receiver<SessionCommand>,
}

/// The current instant on the driver's clock.
///
/// Goes through the tokio clock rather than [`Instant::now`] directly so
/// the whole session follows the virtual clock under `start_paused` tests.
fn clock_now() -> Instant {
    tokio::time::Instant::now().into_std()
}

impl<P, D> SessionDriver<P, D>
where
    P: PointerHandler,
    D: DrawingHandle,
{
    /// Creates a driver. `renderer` may be `None` when the rendering
    /// collaborator is already gone; rendering callbacks are then dropped.
    #[must_use]
    pub fn new(
        session: InputSession,
        pointers: P,
        renderer: Option<D>,
        commands: mpsc::Receiver<SessionCommand>,
    ) -> Self {
        Self {
            session,
            pointers,
            renderer,
            commands,
        }
    }

    /// Runs the session loop until shutdown, then tears the session down.
    ///
    /// Returns the session and collaborators for inspection or reuse.
    pub async fn run(mut self) -> (InputSession, P, Option<D>) {
        let Self {
            ref mut session,
            ref mut pointers,
            ref mut renderer,
            ref mut commands,
        } = self;

        loop {
            let command = match session.timers().next_deadline() {
                Some(deadline) => {
                    tokio::select! {
                        command = commands.next() => command,
                        () = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {
                            let fired = session.advance(
                                clock_now(),
                                pointers,
                                renderer.as_mut().map(|d| d as &mut dyn DrawingHandle),
                            );
                            tracing::trace!("deadline reached, {fired} timers fired");
                            continue;
                        }
                    }
                }
                None => commands.next().await,
            };

            match command {
                None | Some(SessionCommand::Shutdown) => break,
                Some(command) => {
                    Self::apply(session, pointers, renderer, command);
                }
            }
        }

        self.session.teardown();
        (self.session, self.pointers, self.renderer)
    }

    fn apply(
        session: &mut InputSession,
        pointers: &mut P,
        renderer: &mut Option<D>,
        command: SessionCommand,
    ) {
        let now = clock_now();
        match command {
            SessionCommand::KeyPressed { pointer } => {
                session.on_key_pressed(now, pointer, &*pointers);
            }
            SessionCommand::RepeatKeyHeld { pointer, repeat_count } => {
                session.arm_key_repeat(now, pointer, &*pointers, repeat_count);
            }
            SessionCommand::KeyReleased { pointer } => {
                session.on_key_released(pointer);
            }
            SessionCommand::ModifierPressed { kind } => {
                session.on_modifier_pressed(now, kind);
            }
            SessionCommand::ModifierReleased { kind, gesture } => {
                session.on_modifier_released(kind, gesture);
            }
            SessionCommand::KeyTyped { key } => {
                session.on_key_typed(
                    now,
                    &key,
                    renderer.as_mut().map(|d| d as &mut dyn DrawingHandle),
                );
            }
            SessionCommand::GestureHold { pointer } => {
                session.on_gesture_hold(now, pointer);
            }
            SessionCommand::GestureMoved { pointer } => {
                session.on_gesture_moved(pointer);
            }
            SessionCommand::DismissKeyPreview { key } => {
                session.schedule_key_preview_dismissal(now, &key);
            }
            SessionCommand::DismissGesturePreview => {
                session.schedule_gesture_preview_dismissal(now);
            }
            SessionCommand::Shutdown => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use futures::SinkExt;
    use std::collections::HashMap;
    use std::time::Duration;

    #[derive(Default)]
    struct StubPointers {
        keys: HashMap<PointerId, Key>,
        long_presses: Vec<PointerId>,
        batch_updates: Vec<PointerId>,
    }

    impl PointerHandler for StubPointers {
        fn current_key(&self, pointer: PointerId) -> Option<Key> {
            self.keys.get(&pointer).copied()
        }

        fn on_key_repeated(&mut self, _pointer: PointerId, _code: i32, _repeat_count: u32) {}

        fn on_long_pressed(&mut self, pointer: PointerId) {
            self.long_presses.push(pointer);
        }

        fn on_batch_input_update(&mut self, pointer: PointerId, _timestamp: Instant) {
            self.batch_updates.push(pointer);
        }
    }

    #[derive(Default)]
    struct StubRenderer {
        fade_ins: u32,
        fade_outs: u32,
    }

    impl DrawingHandle for StubRenderer {
        fn fade_in(&mut self) {
            self.fade_ins += 1;
        }

        fn fade_out(&mut self) {
            self.fade_outs += 1;
        }

        fn dismiss_key_preview(&mut self, _key: &Key) {}

        fn dismiss_gesture_preview(&mut self) {}
    }

    fn driver_with_key(
        pointer: PointerId,
        key: Key,
    ) -> (
        SessionDriver<StubPointers, StubRenderer>,
        mpsc::Sender<SessionCommand>,
    ) {
        let (tx, rx) = command_channel(16);
        let mut pointers = StubPointers::default();
        pointers.keys.insert(pointer, key);
        let driver = SessionDriver::new(
            InputSession::new(TimingConfig::default()),
            pointers,
            Some(StubRenderer::default()),
            rx,
        );
        (driver, tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_fires_long_press_on_deadline() {
        let (driver, mut tx) = driver_with_key(1, Key::new('a' as i32));

        let script = async move {
            tx.send(SessionCommand::KeyPressed { pointer: 1 }).await.unwrap();
            tokio::time::sleep(Duration::from_millis(400)).await;
            tx.send(SessionCommand::Shutdown).await.unwrap();
        };

        let ((session, pointers, _), ()) = tokio::join!(driver.run(), script);
        assert_eq!(pointers.long_presses, vec![1]);
        assert_eq!(session.timers().pending_timers(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_batch_updates_repeat_until_canceled() {
        let (driver, mut tx) = driver_with_key(1, Key::new('a' as i32));

        let script = async move {
            tx.send(SessionCommand::GestureHold { pointer: 1 }).await.unwrap();
            tokio::time::sleep(Duration::from_millis(350)).await;
            tx.send(SessionCommand::GestureMoved { pointer: 1 }).await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
            tx.send(SessionCommand::Shutdown).await.unwrap();
        };

        let ((_, pointers, _), ()) = tokio::join!(driver.run(), script);
        assert_eq!(
            pointers.batch_updates,
            vec![1, 1, 1],
            "default 100ms interval inside a 350ms hold"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_typing_session_fades() {
        let (driver, mut tx) = driver_with_key(1, Key::new('a' as i32));

        let script = async move {
            tx.send(SessionCommand::KeyTyped { key: Key::new('a' as i32) })
                .await
                .unwrap();
            tx.send(SessionCommand::KeyTyped { key: Key::new('b' as i32) })
                .await
                .unwrap();
            // Let the idle timer expire.
            tokio::time::sleep(Duration::from_millis(500)).await;
            tx.send(SessionCommand::Shutdown).await.unwrap();
        };

        let ((session, _, renderer), ()) = tokio::join!(driver.run(), script);
        let renderer = renderer.unwrap();
        assert_eq!(renderer.fade_outs, 1, "one fade-out at session start");
        assert_eq!(renderer.fade_ins, 1, "one fade-in at idle expiry");
        assert!(!session.is_typing_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_closing_the_channel_tears_down() {
        let (driver, mut tx) = driver_with_key(1, Key::modifier(crate::input::keycode::CODE_SHIFT));

        let script = async move {
            tx.send(SessionCommand::KeyPressed { pointer: 1 }).await.unwrap();
            tx.send(SessionCommand::ModifierPressed { kind: Modifier::Shift })
                .await
                .unwrap();
            // Sender dropped here; the driver must exit and tear down
            // without the long-press or double-tap timers firing.
        };

        let ((session, pointers, _), ()) = tokio::join!(driver.run(), script);
        assert_eq!(session.timers().pending_timers(), 0);
        assert!(pointers.long_presses.is_empty());
        assert!(!session.is_double_tap_pending(Modifier::Shift));
    }
}
