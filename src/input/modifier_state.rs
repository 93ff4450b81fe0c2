// SPDX-License-Identifier: GPL-3.0-only

//! Per-modifier latch/lock state machines.
//!
//! Every modifier kind owns one [`ModifierState`] for the lifetime of the
//! keyboard session. The machine has five states:
//!
//! - **Disabled**: the modifier is off.
//! - **Enabled**: toggled on for upcoming keystrokes until toggled off.
//! - **Locked**: locked on until explicitly unlocked.
//! - **LockToggled**: locked, but temporarily suspended for one keystroke.
//! - **Prefixed**: held pending application to an upcoming composed
//!   character; distinct from both toggle and lock.
//!
//! Transitions are driven by three intents (`set_toggled`, `set_locked`,
//! `set_prefixed`). Every (state, intent) pair has a defined outcome;
//! combinations without an explicit transition leave the state unchanged.
//! Nothing here can fail.

use crate::input::modifier::Modifier;
use std::fmt;

/// Flag bit for the toggled component of the serialized state.
pub const FLAG_TOGGLED: u8 = 1;
/// Flag bit for the locked component of the serialized state.
pub const FLAG_LOCKED: u8 = 2;
/// Flag bit for the prefixed state. Never combined with the other bits.
pub const FLAG_PREFIXED: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Disabled,
    Enabled,
    Locked,
    LockToggled,
    Prefixed,
}

impl State {
    fn name(self) -> &'static str {
        match self {
            State::Disabled => "DISABLED",
            State::Enabled => "ENABLED",
            State::Locked => "LOCKED",
            State::LockToggled => "LOCK_TOGGLED",
            State::Prefixed => "PREFIXED",
        }
    }
}

/// The latch/lock state machine of one modifier kind.
#[derive(Debug, Clone)]
pub struct ModifierState {
    /// Stable name used in trace output.
    name: &'static str,
    state: State,
}

impl ModifierState {
    /// Creates a machine in the Disabled state.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            state: State::Disabled,
        }
    }

    /// Applies the toggle intent.
    ///
    /// Toggling on enables a disabled or prefixed modifier and suspends a
    /// locked one (Locked becomes LockToggled). Toggling off reverses those
    /// transitions. Other states are unchanged.
    pub fn set_toggled(&mut self, toggled: bool) {
        let old = self.state;
        self.state = if toggled {
            match old {
                State::Disabled | State::Prefixed => State::Enabled,
                State::Locked => State::LockToggled,
                other => other,
            }
        } else {
            match old {
                State::Enabled => State::Disabled,
                State::LockToggled => State::Locked,
                other => other,
            }
        };
        tracing::trace!(
            "{}.set_toggled({}): {} -> {}",
            self.name,
            toggled,
            old.name(),
            self.state.name()
        );
    }

    /// Applies the lock intent.
    ///
    /// Locking wins over a plain toggle: Disabled, Prefixed and Enabled all
    /// become Locked. Unlocking always returns to Disabled.
    pub fn set_locked(&mut self, locked: bool) {
        let old = self.state;
        self.state = if locked {
            match old {
                State::Disabled | State::Prefixed | State::Enabled => State::Locked,
                other => other,
            }
        } else {
            State::Disabled
        };
        tracing::trace!(
            "{}.set_locked({}): {} -> {}",
            self.name,
            locked,
            old.name(),
            self.state.name()
        );
    }

    /// Applies the prefix intent.
    ///
    /// Prefixing replaces whatever state was active. Clearing the prefix
    /// only has an effect when the machine is actually Prefixed.
    pub fn set_prefixed(&mut self, prefixed: bool) {
        let old = self.state;
        self.state = if prefixed {
            State::Prefixed
        } else {
            match old {
                State::Prefixed => State::Disabled,
                other => other,
            }
        };
        tracing::trace!(
            "{}.set_prefixed({}): {} -> {}",
            self.name,
            prefixed,
            old.name(),
            self.state.name()
        );
    }

    /// Clears the prefixed state. Shorthand for `set_prefixed(false)`.
    pub fn clear_prefixed(&mut self) {
        self.set_prefixed(false);
    }

    /// Whether the modifier is completely off.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.state == State::Disabled
    }

    /// Whether the modifier is toggled on without being locked.
    #[must_use]
    pub fn is_toggled_only(&self) -> bool {
        self.state == State::Enabled
    }

    /// Whether the modifier is in any non-Disabled state.
    #[must_use]
    pub fn is_active_or_locked(&self) -> bool {
        self.state != State::Disabled
    }

    /// Whether the modifier is locked, suspended or not.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state == State::Locked || self.state == State::LockToggled
    }

    /// Whether the modifier is locked but suspended for one keystroke.
    #[must_use]
    pub fn is_lock_toggled(&self) -> bool {
        self.state == State::LockToggled
    }

    /// Whether the modifier is held as a prefix.
    #[must_use]
    pub fn is_prefixed(&self) -> bool {
        self.state == State::Prefixed
    }

    /// Serializes the state as flag bits.
    ///
    /// Disabled=0, Enabled=1, Locked=2, LockToggled=3, Prefixed=4. The
    /// prefixed bit never coexists with the toggled/locked bits.
    #[must_use]
    pub fn flags(&self) -> u8 {
        match self.state {
            State::Disabled => 0,
            State::Enabled => FLAG_TOGGLED,
            State::Locked => FLAG_LOCKED,
            State::LockToggled => FLAG_LOCKED | FLAG_TOGGLED,
            State::Prefixed => FLAG_PREFIXED,
        }
    }

    /// Restores the state from flag bits.
    ///
    /// A set prefixed bit wins regardless of the other bits; otherwise the
    /// state is the toggled/locked bit combination.
    pub fn set_flags(&mut self, flags: u8) {
        self.state = if flags & FLAG_PREFIXED != 0 {
            State::Prefixed
        } else {
            match flags & (FLAG_TOGGLED | FLAG_LOCKED) {
                0 => State::Disabled,
                FLAG_TOGGLED => State::Enabled,
                FLAG_LOCKED => State::Locked,
                _ => State::LockToggled,
            }
        };
    }
}

impl fmt::Display for ModifierState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.state.name())
    }
}

/// The full set of modifier state machines owned by a keyboard session.
///
/// One machine per [`Modifier`], created together at session start and
/// torn down together with the session.
#[derive(Debug, Clone)]
pub struct ModifierStates {
    states: [ModifierState; 5],
}

impl ModifierStates {
    /// Creates all machines in the Disabled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Modifier::ALL.map(|m| ModifierState::new(m.label())),
        }
    }

    /// The state machine of one modifier kind.
    #[must_use]
    pub fn state(&self, modifier: Modifier) -> &ModifierState {
        &self.states[modifier.index()]
    }

    /// Mutable access to the state machine of one modifier kind.
    #[must_use]
    pub fn state_mut(&mut self, modifier: Modifier) -> &mut ModifierState {
        &mut self.states[modifier.index()]
    }

    /// Iterates all machines together with their kind.
    pub fn iter(&self) -> impl Iterator<Item = (Modifier, &ModifierState)> {
        Modifier::ALL.into_iter().map(|m| (m, self.state(m)))
    }

    /// Returns every machine to Disabled.
    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.set_flags(0);
        }
    }
}

impl Default for ModifierStates {
    fn default() -> Self {
        Self::new()
    }
}
