// SPDX-License-Identifier: GPL-3.0-only

//! The fixed set of modifier kinds handled by the timing core.
//!
//! Each modifier has a primary key code (tapping it toggles the modifier)
//! and a lock-variant key code (a dedicated key that locks it, such as Caps
//! Lock for Shift). Both code spaces are disjoint, so a key code identifies
//! at most one modifier in at most one role.

use crate::input::keycode;

/// A modifier kind tracked by the keyboard session.
///
/// The set is closed: every API that takes a `Modifier` is total over these
/// five values, so "unknown modifier" conditions cannot occur at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Meta,
    Fn,
}

impl Modifier {
    /// All modifier kinds, in a stable order usable for indexing.
    pub const ALL: [Modifier; 5] = [
        Modifier::Shift,
        Modifier::Ctrl,
        Modifier::Alt,
        Modifier::Meta,
        Modifier::Fn,
    ];

    /// Display name used in diagnostics.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Modifier::Shift => "Shift",
            Modifier::Ctrl => "Ctrl",
            Modifier::Alt => "Alt",
            Modifier::Meta => "Meta",
            Modifier::Fn => "Fn",
        }
    }

    /// The primary key code that toggles this modifier.
    #[must_use]
    pub fn key_code(self) -> i32 {
        match self {
            Modifier::Shift => keycode::CODE_SHIFT,
            Modifier::Ctrl => keycode::CODE_CTRL,
            Modifier::Alt => keycode::CODE_ALT,
            Modifier::Meta => keycode::CODE_META,
            Modifier::Fn => keycode::CODE_FN,
        }
    }

    /// The key code of the dedicated lock variant of this modifier.
    #[must_use]
    pub fn lock_key_code(self) -> i32 {
        match self {
            Modifier::Shift => keycode::CODE_CAPS_LOCK,
            Modifier::Ctrl => keycode::CODE_CTRL_LOCK,
            Modifier::Alt => keycode::CODE_ALT_LOCK,
            Modifier::Meta => keycode::CODE_META_LOCK,
            Modifier::Fn => keycode::CODE_FN_LOCK,
        }
    }

    /// Looks up the modifier whose primary key code equals `code`.
    #[must_use]
    pub fn from_key_code(code: i32) -> Option<Modifier> {
        Modifier::ALL.into_iter().find(|m| m.key_code() == code)
    }

    /// Looks up the modifier whose lock-variant key code equals `code`.
    #[must_use]
    pub fn from_lock_key_code(code: i32) -> Option<Modifier> {
        Modifier::ALL.into_iter().find(|m| m.lock_key_code() == code)
    }

    /// Position of this modifier in [`Modifier::ALL`].
    #[must_use]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_key_code() {
        for modifier in Modifier::ALL {
            assert_eq!(Modifier::from_key_code(modifier.key_code()), Some(modifier));
            assert_eq!(
                Modifier::from_lock_key_code(modifier.lock_key_code()),
                Some(modifier)
            );
        }
    }

    #[test]
    fn test_lookup_misses() {
        assert_eq!(Modifier::from_key_code('a' as i32), None);
        assert_eq!(Modifier::from_lock_key_code(keycode::CODE_SHIFT), None);
        assert_eq!(Modifier::from_key_code(keycode::CODE_CAPS_LOCK), None);
    }

    #[test]
    fn test_codes_are_disjoint() {
        for a in Modifier::ALL {
            for b in Modifier::ALL {
                assert_ne!(a.key_code(), b.lock_key_code());
                if a != b {
                    assert_ne!(a.key_code(), b.key_code());
                    assert_ne!(a.lock_key_code(), b.lock_key_code());
                }
            }
        }
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, modifier) in Modifier::ALL.into_iter().enumerate() {
            assert_eq!(modifier.index(), i);
        }
    }
}
