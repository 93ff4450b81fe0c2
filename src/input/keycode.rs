// SPDX-License-Identifier: GPL-3.0-only

//! Key codes and the key descriptor used by the timing core.
//!
//! Printable keys carry their Unicode scalar value as the code. Special
//! keys (modifiers and their lock variants) use negative sentinel codes so
//! they can never collide with printable input. The timing core only ever
//! inspects codes; it never produces or consumes text.

/// Code of the space key.
pub const CODE_SPACE: i32 = ' ' as i32;

/// Code of the enter key.
pub const CODE_ENTER: i32 = '\n' as i32;

/// Code of the Shift key.
pub const CODE_SHIFT: i32 = -101;

/// Code of the Caps Lock key (lock variant of Shift).
pub const CODE_CAPS_LOCK: i32 = -102;

/// Code of the Ctrl key.
pub const CODE_CTRL: i32 = -103;

/// Code of the Ctrl Lock key.
pub const CODE_CTRL_LOCK: i32 = -104;

/// Code of the Alt key.
pub const CODE_ALT: i32 = -105;

/// Code of the Alt Lock key.
pub const CODE_ALT_LOCK: i32 = -106;

/// Code of the Meta key.
pub const CODE_META: i32 = -107;

/// Code of the Meta Lock key.
pub const CODE_META_LOCK: i32 = -108;

/// Code of the Fn key.
pub const CODE_FN: i32 = -109;

/// Code of the Fn Lock key.
pub const CODE_FN_LOCK: i32 = -110;

/// A pressed key as seen by the timing core.
///
/// This is a read-only snapshot handed in by the pointer/key collaborator.
/// The core never mutates a key; it only classifies the code and the two
/// behavior flags when deciding which timers to arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    code: i32,
    modifier: bool,
    alt_code_while_typing: bool,
}

impl Key {
    /// Creates a plain (non-modifier) key with the given code.
    #[must_use]
    pub fn new(code: i32) -> Self {
        Self {
            code,
            modifier: false,
            alt_code_while_typing: false,
        }
    }

    /// Creates a modifier key with the given code.
    #[must_use]
    pub fn modifier(code: i32) -> Self {
        Self {
            code,
            modifier: true,
            alt_code_while_typing: false,
        }
    }

    /// Creates a key that switches to its alt code while the user is typing.
    ///
    /// Such keys must not disturb the typing-idle timer when pressed.
    #[must_use]
    pub fn alt_code_while_typing(code: i32) -> Self {
        Self {
            code,
            modifier: false,
            alt_code_while_typing: true,
        }
    }

    /// The key code.
    #[must_use]
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Whether this key is a modifier key.
    #[must_use]
    pub fn is_modifier(&self) -> bool {
        self.modifier
    }

    /// Whether this key shows an alt code while a typing session is active.
    #[must_use]
    pub fn has_alt_code_while_typing(&self) -> bool {
        self.alt_code_while_typing
    }
}
