// SPDX-License-Identifier: GPL-3.0-only

//! Centralized timing defaults.

/// Delay before the first key repeat fires, in milliseconds.
pub const DEFAULT_KEY_REPEAT_START_DELAY_MS: u64 = 400;

/// Interval between subsequent key repeats, in milliseconds.
pub const DEFAULT_KEY_REPEAT_INTERVAL_MS: u64 = 50;

/// Hold time before a press counts as a long press, in milliseconds.
pub const DEFAULT_LONG_PRESS_TIMEOUT_MS: u64 = 300;

/// Window within which a second modifier tap counts as a double tap,
/// in milliseconds.
pub const DEFAULT_DOUBLE_TAP_WINDOW_MS: u64 = 300;

/// Idle time after the last typed key before the typing session ends,
/// in milliseconds. While the session is active, alt-code keys show their
/// typing variant.
pub const DEFAULT_IGNORE_ALT_CODE_KEY_TIMEOUT_MS: u64 = 350;

/// Interval between batch-input updates while a gesturing pointer holds
/// still, in milliseconds. Zero disables gesture updates.
pub const DEFAULT_GESTURE_UPDATE_INTERVAL_MS: u64 = 100;

/// Delay before a released key's preview popup is dismissed, in
/// milliseconds.
pub const DEFAULT_KEY_PREVIEW_DISMISS_DELAY_MS: u64 = 70;

/// Delay before the floating gesture preview is dismissed, in milliseconds.
pub const DEFAULT_GESTURE_PREVIEW_DISMISS_DELAY_MS: u64 = 200;
