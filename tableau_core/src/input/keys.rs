// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use hashbrown::HashSet;

/// Maps a host key code to a symbolic key name.
pub type KeySymbolFn = fn(u32) -> Option<&'static str>;

/// The set of key codes currently held on one surface.
///
/// Codes that were never pressed, or have been released, are up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    down: HashSet<u32>,
}

impl KeyState {
    /// Creates a tracker with every key up.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `key_code` as held.
    ///
    /// Returns `false` if it was already held, which callers use to drop
    /// auto-repeat key-downs.
    pub fn press(&mut self, key_code: u32) -> bool {
        self.down.insert(key_code)
    }

    /// Marks `key_code` as up. Returns whether it was held.
    pub fn release(&mut self, key_code: u32) -> bool {
        self.down.remove(&key_code)
    }

    /// Returns whether `key_code` is held.
    #[must_use]
    pub fn is_down(&self, key_code: u32) -> bool {
        self.down.contains(&key_code)
    }

    /// Returns the number of held keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.down.len()
    }

    /// Returns whether no key is held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.down.is_empty()
    }

    /// Iterates held key codes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.down.iter().copied()
    }

    /// Releases every key.
    pub fn clear(&mut self) {
        self.down.clear();
    }
}

/// A key transition delivered to [`Node::key_down`](crate::node::Node::key_down)
/// and [`Node::key_up`](crate::node::Node::key_up).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Symbolic name from [`SceneConfig::key_symbols`](crate::config::SceneConfig::key_symbols).
    pub key: Option<&'static str>,
    /// Host key code.
    pub key_code: u32,
    /// Keys held after this transition.
    pub keys_down: KeyState,
}

/// Lower-case names for the legacy DOM `keyCode` values of a US layout.
#[must_use]
pub fn dom_key_name(key_code: u32) -> Option<&'static str> {
    const LETTERS: [&str; 26] = [
        "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r",
        "s", "t", "u", "v", "w", "x", "y", "z",
    ];
    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    const FUNCTION: [&str; 12] = [
        "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12",
    ];

    let name = match key_code {
        8 => "backspace",
        9 => "tab",
        13 => "enter",
        16 => "shift",
        17 => "ctrl",
        18 => "alt",
        19 => "pause",
        20 => "capslock",
        27 => "escape",
        32 => "space",
        33 => "pageup",
        34 => "pagedown",
        35 => "end",
        36 => "home",
        37 => "left",
        38 => "up",
        39 => "right",
        40 => "down",
        45 => "insert",
        46 => "delete",
        48..=57 => DIGITS[(key_code - 48) as usize],
        65..=90 => LETTERS[(key_code - 65) as usize],
        96..=105 => DIGITS[(key_code - 96) as usize],
        112..=123 => FUNCTION[(key_code - 112) as usize],
        186 => ";",
        187 => "=",
        188 => ",",
        189 => "-",
        190 => ".",
        191 => "/",
        192 => "`",
        219 => "[",
        220 => "\\",
        221 => "]",
        222 => "'",
        _ => return None,
    };
    Some(name)
}
