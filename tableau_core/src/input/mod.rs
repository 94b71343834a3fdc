// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer, touch and keyboard state.
//!
//! A surface-owning group receives raw [`DeviceEvent`]s from the host and
//! keeps the authoritative input state for its surface:
//!
//! - one mouse [`InputState`], pressed, moved and released in place;
//! - a [`TouchRegistry`] of live contacts with stable finger indices;
//! - a [`KeyState`] of held key codes, used to filter auto-repeat.
//!
//! All positions stored here are in surface pixel space (see
//! [`device_to_surface`]). Nodes only ever see copies, re-expressed in their
//! own local space with [`InputState::to_local`] as dispatch descends.

mod device;
mod keys;
mod state;
mod touch;

pub use device::{Contact, DeviceEvent, device_to_surface};
pub use keys::{KeyEvent, KeyState, KeySymbolFn, dom_key_name};
pub use state::{InputState, TouchId};
pub use touch::TouchRegistry;
