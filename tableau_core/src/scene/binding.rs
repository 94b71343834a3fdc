// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Device input for surface-owning groups.
//!
//! A group that owns a surface gets an [`InputBinding`] when the surface is
//! installed with [`Scene::set_surface`]. Hosts then feed window-system
//! events for that surface to [`Scene::handle_event`], which converts device
//! coordinates into surface pixels, updates the binding and dispatches into
//! the group's subtree.

use alloc::boxed::Box;
use alloc::vec::Vec;

use kurbo::Point;

use super::dispatch::Payload;
use super::id::NodeId;
use super::store::Scene;
use crate::error::SceneError;
use crate::input::{
    DeviceEvent, InputState, KeyEvent, KeyState, TouchId, TouchRegistry, device_to_surface,
};
use crate::node::{Handled, Hook};
use crate::surface::{self, Surface};
use crate::trace::{BindingEvent, TouchEvent, TouchPhase};

/// Input state of one surface.
#[derive(Clone, Debug, Default)]
pub struct InputBinding {
    pub(crate) mouse: InputState,
    pub(crate) touches: TouchRegistry,
    pub(crate) keys: KeyState,
}

impl InputBinding {
    /// The mouse pointer, in surface pixels.
    #[must_use]
    pub fn mouse(&self) -> &InputState {
        &self.mouse
    }

    /// Live touch contacts, in surface pixels.
    #[must_use]
    pub fn touches(&self) -> &TouchRegistry {
        &self.touches
    }

    /// Held keys.
    #[must_use]
    pub fn keys(&self) -> &KeyState {
        &self.keys
    }
}

/// Where a surface sits on the device, captured once per event.
#[derive(Clone, Copy)]
struct Placement {
    presented: kurbo::Rect,
    pixel_size: (u32, u32),
}

impl Placement {
    fn of(surface: &dyn Surface) -> Self {
        Self {
            presented: surface.presented_rect(),
            pixel_size: surface.pixel_size(),
        }
    }

    fn map(self, position: Point) -> Point {
        device_to_surface(self.presented, self.pixel_size, position)
    }
}

impl Scene {
    /// Gives a group its own surface and starts accepting device events for
    /// it.
    ///
    /// The pixels of the previous surface, if any, are carried over: they
    /// are read, the old surface is cleared, the new one is cleared, and the
    /// pixels are written into it. The group then owns a surface and has a
    /// fresh [`InputBinding`]; the previous binding, with any held keys or
    /// touches, is torn down. The previous surface is returned.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::NotAGroup`] for a leaf and
    /// [`SceneError::InvalidSurface`] if the surface has a zero pixel
    /// dimension or an empty or non-finite presented rectangle. The group is
    /// unchanged in both cases.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn set_surface(
        &mut self,
        id: NodeId,
        mut surface: Box<dyn Surface>,
    ) -> Result<Option<Box<dyn Surface>>, SceneError> {
        self.validate(id);
        if !surface::is_valid(surface.as_ref()) {
            // Report a leaf before an invalid surface.
            self.group_mut(id)?;
            return Err(SceneError::InvalidSurface);
        }
        let group = self.group_mut(id)?;

        let mut previous = group.surface.take();
        let pixels = previous.as_mut().map(|old| {
            let pixels = old.read_pixels();
            old.clear();
            pixels
        });
        surface.clear();
        if let Some(pixels) = &pixels {
            surface.write_pixels(pixels);
        }

        group.surface = Some(surface);
        group.owns_surface = true;
        let detached = group.binding.replace(InputBinding::default()).is_some();

        if detached {
            self.tracer.binding(&BindingEvent {
                node: id,
                attached: false,
            });
        }
        self.tracer.binding(&BindingEvent {
            node: id,
            attached: true,
        });
        Ok(previous)
    }

    /// Returns the input binding of a surface-owning group.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    #[must_use]
    pub fn binding(&self, id: NodeId) -> Option<&InputBinding> {
        self.validate(id);
        self.group[id.slot()].as_ref()?.binding.as_ref()
    }

    /// Feeds a device event for the group's surface.
    ///
    /// Pointer and touch positions are converted from device coordinates to
    /// surface pixels and then dispatched into the subtree, starting with the
    /// group's own transform. Key-downs for keys that are already held are
    /// dropped. Focus changes gate [`cycle`](Self::cycle).
    ///
    /// Events for a node without a binding (a leaf, a group without a
    /// surface, or a group that was added to a parent) are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first hook error. Binding updates made before the failing
    /// hook are kept.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale.
    pub fn handle_event(
        &mut self,
        id: NodeId,
        event: &DeviceEvent,
    ) -> Result<Handled, SceneError> {
        self.validate(id);
        let Some(group) = self.group[id.slot()].as_mut() else {
            return Ok(Handled::Ignored);
        };
        let Some(surface) = group.surface.as_deref() else {
            return Ok(Handled::Ignored);
        };
        let placement = Placement::of(surface);
        let Some(mut binding) = group.binding.take() else {
            return Ok(Handled::Ignored);
        };

        let result = self.route(id, &mut binding, placement, event);

        // Hooks may have destroyed the group, re-parented it, or installed a
        // new surface; only a binding slot that is still expected is refilled.
        if self.is_alive(id)
            && let Some(group) = self.group[id.slot()].as_mut()
            && group.owns_surface
            && group.binding.is_none()
        {
            group.binding = Some(binding);
        }
        result
    }

    fn route(
        &mut self,
        id: NodeId,
        binding: &mut InputBinding,
        placement: Placement,
        event: &DeviceEvent,
    ) -> Result<Handled, SceneError> {
        match event {
            DeviceEvent::PointerDown { position } => {
                binding.mouse.position = placement.map(*position);
                binding.mouse.press();
                self.dispatch_from(id, Hook::PointerDown, Payload::Pointer(binding.mouse))
            }
            DeviceEvent::PointerUp { position } | DeviceEvent::PointerOut { position } => {
                binding.mouse.position = placement.map(*position);
                binding.mouse.release();
                let handled =
                    self.dispatch_from(id, Hook::PointerUp, Payload::Pointer(binding.mouse));
                binding.mouse.reset_gesture();
                handled
            }
            DeviceEvent::PointerMove { position } => {
                let _ = binding.mouse.move_to(placement.map(*position));
                self.dispatch_from(id, Hook::PointerMove, Payload::Pointer(binding.mouse))
            }
            DeviceEvent::TouchStart { touches } => {
                let mut consumed = false;
                for contact in touches {
                    let position = placement.map(contact.position);
                    let Some(entry) = binding.touches.begin(contact.identifier, position) else {
                        continue;
                    };
                    self.trace_touch(id, &entry, TouchPhase::Begin);
                    consumed |= self
                        .dispatch_from(id, Hook::PointerDown, Payload::Pointer(entry))?
                        .is_consumed();
                }
                let all = Payload::Touches(binding.touches.snapshot());
                consumed |= self.dispatch_from(id, Hook::TouchStart, all)?.is_consumed();
                Ok(consumed.into())
            }
            DeviceEvent::TouchMove { touches } => {
                let mut consumed = false;
                for contact in touches {
                    let position = placement.map(contact.position);
                    let Some(entry) = binding.touches.advance(contact.identifier, position) else {
                        continue;
                    };
                    self.trace_touch(id, &entry, TouchPhase::Move);
                    consumed |= self
                        .dispatch_from(id, Hook::PointerMove, Payload::Pointer(entry))?
                        .is_consumed();
                }
                let all = Payload::Touches(binding.touches.snapshot());
                consumed |= self.dispatch_from(id, Hook::TouchMove, all)?.is_consumed();
                Ok(consumed.into())
            }
            DeviceEvent::TouchEnd { touches } | DeviceEvent::TouchCancel { touches } => {
                let reported: Vec<TouchId> = touches.iter().map(|c| c.identifier).collect();
                let mut consumed = false;
                for entry in binding.touches.release_missing(&reported) {
                    self.trace_touch(id, &entry, TouchPhase::End);
                    consumed |= self
                        .dispatch_from(id, Hook::PointerUp, Payload::Pointer(entry))?
                        .is_consumed();
                }
                let remaining = Payload::Touches(binding.touches.snapshot());
                consumed |= self.dispatch_from(id, Hook::TouchEnd, remaining)?.is_consumed();
                Ok(consumed.into())
            }
            DeviceEvent::KeyDown { key_code } => {
                if !binding.keys.press(*key_code) {
                    return Ok(Handled::Ignored);
                }
                let event = self.key_event(*key_code, &binding.keys);
                self.dispatch_from(id, Hook::KeyDown, Payload::Key(&event))
            }
            DeviceEvent::KeyUp { key_code } => {
                let _ = binding.keys.release(*key_code);
                let event = self.key_event(*key_code, &binding.keys);
                self.dispatch_from(id, Hook::KeyUp, Payload::Key(&event))
            }
            DeviceEvent::FocusGained { at } => {
                let group = self.group_mut(id)?;
                group.focused = true;
                group.clock.resync(*at);
                Ok(Handled::Ignored)
            }
            DeviceEvent::FocusLost => {
                self.group_mut(id)?.focused = false;
                Ok(Handled::Ignored)
            }
        }
    }

    fn key_event(&self, key_code: u32, keys: &KeyState) -> KeyEvent {
        KeyEvent {
            key: (self.config.key_symbols)(key_code),
            key_code,
            keys_down: keys.clone(),
        }
    }

    fn trace_touch(&mut self, node: NodeId, entry: &InputState, phase: TouchPhase) {
        if let Some(identifier) = entry.identifier {
            self.tracer.touch(&TouchEvent {
                node,
                finger: entry.finger,
                identifier,
                phase,
            });
        }
    }
}
