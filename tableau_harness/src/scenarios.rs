// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end scenes driven through device events and cycles.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Affine, Point, Rect};
use tableau_core::SceneError;
use tableau_core::config::{GroupConfig, SceneConfig};
use tableau_core::dirty::DirtyFlags;
use tableau_core::input::{Contact, DeviceEvent, TouchId};
use tableau_core::node::{Capabilities, Handled, Hook};
use tableau_core::scene::{NodeId, Scene};
use tableau_core::time::{HostTime, Timebase};

use crate::{Detail, EventLog, MemorySurface, Probe, ProbeError, SurfaceStats};

const EPS: f64 = 1e-9;

fn scene_with_root(width: u32, height: u32) -> (Scene, NodeId) {
    let (scene, root, _) = scene_with_stats(width, height);
    (scene, root)
}

fn scene_with_stats(width: u32, height: u32) -> (Scene, NodeId, Rc<SurfaceStats>) {
    let mut scene = Scene::with_config(SceneConfig::new().with_timebase(Timebase::MILLIS));
    let root = scene.create_group(GroupConfig::new());
    let surface = MemorySurface::new(width, height);
    let stats = surface.stats();
    let _ = scene.set_surface(root, Box::new(surface)).unwrap();
    (scene, root, stats)
}

fn contact(id: i64, x: f64, y: f64) -> Contact {
    Contact {
        identifier: TouchId(id),
        position: Point::new(x, y),
    }
}

fn pointers(log: &EventLog, hook: Hook) -> Vec<tableau_core::input::InputState> {
    log.of(hook)
        .into_iter()
        .filter_map(|e| match e.detail {
            Detail::Pointer(state) => Some(state),
            _ => None,
        })
        .collect()
}

#[test]
fn pointer_reaches_scaled_child_in_local_space() {
    let (mut scene, root) = scene_with_root(200, 200);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.set_transform(
        probe,
        Affine::translate((10.0, 10.0)) * Affine::scale(2.0),
    );
    scene.add(root, probe).unwrap();

    scene
        .handle_event(root, &DeviceEvent::PointerDown {
            position: Point::new(100.0, 50.0),
        })
        .unwrap();

    let downs = pointers(&log, Hook::PointerDown);
    assert_eq!(downs.len(), 1);
    assert!((downs[0].position.x - 45.0).abs() < EPS);
    assert!((downs[0].position.y - 20.0).abs() < EPS);
    assert!(downs[0].held);
}

#[test]
fn device_coordinates_are_scaled_to_pixels() {
    let mut scene = Scene::new();
    let root = scene.create_group(GroupConfig::new());
    let presented = Rect::new(0.0, 0.0, 100.0, 50.0);
    let _ = scene
        .set_surface(
            root,
            Box::new(MemorySurface::presented_at(200, 100, presented)),
        )
        .unwrap();
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.add(root, probe).unwrap();

    scene
        .handle_event(root, &DeviceEvent::PointerMove {
            position: Point::new(50.0, 25.0),
        })
        .unwrap();

    let moves = pointers(&log, Hook::PointerMove);
    assert_eq!(moves[0].position, Point::new(100.0, 50.0));
    assert!(!moves[0].held);
}

#[test]
fn drag_accumulates_and_release_resets() {
    let (mut scene, root) = scene_with_root(100, 100);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.add(root, probe).unwrap();

    for event in [
        DeviceEvent::PointerDown {
            position: Point::new(10.0, 10.0),
        },
        DeviceEvent::PointerMove {
            position: Point::new(13.0, 14.0),
        },
        DeviceEvent::PointerMove {
            position: Point::new(13.0, 20.0),
        },
        DeviceEvent::PointerUp {
            position: Point::new(13.0, 20.0),
        },
    ] {
        scene.handle_event(root, &event).unwrap();
    }

    let moves = pointers(&log, Hook::PointerMove);
    assert_eq!(moves.len(), 2);
    assert!((moves[0].length - 5.0).abs() < EPS);
    assert!((moves[1].length - 11.0).abs() < EPS);
    assert_eq!(moves[1].delta, kurbo::Vec2::new(3.0, 10.0));

    let ups = pointers(&log, Hook::PointerUp);
    assert!(!ups[0].held);
    assert!((ups[0].length - 11.0).abs() < EPS);

    let mouse = scene.binding(root).unwrap().mouse();
    assert_eq!(mouse.length, 0.0);
    assert_eq!(mouse.delta, kurbo::Vec2::ZERO);
}

#[test]
fn finger_indices_fill_the_lowest_hole() {
    let (mut scene, root) = scene_with_root(100, 100);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.add(root, probe).unwrap();
    let (a, b, c) = (1, 2, 3);

    scene
        .handle_event(root, &DeviceEvent::TouchStart {
            touches: vec![contact(a, 1.0, 1.0), contact(b, 2.0, 2.0)],
        })
        .unwrap();
    scene
        .handle_event(root, &DeviceEvent::TouchEnd {
            touches: vec![contact(b, 2.0, 2.0)],
        })
        .unwrap();
    scene
        .handle_event(root, &DeviceEvent::TouchStart {
            touches: vec![contact(b, 2.0, 2.0), contact(c, 3.0, 3.0)],
        })
        .unwrap();

    let fingers: Vec<(Option<TouchId>, usize)> = pointers(&log, Hook::PointerDown)
        .iter()
        .map(|s| (s.identifier, s.finger))
        .collect();
    assert_eq!(
        fingers,
        vec![
            (Some(TouchId(a)), 0),
            (Some(TouchId(b)), 1),
            (Some(TouchId(c)), 0),
        ]
    );

    let ups = pointers(&log, Hook::PointerUp);
    assert_eq!(ups.len(), 1);
    assert_eq!(ups[0].identifier, Some(TouchId(a)));

    let registry = scene.binding(root).unwrap().touches();
    assert_eq!(registry.len(), 2);
    let Some(Detail::Touches(last)) = log.of(Hook::TouchStart).pop().map(|e| e.detail) else {
        panic!("expected a touch batch");
    };
    assert_eq!(last.len(), 2);
}

#[test]
fn stationary_touch_moves_are_dropped() {
    let (mut scene, root) = scene_with_root(100, 100);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.add(root, probe).unwrap();

    scene
        .handle_event(root, &DeviceEvent::TouchStart {
            touches: vec![contact(5, 10.0, 10.0), contact(6, 20.0, 20.0)],
        })
        .unwrap();
    scene
        .handle_event(root, &DeviceEvent::TouchMove {
            touches: vec![contact(5, 10.0, 10.0), contact(6, 23.0, 24.0)],
        })
        .unwrap();

    let moves = pointers(&log, Hook::PointerMove);
    assert_eq!(moves.len(), 1);
    assert_eq!(moves[0].identifier, Some(TouchId(6)));
    assert!((moves[0].length - 5.0).abs() < EPS);
    assert_eq!(log.of(Hook::TouchMove).len(), 1);
}

#[test]
fn topmost_consumer_stops_dispatch() {
    let (mut scene, root) = scene_with_root(100, 100);
    let log = EventLog::new();
    let bottom = scene.create_node(Probe::new("bottom", &log));
    let middle =
        scene.create_node(Probe::new("middle", &log).consuming(Capabilities::POINTER_DOWN));
    let top = scene.create_node(Probe::new("top", &log));
    scene.set_depth(bottom, 0);
    scene.set_depth(middle, 1);
    scene.set_depth(top, 2);
    scene.add_all(root, [top, bottom, middle]).unwrap();
    log.clear();

    let handled = scene
        .handle_event(root, &DeviceEvent::PointerDown {
            position: Point::new(1.0, 1.0),
        })
        .unwrap();

    assert_eq!(handled, Handled::Consumed);
    assert_eq!(
        log.calls(),
        vec![("top", Hook::PointerDown), ("middle", Hook::PointerDown)]
    );
}

#[test]
fn children_stay_sorted_by_depth() {
    let mut scene = Scene::new();
    let root = scene.create_group(GroupConfig::new());
    let log = EventLog::new();
    let nodes: Vec<NodeId> = [3, 1, 2, 1]
        .into_iter()
        .map(|depth| {
            let id = scene.create_node(Probe::new("n", &log));
            scene.set_depth(id, depth);
            id
        })
        .collect();
    scene.add_all(root, nodes.iter().copied()).unwrap();

    let order: Vec<NodeId> = scene.children(root).collect();
    assert_eq!(order, vec![nodes[1], nodes[3], nodes[2], nodes[0]]);

    scene.set_depth(nodes[0], 0);
    let depths: Vec<i32> = scene.children(root).map(|c| scene.depth(c)).collect();
    assert!(depths.windows(2).all(|w| w[0] <= w[1]), "{depths:?}");
    assert_eq!(scene.children(root).next(), Some(nodes[0]));
}

#[test]
fn group_clear_request_clears_root_once() {
    let (mut scene, root, stats) = scene_with_stats(10, 10);
    let log = EventLog::new();
    let group = scene.create_group_with(
        GroupConfig::new(),
        Probe::new("g", &log).requesting(DirtyFlags::CLEAR),
    );
    scene.add(root, group).unwrap();
    // Settle the initial clear and draw before measuring.
    scene.step(root, 0.0).unwrap();
    stats.reset();

    scene.step(root, 16.0).unwrap();

    assert!(!scene.needs_clear(root));
    assert!(!scene.needs_draw(root));
    assert_eq!(stats.clears(), 1);
}

#[test]
fn deep_draw_requests_draw_root_once_per_cycle() {
    let (mut scene, root) = scene_with_root(10, 10);
    let log = EventLog::new();
    let leaf = scene.create_node(Probe::new("leaf", &log).with_capabilities(Capabilities::DRAW));
    scene.add(root, leaf).unwrap();

    let mut parent = root;
    for name in ["a", "b", "c"] {
        let group = scene.create_group_with(
            GroupConfig::new(),
            Probe::new(name, &log)
                .with_capabilities(Capabilities::STEP)
                .requesting(DirtyFlags::DRAW),
        );
        scene.add(parent, group).unwrap();
        parent = group;
    }

    for frame in 0..4_u64 {
        log.clear();
        assert!(scene.cycle(root, HostTime(frame * 16)).unwrap());
        let draws = log.of(Hook::Draw).len();
        assert_eq!(draws, 1, "frame {frame}");
    }
}

#[test]
fn nested_surface_is_composited_at_identity() {
    let (mut scene, root, root_stats) = scene_with_stats(10, 10);
    let nested = scene.create_group(GroupConfig::new().with_transform(Affine::translate((3.0, 4.0))));
    scene.add(root, nested).unwrap();
    let _ = scene
        .set_surface(nested, Box::new(MemorySurface::new(4, 4)))
        .unwrap();
    assert!(scene.owns_surface(nested));

    scene.draw(root).unwrap();

    assert_eq!(root_stats.composites(), 1);
    assert_eq!(root_stats.last_composite(), Some(Affine::IDENTITY));
}

#[test]
fn held_keys_do_not_repeat() {
    let (mut scene, root) = scene_with_root(10, 10);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log));
    scene.add(root, probe).unwrap();

    for event in [
        DeviceEvent::KeyDown { key_code: 13 },
        DeviceEvent::KeyDown { key_code: 13 },
        DeviceEvent::KeyDown { key_code: 37 },
        DeviceEvent::KeyUp { key_code: 13 },
        DeviceEvent::KeyDown { key_code: 13 },
    ] {
        scene.handle_event(root, &event).unwrap();
    }

    let downs: Vec<Detail> = log.of(Hook::KeyDown).into_iter().map(|e| e.detail).collect();
    assert_eq!(
        downs,
        vec![
            Detail::Key(Some("enter"), 13),
            Detail::Key(Some("left"), 37),
            Detail::Key(Some("enter"), 13),
        ]
    );
    assert_eq!(log.of(Hook::KeyUp).len(), 1);
    assert!(scene.binding(root).unwrap().keys().is_down(37));
}

#[test]
fn blur_pauses_stepping_and_focus_resyncs_clock() {
    let (mut scene, root) = scene_with_root(10, 10);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log).with_capabilities(Capabilities::STEP));
    scene.add(root, probe).unwrap();

    assert!(scene.cycle(root, HostTime(0)).unwrap());
    assert!(scene.cycle(root, HostTime(16)).unwrap());
    scene.handle_event(root, &DeviceEvent::FocusLost).unwrap();
    assert!(!scene.has_focus(root));
    assert!(!scene.cycle(root, HostTime(500)).unwrap());
    scene
        .handle_event(root, &DeviceEvent::FocusGained { at: HostTime(1000) })
        .unwrap();
    assert!(scene.cycle(root, HostTime(1010)).unwrap());

    let elapsed: Vec<Detail> = log.of(Hook::Step).into_iter().map(|e| e.detail).collect();
    assert_eq!(
        elapsed,
        vec![
            Detail::Elapsed(0.0),
            Detail::Elapsed(16.0),
            Detail::Elapsed(10.0),
        ]
    );
}

#[test]
fn replacing_a_surface_carries_pixels() {
    let mut scene = Scene::new();
    let root = scene.create_group(GroupConfig::new());
    let first = MemorySurface::new(4, 4);
    let first_stats = first.stats();
    let _ = scene.set_surface(root, Box::new(first)).unwrap();
    // Paint through the scene, since the surface is now owned by it.
    let painted = {
        let mut pixels = scene.surface(root).unwrap().read_pixels();
        pixels.data.fill(9);
        pixels
    };
    scene.surface_mut(root).unwrap().write_pixels(&painted);

    let second = MemorySurface::new(8, 8);
    let second_stats = second.stats();
    let old = scene.set_surface(root, Box::new(second)).unwrap();

    assert!(old.is_some());
    assert_eq!(first_stats.clears(), 2);
    assert_eq!(second_stats.clears(), 1);
    let pixels = scene.surface(root).unwrap().read_pixels();
    assert_eq!((pixels.width, pixels.height), (8, 8));
    assert_eq!(pixels.data[0], 9);
    assert_eq!(pixels.data[3 * 8 + 3], 9);
    assert_eq!(pixels.data[4 * 8 + 4], 0);
}

#[test]
fn degenerate_surface_is_rejected() {
    let mut scene = Scene::new();
    let root = scene.create_group(GroupConfig::new());
    let result = scene.set_surface(root, Box::new(MemorySurface::new(0, 10)));
    assert!(matches!(result, Err(SceneError::InvalidSurface)));
    assert!(scene.binding(root).is_none());
}

#[test]
fn failing_hook_surfaces_as_handler_error() {
    let (mut scene, root) = scene_with_root(10, 10);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log).failing(Hook::PointerDown));
    let below = scene.create_node(Probe::new("below", &log));
    scene.set_depth(probe, 1);
    scene.add_all(root, [below, probe]).unwrap();
    log.clear();

    let err = scene
        .handle_event(root, &DeviceEvent::PointerDown {
            position: Point::new(1.0, 1.0),
        })
        .unwrap_err();

    match err {
        SceneError::Handler { node, hook, source } => {
            assert_eq!(node, probe);
            assert_eq!(hook, Hook::PointerDown);
            let probe_error = source.downcast_ref::<ProbeError>().unwrap();
            assert_eq!(probe_error.name, "p");
        }
        other => panic!("expected a handler error, got {other:?}"),
    }
    assert_eq!(log.calls(), vec![("p", Hook::PointerDown)]);
    // The binding survives the error.
    assert!(scene.binding(root).unwrap().mouse().held);
}

#[test]
fn failing_touch_keeps_committed_fingers() {
    let (mut scene, root) = scene_with_root(10, 10);
    let log = EventLog::new();
    let probe = scene.create_node(Probe::new("p", &log).failing_once(Hook::PointerDown));
    scene.add(root, probe).unwrap();
    log.clear();
    let (a, b) = (7, 8);

    let err = scene
        .handle_event(root, &DeviceEvent::TouchStart {
            touches: vec![contact(a, 1.0, 1.0), contact(b, 2.0, 2.0)],
        })
        .unwrap_err();
    assert!(matches!(
        err,
        SceneError::Handler {
            hook: Hook::PointerDown,
            ..
        }
    ));

    let registry = scene.binding(root).unwrap().touches();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(TouchId(a)).map(|s| s.finger), Some(0));
    assert!(!registry.contains(TouchId(b)));

    scene
        .handle_event(root, &DeviceEvent::TouchStart {
            touches: vec![contact(a, 1.0, 1.0), contact(b, 2.0, 2.0)],
        })
        .unwrap();

    let downs: Vec<(Option<TouchId>, usize)> = pointers(&log, Hook::PointerDown)
        .iter()
        .map(|s| (s.identifier, s.finger))
        .collect();
    assert_eq!(downs, vec![(Some(TouchId(a)), 0), (Some(TouchId(b)), 1)]);
    assert_eq!(scene.binding(root).unwrap().touches().len(), 2);
}
