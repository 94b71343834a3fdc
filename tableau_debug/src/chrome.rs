// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] reads recorded bytes from a [`RecorderSink`](super::recorder::RecorderSink)
//! and writes [Chrome Trace Event Format][spec] JSON to the given writer.
//!
//! Each surface owner becomes its own track (`tid` is the node's slot
//! index). Input and dirty events carry no timestamp of their own; they are
//! placed at the most recent timestamp seen in the recording.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use tableau_core::time::{HostTime, Timebase};

use crate::recorder::{RecordedEvent, decode};

/// Exports recorded events as Chrome Trace Event Format JSON.
///
/// The output is a complete JSON array of trace event objects, suitable for
/// loading into `chrome://tracing` or [Perfetto](https://ui.perfetto.dev/).
///
/// Timestamps are converted to microseconds using the provided [`Timebase`].
pub fn export(bytes: &[u8], timebase: Timebase, writer: &mut dyn Write) -> io::Result<()> {
    let mut events: Vec<Value> = Vec::new();
    let us = |t: HostTime| t.to_nanos(timebase) as f64 / 1000.0;
    let mut last_ts = 0.0;

    for recorded in decode(bytes) {
        match recorded {
            RecordedEvent::Cycle(e) => {
                last_ts = us(e.now);
                events.push(json!({
                    "ph": "i",
                    "name": "Cycle",
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "s": "t",
                    "args": {
                        "cycle_index": e.cycle_index,
                        "elapsed_ms": e.elapsed_ms,
                        "focused": e.focused,
                    }
                }));
            }
            RecordedEvent::PhaseBegin(e) => {
                last_ts = us(e.timestamp);
                events.push(json!({
                    "ph": "B",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "args": {
                        "cycle_index": e.cycle_index,
                    }
                }));
            }
            RecordedEvent::PhaseEnd(e) => {
                last_ts = us(e.timestamp);
                events.push(json!({
                    "ph": "E",
                    "name": format!("{:?}", e.phase),
                    "cat": "Frame",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "args": {
                        "cycle_index": e.cycle_index,
                    }
                }));
            }
            RecordedEvent::Dispatch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("{:?}", e.hook),
                    "cat": "Input",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "s": "t",
                    "args": {
                        "consumed": e.consumed,
                    }
                }));
            }
            RecordedEvent::Touch(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": format!("Touch{:?}", e.phase),
                    "cat": "Input",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "s": "t",
                    "args": {
                        "finger": e.finger,
                        "identifier": e.identifier.0,
                    }
                }));
            }
            RecordedEvent::Binding(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": if e.attached { "BindingAttach" } else { "BindingDetach" },
                    "cat": "Input",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.node.index(),
                    "s": "p",
                }));
            }
            RecordedEvent::Dirty(e) => {
                events.push(json!({
                    "ph": "i",
                    "name": "Dirty",
                    "cat": "Rich",
                    "ts": last_ts,
                    "pid": 0,
                    "tid": e.into.index(),
                    "s": "t",
                    "args": {
                        "cycle_index": e.cycle_index,
                        "from": e.from.index(),
                        "flags": format!("{:?}", e.flags),
                    }
                }));
            }
        }
    }

    serde_json::to_writer_pretty(writer, &events)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderSink;
    use tableau_core::node::Hook;
    use tableau_core::scene::NodeId;
    use tableau_core::trace::{
        CycleEvent, DispatchEvent, PhaseBeginEvent, PhaseEndEvent, PhaseKind, TraceSink,
    };

    #[test]
    fn export_produces_valid_json() {
        let node = NodeId::from_raw(4, 0);
        let mut rec = RecorderSink::new();
        rec.on_cycle(&CycleEvent {
            cycle_index: 1,
            node,
            now: HostTime(1_000_000),
            elapsed_ms: 0.0,
            focused: true,
        });
        rec.on_phase_begin(&PhaseBeginEvent {
            cycle_index: 1,
            node,
            phase: PhaseKind::Step,
            timestamp: HostTime(1_000_000),
        });
        rec.on_phase_end(&PhaseEndEvent {
            cycle_index: 1,
            node,
            phase: PhaseKind::Step,
            timestamp: HostTime(1_000_100),
        });
        rec.on_dispatch(&DispatchEvent {
            node,
            hook: Hook::KeyDown,
            consumed: true,
        });

        let mut out = Vec::new();
        export(rec.as_bytes(), Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();

        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.len(), 4);

        assert_eq!(parsed[0]["ph"], "i");
        assert_eq!(parsed[0]["name"], "Cycle");
        assert_eq!(parsed[0]["tid"], 4);

        assert_eq!(parsed[1]["ph"], "B");
        assert_eq!(parsed[1]["name"], "Step");

        assert_eq!(parsed[2]["ph"], "E");
        assert_eq!(parsed[2]["name"], "Step");

        // Untimed events inherit the latest timestamp.
        assert_eq!(parsed[3]["name"], "KeyDown");
        assert_eq!(parsed[3]["ts"], 1000.1);
        assert_eq!(parsed[3]["args"]["consumed"], true);
    }

    #[test]
    fn export_empty_recording() {
        let mut out = Vec::new();
        export(&[], Timebase::NANOS, &mut out).unwrap();
        let json_str = String::from_utf8(out).unwrap();
        let parsed: Vec<Value> = serde_json::from_str(&json_str).unwrap();
        assert!(parsed.is_empty());
    }
}
