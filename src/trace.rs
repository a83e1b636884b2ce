//! Driver-side reader for plain text event traces
//!
//! The engine normally receives its cluster histories straight from the
//! shower subsystem; this reader feeds it from a text file instead so the
//! program can run standalone. One event per blank-line-separated block,
//! one snapshot per line from hardest to softest, one leg per whitespace
//! token of the form `FLAVOR[*][@PZ]`:
//!
//! * `FLAVOR` is the signed flavor code,
//! * a trailing `*` marks a leg from a hard decay,
//! * `@PZ` sets the longitudinal momentum (default 0).
//!
//! The first two tokens of every snapshot are the initial-state legs.
//! `#` starts a comment. This format belongs to this driver, not to the
//! engine, and is not stable.

use crate::{
    flavor::Flavor,
    history::{ClusterHistory, Leg, NUM_INITIAL},
    momentum::{Momentum, Z},
    numeric::Float,
    record::EventRecord,
    Result,
};

use eyre::{ensure, eyre, WrapErr};

use num_traits::Zero;

use std::{fs::File, io::Read, mem};

/// Read an event trace file into event records
pub fn load_events(file_name: &str) -> Result<Vec<EventRecord>> {
    let trace_str = {
        let mut trace_file = File::open(file_name)
            .wrap_err_with(|| format!("Could not open event trace {file_name:?}"))?;
        let mut buffer = String::new();
        trace_file.read_to_string(&mut buffer)?;
        buffer
    };
    parse_events(&trace_str)
}

/// Decode an event trace from its textual form
pub fn parse_events(trace_str: &str) -> Result<Vec<EventRecord>> {
    let mut events = Vec::new();
    let mut snapshots: Vec<Vec<Leg>> = Vec::new();
    let mut flush = |snapshots: &mut Vec<Vec<Leg>>| {
        if !snapshots.is_empty() {
            let history = ClusterHistory::from_legs(mem::take(snapshots));
            events.push(EventRecord::new(Some(history)));
        }
    };

    for (line_idx, line) in trace_str.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            flush(&mut snapshots);
            continue;
        }
        let legs = line
            .split_whitespace()
            .map(parse_leg)
            .collect::<Result<Vec<_>>>()
            .wrap_err_with(|| format!("Bad snapshot on line {}", line_idx + 1))?;
        ensure!(
            legs.len() >= NUM_INITIAL,
            "Snapshot on line {} is missing its two initial-state legs",
            line_idx + 1
        );
        snapshots.push(legs);
    }
    flush(&mut snapshots);

    Ok(events)
}

/// Decode one leg token
fn parse_leg(token: &str) -> Result<Leg> {
    let (token, pz) = match token.split_once('@') {
        Some((head, pz)) => (
            head,
            pz.parse::<Float>()
                .wrap_err_with(|| format!("Bad longitudinal momentum {pz:?}"))?,
        ),
        None => (token, 0.),
    };
    let (token, from_decay) = match token.strip_suffix('*') {
        Some(head) => (head, true),
        None => (token, false),
    };
    let code = token
        .parse::<i32>()
        .map_err(|_| eyre!("Bad flavor code {token:?}"))?;
    let mut momentum = Momentum::zero();
    momentum[Z] = pz;
    Ok(Leg::new(Flavor(code), from_decay, momentum))
}
