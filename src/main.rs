//! bbveto: a cluster-history veto for simulated event samples
//!
//!
//! # Introduction (for the physicist)
//!
//! Inclusive samples of a heavy process (think top-quark pairs plus jets)
//! partly overlap with the dedicated sample that simulates the same process
//! with extra bottom quarks from the matrix element. Events whose shower
//! clustering history shows that their bottom quarks arose from an
//! unresolved splitting are already covered by the dedicated sample and
//! must be vetoed, or they would be counted twice when the samples are
//! combined.
//!
//! The decision walks the chain of intermediate clustering configurations
//! recorded by the shower, checking a final-state condition (was the
//! configuration just before the first bottom quark appeared already
//! jetty?) and an initial-state condition (did enough emissions happen
//! before the initial-state bottom splitting was unfolded?).
//!
//!
//! # Introduction (for the computer guy)
//!
//! The program is a thin driver around a pure decision engine:
//!
//! * read in the run configuration,
//! * load the event trace,
//! * for each event, walk its snapshot chain twice and combine the two
//!   sub-verdicts into keep-or-veto, accumulating statistics,
//! * apply the reject-or-annotate policy,
//! * then display / store the counters.
//!
//! The engine itself never mutates event data and owns no global state, so
//! a host framework can drive it from as many worker threads as it likes,
//! merging the per-worker statistics at the end of the run.

#![warn(missing_docs)]

mod classify;
mod config;
mod flavor;
mod history;
mod momentum;
mod numeric;
mod output;
mod record;
mod stats;
mod trace;
mod veto;

use eyre::WrapErr;

use crate::{
    config::{Configuration, RunMode},
    stats::VetoStatistics,
    veto::HistoryVeto,
};

use std::time::Instant;

/// We'll use eyre's type-erased result type throughout the application
type Result<T> = eyre::Result<T>;

/// This will act as our main function, with suitable error handling
fn main() -> Result<()> {
    // ### CONFIGURATION READOUT ###

    let config_file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "veto.conf".to_owned());
    let cfg =
        Configuration::load(&config_file).wrap_err("Failed to load the configuration")?;

    // ### EVENT READOUT ###

    let mut events =
        trace::load_events(&cfg.event_file).wrap_err("Failed to load the event trace")?;

    // ### VETO DECISIONS ###

    // NOTE: We start the clock after input I/O, to avoid IO-induced timing
    //       fluctuations
    let saved_time = Instant::now();

    let engine = HistoryVeto::new(cfg.nlo);
    let policy = cfg.policy();
    let mut statistics = VetoStatistics::new();
    let num_events = events.len();
    let mut kept_events = 0;

    for (index, record) in events.iter_mut().enumerate() {
        let keep = match cfg.mode {
            // Disabled mode passes every event through untouched
            RunMode::Disabled => true,
            RunMode::ClusterHistory => {
                veto::process_event(&engine, record, policy, &mut statistics)
                    .wrap_err_with(|| format!("Failed to judge event {}", index + 1))?
            }
        };
        if keep {
            kept_events += 1;
        }
    }

    // ### STATISTICS DISPLAY AND STORAGE ###

    // Measure how much time has elapsed
    let elapsed_time = saved_time.elapsed();

    // Send the counters to the standard output and to disk and we're done
    output::dump_statistics(&cfg, &statistics, num_events, kept_events, elapsed_time)
        .wrap_err("Failed to output the statistics")?;

    Ok(())
}
