//! This module is in charge of outputting the end-of-run veto statistics to
//! the standard output and to disk

use crate::{config::Configuration, numeric::Float, stats::VetoStatistics, Result};

use time::{macros::format_description, OffsetDateTime};

use std::{
    fmt::Display,
    fs::File,
    io::Write,
    time::Duration,
};

/// Name of the statistics file written at the end of the run
const STATS_FILE: &str = "veto.stats";

/// Output the run statistics to the console and to disk
pub fn dump_statistics(
    cfg: &Configuration,
    stats: &VetoStatistics,
    num_events: usize,
    kept_events: usize,
    elapsed_time: Duration,
) -> Result<()> {
    // Print out the counters on stdout, following the wording of the
    // original selector to ease comparisons
    println!();
    println!("Some statistics about the veto procedure:");
    println!(
        "   number of events with IS and FS veto: {}.",
        stats.both_vetoes
    );
    println!(
        "   number of events with FS veto: {}.",
        stats.final_state_vetoes
    );
    println!(
        "   number of events with IS veto: {}.",
        stats.initial_state_vetoes
    );

    // Compute a timestamp of when the run ended
    let format = format_description!("[day]-[month repr:short]-[year repr:last_two]   [hour]:[minute]:[second]");
    let timestamp = OffsetDateTime::now_utc().format(&format)?;

    // Write the full report to a file
    let mut stats_file = File::create(STATS_FILE)?;
    let stats_file = &mut stats_file;
    writeln!(stats_file, " {timestamp}")?;
    writeln!(stats_file, " ---------------------------------------------")?;
    writeln_kv(stats_file, "Run mode", format!("{:?}", cfg.mode))?;
    writeln_kv(stats_file, "NLO mode", cfg.nlo)?;
    writeln_kv(stats_file, "Store verdict as tag", cfg.store)?;
    writeln_kv(stats_file, "Events processed", num_events)?;
    writeln_kv(stats_file, "Events kept", kept_events)?;
    writeln!(stats_file, " ---------------------------------------------")?;
    writeln_kv(stats_file, "Vetoes (IS and FS)", stats.both_vetoes)?;
    writeln_kv(stats_file, "Vetoes (FS only)", stats.final_state_vetoes)?;
    writeln_kv(stats_file, "Vetoes (IS only)", stats.initial_state_vetoes)?;
    writeln_kv(stats_file, "Vetoes (total)", stats.total_vetoes())?;
    if num_events > 0 {
        let veto_fraction = stats.total_vetoes() as Float / num_events as Float;
        writeln_kv(stats_file, "Veto fraction", veto_fraction)?;
    }
    writeln!(stats_file, " ---------------------------------------------")?;
    let elapsed_secs =
        (elapsed_time.as_secs() as Float) + 1e-9 * (elapsed_time.subsec_nanos() as Float);
    writeln_kv(stats_file, "Elapsed time (s)", elapsed_secs)?;
    if num_events > 0 {
        let secs_per_event = elapsed_secs / (num_events as Float);
        writeln_kv(stats_file, "Elapsed time per event (s)", secs_per_event)?;
    }

    Ok(())
}

/// Key-value output that uses fixed-size columns for better readability
fn writeln_kv(file: &mut File, key: &str, value: impl Display) -> std::io::Result<()> {
    writeln!(file, " {key:<31}: {value}")
}
