//! Mechanism for loading and sharing the run configuration

use crate::{veto::VetoPolicy, Result};

use eyre::{bail, eyre, Error, WrapErr};

use std::{fs::File, io::Read, str::FromStr};

/// Veto strategy selected for this run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Keep every event without consulting the engine
    Disabled,

    /// Judge every event by its cluster history
    ClusterHistory,
}

/// Run configuration
#[derive(Debug)]
pub struct Configuration {
    /// Veto strategy
    pub mode: RunMode,

    /// Whether the sample was generated at next-to-leading order
    pub nlo: bool,

    /// Whether vetoed events should be tagged instead of rejected
    pub store: bool,

    /// Path of the event trace to be processed
    pub event_file: String,
}
//
impl Configuration {
    /// Load the configuration from a file, check it, and print it out
    pub fn load(file_name: &str) -> Result<Self> {
        let config_str = {
            let mut config_file = File::open(file_name)
                .wrap_err_with(|| format!("Could not open configuration file {file_name:?}"))?;
            let mut buffer = String::new();
            config_file.read_to_string(&mut buffer)?;
            buffer
        };
        let config = Self::parse(&config_str)?;

        // Echo the loaded values, in the manner of the host framework
        config.print();

        Ok(config)
    }

    /// Decode the configuration from its textual form
    ///
    /// The format is one value per line, first non-whitespace chunk of text,
    /// `#` starting a comment. Values appear in a fixed order.
    fn parse(config_str: &str) -> Result<Self> {
        let mut config_iter = config_str
            .lines()
            .filter_map(|line| line.split('#').next().unwrap_or("").split_whitespace().next());

        // This closure fetches the next configuration item, tagging it with
        // the name of the configuration field which it is supposed to fill
        // to ease error reporting, and handling unexpected end-of-file too.
        let mut next_item = |name: &'static str| -> Result<ConfigItem> {
            config_iter
                .next()
                .map(|data| ConfigItem::new(name, data))
                .ok_or_else(|| eyre!("Missing configuration of {}", name))
        };

        let config = Configuration {
            mode: next_item("mode")?.parse_mode()?,
            nlo: next_item("nlo")?.parse_flag()?,
            store: next_item("store")?.parse_flag()?,
            event_file: next_item("event_file")?.parse::<String>()?,
        };
        Ok(config)
    }

    /// Policy to apply to vetoed events
    pub fn policy(&self) -> VetoPolicy {
        if self.store {
            VetoPolicy::Annotate
        } else {
            VetoPolicy::Reject
        }
    }

    /// Display the configuration, in the way the host framework echoes its
    /// input parameters (this eases comparisons)
    pub fn print(&self) {
        println!("MODUS      : {:?}", self.mode);
        println!("NLO_MODE   : {}", self.nlo);
        println!("STORE_TAG  : {}", self.store);
        println!("EVENT_FILE : {}", self.event_file);
    }
}

/// A value from the configuration file, tagged with the struct field which
/// it is supposed to map for error reporting purposes.
struct ConfigItem<'data> {
    name: &'static str,
    data: &'data str,
}
//
impl<'data> ConfigItem<'data> {
    /// Build a config item from a struct field tag and raw iterator data
    fn new(name: &'static str, data: &'data str) -> Self {
        Self { name, data }
    }

    /// Parse this data using Rust's standard parsing logic
    fn parse<T: FromStr>(self) -> Result<T>
    where
        <T as FromStr>::Err: std::error::Error + Send + Sync + 'static,
    {
        self.data
            .parse::<T>()
            .map_err(Error::new)
            .wrap_err_with(|| format!("Could not parse configuration of {}", self.name))
    }

    /// Parse a flag, accepting the host framework's 0/1 integer convention
    /// in addition to Rust bool syntax
    fn parse_flag(self) -> Result<bool> {
        match self.data {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => self.parse::<bool>(),
        }
    }

    /// Parse the run mode, keeping the numbering of the original selector
    /// (0 = disabled, 8 = cluster history)
    fn parse_mode(self) -> Result<RunMode> {
        match self.parse::<u32>()? {
            0 => Ok(RunMode::Disabled),
            8 => Ok(RunMode::ClusterHistory),
            other => bail!("Only the cluster-history mode (8) is implemented, got {other}"),
        }
    }
}
