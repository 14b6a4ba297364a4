// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Zonekeeper command-line interface.
//!
//! Operates on a YAML zone store and prints serials, SOA stanzas and zone
//! state for use by the config push.
//!
//! # Examples
//!
//! ```bash
//! # Today's base serial
//! zonekeeper serial
//!
//! # Create a master zone and a slave zone
//! zonekeeper create example.com
//! zonekeeper create example.net --master-server 192.0.2.53
//!
//! # Record an edit, render the SOA, acknowledge the push
//! zonekeeper raise example.com
//! zonekeeper soa example.com
//! zonekeeper pushed example.com
//! ```

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing::debug;
use zonekeeper::{
    config::Settings,
    manager::ZoneManager,
    metrics::gather_metrics,
    store::{FileZoneStore, TracingActivityLog},
    zone::{
        serial::{serial_date, serial_revision, SystemClock},
        NewZone, Zone, ZoneChanges, ZoneTimers,
    },
};

type CliManager = ZoneManager<FileZoneStore, TracingActivityLog, Settings, SystemClock>;

// ============================================================================
// CLI Structure
// ============================================================================

/// BIND zone serial and SOA lifecycle tool
#[derive(Parser, Debug)]
#[command(name = "zonekeeper")]
#[command(version, about = "Manage BIND zone serial numbers, pending changes and SOA timers")]
struct Cli {
    /// Settings file (YAML) with the zone defaults
    #[arg(short, long, global = true, env = "ZONEKEEPER_CONFIG")]
    config: Option<PathBuf>,

    /// Zone store file (YAML)
    #[arg(short, long, global = true, env = "ZONEKEEPER_STORE", default_value = "zones.yaml")]
    store: PathBuf,

    /// Output zones as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print today's base serial (YYYYMMDD00)
    Serial,

    /// Create a zone
    Create {
        /// Zone domain name
        domain: String,

        /// Server to transfer the zone from (makes it a slave zone)
        #[arg(long)]
        master_server: Option<IpAddr>,

        #[command(flatten)]
        timers: TimerArgs,
    },

    /// List zones
    List {
        /// Only zones with pending changes
        #[arg(long)]
        pending: bool,

        /// Only deleted zones
        #[arg(long, conflicts_with = "pending")]
        trashed: bool,
    },

    /// Show the state of a zone
    Show {
        /// Zone domain name
        domain: String,
    },

    /// Print the SOA stanza of a zone
    Soa {
        /// Zone domain name
        domain: String,
    },

    /// Print the $TTL directive and SOA stanza of a zone
    Header {
        /// Zone domain name
        domain: String,
    },

    /// Raise the serial of a zone
    ///
    /// Without --force the serial is kept while changes are pending.
    Raise {
        /// Zone domain name
        domain: String,

        /// Raise even if changes are already pending
        #[arg(long)]
        force: bool,
    },

    /// Edit a zone; the serial is raised when anything changed
    Set {
        /// Zone domain name
        domain: String,

        /// New domain name
        #[arg(long)]
        rename: Option<String>,

        /// Make the zone a slave of this server
        #[arg(long, conflicts_with = "master")]
        master_server: Option<IpAddr>,

        /// Make the zone a master zone
        #[arg(long)]
        master: bool,

        /// Drop the custom timers and use the configured defaults
        #[arg(long)]
        use_defaults: bool,

        #[command(flatten)]
        timers: TimerArgs,
    },

    /// Acknowledge that the zone file has been pushed
    Pushed {
        /// Zone domain name
        domain: String,
    },

    /// Soft-delete a zone
    Delete {
        /// Zone domain name
        domain: String,
    },

    /// Restore a soft-deleted zone
    Restore {
        /// Zone domain name
        domain: String,
    },
}

/// Per-zone timer overrides, in seconds
#[derive(Args, Debug, Default)]
struct TimerArgs {
    /// SOA refresh
    #[arg(long)]
    refresh: Option<u32>,

    /// SOA retry
    #[arg(long)]
    retry: Option<u32>,

    /// SOA expire
    #[arg(long)]
    expire: Option<u32>,

    /// SOA negative caching TTL
    #[arg(long)]
    negative_ttl: Option<u32>,

    /// Zone file $TTL
    #[arg(long)]
    default_ttl: Option<u32>,
}

impl TimerArgs {
    fn is_empty(&self) -> bool {
        self.refresh.is_none()
            && self.retry.is_none()
            && self.expire.is_none()
            && self.negative_ttl.is_none()
            && self.default_ttl.is_none()
    }

    /// Overlay the given values on `base`.
    fn merge_into(&self, base: ZoneTimers) -> ZoneTimers {
        ZoneTimers {
            refresh: self.refresh.or(base.refresh),
            retry: self.retry.or(base.retry),
            expire: self.expire.or(base.expire),
            negative_ttl: self.negative_ttl.or(base.negative_ttl),
            default_ttl: self.default_ttl.or(base.default_ttl),
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut manager = build_manager(&cli)?;

    run(&cli, &mut manager)?;

    if cli.metrics {
        print!("{}", gather_metrics().context("Failed to encode metrics")?);
    }
    Ok(())
}

fn init_logging() {
    // Logs go to stderr so command output on stdout stays scriptable
    //
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (text or json)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .compact()
                .init();
        }
    }
}

fn build_manager(cli: &Cli) -> Result<CliManager> {
    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => Settings::defaults(),
    }
    .with_env_overrides();

    let clock = SystemClock::new(settings.serial_timezone()?);
    let store = FileZoneStore::open(&cli.store)
        .with_context(|| format!("Failed to open zone store {}", cli.store.display()))?;
    debug!("Using zone store {}", store.path().display());

    Ok(ZoneManager::new(store, TracingActivityLog, settings, clock))
}

fn run(cli: &Cli, manager: &mut CliManager) -> Result<()> {
    match &cli.command {
        Commands::Serial => {
            println!("{}", manager.generate_serial_number()?);
        }
        Commands::Create {
            domain,
            master_server,
            timers,
        } => {
            let mut new = NewZone::master(domain);
            new.master_server = *master_server;
            if !timers.is_empty() {
                new = new.with_custom_timers(timers.merge_into(ZoneTimers::default()));
            }
            let zone = manager.create_zone(new)?;
            print_zone(cli, manager, &zone)?;
        }
        Commands::List { pending, trashed } => {
            let zones = if *trashed {
                manager.trashed_zones()?
            } else if *pending {
                manager.pending_zones()?
            } else {
                manager.zones()?
            };
            if cli.json {
                let records: Vec<_> = zones.iter().map(Zone::to_record).collect();
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else {
                for zone in &zones {
                    println!(
                        "{}\t{}\t{}\t{}",
                        zone.domain(),
                        zone.serial(),
                        zone_kind(zone),
                        if zone.has_pending_changes() { "pending" } else { "pushed" }
                    );
                }
            }
        }
        Commands::Show { domain } => {
            let zone = require_zone(manager, domain)?;
            print_zone(cli, manager, &zone)?;
        }
        Commands::Soa { domain } => {
            let zone = require_zone(manager, domain)?;
            print!("{}", manager.soa_record(&zone)?);
        }
        Commands::Header { domain } => {
            let zone = require_zone(manager, domain)?;
            print!("{}", manager.zone_header(&zone)?);
        }
        Commands::Raise { domain, force } => {
            let mut zone = require_zone(manager, domain)?;
            println!("{}", manager.raise_serial_number(&mut zone, *force)?);
        }
        Commands::Set {
            domain,
            rename,
            master_server,
            master,
            use_defaults,
            timers,
        } => {
            let mut zone = require_zone(manager, domain)?;
            let changes = set_changes(&zone, rename, *master_server, *master, *use_defaults, timers)?;
            println!("{}", manager.update_zone(&mut zone, &changes)?);
        }
        Commands::Pushed { domain } => {
            let mut zone = require_zone(manager, domain)?;
            manager.mark_pushed(&mut zone)?;
        }
        Commands::Delete { domain } => {
            let zone = require_zone(manager, domain)?;
            if let Some(id) = zone.id() {
                manager.delete_zone(id)?;
            }
        }
        Commands::Restore { domain } => {
            let wanted = zonekeeper::zone::normalize_domain(domain)?;
            // The most recently deleted zone with that name wins
            let zone = manager
                .trashed_zones()?
                .into_iter()
                .filter(|z| z.domain() == wanted)
                .max_by_key(Zone::deleted_at)
                .with_context(|| format!("No deleted zone named '{wanted}'"))?;
            if let Some(id) = zone.id() {
                let zone = manager.restore_zone(id)?;
                print_zone(cli, manager, &zone)?;
            }
        }
    }
    Ok(())
}

fn set_changes(
    zone: &Zone,
    rename: &Option<String>,
    master_server: Option<IpAddr>,
    master: bool,
    use_defaults: bool,
    timers: &TimerArgs,
) -> Result<ZoneChanges> {
    if use_defaults && !timers.is_empty() {
        bail!("--use-defaults cannot be combined with timer values");
    }

    let mut changes = ZoneChanges {
        domain: rename.clone(),
        ..ZoneChanges::default()
    };
    if master {
        changes.master_server = Some(None);
    } else if let Some(server) = master_server {
        changes.master_server = Some(Some(server));
    }
    if use_defaults {
        changes.custom_settings = Some(false);
    } else if !timers.is_empty() {
        changes.custom_settings = Some(true);
        changes.timers = Some(timers.merge_into(*zone.timers()));
    }

    if changes.is_empty() {
        bail!("Nothing to change; pass at least one option");
    }
    Ok(changes)
}

fn require_zone(manager: &CliManager, domain: &str) -> Result<Zone> {
    manager
        .find_by_domain(domain)?
        .with_context(|| format!("Zone '{domain}' not found"))
}

fn zone_kind(zone: &Zone) -> String {
    match zone.master_server() {
        None => "master".to_string(),
        Some(server) => format!("slave of {server}"),
    }
}

fn print_zone(cli: &Cli, manager: &CliManager, zone: &Zone) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&zone.to_record())?);
        return Ok(());
    }

    println!("domain:   {}", zone.domain());
    if let Some(id) = zone.id() {
        println!("id:       {id}");
    }
    match serial_date(zone.serial()) {
        Some(date) => println!(
            "serial:   {} ({} revision {:02})",
            zone.serial(),
            date,
            serial_revision(zone.serial())
        ),
        None => println!("serial:   {}", zone.serial()),
    }
    println!("type:     {}", zone_kind(zone));
    println!(
        "state:    {}",
        if zone.has_pending_changes() { "pending changes" } else { "pushed" }
    );
    println!(
        "timers:   {}",
        if zone.custom_settings() { "custom" } else { "defaults" }
    );

    // Defaults may legitimately be incomplete until a settings file is given
    match manager.timers(zone).resolve_all() {
        Ok(timers) => {
            println!("refresh:  {}", timers.refresh);
            println!("retry:    {}", timers.retry);
            println!("expire:   {}", timers.expire);
            println!("neg. ttl: {}", timers.negative_ttl);
            println!("ttl:      {}", timers.default_ttl);
        }
        Err(e) => println!("timers unresolved: {e}"),
    }
    Ok(())
}
