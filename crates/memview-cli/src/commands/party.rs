//! Party command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use memview::{
    Address, FixedVersion, GameVersion, Member, Party, PartyManager, SessionConfig,
    SnapshotMemory,
};
use owo_colors::OwoColorize;

use super::address::format_address;

/// Options for the party command
pub struct PartyOptions<'a> {
    pub snapshot: &'a Path,
    /// Roster address; when absent the roster is located by signature
    pub address: Option<Address>,
    pub replay: bool,
    pub json: bool,
}

/// Run the party command
pub fn run(options: &PartyOptions<'_>, config: &SessionConfig) -> Result<()> {
    let version = config
        .version
        .context("No game version: pass --version or set `version` in the config file")?;
    let memory = SnapshotMemory::load(options.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", options.snapshot.display()))?;

    let manager = match options.address {
        Some(address) => PartyManager::with_addresses(
            &memory,
            version,
            address,
            address,
            config.roster_capacity,
        )?,
        None => PartyManager::new(&memory, &FixedVersion(version), config)
            .context("Failed to locate the party")?,
    };
    let party = manager.party_list(options.replay);

    if options.json {
        println!("{}", serde_json::to_string_pretty(&party.snapshot())?);
        return Ok(());
    }

    print_party(party, manager.version());
    Ok(())
}

fn print_party(party: &Party<'_, SnapshotMemory>, version: &GameVersion) {
    println!(
        "Party at {} (version {}, {}/{} members)",
        format_address(party.address()),
        version,
        party.len(),
        party.capacity()
    );

    let schema = Member::<SnapshotMemory>::schema();
    for (i, member) in party.iter().enumerate() {
        println!();
        println!("{}", format!("[{}] {}", i, format_address(member.address())).bold());
        for (name, value) in schema.read_all(member) {
            println!("  {:<14}{}", name, value);
        }

        let statuses = member
            .status()
            .map(|s| s.active().unwrap_or_default())
            .unwrap_or_default();
        if statuses.is_empty() {
            println!("  {:<14}{}", "status", "none".dimmed());
        }
        for status in statuses {
            println!(
                "  {:<14}{} param={} {:.1}s from {}",
                "status",
                format!("{:#06x}", status.status_id).cyan(),
                status.param,
                status.remaining,
                format_address(status.source_id as Address)
            );
        }
    }
}
