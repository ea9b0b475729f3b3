//! Layout command implementation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use memview::{GameVersion, PartyLayout, save_table};

/// Print the roster tables used for `version`, or write them to `output`
pub fn run(version: &GameVersion, output: Option<&Path>) -> Result<()> {
    let layout = PartyLayout::for_version(version);

    let Some(dir) = output else {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    };

    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    for table in [&layout.party, &layout.member, &layout.status] {
        let path = dir.join(format!("{}.json", table.name()));
        save_table(&path, table)?;
        println!("Saved {}", path.display());
    }

    Ok(())
}
