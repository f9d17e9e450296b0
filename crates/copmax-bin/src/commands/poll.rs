// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `poll` command.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use copmax_modbus::{GroupSnapshot, RegisterGroup};

use crate::cli::{Cli, OutputFormat, PollArgs};
use crate::config::load_config;
use crate::error::{BinError, BinResult};
use crate::runtime::build_poller;

/// Runs one poll cycle and prints the resulting snapshots.
pub async fn poll(cli: &Cli, args: PollArgs) -> BinResult<()> {
    let config = load_config(&cli.config)?;
    let poller = build_poller(&config)?;

    poller.poll_cycle().await;
    poller.disconnect().await;

    let groups: BTreeMap<RegisterGroup, Arc<GroupSnapshot>> = match args.group {
        Some(group) => BTreeMap::from([(group, poller.read_group(group))]),
        None => poller.snapshot_all(),
    };

    let output = match args.format {
        OutputFormat::Text => render_text(&groups),
        OutputFormat::Json => render_json(&groups)?,
    };
    print!("{}", output);

    if groups.values().all(|snapshot| !snapshot.valid) {
        return Err(BinError::runtime(format!(
            "no register group could be read from {}",
            poller.target()
        )));
    }
    Ok(())
}

fn render_text(groups: &BTreeMap<RegisterGroup, Arc<GroupSnapshot>>) -> String {
    let mut out = String::new();
    for (group, snapshot) in groups {
        let state = if snapshot.valid { "valid" } else { "invalid" };
        let _ = match snapshot.last_updated {
            Some(at) => writeln!(out, "{} ({}, updated {})", group, state, at.to_rfc3339()),
            None => writeln!(out, "{} ({}, never read)", group, state),
        };
        for (address, value) in &snapshot.values {
            let _ = writeln!(out, "  {}{:<3} = {}", group.space(), address, value);
        }
    }
    out
}

fn render_json(groups: &BTreeMap<RegisterGroup, Arc<GroupSnapshot>>) -> BinResult<String> {
    let view: BTreeMap<&str, &GroupSnapshot> = groups
        .iter()
        .map(|(group, snapshot)| (group.as_str(), snapshot.as_ref()))
        .collect();

    let mut json = serde_json::to_string_pretty(&view)
        .map_err(|e| BinError::runtime(format!("failed to encode snapshot: {}", e)))?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<RegisterGroup, Arc<GroupSnapshot>> {
        let mut temps = GroupSnapshot {
            valid: true,
            ..GroupSnapshot::default()
        };
        temps.values.insert(0, 2150);
        temps.values.insert(2, -350);

        BTreeMap::from([
            (RegisterGroup::Temperatures, Arc::new(temps)),
            (RegisterGroup::Status, Arc::new(GroupSnapshot::default())),
        ])
    }

    #[test]
    fn test_render_text() {
        let text = render_text(&sample());
        assert!(text.contains("temperatures (valid"));
        assert!(text.contains("  IR0   = 2150"));
        assert!(text.contains("  IR2   = -350"));
        assert!(text.contains("status (invalid, never read)"));
    }

    #[test]
    fn test_render_json() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["temperatures"]["valid"], true);
        assert_eq!(value["temperatures"]["values"]["2"], -350);
        assert_eq!(value["status"]["valid"], false);
        assert!(value["status"]["last_updated"].is_null());
    }
}
