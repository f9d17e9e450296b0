// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `set` command.

use crate::cli::{Cli, SetArgs};
use crate::config::load_config;
use crate::error::BinResult;
use crate::runtime::build_poller;

/// Writes one setpoint and reports the raw word sent.
///
/// Exits with code 5 when the device refuses the value and 6 when it cannot
/// be reached.
pub async fn set(cli: &Cli, args: SetArgs) -> BinResult<()> {
    let config = load_config(&cli.config)?;
    let poller = build_poller(&config)?;

    let result = poller
        .write_setpoint(args.address, args.value, args.multiplier)
        .await;
    poller.disconnect().await;

    let raw = result?;
    if !cli.quiet {
        println!(
            "HR{} <- {} (value {} x {})",
            args.address, raw, args.value, args.multiplier
        );
    }
    Ok(())
}
