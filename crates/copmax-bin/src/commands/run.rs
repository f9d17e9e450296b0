// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use tracing::info;

use crate::cli::{Cli, RunArgs};
use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;
use crate::shutdown::ShutdownCoordinator;

/// Executes the `run` command: polls until SIGINT/SIGTERM.
pub async fn run(cli: &Cli, args: RunArgs) -> BinResult<()> {
    info!("Starting copmax v{}", crate::VERSION);

    let shutdown = ShutdownCoordinator::new();
    shutdown.listen_for_signals();

    let runtime = RuntimeBuilder::new()
        .config_path(&cli.config)
        .max_cycles(args.cycles)
        .shutdown(shutdown)
        .build()?;

    runtime.run().await
}
