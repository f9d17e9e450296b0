// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `run`: Poll until shutdown
//! - `poll`: One cycle, print the groups
//! - `set`: Write one setpoint
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod poll;
mod run;
mod set;
mod validate;
mod version;

pub use poll::poll;
pub use run::run;
pub use set::set;
pub use validate::validate;
pub use version::version;

use crate::cli::{Cli, Commands};
use crate::error::BinResult;

/// Executes the appropriate command based on CLI arguments.
pub async fn execute(cli: Cli) -> BinResult<()> {
    match cli.effective_command() {
        Commands::Run(args) => run::run(&cli, args).await,
        Commands::Poll(args) => poll::poll(&cli, args).await,
        Commands::Set(args) => set::set(&cli, args).await,
        Commands::Validate(args) => validate::validate(&cli, args),
        Commands::Version => version::version(&cli),
    }
}
