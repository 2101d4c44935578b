// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `run` command.

use taskgate_config::TaskgateConfig;

use crate::error::BinResult;
use crate::runtime::RuntimeBuilder;

/// Starts the server and blocks until shutdown.
pub async fn run(config: TaskgateConfig) -> BinResult<()> {
    RuntimeBuilder::new().config(config).build()?.run().await
}
