// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `version` command.

use crate::error::BinResult;

/// Prints version information for every component.
pub fn version() -> BinResult<()> {
    println!("taskgate - task management backend with role-based access control");
    println!();
    println!("Version Information:");
    println!("  taskgate-bin:    {}", crate::VERSION);
    println!("  taskgate-core:   {}", taskgate_core::VERSION);
    println!("  taskgate-api:    {}", taskgate_api::VERSION);
    println!("  taskgate-config: {}", taskgate_config::VERSION);
    println!();
    println!("Build Information:");
    println!("  Rust Edition: 2024");
    println!("  Target:       {}", std::env::consts::ARCH);
    println!("  OS:           {}", std::env::consts::OS);
    println!();
    println!("Features:");
    println!(
        "  RocksDB:      {}",
        if cfg!(feature = "rocksdb-backend") { "enabled" } else { "disabled" }
    );
    println!();
    println!("License: PolyForm Noncommercial License 1.0.0");
    println!("Copyright (c) 2025 Sylvex. All rights reserved.");

    Ok(())
}
