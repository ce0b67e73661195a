// This file is part of dfxd, a driver and demonstration control loop for the AMD/Xilinx DFX Controller IP.
//
// Copyright 2025 Canonical Ltd.
//
// SPDX-License-Identifier: GPL-3.0-only
//
// dfxd is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License version 3, as published by the Free Software Foundation.
//
// dfxd is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranties of MERCHANTABILITY, SATISFACTORY QUALITY, or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with this program.  If not, see http://www.gnu.org/licenses/.

//! Demonstration binary for the DFX Controller driver.
//!
//! Start-up sequence:
//! 1. Capture and dump the per-slot setup registers (quiesce bracket)
//! 2. Hand reconfiguration ownership from the PCAP boot path to ICAP
//! 3. Cycle RM load triggers and report decoded status until interrupted
//!
//! Needs privileges to map `/dev/mem`.
//!
//! # Environment Variables
//!
//! - `RUST_LOG` - Controls logging level (`trace`, `debug`, `info`, `warn`,
//!   `error` or `off`). Defaults to `info`

use clap::Parser;
use dfxd::config::{DEFAULT_BASE_ADDRESS, DEFAULT_POLL_PERIOD_MS};
use dfxd::control::ControlSequencer;
use dfxd::mmio::DevMem;
use dfxd::poll::PollingLoop;
use dfxd::registers::RegisterMap;
use dfxd::setup::SetupInspector;
use log::{info, warn};
use std::error::Error;
use std::time::Duration;
use tokio::sync::watch;

/// Accept plain decimal or 0x-prefixed hexadecimal addresses.
fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s:?}: {e}"))
}

#[derive(Parser, Debug)]
#[command(name = "dfxd")]
#[command(bin_name = "dfxd")]
struct Cli {
    /// Physical base address of the controller's AXI-Lite window.
    #[arg(long = "base", value_parser = parse_address, default_value_t = DEFAULT_BASE_ADDRESS)]
    base: u64,
    /// Delay between polling-loop register operations, in milliseconds.
    #[arg(long = "period-ms", default_value_t = DEFAULT_POLL_PERIOD_MS)]
    period_ms: u64,
    /// Stop after this many trigger cycles instead of running until interrupted.
    #[arg(long = "cycles")]
    cycles: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let map = RegisterMap::new(cli.base)?;
    let io = DevMem::open(&map)?;
    info!(
        "DFX Controller at 0x{:08X}, polling every {}ms",
        map.base(),
        cli.period_ms
    );

    let snapshot = SetupInspector::new(&io, map).capture()?;
    snapshot.log();
    ControlSequencer::new(&io, map).enable_icap_reprogramming()?;

    let (cancel_tx, mut cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping at next delay boundary");
            let _ = cancel_tx.send(true);
        }
    });

    let mut looper = PollingLoop::new(&io, map, Duration::from_millis(cli.period_ms));
    looper.run(&mut cancel_rx, cli.cycles).await?;
    Ok(())
}
