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

use std::path::PathBuf;

/// Software-side failures of the driver.
///
/// Hardware-reported conditions are never surfaced through this type: the
/// controller's error code is data carried in
/// [`ControllerStatus`](crate::status::ControllerStatus), not a fault. These
/// variants cover caller-contract violations and hosted-platform I/O only.
#[derive(Debug, thiserror::Error)]
pub enum DfxError {
    #[error("DfxError::Argument: {0}")]
    Argument(String),
    #[error("DfxError::DeviceOpen: An IO error occurred when opening {path:?}: {e}")]
    DeviceOpen { path: PathBuf, e: std::io::Error },
    #[error("DfxError::Map: Failed to map physical address 0x{addr:08X}: {e}")]
    Map { addr: u64, e: std::io::Error },
    #[error("DfxError::Access: Address 0x{addr:08X} is outside the mapped register windows")]
    Access { addr: u64 },
    #[error("DfxError::Internal: An internal error occurred: {0}")]
    Internal(String),
}
