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

/// Default physical base address of the DFX Controller's AXI-Lite window.
/// Matches the PL address assignment used by the reference Zynq-7000 design;
/// deployments with a different address map override it on the command line.
pub const DEFAULT_BASE_ADDRESS: u64 = 0x43C0_0000;

/// Size of the controller's register window in bytes. The highest documented
/// register (BS_SIZE3) sits at offset 0xF8.
pub const REGISTER_WINDOW_LEN: usize = 0x100;

/// Physical address of the Zynq-7000 devcfg CTRL register (XDCFG_CTRL).
/// See the Zynq-7000 TRM, "Register XDCFG_CTRL Details".
pub const DEVCFG_CTRL_ADDRESS: u64 = 0xF800_7000;

/// PCAP_PR bit of XDCFG_CTRL. While set, partial reconfiguration belongs to
/// the PCAP boot path; clearing it hands the fabric to ICAPE2 so the DFX
/// Controller can load bitstreams.
pub const PCAP_PR_MASK: u32 = 1 << 27;

/// Number of reconfigurable-module slots the controller exposes.
pub const SLOT_COUNT: usize = 4;

/// Default delay between polling-loop register operations, in milliseconds.
pub const DEFAULT_POLL_PERIOD_MS: u64 = 500;
