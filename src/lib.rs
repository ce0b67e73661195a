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

//! Driver for the AMD/Xilinx DFX (Dynamic Function eXchange) Controller IP.
//!
//! The DFX Controller manages runtime swapping of reconfigurable modules
//! (RMs) into an FPGA region. The host talks to it over a memory-mapped
//! AXI-Lite register window; this crate provides the protocol layers over
//! that window:
//!
//! - [`registers`] - symbolic register map over an injected base address
//! - [`status`] - total decoding of the 32-bit status word into structured
//!   state/error classifications
//! - [`control`] - control commands, RM load triggers, and the one-time ICAP
//!   ownership handover
//! - [`setup`] - diagnostic capture of per-slot bitstream configuration
//!   inside a shutdown/restart bracket
//! - [`poll`] - the demonstration trigger-and-report cycle
//! - [`mmio`] - the register access seam: `/dev/mem` for hardware, a
//!   simulated register bank for tests
//!
//! The driver is stateless about the hardware: controller state transitions
//! are driven entirely by the fabric, and the crate re-reads status rather
//! than caching a transition model. Hardware-reported error codes are data,
//! never software faults. Access is single-owner by design — one task per
//! controller register window, no software-side locking of the bus.

pub mod config;
pub mod control;
pub mod error;
pub mod mmio;
pub mod poll;
pub mod registers;
pub mod setup;
pub mod status;
