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

//! Control command and trigger sequencing.
//!
//! The control register is write-only and aliases the status register, so
//! every operation here is fire-and-forget: the effect is asynchronous in the
//! fabric and only observable through a later status read. The driver never
//! waits on a state transition it did not explicitly ask to observe.

use crate::config::{DEVCFG_CTRL_ADDRESS, PCAP_PR_MASK, SLOT_COUNT};
use crate::error::DfxError;
use crate::mmio::RegisterIo;
use crate::registers::{DfxRegister, RegisterMap};
use log::{info, trace};

/// Commands accepted by the controller's write-only CONTROL register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Quiesce the reconfigurable partition. Required before the bitstream
    /// setup registers read back meaningful values.
    Shutdown,
    /// Resume operation without reloading status from the fabric.
    RestartNoStatus,
    /// Resume operation, restoring status from the fabric.
    RestartWithStatus,
    /// Acknowledge and continue past a software-managed step.
    Proceed,
    /// Hand the reconfigurable partition to user control.
    UserControl,
}

impl ControlCommand {
    /// The wire encoding written to the CONTROL register.
    pub fn code(self) -> u32 {
        match self {
            ControlCommand::Shutdown => 0,
            ControlCommand::RestartNoStatus => 1,
            ControlCommand::RestartWithStatus => 2,
            ControlCommand::Proceed => 3,
            ControlCommand::UserControl => 4,
        }
    }
}

/// Issues control commands and RM load triggers against one controller.
pub struct ControlSequencer<'io> {
    io: &'io dyn RegisterIo,
    map: RegisterMap,
}

impl<'io> ControlSequencer<'io> {
    pub fn new(io: &'io dyn RegisterIo, map: RegisterMap) -> ControlSequencer<'io> {
        ControlSequencer { io, map }
    }

    /// Write `cmd` to the CONTROL register.
    ///
    /// No return value is readable from the same register; callers observe
    /// the effect through a later status read.
    pub fn send_command(&self, cmd: ControlCommand) -> Result<(), DfxError> {
        trace!("issuing control command {cmd:?}");
        self.io
            .write_register(self.map.address_of(DfxRegister::StatusControl), cmd.code())
    }

    /// Request that the controller load reconfigurable module `rm_index`.
    ///
    /// One-shot: the trigger register offers no acknowledgment, so the caller
    /// polls status separately to observe the swap.
    ///
    /// # Returns: `Result<(), DfxError>`
    /// * `Ok(())` - Trigger written
    /// * `Err(DfxError::Argument)` - `rm_index` is not a valid slot for this
    ///   controller (caller-contract violation; triggering an undefined slot
    ///   has undefined hardware behavior, so the driver fails fast)
    pub fn trigger_load(&self, rm_index: u8) -> Result<(), DfxError> {
        if usize::from(rm_index) >= SLOT_COUNT {
            return Err(DfxError::Argument(format!(
                "RM index {rm_index} is out of range for a {SLOT_COUNT}-slot controller."
            )));
        }
        trace!("requesting load of RM {rm_index}");
        self.io.write_register(
            self.map.address_of(DfxRegister::SwTrigger),
            u32::from(rm_index),
        )
    }

    /// Hand device reconfiguration from the PCAP boot path to ICAPE2.
    ///
    /// Clears the PCAP_PR bit of the devcfg control register so the DFX
    /// Controller can program the fabric. Must run before any load trigger;
    /// the read-modify-write makes repeated calls a no-op.
    pub fn enable_icap_reprogramming(&self) -> Result<(), DfxError> {
        let devcfg = self.io.read_register(DEVCFG_CTRL_ADDRESS)?;
        if devcfg & PCAP_PR_MASK == 0 {
            trace!("PCAP_PR already clear, ICAP owns reconfiguration");
            return Ok(());
        }
        info!("clearing PCAP_PR, handing reconfiguration to ICAP");
        self.io
            .write_register(DEVCFG_CTRL_ADDRESS, devcfg & !PCAP_PR_MASK)
    }
}
