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

//! Diagnostic snapshot of the controller's static per-slot configuration.
//!
//! The bitstream address/size registers only read back meaningful values
//! while the reconfigurable partition is quiesced, so the capture brackets
//! its reads in a Shutdown / RestartNoStatus command pair. This is the one
//! place the driver forces a state instead of observing one, and it runs once
//! at start-up, not in steady state. No other control command may be
//! interleaved during the bracket.

use crate::config::SLOT_COUNT;
use crate::control::{ControlCommand, ControlSequencer};
use crate::error::DfxError;
use crate::mmio::RegisterIo;
use crate::registers::{DfxRegister, RegisterMap};
use log::info;

/// Static configuration of one RM slot, captured while quiesced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitstreamSlot {
    /// Bitstream identifier. Populated on UltraScale- device families only;
    /// reads as zero elsewhere.
    pub id: u32,
    /// Physical source address the controller fetches the bitstream from.
    pub address: u32,
    /// Bitstream size in bytes.
    pub size: u32,
}

/// Everything [`SetupInspector::capture`] reads in one quiesce window.
///
/// A value type rather than printed text so tests (and callers with an
/// operational policy) can assert on fields; [`log`](SetupSnapshot::log)
/// renders the human-readable dump.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupSnapshot {
    /// Per-slot trigger counters (TRIGGER0..3).
    pub triggers: [u32; SLOT_COUNT],
    /// Per-slot control words (RM_CONTROL0..3).
    pub rm_controls: [u32; SLOT_COUNT],
    pub slots: [BitstreamSlot; SLOT_COUNT],
}

impl SetupSnapshot {
    /// Log the snapshot as a line-oriented dump. Formatting only; not
    /// load-bearing for correctness.
    pub fn log(&self) {
        for (slot, trigger) in self.triggers.iter().enumerate() {
            info!("TRIGGER{slot}     = RM {trigger}");
        }
        for (slot, control) in self.rm_controls.iter().enumerate() {
            info!("RM_CONTROL{slot}  = 0x{control:08X}");
        }
        for (index, slot) in self.slots.iter().enumerate() {
            info!("BS_ID{index}       = 0x{:08X}", slot.id);
            info!("BS_ADDRESS{index}  = 0x{:08X}", slot.address);
            info!("BS_SIZE{index}     = 0x{:08X} {} bytes", slot.size, slot.size);
        }
    }
}

/// Captures the per-slot setup registers inside a shutdown/restart bracket.
pub struct SetupInspector<'io> {
    io: &'io dyn RegisterIo,
    map: RegisterMap,
}

impl<'io> SetupInspector<'io> {
    pub fn new(io: &'io dyn RegisterIo, map: RegisterMap) -> SetupInspector<'io> {
        SetupInspector { io, map }
    }

    fn read(&self, register: DfxRegister) -> Result<u32, DfxError> {
        self.io.read_register(self.map.address_of(register))
    }

    /// Quiesce the controller, read the per-slot configuration, resume.
    ///
    /// Side effects: one `Shutdown` command, the capture reads, then one
    /// `RestartNoStatus` command so normal operation continues. Sizes are
    /// read first, immediately after the shutdown takes effect.
    ///
    /// # Returns: `Result<SetupSnapshot, DfxError>`
    /// * `Ok(SetupSnapshot)` - Captured configuration for all slots
    /// * `Err(DfxError)` - A register access failed; the controller may be
    ///   left quiesced in that case
    pub fn capture(&self) -> Result<SetupSnapshot, DfxError> {
        let sequencer = ControlSequencer::new(self.io, self.map);
        let mut snapshot = SetupSnapshot::default();

        info!("capturing controller setup (quiescing reconfigurable partition)");
        sequencer.send_command(ControlCommand::Shutdown)?;

        for slot in 0..SLOT_COUNT as u8 {
            snapshot.slots[usize::from(slot)].size = self.read(DfxRegister::BsSize(slot))?;
        }
        for slot in 0..SLOT_COUNT as u8 {
            snapshot.triggers[usize::from(slot)] = self.read(DfxRegister::Trigger(slot))?;
        }
        for slot in 0..SLOT_COUNT as u8 {
            snapshot.rm_controls[usize::from(slot)] = self.read(DfxRegister::RmControl(slot))?;
        }
        for slot in 0..SLOT_COUNT as u8 {
            snapshot.slots[usize::from(slot)].id = self.read(DfxRegister::BsId(slot))?;
            snapshot.slots[usize::from(slot)].address = self.read(DfxRegister::BsAddress(slot))?;
        }

        sequencer.send_command(ControlCommand::RestartNoStatus)?;
        Ok(snapshot)
    }
}
