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

//! Symbolic register map for the DFX Controller's AXI-Lite window.
//!
//! Offsets are fixed by the IP; only the base address varies per deployment,
//! so the map is constructed from an injected base rather than baked-in
//! absolute addresses. Everything here is pure address arithmetic — no I/O.

use crate::config::SLOT_COUNT;
use crate::error::DfxError;

/// Named registers of the DFX Controller.
///
/// Slot-indexed variants carry the RM slot number (0..[`SLOT_COUNT`]). The
/// status and control registers share offset 0x00 by hardware contract — a
/// read returns the status word, a write issues a control command — so they
/// are a single name here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DfxRegister {
    /// Offset 0x00. Read: status word. Write: [`ControlCommand`](crate::control::ControlCommand).
    StatusControl,
    /// Offset 0x04. Last software-issued RM trigger index.
    SwTrigger,
    /// Offsets 0x40 + 4n. Per-slot trigger counters.
    Trigger(u8),
    /// Offsets 0x80 + 8n. Bitstream index per slot.
    // Can't find which Vivado IP configuration parameter this maps to;
    // treated as an opaque read/write register.
    RmBsIndex(u8),
    /// Offsets 0x84 + 8n. Per-slot control word.
    RmControl(u8),
    /// Offsets 0xC0 + 0x10n. Bitstream identifier (UltraScale- device families only).
    BsId(u8),
    /// Offsets 0xC4 + 0x10n. Bitstream source address.
    BsAddress(u8),
    /// Offsets 0xC8 + 0x10n. Bitstream size in bytes.
    BsSize(u8),
}

impl DfxRegister {
    /// Byte offset of this register from the controller base address.
    ///
    /// Slot numbers must be below [`SLOT_COUNT`]; the sequencing layer
    /// enforces that before any slot-indexed register is formed.
    pub fn offset(self) -> u64 {
        match self {
            DfxRegister::StatusControl => 0x00,
            DfxRegister::SwTrigger => 0x04,
            DfxRegister::Trigger(slot) => 0x40 + 0x04 * u64::from(slot),
            DfxRegister::RmBsIndex(slot) => 0x80 + 0x08 * u64::from(slot),
            DfxRegister::RmControl(slot) => 0x84 + 0x08 * u64::from(slot),
            DfxRegister::BsId(slot) => 0xC0 + 0x10 * u64::from(slot),
            DfxRegister::BsAddress(slot) => 0xC4 + 0x10 * u64::from(slot),
            DfxRegister::BsSize(slot) => 0xC8 + 0x10 * u64::from(slot),
        }
    }

    /// Every register name for every slot, in address order. Used by the
    /// simulated register bank and by the map's own tests.
    pub fn all() -> Vec<DfxRegister> {
        let mut regs = vec![DfxRegister::StatusControl, DfxRegister::SwTrigger];
        for slot in 0..SLOT_COUNT as u8 {
            regs.push(DfxRegister::Trigger(slot));
        }
        for slot in 0..SLOT_COUNT as u8 {
            regs.push(DfxRegister::RmBsIndex(slot));
            regs.push(DfxRegister::RmControl(slot));
        }
        for slot in 0..SLOT_COUNT as u8 {
            regs.push(DfxRegister::BsId(slot));
            regs.push(DfxRegister::BsAddress(slot));
            regs.push(DfxRegister::BsSize(slot));
        }
        regs
    }
}

/// Immutable mapping from register name to absolute physical address.
///
/// One instance exists per controller; the base address comes from platform
/// configuration at construction time and never changes afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RegisterMap {
    base: u64,
}

impl RegisterMap {
    /// Create a map over the controller window at `base`.
    ///
    /// # Returns: `Result<RegisterMap, DfxError>`
    /// * `Ok(RegisterMap)` - Map ready for address translation
    /// * `Err(DfxError::Argument)` - No base address was supplied (zero), or
    ///   the base is not 32-bit aligned
    pub fn new(base: u64) -> Result<RegisterMap, DfxError> {
        if base == 0 {
            return Err(DfxError::Argument(
                "A controller base address is required. Provided base address is zero.".into(),
            ));
        }
        if base % 4 != 0 {
            return Err(DfxError::Argument(format!(
                "Controller base address 0x{base:08X} is not 32-bit aligned."
            )));
        }
        Ok(RegisterMap { base })
    }

    /// The configured controller base address.
    pub fn base(&self) -> u64 {
        self.base
    }

    /// Absolute physical address of `register`. Pure; injective for a fixed base.
    pub fn address_of(&self, register: DfxRegister) -> u64 {
        self.base + register.offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_offsets_match_register_table() {
        assert_eq!(DfxRegister::StatusControl.offset(), 0x00);
        assert_eq!(DfxRegister::SwTrigger.offset(), 0x04);
        assert_eq!(DfxRegister::Trigger(0).offset(), 0x40);
        assert_eq!(DfxRegister::Trigger(3).offset(), 0x4C);
        assert_eq!(DfxRegister::RmBsIndex(1).offset(), 0x88);
        assert_eq!(DfxRegister::RmControl(2).offset(), 0x94);
        assert_eq!(DfxRegister::BsId(3).offset(), 0xF0);
        assert_eq!(DfxRegister::BsAddress(1).offset(), 0xD4);
        assert_eq!(DfxRegister::BsSize(3).offset(), 0xF8);
    }

    #[test]
    fn test_address_of_adds_base() {
        let map = RegisterMap::new(0x43C0_0000).unwrap();
        assert_eq!(map.address_of(DfxRegister::StatusControl), 0x43C0_0000);
        assert_eq!(map.address_of(DfxRegister::BsSize(2)), 0x43C0_00E8);
    }

    #[test]
    fn test_address_of_is_injective_for_fixed_base() {
        let map = RegisterMap::new(0x8000_0000).unwrap();
        let regs = DfxRegister::all();
        let addresses: HashSet<u64> = regs.iter().map(|r| map.address_of(*r)).collect();
        assert_eq!(
            addresses.len(),
            regs.len(),
            "two distinct register names resolved to the same address"
        );
    }

    #[test]
    fn test_all_registers_fit_in_window() {
        let max = DfxRegister::all()
            .iter()
            .map(|r| r.offset())
            .max()
            .unwrap();
        assert!(max + 4 <= crate::config::REGISTER_WINDOW_LEN as u64);
    }

    #[test]
    fn test_zero_base_is_rejected() {
        assert!(matches!(
            RegisterMap::new(0),
            Err(DfxError::Argument(..))
        ));
    }

    #[test]
    fn test_unaligned_base_is_rejected() {
        assert!(matches!(
            RegisterMap::new(0x43C0_0002),
            Err(DfxError::Argument(..))
        ));
    }
}
