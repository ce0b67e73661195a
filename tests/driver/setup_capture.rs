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

use crate::driver::sim_controller;
use dfxd::control::ControlCommand;
use dfxd::mmio::RegisterIo;
use dfxd::registers::DfxRegister;
use dfxd::setup::SetupInspector;
use googletest::prelude::*;

/// The simulated bank gates BS_ID/BS_ADDRESS/BS_SIZE on the quiesce flag, so
/// the snapshot can only carry the seeded values if the capture issued
/// Shutdown before its reads.
#[gtest]
fn capture_reads_slot_configuration_inside_the_quiesce_bracket() {
    let (map, bank) = sim_controller();
    for slot in 0..4u8 {
        let n = u32::from(slot);
        bank.seed(map.address_of(DfxRegister::Trigger(slot)), n).unwrap();
        bank.seed(map.address_of(DfxRegister::RmControl(slot)), 0xB0 + n)
            .unwrap();
        bank.seed(map.address_of(DfxRegister::BsId(slot)), 0x10 + n).unwrap();
        bank.seed(
            map.address_of(DfxRegister::BsAddress(slot)),
            0x0010_0000 * (n + 1),
        )
        .unwrap();
        bank.seed(map.address_of(DfxRegister::BsSize(slot)), 0x3DBAC + n)
            .unwrap();
    }

    let snapshot = SetupInspector::new(&bank, map).capture().unwrap();

    for slot in 0..4usize {
        let n = slot as u32;
        expect_that!(snapshot.triggers[slot], eq(n));
        expect_that!(snapshot.rm_controls[slot], eq(0xB0 + n));
        expect_that!(snapshot.slots[slot].id, eq(0x10 + n));
        expect_that!(snapshot.slots[slot].address, eq(0x0010_0000 * (n + 1)));
        expect_that!(snapshot.slots[slot].size, eq(0x3DBAC + n));
    }
}

#[gtest]
fn capture_brackets_reads_in_shutdown_then_restart() {
    let (map, bank) = sim_controller();
    SetupInspector::new(&bank, map).capture().unwrap();

    expect_that!(
        bank.commands().unwrap(),
        eq(&vec![
            ControlCommand::Shutdown.code(),
            ControlCommand::RestartNoStatus.code()
        ])
    );
    expect_that!(bank.shutdown_asserted().unwrap(), eq(false));
}

/// Outside the bracket the setup registers are meaningless; they read zero.
#[gtest]
fn setup_registers_read_zero_without_shutdown() {
    let (map, bank) = sim_controller();
    let size2 = map.address_of(DfxRegister::BsSize(2));
    bank.seed(size2, 0xCAFE).unwrap();

    expect_that!(bank.read_register(size2).unwrap(), eq(0));
}
