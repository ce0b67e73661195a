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
use dfxd::control::ControlSequencer;
use dfxd::error::DfxError;
use dfxd::registers::DfxRegister;
use dfxd::status::{ControllerState, read_status};
use googletest::prelude::*;
use rstest::*;

#[gtest]
#[rstest]
#[case::slot_0(0, true)]
#[case::slot_1(1, true)]
#[case::slot_3(3, true)]
#[case::slot_4_out_of_range(4, false)]
#[case::slot_255_out_of_range(255, false)]
fn trigger_load_cases(#[case] rm: u8, #[case] accepted: bool) {
    let (map, bank) = sim_controller();
    let sequencer = ControlSequencer::new(&bank, map);

    let result = sequencer.trigger_load(rm);
    let trigger_writes = bank
        .writes_to(map.address_of(DfxRegister::SwTrigger))
        .unwrap();

    if accepted {
        result.unwrap();
        expect_that!(trigger_writes, eq(&vec![u32::from(rm)]));
    } else {
        assert!(matches!(result, Err(DfxError::Argument(..))));
        expect_that!(trigger_writes, is_empty());
    }
}

/// A trigger is one-shot with no acknowledgment: a status read issued before
/// the controller acts may still report the previous cycle, and the driver
/// must take that as an answer instead of waiting for a transition.
#[gtest]
fn trigger_does_not_await_a_state_transition() {
    let (map, bank) = sim_controller();
    bank.set_status(0x0000_0107).unwrap(); // Loaded, RM 1, from the previous cycle

    let sequencer = ControlSequencer::new(&bank, map);
    sequencer.trigger_load(3).unwrap();

    let status = read_status(&bank, &map).unwrap();
    expect_that!(status.state, eq(ControllerState::Loaded));
    expect_that!(status.active_rm_id, eq(1));
}
