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
use dfxd::poll::PollingLoop;
use dfxd::registers::DfxRegister;
use googletest::prelude::*;
use std::time::Duration;
use tokio::sync::watch;

#[gtest]
#[tokio::test]
async fn bounded_run_triggers_slots_in_descending_order() {
    let (map, bank) = sim_controller();
    bank.set_status(0x0000_0107).unwrap();
    let mut looper = PollingLoop::new(&bank, map, Duration::ZERO);
    let (_tx, mut cancel) = watch::channel(false);

    looper.run(&mut cancel, Some(8)).await.unwrap();

    let triggers = bank
        .writes_to(map.address_of(DfxRegister::SwTrigger))
        .unwrap();
    expect_that!(triggers, eq(&vec![3, 2, 1, 0, 3, 2, 1, 0]));
}

/// A fault code in status is reported, not acted on: the loop keeps cycling
/// and issues no control command of its own.
#[gtest]
#[tokio::test]
async fn hardware_fault_codes_do_not_stop_the_loop() {
    let (map, bank) = sim_controller();
    bank.set_status(0x0000_010F).unwrap(); // Loaded, Bad Configuration
    let mut looper = PollingLoop::new(&bank, map, Duration::ZERO);
    let (_tx, mut cancel) = watch::channel(false);

    looper.run(&mut cancel, Some(2)).await.unwrap();

    expect_that!(bank.commands().unwrap(), is_empty());
    let triggers = bank
        .writes_to(map.address_of(DfxRegister::SwTrigger))
        .unwrap();
    expect_that!(triggers, eq(&vec![3, 2]));
}

#[gtest]
#[tokio::test]
async fn cancellation_stops_the_loop_at_a_delay_boundary() {
    let (map, bank) = sim_controller();
    let mut looper = PollingLoop::new(&bank, map, Duration::ZERO);
    let (tx, mut cancel) = watch::channel(false);

    assert_that!(looper.step(&mut cancel).await.unwrap(), eq(true));
    tx.send(true).unwrap();
    assert_that!(looper.step(&mut cancel).await.unwrap(), eq(false));

    // Only the completed cycle's trigger made it out.
    let triggers = bank
        .writes_to(map.address_of(DfxRegister::SwTrigger))
        .unwrap();
    expect_that!(triggers, eq(&vec![3]));
}
