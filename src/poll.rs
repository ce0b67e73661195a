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

//! Demonstration control policy: trigger a swap, report status, repeat.
//!
//! This is policy around the protocol, not the protocol itself. The RM
//! selector descends from 3 modulo the slot count — a deliberate marker that
//! the requests are software-initiated, since fabric-side trigger patterns
//! count upward. Hardware-reported faults are logged and not acted on; an
//! operational system would branch on
//! [`ControllerError`](crate::status::ControllerError) here.

use crate::config::SLOT_COUNT;
use crate::control::ControlSequencer;
use crate::error::DfxError;
use crate::mmio::RegisterIo;
use crate::registers::{DfxRegister, RegisterMap};
use crate::status::{ControllerStatus, read_status};
use log::{info, warn};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// The loop over one controller: trigger → delay → status → delay → status.
///
/// The loop itself is stateless about the hardware — it re-reads status each
/// time instead of tracking transitions, and never blocks waiting for a state
/// change it did not explicitly await. Cancellation is observed at every
/// delay boundary.
pub struct PollingLoop<'io> {
    io: &'io dyn RegisterIo,
    map: RegisterMap,
    sequencer: ControlSequencer<'io>,
    period: Duration,
    next_rm: u8,
}

impl<'io> PollingLoop<'io> {
    pub fn new(io: &'io dyn RegisterIo, map: RegisterMap, period: Duration) -> PollingLoop<'io> {
        PollingLoop {
            io,
            map,
            sequencer: ControlSequencer::new(io, map),
            period,
            // Counting backwards means the requests can't be mistaken for
            // ones raised from digital logic.
            next_rm: SLOT_COUNT as u8 - 1,
        }
    }

    /// Take the current RM selector and step it down modulo the slot count.
    fn advance(&mut self) -> u8 {
        let rm = self.next_rm;
        self.next_rm = if rm == 0 { SLOT_COUNT as u8 - 1 } else { rm - 1 };
        rm
    }

    /// Read, decode and report the current status plus the trigger read-back.
    ///
    /// A fault code is reported at `warn` severity and nothing more:
    /// corrective action is application policy, deliberately outside this
    /// demonstration loop.
    pub fn report_status(&self) -> Result<ControllerStatus, DfxError> {
        let status = read_status(self.io, &self.map)?;
        let sw_trigger = self
            .io
            .read_register(self.map.address_of(DfxRegister::SwTrigger))?;
        info!("Status = 0x{:08X}", status.raw);
        info!(" State    : {} {}", status.state.code(), status.state);
        info!(" Error    : {} {}", status.error.code(), status.error);
        info!(" Shutdown : {}", u8::from(status.shutdown));
        info!(" RM_ID    : {}", status.active_rm_id);
        info!("SW Trigger = 0x{sw_trigger:08X}");
        if status.error.is_fault() {
            warn!("controller reports fault: {}", status.error);
        }
        Ok(status)
    }

    /// Sleep for one period, or return `true` immediately if cancelled.
    ///
    /// A dropped cancellation sender counts as cancellation: with nobody left
    /// to stop the loop, running on would be unstoppable.
    async fn pause(&self, cancel: &mut watch::Receiver<bool>) -> bool {
        if *cancel.borrow() {
            return true;
        }
        tokio::select! {
            () = sleep(self.period) => false,
            _ = cancel.changed() => true,
        }
    }

    /// One full cycle: status, trigger the next RM, delay, status again.
    ///
    /// # Returns: `Result<bool, DfxError>`
    /// * `Ok(true)` - Cycle completed
    /// * `Ok(false)` - Cancellation observed; the cycle stopped at a delay
    ///   boundary without touching the registers further
    /// * `Err(DfxError)` - A register access failed
    pub async fn step(&mut self, cancel: &mut watch::Receiver<bool>) -> Result<bool, DfxError> {
        if self.pause(cancel).await {
            return Ok(false);
        }
        self.report_status()?;
        let rm = self.advance();
        self.sequencer.trigger_load(rm)?;
        if self.pause(cancel).await {
            return Ok(false);
        }
        self.report_status()?;
        Ok(true)
    }

    /// Run cycles until cancelled, or until `cycle_bound` cycles completed.
    ///
    /// The unbounded form matches the boot-resident original; the bound
    /// exists for supervised bring-up runs.
    pub async fn run(
        &mut self,
        cancel: &mut watch::Receiver<bool>,
        cycle_bound: Option<u64>,
    ) -> Result<(), DfxError> {
        let mut completed: u64 = 0;
        loop {
            if !self.step(cancel).await? {
                info!("polling loop cancelled after {completed} cycles");
                return Ok(());
            }
            completed += 1;
            if cycle_bound.is_some_and(|bound| completed >= bound) {
                info!("polling loop finished {completed} bounded cycles");
                return Ok(());
            }
        }
    }
}
