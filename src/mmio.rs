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

//! Memory-mapped register access.
//!
//! The protocol layers never touch raw pointers; they go through the
//! [`RegisterIo`] seam, which has two implementations:
//!
//! - [`DevMem`] maps the controller window and the devcfg register page from
//!   `/dev/mem` and performs volatile 32-bit accesses against real hardware.
//! - [`SimRegisterBank`] is an in-memory stand-in that also models the two
//!   protocol quirks the tests depend on: the status/control register alias
//!   and the shutdown gating of the bitstream setup registers.

use crate::config::{DEVCFG_CTRL_ADDRESS, PCAP_PR_MASK, REGISTER_WINDOW_LEN};
use crate::error::DfxError;
use crate::registers::{DfxRegister, RegisterMap};
use log::trace;
use rustix::mm::{MapFlags, ProtFlags, mmap, munmap};
use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::ptr;
use std::sync::{Mutex, MutexGuard};

/// Blocking, synchronous 32-bit register access at absolute physical
/// addresses — the hosted equivalent of bare-metal `Xil_In32`/`Xil_Out32`.
///
/// Accesses fail only for software reasons (address outside the mapped
/// windows, misalignment); the hardware itself has no failing read.
pub trait RegisterIo {
    fn read_register(&self, addr: u64) -> Result<u32, DfxError>;
    fn write_register(&self, addr: u64, value: u32) -> Result<(), DfxError>;
}

static DEV_MEM_PATH: &str = "/dev/mem";
const PAGE_SIZE: u64 = 0x1000;

/// One page-aligned mapping covering a requested physical range.
#[derive(Debug)]
struct Mapping {
    ptr: *mut u8,
    /// Page-aligned physical address the mapping starts at.
    page_base: u64,
    /// Length actually mapped (page rounded).
    map_len: usize,
    /// Requested physical range, used for bounds checks.
    first: u64,
    len: usize,
}

impl Mapping {
    /// Map `len` bytes of physical memory starting at `first`.
    ///
    /// `/dev/mem` mappings must be page aligned, so the mapping is widened to
    /// page boundaries and accesses are offset within it.
    fn new(file: &File, first: u64, len: usize) -> Result<Mapping, DfxError> {
        let page_base = first & !(PAGE_SIZE - 1);
        let map_len = ((first + len as u64 - page_base + PAGE_SIZE - 1) & !(PAGE_SIZE - 1)) as usize;
        trace!("Mapping 0x{map_len:X} bytes at physical 0x{page_base:08X}");

        // SAFETY: fd is a valid open /dev/mem handle and the kernel validates
        // the physical range; a failed mapping is reported as Errno.
        let addr = unsafe {
            mmap(
                ptr::null_mut(),
                map_len,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file,
                page_base,
            )
        }
        .map_err(|e| DfxError::Map {
            addr: first,
            e: e.into(),
        })?;

        Ok(Mapping {
            ptr: addr.cast::<u8>(),
            page_base,
            map_len,
            first,
            len,
        })
    }

    fn contains(&self, addr: u64) -> bool {
        addr >= self.first && addr + 4 <= self.first + self.len as u64
    }

    /// Pointer to the 32-bit register at physical `addr`.
    ///
    /// Caller must have checked `contains(addr)` and 4-byte alignment first.
    fn register_ptr(&self, addr: u64) -> *mut u32 {
        // SAFETY: contains() guarantees the offset stays inside map_len.
        unsafe { self.ptr.add((addr - self.page_base) as usize).cast::<u32>() }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        // SAFETY: ptr/map_len are exactly what mmap returned.
        if let Err(e) = unsafe { munmap(self.ptr.cast::<c_void>(), self.map_len) } {
            trace!("munmap of 0x{:08X} failed: {e}", self.page_base);
        }
    }
}

/// Physical register access through `/dev/mem`.
///
/// Maps two windows at construction: the controller's AXI-Lite register
/// window and the page holding the platform devcfg control register. All
/// accesses are volatile so the compiler cannot elide or reorder them.
#[derive(Debug)]
pub struct DevMem {
    window: Mapping,
    devcfg: Mapping,
    _file: File,
}

impl DevMem {
    /// Open `/dev/mem` and map the register windows for `map`'s controller.
    ///
    /// # Returns: `Result<DevMem, DfxError>`
    /// * `Ok(DevMem)` - Both windows mapped and ready
    /// * `Err(DfxError::DeviceOpen)` - `/dev/mem` could not be opened
    ///   (typically missing privileges)
    /// * `Err(DfxError::Map)` - A window could not be mapped
    pub fn open(map: &RegisterMap) -> Result<DevMem, DfxError> {
        let path = Path::new(DEV_MEM_PATH);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| DfxError::DeviceOpen {
                path: path.into(),
                e,
            })?;
        let window = Mapping::new(&file, map.base(), REGISTER_WINDOW_LEN)?;
        let devcfg = Mapping::new(&file, DEVCFG_CTRL_ADDRESS, 4)?;
        Ok(DevMem {
            window,
            devcfg,
            _file: file,
        })
    }

    fn mapping_for(&self, addr: u64) -> Result<&Mapping, DfxError> {
        if addr % 4 != 0 {
            return Err(DfxError::Access { addr });
        }
        if self.window.contains(addr) {
            Ok(&self.window)
        } else if self.devcfg.contains(addr) {
            Ok(&self.devcfg)
        } else {
            Err(DfxError::Access { addr })
        }
    }
}

impl RegisterIo for DevMem {
    fn read_register(&self, addr: u64) -> Result<u32, DfxError> {
        let mapping = self.mapping_for(addr)?;
        // SAFETY: register_ptr is in-bounds and 4-byte aligned; volatile
        // because the value is hardware state.
        let value = unsafe { mapping.register_ptr(addr).read_volatile() };
        trace!("rd 0x{addr:08X} -> 0x{value:08X}");
        Ok(value)
    }

    fn write_register(&self, addr: u64, value: u32) -> Result<(), DfxError> {
        let mapping = self.mapping_for(addr)?;
        trace!("wr 0x{addr:08X} <- 0x{value:08X}");
        // SAFETY: as above; volatile so the store reaches the bus.
        unsafe { mapping.register_ptr(addr).write_volatile(value) };
        Ok(())
    }
}

#[derive(Debug, Default)]
struct SimState {
    /// Value returned by STATUS reads; independent of CONTROL writes.
    status: u32,
    /// Whether the last control command quiesced the controller.
    shutdown_asserted: bool,
    /// Backing store for plain read/write registers.
    values: HashMap<u64, u32>,
    /// Journal of every write, in issue order.
    writes: Vec<(u64, u32)>,
}

/// Simulated register backing store for tests.
///
/// Beyond plain storage it reproduces the controller behaviors the driver is
/// written against:
///
/// - offset 0x00 aliases STATUS (read) and CONTROL (write): reads return the
///   value set through [`set_status`](Self::set_status), writes land in the
///   journal and drive the simulated shutdown flag;
/// - the per-slot BS_ID/BS_ADDRESS/BS_SIZE registers read back zero unless a
///   `Shutdown` command was the most recent control write, matching the real
///   IP's quiesce requirement;
/// - everything else is last-value-written storage, with unmapped addresses
///   reading zero like an undecoded AXI region.
///
/// The devcfg control register is seeded with `PCAP_PR` set (plus a few
/// unrelated bits) so ICAP handover can be observed as a read-modify-write.
#[derive(Debug)]
pub struct SimRegisterBank {
    status_addr: u64,
    gated: HashSet<u64>,
    inner: Mutex<SimState>,
}

/// Arbitrary non-PCAP_PR devcfg bits, seeded so tests can verify they survive
/// the ICAP handover read-modify-write.
const SIM_DEVCFG_RESIDUE: u32 = 0x0000_4E00;

impl SimRegisterBank {
    pub fn new(map: &RegisterMap) -> SimRegisterBank {
        let mut gated = HashSet::new();
        for reg in DfxRegister::all() {
            if matches!(
                reg,
                DfxRegister::BsId(_) | DfxRegister::BsAddress(_) | DfxRegister::BsSize(_)
            ) {
                gated.insert(map.address_of(reg));
            }
        }
        let mut values = HashMap::new();
        values.insert(DEVCFG_CTRL_ADDRESS, PCAP_PR_MASK | SIM_DEVCFG_RESIDUE);
        SimRegisterBank {
            status_addr: map.address_of(DfxRegister::StatusControl),
            gated,
            inner: Mutex::new(SimState {
                values,
                ..SimState::default()
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, SimState>, DfxError> {
        self.inner
            .lock()
            .map_err(|e| DfxError::Internal(format!("Failed to lock simulated registers: {e}")))
    }

    /// Set the word returned by subsequent STATUS reads.
    pub fn set_status(&self, raw: u32) -> Result<(), DfxError> {
        self.state()?.status = raw;
        Ok(())
    }

    /// Store a register value directly, without touching the write journal.
    pub fn seed(&self, addr: u64, value: u32) -> Result<(), DfxError> {
        self.state()?.values.insert(addr, value);
        Ok(())
    }

    /// Every write issued so far, in order.
    pub fn writes(&self) -> Result<Vec<(u64, u32)>, DfxError> {
        Ok(self.state()?.writes.clone())
    }

    /// Control commands issued so far (writes to the status/control alias).
    pub fn commands(&self) -> Result<Vec<u32>, DfxError> {
        let state = self.state()?;
        Ok(state
            .writes
            .iter()
            .filter(|(addr, _)| *addr == self.status_addr)
            .map(|(_, value)| *value)
            .collect())
    }

    /// Writes issued to `addr` so far, in order.
    pub fn writes_to(&self, addr: u64) -> Result<Vec<u32>, DfxError> {
        let state = self.state()?;
        Ok(state
            .writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, value)| *value)
            .collect())
    }

    pub fn shutdown_asserted(&self) -> Result<bool, DfxError> {
        Ok(self.state()?.shutdown_asserted)
    }
}

impl RegisterIo for SimRegisterBank {
    fn read_register(&self, addr: u64) -> Result<u32, DfxError> {
        let state = self.state()?;
        if addr == self.status_addr {
            return Ok(state.status);
        }
        if self.gated.contains(&addr) && !state.shutdown_asserted {
            return Ok(0);
        }
        Ok(state.values.get(&addr).copied().unwrap_or(0))
    }

    fn write_register(&self, addr: u64, value: u32) -> Result<(), DfxError> {
        let mut state = self.state()?;
        state.writes.push((addr, value));
        if addr == self.status_addr {
            // Command encoding: 0 shutdown, 1/2 restart variants. Other
            // commands do not move the quiesce flag.
            match value {
                0 => state.shutdown_asserted = true,
                1 | 2 => state.shutdown_asserted = false,
                _ => {}
            }
        } else {
            state.values.insert(addr, value);
        }
        Ok(())
    }
}
