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

//! Decoding of the controller's 32-bit status word.
//!
//! Decoding is pure and total: every bit pattern produces a structured
//! result, and codes the IP documentation leaves undefined classify to
//! explicit fallback variants instead of failing. Status is advisory — the
//! hardware never produces a software-fatal condition through this path.
//!
//! Status word layout:
//! ```text
//! bits[2:0]  state
//! bits[6:3]  error
//! bit[7]     shutdown flag
//! bits[15:8] active RM id
//! ```

use crate::error::DfxError;
use crate::mmio::RegisterIo;
use crate::registers::{DfxRegister, RegisterMap};
use std::fmt;

/// Virtual socket manager state, bits[2:0] of the status word.
///
/// Transitions are driven entirely by the hardware in response to commands;
/// the driver re-reads status rather than tracking a transition model of its
/// own. `Loaded` is the idle state of a healthy controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Empty,
    HwShutdown,
    SwShutdown,
    ClearingBitstream,
    Loading,
    SwStartup,
    ResetRm,
    Loaded,
    /// Codes above 7. Unreachable from a real status word (the field is three
    /// bits wide) but classification stays total for any caller.
    Unrecognized(u8),
}

impl ControllerState {
    /// Total lookup: every `u8` maps to a variant.
    pub fn classify(code: u8) -> ControllerState {
        match code {
            0 => ControllerState::Empty,
            1 => ControllerState::HwShutdown,
            2 => ControllerState::SwShutdown,
            3 => ControllerState::ClearingBitstream,
            4 => ControllerState::Loading,
            5 => ControllerState::SwStartup,
            6 => ControllerState::ResetRm,
            7 => ControllerState::Loaded,
            other => ControllerState::Unrecognized(other),
        }
    }

    /// The numeric code this variant classifies.
    pub fn code(self) -> u8 {
        match self {
            ControllerState::Empty => 0,
            ControllerState::HwShutdown => 1,
            ControllerState::SwShutdown => 2,
            ControllerState::ClearingBitstream => 3,
            ControllerState::Loading => 4,
            ControllerState::SwStartup => 5,
            ControllerState::ResetRm => 6,
            ControllerState::Loaded => 7,
            ControllerState::Unrecognized(code) => code,
        }
    }
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerState::Empty => write!(f, "Empty"),
            ControllerState::HwShutdown => write!(f, "HW Shutdown"),
            ControllerState::SwShutdown => write!(f, "SW Shutdown"),
            ControllerState::ClearingBitstream => write!(f, "Clearing BS"),
            ControllerState::Loading => write!(f, "Loading"),
            ControllerState::SwStartup => write!(f, "SW Startup"),
            ControllerState::ResetRm => write!(f, "Reset RM"),
            ControllerState::Loaded => write!(f, "Loaded"),
            ControllerState::Unrecognized(code) => write!(f, "Unrecognized ({code})"),
        }
    }
}

/// Hardware-reported error classification, bits[6:3] of the status word.
///
/// Reported, never thrown: a non-`NoError` value is data for the operator,
/// and corrective action is application policy outside this driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerError {
    NoError,
    /// The fetch path was asked to load a zero-byte bitstream.
    BadConfiguration,
    /// The ICAP returned an error code while loading the bitstream.
    BitstreamError,
    /// ICAP access was removed during a bitstream transfer. Only possible on
    /// UltraScale and UltraScale+ devices.
    LostAccess,
    /// The bitstream could not be fetched from the configuration library.
    FetchError,
    BitstreamAndFetchError,
    LostAndFetchError,
    /// A compressed bitstream ended at an invalid place in the decompression
    /// algorithm.
    BadSizeError,
    /// A compressed bitstream was received in the incorrect format.
    BadFormatError,
    /// Code 15: an unknown error occurred.
    UnknownError,
    /// Codes 9 through 14 have no defined meaning.
    Unassigned(u8),
}

impl ControllerError {
    /// Total lookup: every `u8` maps to a variant. Codes above the 4-bit
    /// field width also land in `Unassigned`.
    pub fn classify(code: u8) -> ControllerError {
        match code {
            0 => ControllerError::NoError,
            1 => ControllerError::BadConfiguration,
            2 => ControllerError::BitstreamError,
            3 => ControllerError::LostAccess,
            4 => ControllerError::FetchError,
            5 => ControllerError::BitstreamAndFetchError,
            6 => ControllerError::LostAndFetchError,
            7 => ControllerError::BadSizeError,
            8 => ControllerError::BadFormatError,
            15 => ControllerError::UnknownError,
            other => ControllerError::Unassigned(other),
        }
    }

    /// The numeric code this variant classifies.
    pub fn code(self) -> u8 {
        match self {
            ControllerError::NoError => 0,
            ControllerError::BadConfiguration => 1,
            ControllerError::BitstreamError => 2,
            ControllerError::LostAccess => 3,
            ControllerError::FetchError => 4,
            ControllerError::BitstreamAndFetchError => 5,
            ControllerError::LostAndFetchError => 6,
            ControllerError::BadSizeError => 7,
            ControllerError::BadFormatError => 8,
            ControllerError::UnknownError => 15,
            ControllerError::Unassigned(code) => code,
        }
    }

    /// Whether the controller is reporting a fault condition.
    pub fn is_fault(self) -> bool {
        self != ControllerError::NoError
    }
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::NoError => write!(f, "No Error"),
            ControllerError::BadConfiguration => write!(f, "Bad Configuration"),
            ControllerError::BitstreamError => write!(f, "BS Error"),
            ControllerError::LostAccess => write!(f, "Lost Error"),
            ControllerError::FetchError => write!(f, "Fetch Error"),
            ControllerError::BitstreamAndFetchError => write!(f, "BS & Fetch errors"),
            ControllerError::LostAndFetchError => write!(f, "Lost & Fetch errors"),
            ControllerError::BadSizeError => write!(f, "Bad Size Error"),
            ControllerError::BadFormatError => write!(f, "Bad Format Error"),
            ControllerError::UnknownError => write!(f, "Unknown Error"),
            ControllerError::Unassigned(code) => write!(f, "Unassigned error ({code})"),
        }
    }
}

/// One decoded status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerStatus {
    /// The raw word as read from the STATUS register.
    pub raw: u32,
    pub state: ControllerState,
    pub error: ControllerError,
    pub shutdown: bool,
    pub active_rm_id: u8,
}

impl ControllerStatus {
    /// Decode a raw status word. Pure bit extraction with no failure path.
    pub fn decode(raw: u32) -> ControllerStatus {
        ControllerStatus {
            raw,
            state: ControllerState::classify((raw & 0x7) as u8),
            error: ControllerError::classify(((raw >> 3) & 0xF) as u8),
            shutdown: (raw >> 7) & 0x1 != 0,
            active_rm_id: ((raw >> 8) & 0xFF) as u8,
        }
    }
}

impl fmt::Display for ControllerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "state={} error={} shutdown={} rm_id={}",
            self.state, self.error, u8::from(self.shutdown), self.active_rm_id
        )
    }
}

/// Read and decode the controller's current status.
pub fn read_status(io: &dyn RegisterIo, map: &RegisterMap) -> Result<ControllerStatus, DfxError> {
    let raw = io.read_register(map.address_of(DfxRegister::StatusControl))?;
    Ok(ControllerStatus::decode(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_extracts_fields_for_any_input() {
        for raw in [0u32, 0xFFFF_FFFF, 0xDEAD_BEEF, 0x0000_0107, 0x8000_0001] {
            let status = ControllerStatus::decode(raw);
            assert_eq!(status.raw, raw);
            assert_eq!(u32::from(status.state.code()), raw & 0x7);
            assert_eq!(u32::from(status.error.code()), (raw >> 3) & 0xF);
            assert_eq!(u32::from(status.shutdown), (raw >> 7) & 0x1);
            assert_eq!(u32::from(status.active_rm_id), (raw >> 8) & 0xFF);
        }
    }

    #[test]
    fn test_classify_state_is_total() {
        for code in 0..=u8::MAX {
            let state = ControllerState::classify(code);
            assert_eq!(state.code(), code);
            if code > 7 {
                assert_eq!(state, ControllerState::Unrecognized(code));
            }
            assert!(!state.to_string().is_empty());
        }
    }

    #[test]
    fn test_classify_error_is_total() {
        for code in 0..=u8::MAX {
            let error = ControllerError::classify(code);
            assert_eq!(error.code(), code);
            assert!(!error.to_string().is_empty());
        }
        for code in 9..=14 {
            assert_eq!(
                ControllerError::classify(code),
                ControllerError::Unassigned(code)
            );
        }
        assert_eq!(ControllerError::classify(15), ControllerError::UnknownError);
    }

    #[test]
    fn test_loaded_rm1_no_error() {
        let status = ControllerStatus::decode(0x0000_0107);
        assert_eq!(status.state, ControllerState::Loaded);
        assert_eq!(status.error, ControllerError::NoError);
        assert!(!status.shutdown);
        assert_eq!(status.active_rm_id, 1);
    }

    #[test]
    fn test_loaded_rm1_bad_configuration() {
        let status = ControllerStatus::decode(0x0000_010F);
        assert_eq!(status.state, ControllerState::Loaded);
        assert_eq!(status.error, ControllerError::BadConfiguration);
        assert!(!status.shutdown);
        assert_eq!(status.active_rm_id, 1);
    }

    #[test]
    fn test_state_labels_match_hardware_documentation() {
        assert_eq!(ControllerState::classify(1).to_string(), "HW Shutdown");
        assert_eq!(ControllerState::classify(3).to_string(), "Clearing BS");
        assert_eq!(ControllerState::classify(7).to_string(), "Loaded");
        assert_eq!(ControllerError::classify(5).to_string(), "BS & Fetch errors");
        assert_eq!(ControllerError::classify(15).to_string(), "Unknown Error");
    }

    #[test]
    fn test_only_no_error_is_not_a_fault() {
        assert!(!ControllerError::NoError.is_fault());
        for code in 1..=u8::MAX {
            assert!(ControllerError::classify(code).is_fault());
        }
    }
}
