use std::fmt;

use crate::{ControllerFamily, ProtocolError, Result};

/// Largest interrupt report any supported family sends.
pub const MAX_REPORT_LEN: usize = 32;

/// Minimum length byte for OG Xbox and wired 360 input reports.
const MIN_WIRED_REPORT_LEN: u8 = 0x14;
/// Wireless 360 input reports carry this marker at byte 5.
const WIRELESS_INPUT_MARKER: u8 = 0x13;
/// Xbox One report type for button data.
const XBOX_ONE_INPUT_REPORT: u8 = 0x20;

/// One received interrupt report.
///
/// Bytes past `len` are always zero, so decoders can read any fixed offset
/// below [`MAX_REPORT_LEN`] without bounds checks failing.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawReport {
    bytes: [u8; MAX_REPORT_LEN],
    len: u8,
}

impl RawReport {
    /// Copies `data` into a report, rejecting anything longer than the buffer.
    pub fn new(data: &[u8]) -> Result<Self> {
        if data.len() > MAX_REPORT_LEN {
            return Err(ProtocolError::ReportTooLong { len: data.len() });
        }
        Ok(Self::truncated(data))
    }

    /// Copies at most [`MAX_REPORT_LEN`] bytes of `data`.
    pub fn truncated(data: &[u8]) -> Self {
        let len = data.len().min(MAX_REPORT_LEN);
        let mut bytes = [0u8; MAX_REPORT_LEN];
        bytes[..len].copy_from_slice(&data[..len]);
        Self {
            bytes,
            len: len as u8,
        }
    }

    /// Received bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Whole zero-padded buffer.
    #[inline]
    pub fn padded(&self) -> &[u8; MAX_REPORT_LEN] {
        &self.bytes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Default for RawReport {
    fn default() -> Self {
        Self {
            bytes: [0; MAX_REPORT_LEN],
            len: 0,
        }
    }
}

impl fmt::Debug for RawReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawReport[")?;
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02x}")?;
        }
        write!(f, "]")
    }
}

/// Decides whether `data` is an input report for `family`.
///
/// Keep-alives, status frames and partial transfers share the interrupt
/// endpoint with input reports; they fail here and must be dropped without
/// touching the last accepted report.
pub fn validate(family: ControllerFamily, data: &[u8]) -> bool {
    match family {
        ControllerFamily::OriginalXbox | ControllerFamily::Xbox360Wired => data
            .get(1)
            .is_some_and(|&len| len >= MIN_WIRED_REPORT_LEN),
        ControllerFamily::Xbox360Wireless => {
            let has_data = data.get(1).is_some_and(|&b| b & 0x01 != 0);
            has_data && data.get(5) == Some(&WIRELESS_INPUT_MARKER)
        }
        ControllerFamily::XboxOne => data.first() == Some(&XBOX_ONE_INPUT_REPORT),
    }
}
