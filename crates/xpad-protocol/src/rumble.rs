use std::fmt;

use crate::ControllerFamily;

/// Longest outbound rumble packet (Xbox One).
pub const MAX_RUMBLE_PACKET_LEN: usize = 13;

const XBOX_360_WIRELESS_TEMPLATE: [u8; 8] = [0x00, 0x01, 0x0F, 0xC0, 0x00, 0x00, 0x00, 0x00];
const XBOX_360_WIRED_TEMPLATE: [u8; 8] = [0x00, 0x08, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
const ORIGINAL_XBOX_TEMPLATE: [u8; 6] = [0x00, 0x06, 0x00, 0x00, 0x00, 0x00];
const XBOX_ONE_TEMPLATE: [u8; 13] = [
    0x09, 0x00, 0x00, 0x09, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x00, 0xEB,
];

/// Xbox One motors take a 0..=100 percentage.
const XBOX_ONE_MAGNITUDE_DIVISOR: u16 = 655;

/// An encoded force-feedback command ready for an interrupt OUT transfer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RumblePacket {
    bytes: [u8; MAX_RUMBLE_PACKET_LEN],
    len: u8,
}

impl RumblePacket {
    fn from_template(template: &[u8]) -> Self {
        let mut bytes = [0u8; MAX_RUMBLE_PACKET_LEN];
        bytes[..template.len()].copy_from_slice(template);
        Self {
            bytes,
            len: template.len() as u8,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
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

impl AsRef<[u8]> for RumblePacket {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for RumblePacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RumblePacket[")?;
        for (i, b) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{b:02x}")?;
        }
        write!(f, "]")
    }
}

/// Builds the rumble command for `family` from 16-bit motor magnitudes.
///
/// `low` drives the low-frequency (left, heavy) motor, `high` the
/// high-frequency (right, light) one.
pub fn encode_rumble(family: ControllerFamily, low: u16, high: u16) -> RumblePacket {
    let [low_lo, low_hi] = low.to_le_bytes();
    let [high_lo, high_hi] = high.to_le_bytes();
    match family {
        ControllerFamily::Xbox360Wireless => {
            let mut packet = RumblePacket::from_template(&XBOX_360_WIRELESS_TEMPLATE);
            packet.bytes[5] = low_hi;
            packet.bytes[6] = high_hi;
            packet
        }
        ControllerFamily::Xbox360Wired => {
            let mut packet = RumblePacket::from_template(&XBOX_360_WIRED_TEMPLATE);
            packet.bytes[3] = low_hi;
            packet.bytes[4] = high_hi;
            packet
        }
        ControllerFamily::OriginalXbox => {
            let mut packet = RumblePacket::from_template(&ORIGINAL_XBOX_TEMPLATE);
            packet.bytes[2] = low_lo;
            packet.bytes[3] = low_hi;
            packet.bytes[4] = high_lo;
            packet.bytes[5] = high_hi;
            packet
        }
        ControllerFamily::XboxOne => {
            let mut packet = RumblePacket::from_template(&XBOX_ONE_TEMPLATE);
            packet.bytes[8] = (low / XBOX_ONE_MAGNITUDE_DIVISOR) as u8;
            packet.bytes[9] = (high / XBOX_ONE_MAGNITUDE_DIVISOR) as u8;
            packet
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xbox_360_wireless_uses_high_bytes() {
        let packet = encode_rumble(ControllerFamily::Xbox360Wireless, 0xABCD, 0x1234);
        assert_eq!(
            packet.as_bytes(),
            &[0x00, 0x01, 0x0F, 0xC0, 0x00, 0xAB, 0x12, 0x00]
        );
    }

    #[test]
    fn xbox_360_wired_uses_high_bytes() {
        let packet = encode_rumble(ControllerFamily::Xbox360Wired, 0xABCD, 0x1234);
        assert_eq!(
            packet.as_bytes(),
            &[0x00, 0x08, 0x00, 0xAB, 0x12, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn original_xbox_keeps_full_resolution() {
        let packet = encode_rumble(ControllerFamily::OriginalXbox, 0xABCD, 0x1234);
        assert_eq!(packet.as_bytes(), &[0x00, 0x06, 0xCD, 0xAB, 0x34, 0x12]);
    }

    #[test]
    fn xbox_one_scales_to_percent() {
        let packet = encode_rumble(ControllerFamily::XboxOne, u16::MAX, 655 * 50);
        assert_eq!(
            packet.as_bytes(),
            &[0x09, 0x00, 0x00, 0x09, 0x00, 0x0F, 0x00, 0x00, 100, 50, 0xFF, 0x00, 0xEB]
        );
        let packet = encode_rumble(ControllerFamily::XboxOne, 654, 0);
        assert_eq!(&packet.as_bytes()[8..10], &[0, 0]);
    }

    #[test]
    fn stop_packets_carry_zero_magnitudes() {
        for family in ControllerFamily::ALL {
            let packet = encode_rumble(family, 0, 0);
            assert!(!packet.is_empty());
            assert!(packet.len() <= MAX_RUMBLE_PACKET_LEN);
        }
        assert_eq!(
            encode_rumble(ControllerFamily::OriginalXbox, 0, 0).as_bytes(),
            &ORIGINAL_XBOX_TEMPLATE
        );
    }

    #[test]
    fn encoding_is_deterministic() {
        for family in ControllerFamily::ALL {
            assert_eq!(
                encode_rumble(family, 0x8000, 0x4000),
                encode_rumble(family, 0x8000, 0x4000)
            );
        }
    }
}
