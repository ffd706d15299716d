use std::fmt;
use std::str::FromStr;

use crate::ProtocolError;

/// Hardware/protocol variant of a gamepad.
///
/// Decided by the transport at enumeration time and fixed for the lifetime of
/// the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerFamily {
    OriginalXbox,
    Xbox360Wired,
    Xbox360Wireless,
    XboxOne,
}

/// Input surface exposed to the host framework for an opened gamepad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub axes: u8,
    pub buttons: u8,
    pub hats: u8,
}

/// All four families expose the same surface.
pub const GAMEPAD_CAPABILITIES: Capabilities = Capabilities {
    axes: 6,
    buttons: 10,
    hats: 1,
};

impl ControllerFamily {
    pub const ALL: [ControllerFamily; 4] = [
        ControllerFamily::OriginalXbox,
        ControllerFamily::Xbox360Wired,
        ControllerFamily::Xbox360Wireless,
        ControllerFamily::XboxOne,
    ];

    /// Device type tag used by the USB host stack.
    pub const fn tag(self) -> u8 {
        match self {
            ControllerFamily::OriginalXbox => 0x01,
            ControllerFamily::Xbox360Wired => 0x02,
            ControllerFamily::Xbox360Wireless => 0x03,
            ControllerFamily::XboxOne => 0x04,
        }
    }

    /// Maps a host stack device tag onto a family.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x01 => Some(ControllerFamily::OriginalXbox),
            0x02 => Some(ControllerFamily::Xbox360Wired),
            0x03 => Some(ControllerFamily::Xbox360Wireless),
            0x04 => Some(ControllerFamily::XboxOne),
            _ => None,
        }
    }

    /// Human-readable product line, without the player suffix.
    pub const fn product_name(self) -> &'static str {
        match self {
            ControllerFamily::OriginalXbox => "Original Xbox Controller",
            ControllerFamily::Xbox360Wired | ControllerFamily::Xbox360Wireless => {
                "Xbox 360 Controller"
            }
            ControllerFamily::XboxOne => "Xbox One Controller",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            ControllerFamily::OriginalXbox => "original-xbox",
            ControllerFamily::Xbox360Wired => "xbox360-wired",
            ControllerFamily::Xbox360Wireless => "xbox360-wireless",
            ControllerFamily::XboxOne => "xbox-one",
        }
    }

    pub const fn capabilities(self) -> Capabilities {
        GAMEPAD_CAPABILITIES
    }
}

impl TryFrom<u8> for ControllerFamily {
    type Error = ProtocolError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        Self::from_tag(tag).ok_or(ProtocolError::UnsupportedFamily(tag))
    }
}

impl FromStr for ControllerFamily {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|family| family.slug() == normalized)
            .ok_or_else(|| ProtocolError::UnknownFamilyName(s.to_string()))
    }
}

impl fmt::Display for ControllerFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}
