use std::fmt;

/// Bus type tag placed in byte 0 of every GUID.
pub const BUS_TYPE_USB: u8 = 0x03;

/// 16-byte joystick identifier in the layout game controller databases key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JoystickGuid(pub [u8; 16]);

impl JoystickGuid {
    /// Bus type at byte 0, vendor id at bytes 4..=5 and product id at bytes
    /// 8..=9, both little-endian; everything else zero.
    pub fn from_ids(vendor_id: u16, product_id: u16) -> Self {
        let mut data = [0u8; 16];
        data[0] = BUS_TYPE_USB;
        data[4..6].copy_from_slice(&vendor_id.to_le_bytes());
        data[8..10].copy_from_slice(&product_id.to_le_bytes());
        Self(data)
    }

    pub fn vendor_id(&self) -> u16 {
        u16::from_le_bytes([self.0[4], self.0[5]])
    }

    pub fn product_id(&self) -> u16 {
        u16::from_le_bytes([self.0[8], self.0[9]])
    }
}

impl fmt::Display for JoystickGuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}
