use std::fmt;

use xpad_bit_derive::Bit;
use xpad_bit_mask::Bitmask;

/// Logical gamepad buttons, independent of the controller family.
#[derive(Bit, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    Start,
    Back,
    LeftThumb,
    RightThumb,
    LeftShoulder,
    RightShoulder,
    A,
    B,
    X,
    Y,
}

/// Set of pressed buttons.
pub type Buttons = Bitmask<Button>;

impl Button {
    /// Buttons reported individually to the host, in host index order.
    /// The d-pad is reported through the hat instead.
    pub const HOST_ORDER: [Button; 10] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::Back,
        Button::Start,
        Button::LeftThumb,
        Button::RightThumb,
    ];

    /// Host button index, or `None` for d-pad directions.
    pub fn host_index(self) -> Option<u8> {
        Self::HOST_ORDER
            .iter()
            .position(|&b| b == self)
            .map(|i| i as u8)
    }

    pub const fn is_dpad(self) -> bool {
        matches!(
            self,
            Button::DpadUp | Button::DpadDown | Button::DpadLeft | Button::DpadRight
        )
    }
}

/// Host axes, in host index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    LeftX,
    LeftY,
    LeftTrigger,
    RightX,
    RightY,
    RightTrigger,
}

impl Axis {
    pub const ALL: [Axis; 6] = [
        Axis::LeftX,
        Axis::LeftY,
        Axis::LeftTrigger,
        Axis::RightX,
        Axis::RightY,
        Axis::RightTrigger,
    ];

    pub const fn index(self) -> u8 {
        self as u8
    }
}

/// 8-way d-pad position as a set of direction bits.
///
/// Opposite directions may both be set if the hardware reports them.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Hat(u8);

impl Hat {
    pub const CENTERED: Hat = Hat(0x00);
    pub const UP: Hat = Hat(0x01);
    pub const RIGHT: Hat = Hat(0x02);
    pub const DOWN: Hat = Hat(0x04);
    pub const LEFT: Hat = Hat(0x08);
    pub const RIGHT_UP: Hat = Hat(0x03);
    pub const RIGHT_DOWN: Hat = Hat(0x06);
    pub const LEFT_UP: Hat = Hat(0x09);
    pub const LEFT_DOWN: Hat = Hat(0x0C);

    pub fn from_buttons(buttons: &Buttons) -> Hat {
        let mut bits = 0;
        if buttons.contains(Button::DpadUp) {
            bits |= Hat::UP.0;
        }
        if buttons.contains(Button::DpadDown) {
            bits |= Hat::DOWN.0;
        }
        if buttons.contains(Button::DpadLeft) {
            bits |= Hat::LEFT.0;
        }
        if buttons.contains(Button::DpadRight) {
            bits |= Hat::RIGHT.0;
        }
        Hat(bits)
    }

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn contains(self, other: Hat) -> bool {
        self.0 & other.0 == other.0
    }
}

impl fmt::Debug for Hat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("Centered");
        }
        let names = [
            (Hat::UP, "Up"),
            (Hat::RIGHT, "Right"),
            (Hat::DOWN, "Down"),
            (Hat::LEFT, "Left"),
        ];
        let mut first = true;
        for (dir, name) in names {
            if self.contains(dir) {
                if !first {
                    f.write_str("|")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Normalized, family-independent input snapshot.
///
/// Stick Y axes are already inverted so that "up" has the same sign on every
/// family. The zeroed value is a valid centered/unpressed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct GamepadState {
    pub buttons: Buttons,
    pub left_trigger: u8,
    pub right_trigger: u8,
    pub left_stick_x: i16,
    pub left_stick_y: i16,
    pub right_stick_x: i16,
    pub right_stick_y: i16,
}

impl GamepadState {
    #[inline]
    pub fn is_pressed(&self, button: Button) -> bool {
        self.buttons.contains(button)
    }

    #[inline]
    pub fn hat(&self) -> Hat {
        Hat::from_buttons(&self.buttons)
    }

    /// Host axis value; triggers go through [`trigger_to_axis`].
    pub fn axis(&self, axis: Axis) -> i16 {
        match axis {
            Axis::LeftX => self.left_stick_x,
            Axis::LeftY => self.left_stick_y,
            Axis::LeftTrigger => trigger_to_axis(self.left_trigger),
            Axis::RightX => self.right_stick_x,
            Axis::RightY => self.right_stick_y,
            Axis::RightTrigger => trigger_to_axis(self.right_trigger),
        }
    }
}

/// Spreads an 8-bit trigger over the full signed 16-bit axis range.
#[inline]
pub const fn trigger_to_axis(raw: u8) -> i16 {
    let wide = ((raw as u16) << 8) | raw as u16;
    (wide as i32 - 32768) as i16
}
