use crate::report::MAX_REPORT_LEN;
use crate::state::{Button, Buttons, GamepadState};
use crate::{ControllerFamily, RawReport};

/// Analog face buttons on the original Xbox pad count as pressed above this.
const ANALOG_BUTTON_DEADZONE: u8 = 0x20;

/// Byte layout of one family's input report.
struct Layout {
    /// Offset of the little-endian digital button word.
    buttons_at: usize,
    /// Bit in the button word for each logical button.
    button_bits: &'static [(u8, Button)],
    /// Pressure-sensitive buttons: byte offset and the button they drive.
    analog_buttons: &'static [(usize, Button)],
    left_trigger_at: usize,
    right_trigger_at: usize,
    /// Offsets of LX, LY, RX, RY (i16 little-endian).
    sticks_at: [usize; 4],
}

/// Shared by both 360 variants; bits 10 and 11 are guide/unused.
const XBOX_360_BUTTON_BITS: &[(u8, Button)] = &[
    (0, Button::DpadUp),
    (1, Button::DpadDown),
    (2, Button::DpadLeft),
    (3, Button::DpadRight),
    (4, Button::Start),
    (5, Button::Back),
    (6, Button::LeftThumb),
    (7, Button::RightThumb),
    (8, Button::LeftShoulder),
    (9, Button::RightShoulder),
    (12, Button::A),
    (13, Button::B),
    (14, Button::X),
    (15, Button::Y),
];

const ORIGINAL_XBOX: Layout = Layout {
    buttons_at: 2,
    button_bits: &[
        (0, Button::DpadUp),
        (1, Button::DpadDown),
        (2, Button::DpadLeft),
        (3, Button::DpadRight),
        (4, Button::Start),
        (5, Button::Back),
        (6, Button::LeftThumb),
        (7, Button::RightThumb),
    ],
    // Black acts as right shoulder, White as left shoulder.
    analog_buttons: &[
        (4, Button::A),
        (5, Button::B),
        (6, Button::X),
        (7, Button::Y),
        (8, Button::RightShoulder),
        (9, Button::LeftShoulder),
    ],
    left_trigger_at: 10,
    right_trigger_at: 11,
    sticks_at: [12, 14, 16, 18],
};

const XBOX_360_WIRED: Layout = Layout {
    buttons_at: 2,
    button_bits: XBOX_360_BUTTON_BITS,
    analog_buttons: &[],
    left_trigger_at: 4,
    right_trigger_at: 5,
    sticks_at: [6, 8, 10, 12],
};

const XBOX_360_WIRELESS: Layout = Layout {
    buttons_at: 6,
    button_bits: XBOX_360_BUTTON_BITS,
    analog_buttons: &[],
    left_trigger_at: 8,
    right_trigger_at: 9,
    sticks_at: [10, 12, 14, 16],
};

// Triggers are 10-bit words at 6 and 8; only the low byte of each is read.
const XBOX_ONE: Layout = Layout {
    buttons_at: 4,
    button_bits: &[
        (2, Button::Start),
        (3, Button::Back),
        (4, Button::A),
        (5, Button::B),
        (6, Button::X),
        (7, Button::Y),
        (8, Button::DpadUp),
        (9, Button::DpadDown),
        (10, Button::DpadLeft),
        (11, Button::DpadRight),
        (12, Button::LeftShoulder),
        (13, Button::RightShoulder),
        (14, Button::LeftThumb),
        (15, Button::RightThumb),
    ],
    analog_buttons: &[],
    left_trigger_at: 6,
    right_trigger_at: 8,
    sticks_at: [10, 12, 14, 16],
};

const fn layout(family: ControllerFamily) -> &'static Layout {
    match family {
        ControllerFamily::OriginalXbox => &ORIGINAL_XBOX,
        ControllerFamily::Xbox360Wired => &XBOX_360_WIRED,
        ControllerFamily::Xbox360Wireless => &XBOX_360_WIRELESS,
        ControllerFamily::XboxOne => &XBOX_ONE,
    }
}

#[inline]
fn read_u16(buf: &[u8; MAX_REPORT_LEN], at: usize) -> u16 {
    u16::from_le_bytes([buf[at], buf[at + 1]])
}

#[inline]
fn read_i16(buf: &[u8; MAX_REPORT_LEN], at: usize) -> i16 {
    i16::from_le_bytes([buf[at], buf[at + 1]])
}

/// Decodes a validated report into the canonical state.
///
/// Pure and total: any byte content yields some state, and all offsets lie
/// inside the fixed report buffer.
pub fn decode(family: ControllerFamily, report: &RawReport) -> GamepadState {
    let layout = layout(family);
    let buf = report.padded();

    let word = read_u16(buf, layout.buttons_at);
    let mut buttons = Buttons::empty();
    for &(bit, button) in layout.button_bits {
        buttons.set(button, word & (1 << bit) != 0);
    }
    for &(at, button) in layout.analog_buttons {
        if buf[at] > ANALOG_BUTTON_DEADZONE {
            buttons.insert(button);
        }
    }

    let [lx, ly, rx, ry] = layout.sticks_at;
    GamepadState {
        buttons,
        left_trigger: buf[layout.left_trigger_at],
        right_trigger: buf[layout.right_trigger_at],
        left_stick_x: read_i16(buf, lx),
        left_stick_y: !read_i16(buf, ly),
        right_stick_x: read_i16(buf, rx),
        right_stick_y: !read_i16(buf, ry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{trigger_to_axis, Axis, Hat};

    const ALL_BUTTONS: [Button; 14] = [
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::Start,
        Button::Back,
        Button::LeftThumb,
        Button::RightThumb,
        Button::LeftShoulder,
        Button::RightShoulder,
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
    ];

    fn report(bytes: &[u8]) -> RawReport {
        RawReport::new(bytes).unwrap()
    }

    fn all_pressed() -> Buttons {
        Buttons::new(&ALL_BUTTONS)
    }

    #[test]
    fn layouts_stay_inside_report_buffer() {
        for family in ControllerFamily::ALL {
            let l = layout(family);
            assert!(l.buttons_at + 1 < MAX_REPORT_LEN);
            assert!(l.left_trigger_at < MAX_REPORT_LEN);
            assert!(l.right_trigger_at < MAX_REPORT_LEN);
            assert!(l.sticks_at.iter().all(|&at| at + 1 < MAX_REPORT_LEN));
            assert!(l.analog_buttons.iter().all(|&(at, _)| at < MAX_REPORT_LEN));
        }
    }

    #[test]
    fn every_family_maps_all_fourteen_buttons() {
        for family in ControllerFamily::ALL {
            let l = layout(family);
            let mapped: Buttons = l
                .button_bits
                .iter()
                .map(|&(_, b)| b)
                .chain(l.analog_buttons.iter().map(|&(_, b)| b))
                .collect();
            assert_eq!(mapped, all_pressed(), "{family}");
        }
    }

    #[test]
    fn original_xbox_released() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x14;
        assert_eq!(
            decode(ControllerFamily::OriginalXbox, &report(&bytes)),
            GamepadState {
                left_stick_y: -1,
                right_stick_y: -1,
                ..GamepadState::default()
            }
        );
    }

    #[test]
    fn original_xbox_all_pressed_and_extremes() {
        let bytes = [
            0x00, 0x14, // header
            0xFF, 0x00, // digital buttons
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, // A B X Y Black White
            0xFF, 0x00, // LT RT
            0xFF, 0x7F, // LX = max
            0x00, 0x80, // LY = min
            0x00, 0x80, // RX = min
            0xFF, 0x7F, // RY = max
        ];
        let state = decode(ControllerFamily::OriginalXbox, &report(&bytes));
        assert_eq!(state.buttons, all_pressed());
        assert_eq!(state.left_trigger, 0xFF);
        assert_eq!(state.right_trigger, 0x00);
        assert_eq!(state.left_stick_x, i16::MAX);
        assert_eq!(state.left_stick_y, i16::MAX);
        assert_eq!(state.right_stick_x, i16::MIN);
        assert_eq!(state.right_stick_y, i16::MIN);
    }

    #[test]
    fn original_xbox_analog_buttons_use_deadzone() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x14;
        bytes[4] = 0x20; // A exactly at deadzone: released
        bytes[5] = 0x21; // B just above: pressed
        bytes[8] = 0x80; // Black
        bytes[9] = 0x10; // White below deadzone
        let state = decode(ControllerFamily::OriginalXbox, &report(&bytes));
        assert!(!state.is_pressed(Button::A));
        assert!(state.is_pressed(Button::B));
        assert!(state.is_pressed(Button::RightShoulder));
        assert!(!state.is_pressed(Button::LeftShoulder));
    }

    #[test]
    fn original_xbox_ignores_high_button_byte() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x14;
        bytes[3] = 0xFF;
        let state = decode(ControllerFamily::OriginalXbox, &report(&bytes));
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn xbox_360_wired_all_pressed_and_extremes() {
        let bytes = [
            0x00, 0x14, // header
            0xFF, 0xFF, // buttons (bits 10/11 are ignored)
            0x00, 0xFF, // LT RT
            0x00, 0x80, // LX = min
            0xFF, 0x7F, // LY = max
            0xFF, 0x7F, // RX = max
            0x00, 0x80, // RY = min
            0, 0, 0, 0, 0, 0,
        ];
        let state = decode(ControllerFamily::Xbox360Wired, &report(&bytes));
        assert_eq!(state.buttons, all_pressed());
        assert_eq!(state.axis(Axis::LeftTrigger), -32768);
        assert_eq!(state.axis(Axis::RightTrigger), 32767);
        assert_eq!(state.left_stick_x, i16::MIN);
        assert_eq!(state.left_stick_y, i16::MIN);
        assert_eq!(state.right_stick_x, i16::MAX);
        assert_eq!(state.right_stick_y, i16::MAX);
    }

    #[test]
    fn xbox_360_wired_single_buttons() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x14;
        bytes[3] = 0x10; // bit 12
        let state = decode(ControllerFamily::Xbox360Wired, &report(&bytes));
        assert_eq!(state.buttons, Buttons::new(&[Button::A]));

        bytes[3] = 0x00;
        bytes[2] = 0x09; // up + right
        let state = decode(ControllerFamily::Xbox360Wired, &report(&bytes));
        assert_eq!(state.hat(), Hat::RIGHT_UP);
    }

    #[test]
    fn xbox_360_wireless_all_pressed_and_extremes() {
        let mut bytes = [0u8; 29];
        bytes[1] = 0x01;
        bytes[5] = 0x13;
        bytes[6] = 0xFF;
        bytes[7] = 0xF3;
        bytes[8] = 0xFF; // LT
        bytes[9] = 0x00; // RT
        bytes[10..12].copy_from_slice(&i16::MAX.to_le_bytes());
        bytes[12..14].copy_from_slice(&0i16.to_le_bytes());
        bytes[14..16].copy_from_slice(&(-1234i16).to_le_bytes());
        bytes[16..18].copy_from_slice(&i16::MIN.to_le_bytes());
        let state = decode(ControllerFamily::Xbox360Wireless, &report(&bytes));
        assert_eq!(state.buttons, all_pressed());
        assert_eq!(state.left_trigger, 0xFF);
        assert_eq!(state.right_trigger, 0x00);
        assert_eq!(state.left_stick_x, i16::MAX);
        assert_eq!(state.left_stick_y, -1);
        assert_eq!(state.right_stick_x, -1234);
        assert_eq!(state.right_stick_y, i16::MAX);
    }

    #[test]
    fn xbox_360_wired_released() {
        let mut bytes = [0u8; 20];
        bytes[1] = 0x14;
        bytes[8..10].copy_from_slice(&(-1i16).to_le_bytes());
        bytes[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        let state = decode(ControllerFamily::Xbox360Wired, &report(&bytes));
        assert_eq!(state, GamepadState::default());
    }

    #[test]
    fn xbox_one_released() {
        let mut bytes = [0u8; 18];
        bytes[0] = 0x20;
        bytes[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        bytes[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        let state = decode(ControllerFamily::XboxOne, &report(&bytes));
        assert_eq!(state, GamepadState::default());
    }

    /// Zeroed report that passes validation for `family`.
    fn blank(family: ControllerFamily) -> [u8; MAX_REPORT_LEN] {
        let mut bytes = [0u8; MAX_REPORT_LEN];
        match family {
            ControllerFamily::OriginalXbox | ControllerFamily::Xbox360Wired => bytes[1] = 0x14,
            ControllerFamily::Xbox360Wireless => {
                bytes[1] = 0x01;
                bytes[5] = 0x13;
            }
            ControllerFamily::XboxOne => bytes[0] = 0x20,
        }
        bytes
    }

    #[test]
    fn sticks_and_triggers_reach_both_extremes() {
        for family in ControllerFamily::ALL {
            let l = layout(family);
            for (raw, trigger) in [(i16::MIN, 0x00), (i16::MAX, 0xFF)] {
                let mut bytes = blank(family);
                for at in l.sticks_at {
                    bytes[at..at + 2].copy_from_slice(&raw.to_le_bytes());
                }
                bytes[l.left_trigger_at] = trigger;
                bytes[l.right_trigger_at] = trigger;
                assert!(crate::report::validate(family, &bytes), "{family}");

                let state = decode(family, &report(&bytes));
                assert_eq!(state.left_stick_x, raw, "{family}");
                assert_eq!(state.right_stick_x, raw, "{family}");
                assert_eq!(state.left_stick_y, !raw, "{family}");
                assert_eq!(state.right_stick_y, !raw, "{family}");
                assert_eq!(state.left_trigger, trigger, "{family}");
                assert_eq!(state.right_trigger, trigger, "{family}");
                assert_eq!(
                    state.axis(Axis::LeftTrigger),
                    if trigger == 0 { i16::MIN } else { i16::MAX },
                    "{family}"
                );
            }
        }
    }

    #[test]
    fn xbox_360_wireless_released() {
        let mut bytes = [0u8; 29];
        bytes[1] = 0x01;
        bytes[5] = 0x13;
        bytes[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        bytes[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        let state = decode(ControllerFamily::Xbox360Wireless, &report(&bytes));
        assert_eq!(state, GamepadState::default());
    }

    #[test]
    fn xbox_one_all_pressed_and_extremes() {
        let mut bytes = [0u8; 18];
        bytes[0] = 0x20;
        bytes[4] = 0xFC; // bits 2..=7
        bytes[5] = 0xFF; // bits 8..=15
        bytes[6] = 0xFF; // LT low byte
        bytes[7] = 0x03; // LT high bits, ignored
        bytes[8] = 0x00; // RT low byte
        bytes[10..12].copy_from_slice(&i16::MIN.to_le_bytes());
        bytes[12..14].copy_from_slice(&i16::MAX.to_le_bytes());
        bytes[14..16].copy_from_slice(&i16::MAX.to_le_bytes());
        bytes[16..18].copy_from_slice(&i16::MAX.to_le_bytes());
        let state = decode(ControllerFamily::XboxOne, &report(&bytes));
        assert_eq!(state.buttons, all_pressed());
        assert_eq!(state.left_trigger, 0xFF);
        assert_eq!(state.right_trigger, 0x00);
        assert_eq!(state.left_stick_x, i16::MIN);
        assert_eq!(state.left_stick_y, i16::MIN);
        assert_eq!(state.right_stick_x, i16::MAX);
        assert_eq!(state.right_stick_y, i16::MIN);
    }

    #[test]
    fn xbox_one_bit_positions() {
        let cases = [
            (2, Button::Start),
            (3, Button::Back),
            (4, Button::A),
            (7, Button::Y),
            (8, Button::DpadUp),
            (11, Button::DpadRight),
            (12, Button::LeftShoulder),
            (15, Button::RightThumb),
        ];
        for (bit, button) in cases {
            let mut bytes = [0u8; 18];
            bytes[0] = 0x20;
            bytes[4..6].copy_from_slice(&(1u16 << bit).to_le_bytes());
            let state = decode(ControllerFamily::XboxOne, &report(&bytes));
            assert_eq!(state.buttons, Buttons::new(&[button]), "bit {bit}");
        }
    }

    #[test]
    fn xbox_one_sync_and_guide_bits_are_ignored() {
        let mut bytes = [0u8; 18];
        bytes[0] = 0x20;
        bytes[4] = 0x03;
        let state = decode(ControllerFamily::XboxOne, &report(&bytes));
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn decode_is_idempotent() {
        let bytes = [
            0x00, 0x14, 0x5A, 0xA5, 0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC, 0xDE, 0xF0, 0x11,
            0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88,
        ];
        let raw = report(&bytes);
        for family in ControllerFamily::ALL {
            assert_eq!(decode(family, &raw), decode(family, &raw));
        }
    }

    #[test]
    fn short_reports_decode_as_zero_padded() {
        let state = decode(ControllerFamily::XboxOne, &report(&[0x20]));
        assert!(state.buttons.is_empty());
        assert_eq!(state.left_stick_y, -1);
        assert_eq!(trigger_to_axis(state.left_trigger), -32768);
    }
}
