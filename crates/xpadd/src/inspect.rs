use xpad_protocol::{
    decode, validate, Axis, Button, ControllerFamily, GamepadState, RawReport,
};

/// Decodes one report the way the driver would, or `None` when the family
/// would reject it.
pub(crate) fn decode_report(family: ControllerFamily, data: &[u8]) -> Option<GamepadState> {
    if !validate(family, data) {
        return None;
    }
    Some(decode(family, &RawReport::truncated(data)))
}

/// Human-readable lines for a decoded state, host axis values included.
pub(crate) fn describe_state(state: &GamepadState) -> Vec<String> {
    let pressed: Vec<String> = state
        .buttons
        .iter()
        .filter(|button| !button.is_dpad())
        .map(|button: Button| format!("{button:?}"))
        .collect();
    let buttons = if pressed.is_empty() {
        "none".to_string()
    } else {
        pressed.join(" ")
    };

    let mut lines = vec![
        format!("buttons: {buttons}"),
        format!("hat: {:?}", state.hat()),
        format!(
            "triggers: left={} right={}",
            state.left_trigger, state.right_trigger
        ),
    ];
    lines.extend(
        Axis::ALL
            .iter()
            .map(|axis| format!("axis {axis:?}: {}", state.axis(*axis))),
    );
    lines
}
