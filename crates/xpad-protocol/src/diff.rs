use smallvec::SmallVec;

use crate::state::{Axis, Button, GamepadState, Hat};

/// Upper bound of events one update can produce: hat, host buttons, axes.
pub const MAX_EVENTS: usize = 1 + Button::HOST_ORDER.len() + Axis::ALL.len();

/// A single edge-triggered input change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputEvent {
    /// The d-pad moved to a new position.
    Hat(Hat),
    /// A host button was pressed or released.
    Button { button: Button, pressed: bool },
    /// An axis moved; triggers use the remapped signed range.
    Axis { axis: Axis, value: i16 },
}

/// Events produced by one update, in emission order.
pub type InputEvents = SmallVec<[InputEvent; MAX_EVENTS]>;

/// Lists what changed between two snapshots.
///
/// Order is fixed: hat first, then buttons in [`Button::HOST_ORDER`], then
/// axes in [`Axis::ALL`] order. Unchanged fields produce nothing.
pub fn diff(previous: &GamepadState, current: &GamepadState) -> InputEvents {
    let mut events = InputEvents::new();

    let hat = current.hat();
    if hat != previous.hat() {
        events.push(InputEvent::Hat(hat));
    }

    let toggled = previous.buttons.toggled(&current.buttons);
    if !toggled.is_empty() {
        for button in Button::HOST_ORDER {
            if toggled.contains(button) {
                events.push(InputEvent::Button {
                    button,
                    pressed: current.is_pressed(button),
                });
            }
        }
    }

    for axis in Axis::ALL {
        let value = current.axis(axis);
        if value != previous.axis(axis) {
            events.push(InputEvent::Axis { axis, value });
        }
    }

    events
}

/// Diffs `current` against `previous`, then stores it as the new previous.
pub fn apply(previous: &mut GamepadState, current: GamepadState) -> InputEvents {
    let events = diff(previous, &current);
    *previous = current;
    events
}
