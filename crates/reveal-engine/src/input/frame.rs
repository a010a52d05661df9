use super::types::InputEvent;

/// Input events that arrived since the previous frame, in arrival order.
///
/// Per-frame deltas are consumed by exactly one frame; the runtime clears the
/// frame after `App::on_frame` returns.
#[derive(Debug, Default)]
pub struct InputFrame {
    pub events: Vec<InputEvent>,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        self.events.push(ev);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::input::{PointerButton, PointerMoveEvent};

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(PointerMoveEvent { x, y })
    }

    #[test]
    fn events_are_recorded_in_arrival_order() {
        let mut frame = InputFrame::default();
        frame.push_event(moved(1.0, 1.0));
        frame.push_event(InputEvent::PointerButton {
            button: PointerButton::Primary,
            pressed: true,
        });
        frame.push_event(moved(2.0, 3.0));

        assert_eq!(frame.events.len(), 3);
        assert_eq!(frame.events[0], moved(1.0, 1.0));
        assert_eq!(frame.events[2], moved(2.0, 3.0));
    }

    #[test]
    fn clear_drops_events() {
        let mut frame = InputFrame::default();
        frame.push_event(moved(4.0, 5.0));
        frame.push_event(InputEvent::Wheel { delta_y: 1.0 });
        frame.clear();
        assert!(frame.events.is_empty());
    }
}
