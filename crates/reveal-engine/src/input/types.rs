/// Pointer move event in logical pixels, relative to the window's top-left corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PointerMoveEvent {
    pub x: f32,
    pub y: f32,
}

/// Pointer buttons the input subsystem distinguishes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Runtime translates window system events into these.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMoved(PointerMoveEvent),

    PointerButton { button: PointerButton, pressed: bool },

    /// Vertical wheel motion in lines; positive scrolls away from the user.
    Wheel { delta_y: f32 },

    /// Window focus change.
    Focused(bool),
}
