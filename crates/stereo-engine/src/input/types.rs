/// Keyboard key identifier.
///
/// Only the keys the viewer reacts to are named; everything else maps to
/// `Key::Unknown` with the platform key code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Space,

    /// Platform-dependent key not represented here.
    Unknown(u32),
}

/// Platform-agnostic discrete input event.
///
/// Only fresh presses are delivered: releases and auto-repeats are filtered
/// out by the runtime, so one physical press yields exactly one event.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum InputEvent {
    KeyPressed(Key),
}
