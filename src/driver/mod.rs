//! The host boundary: a small set of traits the core emulator drives
//! without knowing whether the other side is a real window or a stub.
//! Keeping the surface thin here is what let the CHIP-8 ancestor of this
//! code run headless in tests, and the same trick applies to a cabinet.

pub mod minifb;

use crate::error::EmuError;

/// One video frame, ARGB-packed, `width * height` pixels, row-major.
pub type Frame<'a> = &'a [u32];

/// Output side of the host boundary: takes frames, owns the window (or
/// lack of one) and its lifecycle.
pub trait PresentationSurface {
    fn init(&mut self, width: usize, height: usize, title: &str) -> Result<(), EmuError>;

    fn present(&mut self, frame: Frame) -> Result<(), EmuError>;

    /// `false` once the host window wants to close.
    fn is_open(&self) -> bool;

    fn destroy(&mut self);
}

/// Cabinet buttons this emulator understands — coin slot, both players'
/// start buttons, and both players' controls. Dip-switch panels are out
/// of scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CabinetKey {
    Coin,
    Player1Start,
    Player2Start,
    Player1Fire,
    Player1Left,
    Player1Right,
    Player2Fire,
    Player2Left,
    Player2Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(CabinetKey),
    KeyUp(CabinetKey),
    Quit,
}

/// Input side of the host boundary. Implementations drain whatever
/// native event queue they have into a batch of [`InputEvent`]s once
/// per call.
pub trait InputSource {
    fn poll_events(&mut self) -> Vec<InputEvent>;
}

/// The `/dev/null` of host surfaces — used for headless runs and tests.
pub struct NullSurface;

impl PresentationSurface for NullSurface {
    fn init(&mut self, _width: usize, _height: usize, _title: &str) -> Result<(), EmuError> {
        Ok(())
    }
    fn present(&mut self, _frame: Frame) -> Result<(), EmuError> {
        Ok(())
    }
    fn is_open(&self) -> bool {
        true
    }
    fn destroy(&mut self) {}
}

impl InputSource for NullSurface {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        Vec::new()
    }
}
