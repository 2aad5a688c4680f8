use crate::driver::{CabinetKey, Frame, InputEvent, InputSource, PresentationSurface};
use crate::error::EmuError;

pub struct Minifb {
    window: Option<minifb::Window>,
    width: usize,
    height: usize,
    // Keys currently held down, so we can emit KeyUp when they're released.
    held: Vec<minifb::Key>,
}

impl Minifb {
    pub fn new() -> Self {
        Minifb {
            window: None,
            width: 0,
            height: 0,
            held: Vec::new(),
        }
    }

    fn map_key(key: minifb::Key) -> Option<CabinetKey> {
        match key {
            minifb::Key::C => Some(CabinetKey::Coin),
            minifb::Key::Key1 => Some(CabinetKey::Player1Start),
            minifb::Key::Enter => Some(CabinetKey::Player1Start),
            minifb::Key::Space => Some(CabinetKey::Player1Fire),
            minifb::Key::Left => Some(CabinetKey::Player1Left),
            minifb::Key::Right => Some(CabinetKey::Player1Right),
            minifb::Key::Key2 => Some(CabinetKey::Player2Start),
            minifb::Key::LeftAlt => Some(CabinetKey::Player2Fire),
            minifb::Key::A => Some(CabinetKey::Player2Left),
            minifb::Key::D => Some(CabinetKey::Player2Right),
            _ => None,
        }
    }
}

impl Default for Minifb {
    fn default() -> Self {
        Minifb::new()
    }
}

impl PresentationSurface for Minifb {
    fn init(&mut self, width: usize, height: usize, title: &str) -> Result<(), EmuError> {
        let window = minifb::Window::new(
            title,
            width,
            height,
            minifb::WindowOptions {
                resize: true,
                scale: minifb::Scale::X2,
                ..Default::default()
            },
        )
        .map_err(|e| EmuError::Surface(e.to_string()))?;

        self.window = Some(window);
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn present(&mut self, frame: Frame) -> Result<(), EmuError> {
        let window = self
            .window
            .as_mut()
            .ok_or_else(|| EmuError::Surface("present called before init".into()))?;
        window
            .update_with_buffer(frame, self.width, self.height)
            .map_err(|e| EmuError::Surface(e.to_string()))
    }

    fn is_open(&self) -> bool {
        self.window.as_ref().map(|w| w.is_open()).unwrap_or(false)
    }

    fn destroy(&mut self) {
        self.window = None;
    }
}

impl Drop for Minifb {
    fn drop(&mut self) {
        self.destroy();
    }
}

impl InputSource for Minifb {
    fn poll_events(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let Some(window) = self.window.as_ref() else {
            return events;
        };

        if !window.is_open() {
            events.push(InputEvent::Quit);
            return events;
        }

        let now_down = window.get_keys();

        if now_down.contains(&minifb::Key::Escape) {
            events.push(InputEvent::Quit);
            return events;
        }

        for key in &now_down {
            if !self.held.contains(key) {
                if let Some(mapped) = Self::map_key(*key) {
                    events.push(InputEvent::KeyDown(mapped));
                }
            }
        }
        for key in &self.held {
            if !now_down.contains(key) {
                if let Some(mapped) = Self::map_key(*key) {
                    events.push(InputEvent::KeyUp(mapped));
                }
            }
        }
        self.held = now_down;

        events
    }
}
