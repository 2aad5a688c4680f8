//! The arcade cabinet harness: wires the [`Cpu`] to the shift-register
//! coprocessor, the two input ports, and the video-RAM unpacking that
//! turns the CPU's bitmap into a frame a host window can present. This
//! is the Rust shape of the original cabinet's per-frame update loop —
//! two half-frame interrupts, then a draw.

use std::time::{Duration, Instant};

use crate::cpu::{Cpu, IoEvent, VRAM_OFFSET};
use crate::driver::{CabinetKey, InputEvent, InputSource, PresentationSurface};
use crate::error::EmuError;

const FPS: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub struct MachineConfig {
    /// Output frame width, post video-RAM rotation.
    pub screen_width: usize,
    /// Output frame height, post video-RAM rotation.
    pub screen_height: usize,
    /// Approximate CPU clock, in Hz, the per-frame cycle budget is
    /// derived from.
    pub target_hz: u32,
    /// Where ROM images are loaded in the CPU's address space.
    pub rom_offset: u16,
}

impl Default for MachineConfig {
    fn default() -> Self {
        MachineConfig {
            screen_width: 224,
            screen_height: 256,
            target_hz: 2_000_000,
            rom_offset: crate::cpu::ROM_OFFSET,
        }
    }
}

const PX_OFF_COLOR: u32 = 0x00_00_00;
const PX_ON_COLOR: u32 = 0xFF_FF_FF;

pub struct Machine {
    config: MachineConfig,
    cpu: Cpu,
    port1: u8,
    port2: u8,
    shift_register: u16,
    shift_offset: u8,
    framebuffer: Vec<u32>,
    half_frame_budget: u32,
    cycles_per_frame: u32,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Self {
        let cycles_per_frame = config.target_hz / FPS;

        Machine {
            framebuffer: vec![PX_OFF_COLOR; config.screen_width * config.screen_height],
            cpu: Cpu::new(),
            // Bit 3 ("ready") is tied high on real hardware and never toggled.
            port1: 1 << 3,
            port2: 0,
            shift_register: 0,
            shift_offset: 0,
            half_frame_budget: cycles_per_frame / 2,
            cycles_per_frame,
            config,
        }
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<(), EmuError> {
        self.cpu.load_rom(rom, self.config.rom_offset)
    }

    pub fn framebuffer(&self) -> &[u32] {
        &self.framebuffer
    }

    pub fn apply_input(&mut self, event: InputEvent) {
        let (key, down) = match event {
            InputEvent::KeyDown(key) => (key, true),
            InputEvent::KeyUp(key) => (key, false),
            InputEvent::Quit => return,
        };
        let (port, bit) = Self::port_and_bit(key);
        let latch = if port == 1 {
            &mut self.port1
        } else {
            &mut self.port2
        };
        if down {
            *latch |= bit;
        } else {
            *latch &= !bit;
        }
    }

    /// Cabinet-standard port/bit positions, per the input mapping table.
    fn port_and_bit(key: CabinetKey) -> (u8, u8) {
        match key {
            CabinetKey::Coin => (1, 1 << 0),
            CabinetKey::Player2Start => (1, 1 << 1),
            CabinetKey::Player1Start => (1, 1 << 2),
            CabinetKey::Player1Fire => (1, 1 << 4),
            CabinetKey::Player1Left => (1, 1 << 5),
            CabinetKey::Player1Right => (1, 1 << 6),
            CabinetKey::Player2Fire => (2, 1 << 4),
            CabinetKey::Player2Left => (2, 1 << 5),
            CabinetKey::Player2Right => (2, 1 << 6),
        }
    }

    fn step_once(&mut self) -> Result<(), EmuError> {
        if let Some(event) = self.cpu.step()? {
            self.handle_io(event);
        }
        Ok(())
    }

    fn handle_io(&mut self, event: IoEvent) {
        match event {
            IoEvent::Out { port } => match port {
                2 => self.shift_offset = self.cpu.a & 0x7,
                4 => {
                    self.shift_register = ((self.cpu.a as u16) << 8) | (self.shift_register >> 8);
                }
                // Sound and watchdog ports: this emulator has no sound
                // hardware, so these are accepted and ignored.
                3 | 5 | 6 => {}
                _ => {}
            },
            IoEvent::In { port } => {
                let value = match port {
                    1 => self.port1,
                    2 => self.port2,
                    3 => ((self.shift_register >> (8 - self.shift_offset as u32)) & 0xff) as u8,
                    _ => 0,
                };
                self.cpu.set_a(value);
            }
        }
    }

    /// Run one video frame's worth of CPU instructions: step until the
    /// half-frame cycle budget, fire the mid-frame interrupt if armed,
    /// step to the full budget, fire the end-of-frame interrupt, then
    /// unpack video RAM into the framebuffer.
    pub fn run_frame(&mut self) -> Result<(), EmuError> {
        self.cpu.reset_cycles();

        while self.cpu.cycles() < self.half_frame_budget {
            self.step_once()?;
        }
        if self.cpu.interrupts_enabled() {
            self.cpu.interrupt(0x08)?;
        }

        while self.cpu.cycles() < self.cycles_per_frame {
            self.step_once()?;
        }
        if self.cpu.interrupts_enabled() {
            self.cpu.interrupt(0x10)?;
        }

        self.render_frame()
    }

    /// Unpacks the 1-bit-per-pixel, 256x224 video RAM into the output
    /// framebuffer, rotating 90 degrees counter-clockwise so a window
    /// can present it upright without its own rotation logic.
    fn render_frame(&mut self) -> Result<(), EmuError> {
        let native_width = 256usize;
        let bytes = (native_width * 224) / 8;

        for i in 0..bytes {
            let byte = self.cpu.mem_read(VRAM_OFFSET + i as u16)?;
            let x = (i * 8) % native_width;
            let y = (i * 8) / native_width;

            for b in 0..8 {
                let on = (byte >> b) & 1 != 0;
                let px = y;
                let py = self.config.screen_height - 1 - (x + b);
                let idx = py * self.config.screen_width + px;
                self.framebuffer[idx] = if on { PX_ON_COLOR } else { PX_OFF_COLOR };
            }
        }
        Ok(())
    }

    /// Drives the cabinet against a live host surface until the window
    /// closes or a quit event arrives, pacing itself to `FPS`.
    pub fn run<S: PresentationSurface + InputSource>(
        &mut self,
        surface: &mut S,
    ) -> Result<(), EmuError> {
        let frame_period = Duration::from_secs(1) / FPS;

        while surface.is_open() {
            let frame_start = Instant::now();

            for event in surface.poll_events() {
                if event == InputEvent::Quit {
                    return Ok(());
                }
                self.apply_input(event);
            }

            self.run_frame()?;
            surface.present(self.framebuffer())?;

            let elapsed = frame_start.elapsed();
            if elapsed < frame_period {
                std::thread::sleep(frame_period - elapsed);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::NullSurface;

    fn machine_with_rom(rom: &[u8]) -> Machine {
        let mut m = Machine::new(MachineConfig::default());
        m.load_rom(rom).unwrap();
        m
    }

    #[test]
    fn half_and_full_frame_budgets_are_derived_from_target_hz() {
        let m = Machine::new(MachineConfig::default());
        assert_eq!(m.cycles_per_frame, 33_333);
        assert_eq!(m.half_frame_budget, 16_666);
    }

    #[test]
    fn shift_register_feeds_back_the_requested_offset() {
        let mut m = machine_with_rom(&[0x00]);
        m.cpu.a = 0xff;
        m.handle_io(IoEvent::Out { port: 4 }); // shift_register = 0xff00
        m.cpu.a = 0x0f;
        m.handle_io(IoEvent::Out { port: 4 }); // shift_register = 0x0fff
        assert_eq!(m.shift_register, 0x0fff);

        m.cpu.a = 4;
        m.handle_io(IoEvent::Out { port: 2 }); // shift_offset = 4
        m.handle_io(IoEvent::In { port: 3 });
        assert_eq!(m.cpu.a, ((0x0fffu16 >> (8 - 4)) & 0xff) as u8);
    }

    #[test]
    fn port1_ready_bit_is_set_at_reset() {
        let m = Machine::new(MachineConfig::default());
        assert_eq!(m.port1 & (1 << 3), 1 << 3);
    }

    #[test]
    fn input_events_toggle_port1_bits() {
        let mut m = Machine::new(MachineConfig::default());
        m.apply_input(InputEvent::KeyDown(CabinetKey::Coin));
        assert_eq!(m.port1 & 1, 1);
        m.apply_input(InputEvent::KeyUp(CabinetKey::Coin));
        assert_eq!(m.port1 & 1, 0);
    }

    #[test]
    fn player_two_controls_land_on_port2() {
        let mut m = Machine::new(MachineConfig::default());
        assert_eq!(m.port2, 0);

        m.apply_input(InputEvent::KeyDown(CabinetKey::Player2Start));
        assert_eq!(m.port1 & (1 << 1), 1 << 1);

        m.apply_input(InputEvent::KeyDown(CabinetKey::Player2Fire));
        m.apply_input(InputEvent::KeyDown(CabinetKey::Player2Left));
        m.apply_input(InputEvent::KeyDown(CabinetKey::Player2Right));
        assert_eq!(m.port2, (1 << 4) | (1 << 5) | (1 << 6));

        m.apply_input(InputEvent::KeyUp(CabinetKey::Player2Fire));
        assert_eq!(m.port2, (1 << 5) | (1 << 6));
    }

    #[test]
    fn run_frame_unpacks_a_fully_lit_video_ram_to_all_on_pixels() {
        let mut m = machine_with_rom(&[0x76]); // HLT would trap; we never step it
        for addr in VRAM_OFFSET..VRAM_OFFSET + (256 * 224 / 8) as u16 {
            m.cpu.load_rom(&[0xff], addr).unwrap();
        }
        m.render_frame().unwrap();
        assert!(m.framebuffer().iter().all(|&px| px == PX_ON_COLOR));
    }

    #[test]
    fn run_against_null_surface_executes_without_error() {
        // An infinite tight loop (JMP to self) so the frame budget is
        // what ends each call to run_frame, not program termination.
        let mut m = machine_with_rom(&[0xc3, 0x00, 0x20]); // JMP 0x2000
        m.run_frame().unwrap();
        let mut surface = NullSurface;
        // NullSurface.is_open() is always true, so drive a few frames
        // directly instead of the full `run` loop, which would spin
        // forever against a headless surface.
        for _ in 0..3 {
            m.run_frame().unwrap();
        }
        surface.present(m.framebuffer()).unwrap();
    }
}
