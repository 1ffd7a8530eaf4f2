//! NES emulator entry point.
//!
//! Loads a cartridge and runs the CPU with a display window, or headless for a fixed number of
//! frames. Usage: hunes [--scale N] [--start-pc HEX] [--trace] [--frames N] path/to/game.nes

use std::process;
use std::time::Instant;

use ansi_term::Colour::Red;
use clap::Parser;
use hunes::{
    bus::NesBus,
    cartridge::Cartridge,
    config::{Config, WindowScale},
    controller::Button,
    cpu::CPU,
    error::Result,
    ppu::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH},
};
use minifb::{Key, Window, WindowOptions};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Joypad 1 layout.
const KEY_MAP: [(Key, Button); 8] = [
    (Key::Z, Button::A),
    (Key::X, Button::B),
    (Key::RightShift, Button::Select),
    (Key::Enter, Button::Start),
    (Key::Up, Button::Up),
    (Key::Down, Button::Down),
    (Key::Left, Button::Left),
    (Key::Right, Button::Right),
];

/// Frames between window title FPS refreshes.
const FPS_WINDOW: u32 = 10;

fn main() {
    let config = Config::parse();
    init_logging(config.trace);

    if let Err(err) = run(&config) {
        eprintln!("{} {err}", Red.bold().paint("error:"));
        process::exit(1);
    }
}

/// RUST_LOG wins; otherwise `info`, or `trace` for this crate with --trace.
fn init_logging(trace: bool) {
    let default = if trace { "info,hunes=trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(config: &Config) -> Result<()> {
    let cart = Cartridge::load(&config.rom)?;
    let mut cpu = CPU::new(NesBus::new(cart));
    cpu.reset();

    if let Some(pc) = config.start_pc {
        info!("starting at ${pc:04X} instead of the reset vector");
        cpu.pc = pc;
    }

    match config.frames {
        Some(frames) => run_headless(&mut cpu, frames),
        None => run_window(&mut cpu, config.scale),
    }
}

fn run_headless(cpu: &mut CPU<NesBus>, frames: u64) -> Result<()> {
    let start = Instant::now();
    for _ in 0..frames {
        cpu.run_frame()?;
    }
    info!(
        frames,
        cycles = cpu.cycles,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "headless run finished"
    );
    Ok(())
}

fn run_window(cpu: &mut CPU<NesBus>, scale: WindowScale) -> Result<()> {
    let mut window = Window::new(
        "hunes",
        SCREEN_WIDTH,
        SCREEN_HEIGHT,
        WindowOptions {
            scale: scale.to_minifb(),
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    let mut frames = 0;
    let mut fps_start = Instant::now();

    while window.is_open() && !window.is_key_down(Key::Escape) {
        let pad = cpu.bus.controller(0);
        for (key, button) in KEY_MAP {
            pad.set_button_pressed(button, window.is_key_down(key));
        }

        cpu.run_frame()?;
        window.update_with_buffer(cpu.bus.framebuffer(), SCREEN_WIDTH, SCREEN_HEIGHT)?;

        frames += 1;
        if frames == FPS_WINDOW {
            let fps = frames as f64 / fps_start.elapsed().as_secs_f64();
            window.set_title(&format!("hunes - {fps:.1} fps"));
            frames = 0;
            fps_start = Instant::now();
        }
    }
    Ok(())
}
