//! Command-line configuration for the `hunes` binary.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Instruction-stepped NES emulator
#[derive(Parser, Debug)]
#[command(name = "hunes", version)]
#[command(about = "An instruction-stepped NES emulator", long_about = None)]
pub struct Config {
    /// Path to the iNES ROM file
    pub rom: PathBuf,

    /// Window scale factor
    #[arg(short, long, value_enum, default_value_t = WindowScale::X2)]
    pub scale: WindowScale,

    /// Start execution here instead of at the RESET vector (hex, e.g. C000)
    #[arg(long, value_parser = parse_address)]
    pub start_pc: Option<u16>,

    /// Log every instruction (nestest format) at trace level
    #[arg(short, long)]
    pub trace: bool,

    /// Run this many frames without a window, then exit
    #[arg(short, long)]
    pub frames: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum WindowScale {
    #[value(name = "1")]
    X1,
    #[value(name = "2")]
    X2,
    #[value(name = "4")]
    X4,
    #[value(name = "8")]
    X8,
}

impl WindowScale {
    pub fn to_minifb(self) -> minifb::Scale {
        match self {
            WindowScale::X1 => minifb::Scale::X1,
            WindowScale::X2 => minifb::Scale::X2,
            WindowScale::X4 => minifb::Scale::X4,
            WindowScale::X8 => minifb::Scale::X8,
        }
    }
}

/// Parse `C000`, `$C000` or `0xC000`.
fn parse_address(s: &str) -> Result<u16, String> {
    let digits = s
        .strip_prefix('$')
        .or_else(|| s.strip_prefix("0x"))
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address `{s}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["hunes", "game.nes"]).unwrap();
        assert_eq!(config.rom, PathBuf::from("game.nes"));
        assert_eq!(config.scale, WindowScale::X2);
        assert_eq!(config.start_pc, None);
        assert!(!config.trace);
        assert_eq!(config.frames, None);
    }

    #[test]
    fn nestest_automation_flags() {
        let config = Config::try_parse_from([
            "hunes",
            "nestest.nes",
            "--start-pc",
            "$C000",
            "--trace",
            "--frames",
            "30",
            "--scale",
            "4",
        ])
        .unwrap();
        assert_eq!(config.start_pc, Some(0xC000));
        assert!(config.trace);
        assert_eq!(config.frames, Some(30));
        assert_eq!(config.scale, WindowScale::X4);
    }

    #[test]
    fn address_formats() {
        assert_eq!(parse_address("c000"), Ok(0xC000));
        assert_eq!(parse_address("0x8000"), Ok(0x8000));
        assert!(parse_address("10000").is_err());
        assert!(parse_address("zz").is_err());
    }

    #[test]
    fn rejects_unknown_scale() {
        assert!(Config::try_parse_from(["hunes", "game.nes", "--scale", "3"]).is_err());
    }

    #[test]
    fn rom_is_required() {
        assert!(Config::try_parse_from(["hunes"]).is_err());
    }
}
