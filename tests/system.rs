mod common;

use common::{RomBuilder, nrom};
use hunes::{
    bus::OAM_DMA_CYCLES,
    cartridge::{Cartridge, Mirroring},
    controller::Button,
    error::{CartridgeError, CpuError},
    memory::Memory,
    ppu::registers::STATUS_VBLANK,
};

/// CPU cycles in one 262×341-dot frame, rounded up.
const CYCLES_PER_FRAME: u64 = (262 * 341 + 2) / 3;

#[test]
fn header_round_trip() {
    let cart = RomBuilder::new(0, 1, 1).vertical().cartridge();
    assert_eq!(cart.mirroring(), Mirroring::Vertical);
    assert_eq!(cart.mapper_id(), 0);
    assert_eq!(cart.mapper.prg_rom().len(), 16384);
    assert_eq!(cart.mapper.chr().len(), 8192);
}

#[test]
fn unsupported_mapper_is_fatal() {
    let image = RomBuilder::new(4, 2, 1).build();
    assert!(matches!(
        Cartridge::from_bytes(&image),
        Err(CartridgeError::UnsupportedMapper(4))
    ));
}

#[test]
fn truncated_image_is_rejected() {
    let mut image = RomBuilder::new(0, 1, 1).build();
    image.truncate(16 + 0x4000 + 100);
    assert!(matches!(
        Cartridge::from_bytes(&image),
        Err(CartridgeError::Truncated { section: "CHR ROM", .. })
    ));
}

#[test]
fn nrom_128_mirrors_into_upper_half() {
    let mut cpu = RomBuilder::new(0, 1, 1).code(0, &[0xAB]).boot();
    assert_eq!(cpu.bus.read(0x8000), 0xAB);
    assert_eq!(cpu.bus.read(0xC000), 0xAB);
}

#[test]
fn reset_vector_is_honoured() {
    let cpu = RomBuilder::new(0, 1, 1)
        .vectors(0x0000, 0x8123, 0x0000)
        .boot();
    assert_eq!(cpu.pc, 0x8123);
}

#[test]
fn ram_mirrors_through_cpu_stores() {
    // LDA #$5A; STA $0000
    let mut cpu = nrom(&[0xA9, 0x5A, 0x8D, 0x00, 0x00], &[]).boot();
    cpu.step().unwrap();
    cpu.step().unwrap();
    for addr in [0x0000, 0x0800, 0x1000, 0x1800] {
        assert_eq!(cpu.bus.read(addr), 0x5A);
    }
}

#[test]
fn one_frame_takes_a_full_sweep() {
    // JMP $8000
    let mut cpu = nrom(&[0x4C, 0x00, 0x80], &[]).boot();
    cpu.run_frame().unwrap();

    assert_eq!(cpu.bus.ppu.frame, 1);
    assert!(!cpu.bus.frame_ready());
    let cycles = cpu.bus.cycles();
    assert!(
        (CYCLES_PER_FRAME..CYCLES_PER_FRAME + 3).contains(&cycles),
        "{cycles} cycles"
    );
    assert_eq!(cpu.bus.framebuffer().len(), 256 * 240);
}

#[test]
fn vblank_polling_loop_sees_each_frame_once() {
    // loop: LDA $2002; BPL loop; INC $10; JMP loop
    let program = [0xAD, 0x02, 0x20, 0x10, 0xFB, 0xE6, 0x10, 0x4C, 0x00, 0x80];
    let mut cpu = nrom(&program, &[]).boot();

    cpu.run_frame().unwrap();
    assert_eq!(cpu.bus.read(0x0010), 1);
    cpu.run_frame().unwrap();
    assert_eq!(cpu.bus.read(0x0010), 2);
}

#[test]
fn nmi_handler_runs_once_per_frame() {
    // LDA #$80; STA $2000; loop: JMP loop
    let program = [0xA9, 0x80, 0x8D, 0x00, 0x20, 0x4C, 0x05, 0x80];
    // INC $10; RTI
    let handler = [0xE6, 0x10, 0x40];
    let mut cpu = nrom(&program, &handler).boot();

    for _ in 0..3 {
        cpu.run_frame().unwrap();
    }
    assert_eq!(cpu.bus.read(0x0010), 3);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn nmi_disabled_means_no_handler() {
    let handler = [0xE6, 0x10, 0x40];
    let mut cpu = nrom(&[0x4C, 0x00, 0x80], &handler).boot();
    cpu.run_frame().unwrap();
    assert_eq!(cpu.bus.read(0x0010), 0);
    assert_eq!(cpu.bus.ppu.read_status() & STATUS_VBLANK, 0);
}

#[test]
fn oam_dma_from_cpu_stalls_and_copies() {
    // LDA #$07; STA $0203; LDA #$02; STA $4014
    let program = [0xA9, 0x07, 0x8D, 0x03, 0x02, 0xA9, 0x02, 0x8D, 0x14, 0x40];
    let mut cpu = nrom(&program, &[]).boot();
    for _ in 0..3 {
        cpu.step().unwrap();
    }
    let before = cpu.bus.cycles();
    assert_eq!(before, 8);

    // The write lands on cycle 12, an even cycle: no alignment cycle.
    let spent = cpu.step().unwrap();
    assert_eq!(spent, 4 + OAM_DMA_CYCLES);
    assert_eq!(cpu.bus.cycles() - before, spent as u64);
    assert_eq!(cpu.bus.ppu.oam[3], 0x07);
}

#[test]
fn oam_dma_on_odd_cycle_pays_alignment() {
    // LDX #0; LDA #$02; STA $4014,X
    let program = [0xA2, 0x00, 0xA9, 0x02, 0x9D, 0x14, 0x40];
    let mut cpu = nrom(&program, &[]).boot();
    cpu.step().unwrap();
    cpu.step().unwrap();
    assert_eq!(cpu.bus.cycles(), 4);

    // 4 + 5 = 9: the write finishes on an odd cycle.
    assert_eq!(cpu.step(), Ok(5 + OAM_DMA_CYCLES + 1));
}

#[test]
fn controller_read_from_cpu() {
    // LDA #1; STA $4016; LDA #0; STA $4016; LDA $4016; STA $20; LDA $4016; STA $21
    let program = [
        0xA9, 0x01, 0x8D, 0x16, 0x40, 0xA9, 0x00, 0x8D, 0x16, 0x40, 0xAD, 0x16, 0x40, 0x85,
        0x20, 0xAD, 0x16, 0x40, 0x85, 0x21,
    ];
    let mut cpu = nrom(&program, &[]).boot();
    cpu.bus.controller(0).set_button_pressed(Button::A, true);
    for _ in 0..8 {
        cpu.step().unwrap();
    }

    // Upper bits are the $40 left on the bus by the operand fetch.
    assert_eq!(cpu.bus.read(0x0020), 0x41);
    assert_eq!(cpu.bus.read(0x0021), 0x40);
}

#[test]
fn uxrom_bank_switch_from_fixed_bank() {
    // In the fixed bank at $C000: LDA #1; STA $8000; LDA $8000; STA $10
    let mut cpu = RomBuilder::new(2, 2, 0)
        .code(0x0000, &[0x11])
        .code(0x4000, &[0xA9, 0x01, 0x8D, 0x00, 0x80, 0xAD, 0x00, 0x80, 0x85, 0x10])
        .vectors(0xC000, 0xC000, 0xC000)
        .boot();

    assert_eq!(cpu.bus.read(0x8000), 0x11);
    for _ in 0..4 {
        cpu.step().unwrap();
    }
    // Bank 1 is also the fixed bank, so $8000 now shows the program's first byte.
    assert_eq!(cpu.bus.read(0x0010), 0xA9);
}

#[test]
fn jam_stops_the_frame_loop() {
    let mut cpu = nrom(&[0xE8, 0x02], &[]).boot();
    assert_eq!(
        cpu.run_frame(),
        Err(CpuError::Jammed {
            opcode: 0x02,
            pc: 0x8001
        })
    );
    assert!(cpu.halted);
    assert_eq!(cpu.x, 1);
}
