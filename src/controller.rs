//! NES controller input handling.
//!
//! Implements the standard [controller](https://www.nesdev.org/wiki/Standard_controller) shift
//! register protocol: while $4016 bit 0 is held high the register keeps reloading from the
//! buttons; the falling edge latches them. Each read of $4016/$4017 then returns one bit
//! (A, B, Select, Start, Up, Down, Left, Right) and reads past the eighth return 1.

/// Buttons in shift-out order. The discriminant is the bit position in the latched byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Button {
    A = 0,
    B = 1,
    Select = 2,
    Start = 3,
    Up = 4,
    Down = 5,
    Left = 6,
    Right = 7,
}

impl Button {
    pub const ALL: [Button; 8] = [
        Button::A,
        Button::B,
        Button::Select,
        Button::Start,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    fn mask(self) -> u8 {
        1 << self as u8
    }
}

/// One standard joypad on port 1 ($4016) or port 2 ($4017).
#[derive(Default)]
pub struct Controller {
    /// Live button states, bit per [`Button`].
    state: u8,
    /// Shifted out LSB-first on read.
    shift: u8,
    strobe: bool,
}

impl Controller {
    /// Create a new controller with no buttons pressed.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_button_pressed(&mut self, button: Button, pressed: bool) {
        if pressed {
            self.state |= button.mask();
        } else {
            self.state &= !button.mask();
        }
        if self.strobe {
            self.shift = self.state;
        }
    }

    pub fn is_pressed(&self, button: Button) -> bool {
        self.state & button.mask() != 0
    }

    pub fn state(&self) -> u8 {
        self.state
    }

    /// Read one bit. During strobe this is always the A button.
    pub fn read(&mut self) -> u8 {
        if self.strobe {
            return self.state & 1;
        }
        let bit = self.shift & 1;
        self.shift = (self.shift >> 1) | 0x80;
        bit
    }

    /// Write to $4016. Bit 0 drives the strobe line; its falling edge latches the buttons.
    pub fn write(&mut self, data: u8) {
        let strobe = data & 1 != 0;
        if strobe || self.strobe {
            self.shift = self.state;
        }
        self.strobe = strobe;
    }
}
