//! Opcode abstractions, functionality and constants.
use std::convert::TryFrom;

use crate::{definitions::memory, MemoryError, OpcodeError};

/// the mask for the lower twelve bits, the address part of an opcode
pub(crate) const OPCODE_MASK_0FFF: u16 = 0x0FFF;

/// the mask for the lower eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = 0x00FF;

/// the mask that removes the last nibble
pub(crate) const OPCODE_MASK_FFF0: u16 = 0xFFF0;

/// the mask for a single nibble inside of a byte
const NIBBLE_MASK: u8 = 0x0F;

/// the size of a nibble in bits
const NIBBLE_SIZE: u8 = 4;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
///  assert!(build_opcode(&SPLIT_OPCODE, 3).is_err());
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, MemoryError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(MemoryError::OutOfBounds {
            pointer,
            len: memory::opcodes::SIZE,
            size: data.len(),
        })
    }
}

/// The decoded view of the two raw bytes of an instruction.
///
/// The first nibble selects the instruction family, the others carry the operands.
/// ```rust
/// # use chip::opcode::Instruction;
/// let instruction = Instruction::decode([0xD1, 0x25]);
/// assert_eq!(instruction.raw, 0xD125);
/// assert_eq!(
///     (instruction.first, instruction.second, instruction.third, instruction.fourth),
///     (0xD, 0x1, 0x2, 0x5)
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// the full big-endian opcode
    pub raw: Opcode,
    /// the highest nibble
    pub first: u8,
    pub second: u8,
    pub third: u8,
    /// the lowest nibble
    pub fourth: u8,
}

impl Instruction {
    /// Splits the two bytes (high byte first) into their nibbles.
    pub fn decode(bytes: [u8; 2]) -> Self {
        let [high, low] = bytes;
        Self {
            raw: Opcode::from_be_bytes(bytes),
            first: high >> NIBBLE_SIZE,
            second: high & NIBBLE_MASK,
            third: low >> NIBBLE_SIZE,
            fourth: low & NIBBLE_MASK,
        }
    }

    /// The register index `X` of `TXNN` and `TXYN` opcodes.
    pub fn x(&self) -> usize {
        self.second as usize
    }

    /// The register index `Y` of `TXYN` opcodes.
    pub fn y(&self) -> usize {
        self.third as usize
    }

    /// The constant `N` of `TXYN` opcodes.
    pub fn n(&self) -> usize {
        self.fourth as usize
    }

    /// The low byte of the opcode
    /// ```rust
    /// # use chip::opcode::Instruction;
    /// assert_eq!(Instruction::from(0x1EDA).nn(), 0xDA);
    /// ```
    pub fn nn(&self) -> u8 {
        (self.raw & OPCODE_MASK_00FF) as u8
    }

    /// The address part of the opcode
    /// ```rust
    /// # use chip::opcode::Instruction;
    /// assert_eq!(Instruction::from(0x1EDA).nnn(), 0xEDA);
    /// ```
    pub fn nnn(&self) -> usize {
        (self.raw & OPCODE_MASK_0FFF) as usize
    }
}

impl From<Opcode> for Instruction {
    fn from(opcode: Opcode) -> Self {
        Self::decode(opcode.to_be_bytes())
    }
}

/// implFromCode is a macro responsible for creating the boilerplate code
/// needed to map the selector part of an opcode onto its sub operation.
macro_rules! implFromCode {
    ($type_name:ident : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        impl $type_name {
            fn from_code(value: $type_from) -> Option<Self> {
                match value {
                    $(
                        $key => Some($val),
                    )+
                    _ => None,
                }
            }
        }
    };
}

/// The register to register operations of the `8XYN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOpcode {
    Move,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubN,
    ShiftLeft,
}

implFromCode!(ArithmeticOpcode : u8 :
    // 8XY0
    // Sets VX to the value of VY.
    0x0 => ArithmeticOpcode::Move,
    // 8XY1
    // Sets VX to VX or VY. (Bitwise OR operation)
    0x1 => ArithmeticOpcode::Or,
    // 8XY2
    // Sets VX to VX and VY. (Bitwise AND operation)
    0x2 => ArithmeticOpcode::And,
    // 8XY3
    // Sets VX to VX xor VY.
    0x3 => ArithmeticOpcode::Xor,
    // 8XY4
    // Adds VY to VX. VF is set to 1 when there's a carry, and to 0 when there isn't.
    0x4 => ArithmeticOpcode::Add,
    // 8XY5
    // VY is subtracted from VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x5 => ArithmeticOpcode::Sub,
    // 8XY6
    // Stores the least significant bit of VX in VF and then shifts VX to the right by 1.
    0x6 => ArithmeticOpcode::ShiftRight,
    // 8XY7
    // Sets VX to VY minus VX. VF is set to 0 when there's a borrow, and 1 when there
    // isn't.
    0x7 => ArithmeticOpcode::SubN,
    // 8XYE
    // Stores the most significant bit of VX in VF and then shifts VX to the left by 1.
    0xE => ArithmeticOpcode::ShiftLeft,
);

/// The keypad operations of the `EXNN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOpcode {
    Pressed,
    NotPressed,
}

implFromCode!(KeyOpcode : u8 :
    // EX9E
    // Skips the next instruction if the key stored in VX is pressed.
    0x9E => KeyOpcode::Pressed,
    // EXA1
    // Skips the next instruction if the key stored in VX isn't pressed.
    0xA1 => KeyOpcode::NotPressed,
);

/// The timer, index and memory operations of the `FXNN` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOpcode {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

implFromCode!(MiscOpcode : u8 :
    // FX07
    // Sets VX to the value of the delay timer.
    0x07 => MiscOpcode::GetDelayTimer,
    // FX0A
    // A key press is awaited, and then stored in VX.
    0x0A => MiscOpcode::AwaitKeyPress,
    // FX15
    // Sets the delay timer to VX.
    0x15 => MiscOpcode::SetDelayTimer,
    // FX18
    // Sets the sound timer to VX.
    0x18 => MiscOpcode::SetSoundTimer,
    // FX1E
    // Adds VX to I. VF is not affected.
    0x1E => MiscOpcode::AddVxToI,
    // FX29
    // Sets I to the location of the font sprite for the character in VX.
    0x29 => MiscOpcode::SetIToSprite,
    // FX33
    // Stores the binary-coded decimal representation of VX at I, I + 1 and I + 2.
    0x33 => MiscOpcode::StoreBCD,
    // FX55
    // Stores V0 to VX (including VX) in memory starting at address I.
    0x55 => MiscOpcode::StoreV0ToVx,
    // FX65
    // Fills V0 to VX (including VX) with values from memory starting at address I.
    0x65 => MiscOpcode::FillV0ToVx,
);

/// A fully routed operation, ready to be executed by the chipset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcodes {
    /// `0NNN` calls a machine code routine, which is ignored.
    System { nnn: usize },
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump { nnn: usize },
    /// `2NNN`
    Call { nnn: usize },
    /// `3XNN`
    SkipEqual { x: usize, nn: u8 },
    /// `4XNN`
    SkipNotEqual { x: usize, nn: u8 },
    /// `5XY0`
    SkipRegistersEqual { x: usize, y: usize },
    /// `6XNN`
    Load { x: usize, nn: u8 },
    /// `7XNN`
    Add { x: usize, nn: u8 },
    /// `8XYN`
    Arithmetic {
        ops: ArithmeticOpcode,
        x: usize,
        y: usize,
    },
    /// `9XY0`
    SkipRegistersNotEqual { x: usize, y: usize },
    /// `ANNN`
    LoadIndex { nnn: usize },
    /// `BNNN`
    JumpOffset { nnn: usize },
    /// `CXNN`
    Random { x: usize, nn: u8 },
    /// `DXYN`
    Draw { x: usize, y: usize, n: usize },
    /// `EXNN`
    Key { ops: KeyOpcode, x: usize },
    /// `FXNN`
    Misc { ops: MiscOpcode, x: usize },
}

impl TryFrom<Instruction> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Instruction) -> Result<Self, Self::Error> {
        let invalid = || OpcodeError::InvalidOpcode(value.raw);
        let (x, y) = (value.x(), value.y());

        let res = match value.first {
            0x0 => match value.raw {
                0x00E0 => Opcodes::Clear,
                0x00EE => Opcodes::Return,
                raw if raw & OPCODE_MASK_FFF0 == 0x00E0 => return Err(invalid()),
                _ => Opcodes::System { nnn: value.nnn() },
            },
            0x1 => Opcodes::Jump { nnn: value.nnn() },
            0x2 => Opcodes::Call { nnn: value.nnn() },
            0x3 => Opcodes::SkipEqual { x, nn: value.nn() },
            0x4 => Opcodes::SkipNotEqual { x, nn: value.nn() },
            0x5 => Opcodes::SkipRegistersEqual { x, y },
            0x6 => Opcodes::Load { x, nn: value.nn() },
            0x7 => Opcodes::Add { x, nn: value.nn() },
            0x8 => Opcodes::Arithmetic {
                ops: ArithmeticOpcode::from_code(value.fourth).ok_or_else(invalid)?,
                x,
                y,
            },
            0x9 => Opcodes::SkipRegistersNotEqual { x, y },
            0xA => Opcodes::LoadIndex { nnn: value.nnn() },
            0xB => Opcodes::JumpOffset { nnn: value.nnn() },
            0xC => Opcodes::Random { x, nn: value.nn() },
            0xD => Opcodes::Draw { x, y, n: value.n() },
            0xE => Opcodes::Key {
                ops: KeyOpcode::from_code(value.nn()).ok_or_else(invalid)?,
                x,
            },
            0xF => Opcodes::Misc {
                ops: MiscOpcode::from_code(value.nn()).ok_or_else(invalid)?,
                x,
            },
            _ => return Err(invalid()),
        };
        Ok(res)
    }
}

impl TryFrom<Opcode> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        Opcodes::try_from(Instruction::from(value))
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip can take after an opcode was executed.
/// The fetch already moved the program counter onto the following opcode.
pub enum ProgramCounterStep {
    /// Will keep the program counter on the following opcode
    Next,
    /// Will jump over the following opcode
    Skip,
    /// Will simply move the program counter to the given location.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the run loop.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// The run loop has to wait for the next key press
    /// and hand it to the register with the given index.
    Wait(usize),
    /// The display has to be redrawn
    Draw,
}
