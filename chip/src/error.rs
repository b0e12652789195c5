use std::io;

use thiserror::Error;

use crate::opcode::Opcode;

/// All the fatal states the chip can run into while executing a program.
#[derive(Error, Debug, PartialEq, Clone)]
pub enum ProcessError {
    #[error("Invalid opcode state '{0}'.")]
    Opcode(#[from] OpcodeError),
    #[error("Invalid memory access '{0}'.")]
    Memory(#[from] MemoryError),
    #[error("Invalid stack state '{0}'.")]
    Stack(#[from] StackError),
    #[error("There is no key {0:#04X} on the keypad.")]
    Key(u8),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum OpcodeError {
    #[error("An unsupported opcode was used {0:#06X?}.")]
    InvalidOpcode(Opcode),
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum MemoryError {
    #[error("Pointer location invalid there can not be {len} bytes at {pointer:#06X}, if memory len is {size}")]
    OutOfBounds {
        pointer: usize,
        len: usize,
        size: usize,
    },
}

#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum StackError {
    #[error("Stack is full!")]
    Full,
    #[error("Stack is empty!")]
    Empty,
}

/// Errors that prevent a chip from being set up in the first place.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Unable to read the rom '{name}'.")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("The rom '{name}' has {size} bytes, but only {capacity} bytes fit into memory.")]
    TooLarge {
        name: String,
        size: usize,
        capacity: usize,
    },
    #[error("Unable to read the rom archive.")]
    Archive(#[from] zip::result::ZipError),
}
