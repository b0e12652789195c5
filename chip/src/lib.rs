//! A CHIP-8 virtual cpu, it decodes and executes the 35 opcodes of the original
//! interpreter against a 4KiB memory and a `64x32` monochrome framebuffer.
//!
//! The display, the keypad and the tone are plugged in through the traits in
//! [`devices`], the [`Runner`] drives a [`chip8::ChipSet`] with them.
pub mod chip8;
pub mod definitions;
pub mod devices;
pub mod opcode;
pub mod resources;
pub mod timer;
mod error;

// reexporting for convinience
mod runner;
pub use error::*;
pub use runner::*;
