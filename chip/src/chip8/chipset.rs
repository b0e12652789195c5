use std::{convert::TryFrom, ops::Range};

use {
    crate::{
        definitions::{cpu, display, keyboard, memory},
        devices::{Frame, KeyboardCommands},
        opcode::{Instruction, Opcode, Opcodes, Operation, ProgramCounterStep},
        resources::Rom,
        timer::Timer,
        LoadError, MemoryError, ProcessError, StackError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet {
    /// name of the loaded rom
    pub(super) name: String,
    /// the last opcode that was fetched, all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x000-0x1FF` - Chip 8 interpreter (contains font set in emu)
    /// - `0x000-0x04F` - Used for the built in `4x5` pixel font set (`0-F`)
    /// - `0x200-0xFFF` - Program ROM and work RAM
    pub(super) memory: Box<[u8]>,
    /// The first address after the loaded program, fetching from here on ends the program.
    pub(super) program_end: usize,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions; thus, it should be avoided. In an addition operation, `VF` is the carry flag,
    /// while in subtraction, it is the "no borrow" flag. In the draw instruction `VF` is set upon
    /// pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index for the register, this is a special register entry
    /// called index `I`
    pub(super) index_register: u16,
    /// The program counter is a CPU register in the computer processor which has the address of the
    /// next instruction to be executed from memory.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called. The original
    /// [RCA 1802](https://de.wikipedia.org/wiki/RCA1802) version allocated `48` bytes for up to
    /// `12` levels of nesting; modern implementations usually have more.
    /// (here we are using `16`)
    /// The length of the stack is the stack pointer, it always points to the next free slot.
    pub(super) stack: ArrayVec<[usize; cpu::stack::SIZE]>,
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    pub(super) delay_timer: Timer,
    /// Sound timer: This timer is used for sound effects. When its value is nonzero, a beeping
    /// sound is made.
    pub(super) sound_timer: Timer,
    /// The graphics of the Chip 8 are black and white and the screen has a total of `2048` pixels
    /// `(64 x 32)`. This can easily be implemented using an array that hold the pixel state `(1 or 0)`:
    pub(super) display: Box<Frame>,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
}

impl ChipSet {
    /// will create a new chipset object
    pub fn new(rom: Rom) -> Result<Self, LoadError> {
        let data = rom.get_data();
        if data.len() > cpu::PROGRAM_CAPACITY {
            return Err(LoadError::TooLarge {
                name: rom.get_name().to_string(),
                size: data.len(),
                capacity: cpu::PROGRAM_CAPACITY,
            });
        }

        // initialize all the memory with 0
        let mut ram = vec![0; memory::SIZE].into_boxed_slice();

        // load fonts
        ram[display::fontset::LOCATION
            ..(display::fontset::LOCATION + display::fontset::FONTSET.len())]
            .copy_from_slice(&display::fontset::FONTSET);

        // write the rom data into memory
        let program_end = cpu::PROGRAM_COUNTER + data.len();
        ram[cpu::PROGRAM_COUNTER..program_end].copy_from_slice(data);

        log::info!("loaded rom '{}' with {} bytes", rom.get_name(), data.len());

        Ok(Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: ram,
            program_end,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            delay_timer: Timer::default(),
            sound_timer: Timer::default(),
            display: Box::new([[false; display::WIDTH]; display::HEIGHT]),
            rng: Box::new(rand::rngs::OsRng),
        })
    }

    /// Will replace the random number generator used by `CXNN`.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Will read the two bytes at the program counter and move the counter onto
    /// the following opcode. Returns `None` once the program counter ran past the
    /// loaded program.
    pub fn fetch(&mut self) -> Option<[u8; 2]> {
        let pointer = self.program_counter;
        if pointer + memory::opcodes::SIZE > self.program_end {
            return None;
        }
        self.program_counter += memory::opcodes::SIZE;
        Some([self.memory[pointer], self.memory[pointer + 1]])
    }

    /// will advance the program by a single step, returns `None` if the end
    /// of the program has been reached.
    pub fn next<K>(&mut self, input: &mut K) -> Result<Option<Operation>, ProcessError>
    where
        K: KeyboardCommands + ?Sized,
    {
        let bytes = match self.fetch() {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let instruction = Instruction::decode(bytes);
        self.opcode = instruction.raw;
        log::debug!(
            "pc {:#06X} opcode {:#06X}",
            self.program_counter - memory::opcodes::SIZE,
            instruction.raw
        );

        let opcode = Opcodes::try_from(instruction)?;
        let (step, operation) = self.execute(opcode, input)?;
        self.step(step);
        Ok(Some(operation))
    }

    /// Will finish an `FX0A` opcode by writing the pressed key into the waiting register.
    pub fn resume_with_key(&mut self, register: usize, key: u8) -> Result<(), ProcessError> {
        if key as usize >= keyboard::SIZE {
            return Err(ProcessError::Key(key));
        }
        self.registers[register] = key;
        Ok(())
    }

    /// Will count both timers down by one, returns if the tone shall be played.
    pub fn tick_timers(&mut self) -> bool {
        self.delay_timer.tick();
        let play = self.sound_timer.tick();
        log::trace!(
            "timers delay {} sound {}",
            self.delay_timer.get_value(),
            self.sound_timer.get_value()
        );
        play
    }

    /// will return the name of the loaded rom
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// will return the opcode that was fetched last
    pub fn get_opcode(&self) -> Opcode {
        self.opcode
    }

    /// will return the full memory
    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    /// will return the registers `V0` to `VF`
    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    /// will return the return addresses currently on the stack, the
    /// last entry is the top of the stack
    pub fn get_stack(&self) -> &[usize] {
        self.stack.as_slice()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.sound_timer.get_value()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.delay_timer.get_value()
    }

    /// Will return a immutable reference to the current display configuration
    pub fn get_display(&self) -> &Frame {
        &self.display
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: usize) -> Result<(), StackError> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(StackError::Full),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<usize, StackError> {
        self.stack.pop().ok_or(StackError::Empty)
    }

    /// Will return the memory range `I..I + len`, if it lies within memory.
    pub(super) fn index_range(&self, len: usize) -> Result<Range<usize>, MemoryError> {
        let pointer = self.index_register as usize;
        let end = pointer + len;
        if end > self.memory.len() {
            Err(MemoryError::OutOfBounds {
                pointer,
                len,
                size: self.memory.len(),
            })
        } else {
            Ok(pointer..end)
        }
    }

    /// will move the program counter according to the step
    pub(super) fn step(&mut self, step: ProgramCounterStep) {
        match step {
            ProgramCounterStep::Next => {}
            ProgramCounterStep::Skip => self.program_counter += memory::opcodes::SIZE,
            ProgramCounterStep::Jump(pointer) => self.program_counter = pointer,
        }
    }
}
