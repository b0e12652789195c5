use crate::{
    definitions::{cpu, display, keyboard},
    devices::KeyboardCommands,
    opcode::{ArithmeticOpcode, KeyOpcode, MiscOpcode, Opcodes, Operation, ProgramCounterStep},
    ProcessError,
};

use super::ChipSet;

/// The result of a single executed opcode
type Executed = Result<(ProgramCounterStep, Operation), ProcessError>;

impl ChipSet {
    /// Will run exactly one opcode against the chipset.
    pub(super) fn execute<K>(&mut self, opcode: Opcodes, input: &mut K) -> Executed
    where
        K: KeyboardCommands + ?Sized,
    {
        let step = match opcode {
            Opcodes::System { nnn } => {
                // 0NNN
                // Calls machine code routine at address NNN, there is no machine to run it on.
                log::warn!("ignoring machine code routine at {:#05X}", nnn);
                ProgramCounterStep::Next
            }
            Opcodes::Clear => {
                // 00E0
                // clear display
                for row in self.display.iter_mut() {
                    row.fill(false);
                }
                return Ok((ProgramCounterStep::Next, Operation::Draw));
            }
            Opcodes::Return => {
                // 00EE
                // Return from sub routine => pop from stack
                let pc = self.pop_stack()?;
                log::debug!("return to {:#06X}", pc);
                ProgramCounterStep::Jump(pc)
            }
            // 1NNN
            // Jumps to address NNN.
            Opcodes::Jump { nnn } => ProgramCounterStep::Jump(nnn),
            Opcodes::Call { nnn } => {
                // 2NNN
                // Calls subroutine at NNN, the program counter already points
                // to the opcode after the call.
                self.push_stack(self.program_counter)?;
                ProgramCounterStep::Jump(nnn)
            }
            // 3XNN
            // Skips the next instruction if VX equals NN.
            Opcodes::SkipEqual { x, nn } => ProgramCounterStep::cond(self.registers[x] == nn),
            // 4XNN
            // Skips the next instruction if VX doesn't equal NN.
            Opcodes::SkipNotEqual { x, nn } => ProgramCounterStep::cond(self.registers[x] != nn),
            // 5XY0
            // Skips the next instruction if VX equals VY.
            Opcodes::SkipRegistersEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] == self.registers[y])
            }
            Opcodes::Load { x, nn } => {
                // 6XNN
                // Sets VX to NN.
                self.registers[x] = nn;
                ProgramCounterStep::Next
            }
            Opcodes::Add { x, nn } => {
                // 7XNN
                // Adds NN to VX. (Carry flag is not changed)
                self.registers[x] = self.registers[x].wrapping_add(nn);
                ProgramCounterStep::Next
            }
            Opcodes::Arithmetic { ops, x, y } => {
                self.arithmetic(ops, x, y);
                ProgramCounterStep::Next
            }
            // 9XY0
            // Skips the next instruction if VX doesn't equal VY.
            Opcodes::SkipRegistersNotEqual { x, y } => {
                ProgramCounterStep::cond(self.registers[x] != self.registers[y])
            }
            Opcodes::LoadIndex { nnn } => {
                // ANNN
                // Sets I to the address NNN.
                self.index_register = nnn as u16;
                ProgramCounterStep::Next
            }
            // BNNN
            // Jumps to the address NNN plus V0.
            Opcodes::JumpOffset { nnn } => {
                ProgramCounterStep::Jump(nnn + self.registers[0] as usize)
            }
            Opcodes::Random { x, nn } => {
                // CXNN
                // Sets VX to the result of a bitwise and operation on a random number and NN.
                // using a fill bytes call here, as the trait RngCore does not
                // support random u8.
                let mut rand = [0u8];
                self.rng.fill_bytes(&mut rand);
                self.registers[x] = nn & rand[0];
                ProgramCounterStep::Next
            }
            Opcodes::Draw { x, y, n } => return self.draw(x, y, n),
            Opcodes::Key { ops, x } => self.key(ops, x, input)?,
            Opcodes::Misc { ops, x } => return self.misc(ops, x),
        };
        Ok((step, Operation::None))
    }

    fn arithmetic(&mut self, ops: ArithmeticOpcode, x: usize, y: usize) {
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is written last, so that it wins if VF is the target
        let (result, flag) = match ops {
            ArithmeticOpcode::Move => (vy, None),
            ArithmeticOpcode::Or => (vx | vy, None),
            ArithmeticOpcode::And => (vx & vy, None),
            ArithmeticOpcode::Xor => (vx ^ vy, None),
            ArithmeticOpcode::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            // VF is the "no borrow" flag, it compares the register values
            ArithmeticOpcode::Sub => (vx.wrapping_sub(vy), Some((vx >= vy) as u8)),
            ArithmeticOpcode::ShiftRight => (vx >> 1, Some(vx & 0x01)),
            ArithmeticOpcode::SubN => (vy.wrapping_sub(vx), Some((vy >= vx) as u8)),
            ArithmeticOpcode::ShiftLeft => (vx << 1, Some(vx >> 7)),
        };

        self.registers[x] = result;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
    }

    fn draw(&mut self, reg_x: usize, reg_y: usize, n: usize) -> Executed {
        // DXYN
        // Draws a sprite at coordinate (VX, VY) that has a width of 8 pixels and a height of N
        // pixels. Each row of 8 pixels is read as bit-coded starting from memory location I; I
        // value doesn’t change after the execution of this instruction. VF is set to 1 if any
        // screen pixels are flipped from set to unset when the sprite is drawn, and to 0 if that
        // doesn’t happen.
        // see https://tobiasvl.github.io/blog/write-a-chip-8-emulator/
        let sprite = self.index_range(n)?;

        // only the starting position wraps, the sprite itself is clipped
        let coorx = self.registers[reg_x] as usize % display::WIDTH;
        let coory = self.registers[reg_y] as usize % display::HEIGHT;

        let mut collision = false;

        for (i, row) in self.memory[sprite].iter().enumerate() {
            let y = coory + i;
            if y >= display::HEIGHT {
                break;
            }

            for j in 0..display::SPRITE_WIDTH {
                let x = coorx + j;
                if x >= display::WIDTH {
                    break;
                }

                let mask = 0x80 >> j;
                if row & mask == 0 {
                    continue;
                }

                let pixel = &mut self.display[y][x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.registers[cpu::register::LAST] = collision as u8;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key<K>(&mut self, ops: KeyOpcode, x: usize, input: &mut K) -> Result<ProgramCounterStep, ProcessError>
    where
        K: KeyboardCommands + ?Sized,
    {
        let key = self.registers[x];
        if key as usize >= keyboard::SIZE {
            return Err(ProcessError::Key(key));
        }
        let pressed = input.is_pressed(key);

        let step = match ops {
            // EX9E
            // Skips the next instruction if the key stored in VX is pressed.
            KeyOpcode::Pressed => ProgramCounterStep::cond(pressed),
            // EXA1
            // Skips the next instruction if the key stored in VX isn't pressed.
            KeyOpcode::NotPressed => ProgramCounterStep::cond(!pressed),
        };
        Ok(step)
    }

    fn misc(&mut self, ops: MiscOpcode, x: usize) -> Executed {
        match ops {
            MiscOpcode::GetDelayTimer => {
                // FX07
                // Sets VX to the value of the delay timer.
                self.registers[x] = self.delay_timer.get_value();
            }
            MiscOpcode::AwaitKeyPress => {
                // FX0A
                // A key press is awaited, and then stored in VX. The run loop does the
                // waiting and hands the key back with `resume_with_key`.
                return Ok((ProgramCounterStep::Next, Operation::Wait(x)));
            }
            MiscOpcode::SetDelayTimer => {
                // FX15
                // Sets the delay timer to VX.
                self.delay_timer.set_value(self.registers[x]);
            }
            MiscOpcode::SetSoundTimer => {
                // FX18
                // Sets the sound timer to VX.
                self.sound_timer.set_value(self.registers[x]);
            }
            MiscOpcode::AddVxToI => {
                // FX1E
                // Adds VX to I. VF is not affected.
                let xi = self.registers[x] as u16;
                self.index_register = self.index_register.wrapping_add(xi);
            }
            MiscOpcode::SetIToSprite => {
                // FX29
                // Sets I to the location of the sprite for the character in VX. Characters 0-F (in
                // hexadecimal) are represented by a 4x5 font, only the low nibble of VX counts.
                let val = (self.registers[x] & 0x0F) as usize;
                let location =
                    display::fontset::LOCATION + display::fontset::GLYPH_SIZE * val;
                self.index_register = location as u16;
            }
            MiscOpcode::StoreBCD => {
                // FX33
                // Stores the binary-coded decimal representation of VX, with the most significant
                // of three digits at the address in I, the middle digit at I plus 1, and the least
                // significant digit at I plus 2.
                let range = self.index_range(3)?;
                let r = self.registers[x];

                self.memory[range].copy_from_slice(&[
                    r / 100,      // 246u8 / 100 => 2
                    r / 10 % 10,  // 246u8 / 10 => 24 % 10 => 4
                    r % 10,       // 246u8 % 10 => 6
                ]);
            }
            MiscOpcode::StoreV0ToVx => {
                // FX55
                // Stores V0 to VX (including VX) in memory starting at address I. The offset from I
                // is increased by 1 for each value written, but I itself is left unmodified.
                let range = self.index_range(x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
            }
            MiscOpcode::FillV0ToVx => {
                // FX65
                // Fills V0 to VX (including VX) with values from memory starting at address I. The
                // offset from I is increased by 1 for each value written, but I itself is left
                // unmodified.
                let range = self.index_range(x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
            }
        }
        Ok((ProgramCounterStep::Next, Operation::None))
    }
}
