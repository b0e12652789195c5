//! The pretty print implementation for the [`ChipSet`](super::ChipSet), it dumps the full
//! machine state in a readable way, so that it can be shown after a crash.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use super::ChipSet;
use crate::definitions::cpu;
use once_cell::sync::Lazy;
use std::fmt;

/// The length of the pretty print data
/// as a single instruction is u16 the octa
/// size will show how often the block shall
/// be repeated has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

const END_OF_LINE: char = '\n';
const INDENT_FILLAMENT: char = '\t';
const INDENT_SIZE: usize = 2;

/// Will add an indent post processing
fn indent_helper(text: &mut String, indent: usize) {
    for _ in 0..indent {
        text.push(INDENT_FILLAMENT);
    }
}

macro_rules! intformat {
    () => {
        // The formatted string will be 2 sysbols for the prefix (0x)
        // and 4 for the rest long.
        "{:#06X}"
    };
}

static POINTER_LEN: Lazy<usize> =
    Lazy::new(|| format!(concat!(intformat!(), " - ", intformat!(), " :"), 0, 0).len());

static INTEGER_LEN: Lazy<usize> = Lazy::new(|| format!(intformat!(), 0).len());

// calculate a line lenght (This is a bit bigger then the actual line will be)
static LENLINE: Lazy<usize> =
    Lazy::new(|| INDENT_SIZE + HEX_PRINT_STEP * (*INTEGER_LEN + 1) + 1 + *POINTER_LEN);

/// Handles all the printing of the pointer values.
mod pointer_print {
    use std::fmt::{self, Write};

    /// will formatt the pointers according to definition
    pub(super) fn formatter(line: &mut String, from: usize, to: usize) -> fmt::Result {
        write!(
            line,
            concat!(intformat!(), " - ", intformat!(), " :"),
            from, to
        )
    }
}

/// Handles all the opcode prints
mod opcode_print {
    use super::{integer_print, pointer_print, HEX_PRINT_STEP};
    use crate::{
        definitions::memory,
        opcode::{self, Opcode},
    };
    use once_cell::sync::Lazy;
    use std::fmt::{self, Write};

    /// The internal length of the given data
    /// as the data is stored as u8 and an opcode
    /// is u16 long
    const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;
    /// The values that are used when there are at lease two rows of zeros.
    const FILLER_BASE: &str = "...";

    /// Prepares the line that will be used for rows of only zeros.
    static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
        let formatted = format!(intformat!(), 0u16);
        match HEX_PRINT_STEP {
            1 => formatted,
            2 => format!("{} {}", formatted, formatted),
            _ => {
                let length = formatted.len() * (HEX_PRINT_STEP - 2) + (HEX_PRINT_STEP - 1)
                    - FILLER_BASE.len();
                let filler = " ".repeat(length / 2);

                format!(
                    "{}{}{}{}{}",
                    formatted, filler, FILLER_BASE, filler, formatted
                )
            }
        }
    });

    /// this struct will simulate a single row of opcodes (only in this context)
    struct Row {
        from: usize,
        to: usize,
        data: [Opcode; HEX_PRINT_STEP],
        only_null: bool,
    }

    /// using the fmt::Display` for simple printing of the data later on
    impl fmt::Display for Row {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let mut res = String::with_capacity(*super::LENLINE);
            pointer_print::formatter(&mut res, self.from, self.to)?;
            res.push(' ');

            if self.only_null {
                res.push_str(&ZERO_FILLER)
            } else {
                for entry in self.data.iter() {
                    integer_print::formatter(&mut res, *entry)?;
                    res.push(' ');
                }
                res.truncate(res.trim_end().len());
            }
            write!(f, "{}", res)
        }
    }

    /// will pretty print the content of the raw memory
    /// this functions assumes the full data to be passed
    /// as the offset is calculated from the beginning of the
    /// memory block
    pub(super) fn printer(memory: &[u8], indent: usize) -> Result<String, fmt::Error> {
        let mut rows: Vec<Row> = Vec::with_capacity(memory.len() / POINTER_INCREMENT);

        for from in (0..memory.len()).step_by(POINTER_INCREMENT) {
            // precalculate the end location
            let to = (from + POINTER_INCREMENT).min(memory.len()) - 1;

            let mut data = [0; HEX_PRINT_STEP];
            // loop over all the opcodes u8 pairs, a trailing single byte is
            // printed as the high byte
            for (entry, index) in data.iter_mut().zip((from..=to).step_by(memory::opcodes::SIZE)) {
                *entry = opcode::build_opcode(memory, index)
                    .unwrap_or_else(|_| Opcode::from(memory[index]) << 8);
            }
            let only_null = data.iter().all(|entry| *entry == 0);

            // create the row that shall be used later on
            let mut row = Row {
                from,
                to,
                data,
                only_null,
            };

            // fold consecutive rows of zeros into a single one
            if only_null {
                if let Some(last_row) = rows.last() {
                    if last_row.only_null {
                        row.from = last_row.from;
                        rows.pop();
                    }
                }
            }
            rows.push(row)
        }

        let mut string = String::with_capacity((*super::LENLINE + 1) * rows.len());
        for row in rows {
            super::indent_helper(&mut string, indent);
            write!(string, "{}{}", row, super::END_OF_LINE)?;
        }
        if let Some(index) = string.rfind(super::END_OF_LINE) {
            string.truncate(index);
        }
        Ok(string)
    }
}

/// handles printting of any and all of intergers.
mod integer_print {
    use super::{pointer_print, HEX_PRINT_STEP};
    use num_traits::Unsigned;
    use std::fmt::{self, Write};

    /// will format all integer types
    pub(super) fn formatter<T>(line: &mut String, data: T) -> fmt::Result
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        write!(line, intformat!(), data)
    }

    /// will pretty print all the integer data given
    pub(super) fn printer<T>(data: &[T], indent: usize) -> Result<String, fmt::Error>
    where
        T: fmt::UpperHex + Unsigned + Copy,
    {
        let result_size = *super::LENLINE * (data.len() / HEX_PRINT_STEP + 1);

        let mut res = String::with_capacity(result_size);
        for i in (0..data.len()).step_by(HEX_PRINT_STEP) {
            let n = (i + HEX_PRINT_STEP - 1).min(data.len() - 1);

            super::indent_helper(&mut res, indent);
            pointer_print::formatter(&mut res, i, n)?;

            for entry in &data[i..=n] {
                res.push(' ');
                formatter(&mut res, *entry)?;
            }
            res.push(super::END_OF_LINE);
        }

        // Remove unneded new line
        if let Some(index) = res.rfind(super::END_OF_LINE) {
            res.truncate(index);
        }

        Ok(res)
    }
}

/// will prepare a single indented value
fn single<T>(value: T) -> Result<String, fmt::Error>
where
    T: fmt::UpperHex + num_traits::Unsigned + Copy,
{
    let mut line = String::with_capacity(*INTEGER_LEN + INDENT_SIZE);
    indent_helper(&mut line, INDENT_SIZE);
    integer_print::formatter(&mut line, value)?;
    Ok(line)
}

impl fmt::Display for ChipSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // prepate the rom name
        let mut nam = String::with_capacity(INDENT_SIZE + self.name.len());
        indent_helper(&mut nam, INDENT_SIZE);
        nam.push_str(&self.name);

        let opc = single(self.opcode)?;
        let prc = single(self.program_counter)?;
        let idx = single(self.index_register)?;
        let del = single(self.delay_timer.get_value())?;
        let snd = single(self.sound_timer.get_value())?;
        let stp = single(self.stack.len())?;

        let mem = opcode_print::printer(&self.memory, INDENT_SIZE)?;
        let reg = integer_print::printer(&self.registers[..], INDENT_SIZE)?;

        // handle stack specially as it needes to be filled up if empty
        let mut stack = [0; cpu::stack::SIZE];
        stack[..self.stack.len()].copy_from_slice(self.stack.as_slice());
        let sta = integer_print::printer(&stack[..], INDENT_SIZE)?;

        write!(
            f,
            "Chipset {{\n\
                \tProgram Name :\n{}\n\
                \tOpcode :\n{}\n\
                \tProgram Counter :\n{}\n\
                \tIndex Register :\n{}\n\
                \tDelay Timer :\n{}\n\
                \tSound Timer :\n{}\n\
                \tMemory :\n{}\n\
                \tStack Pointer :\n{}\n\
                \tStack :\n{}\n\
                \tRegister :\n{}\n\
                }}",
            nam, opc, prc, idx, del, snd, mem, stp, sta, reg
        )
    }
}
