use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use std::path::PathBuf;

use ion_bytecode::bin11::{Generator, MacroContext};
use ion_bytecode::ir;
use ion_bytecode::util::{BytecodeBuffer, ConstantPool};

/// Compile a binary Ion file to bytecode and print the instruction stream.
#[derive(ClapParser, Debug)]
struct Args {
    /// Input file containing binary-encoded values.
    input: PathBuf,

    /// Byte offset to start decoding at.
    #[arg(long, default_value_t = 0)]
    offset: usize,

    /// Resolve reference instructions against the source buffer and print
    /// the materialized values alongside.
    #[arg(long)]
    materialize: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let data = std::fs::read(&args.input)
        .with_context(|| format!("unable to read {:?}", args.input))?;
    log::info!("compiling {} bytes from {:?}", data.len(), args.input);

    let mut generator = Generator::new(&data, args.offset);
    let mut bytecode = BytecodeBuffer::new();
    let mut constants = ConstantPool::new();
    generator
        .refill(&mut bytecode, &mut constants, MacroContext::default(), &[])
        .with_context(|| format!("compile pass failed in {:?}", args.input))?;

    let words = bytecode.words();
    let mut index = 0;
    while index < words.len() {
        let instruction = words[index];
        let operand_count = match ir::operand_count_bits(instruction) {
            count @ 0..=2 => count as usize,
            _ => 0,
        };
        let operand_end = (index + 1 + operand_count).min(words.len());
        let operands = &words[index + 1..operand_end];
        let line = ir::render_instruction(instruction, operands);
        let annotation = if args.materialize {
            materialize(&generator, instruction, operands)
        } else {
            None
        };
        match annotation {
            Some(value) => println!("{index:6}  {line}  ; {value}"),
            None => println!("{index:6}  {line}"),
        }
        index = operand_end;
    }

    if !constants.is_empty() {
        println!("constant pool: {} entries", constants.len());
    }
    Ok(())
}

/// Resolves a reference instruction's payload for display, if it has one.
fn materialize(generator: &Generator<'_>, instruction: i32, operands: &[i32]) -> Option<String> {
    let data = ir::data(instruction);
    let position = (*operands.first()?) as u32;
    let rendered = match ir::operation(instruction) {
        ir::op::STRING_REF | ir::op::SYMBOL_REF | ir::op::ANNOTATION_REF => generator
            .read_text_reference(position, data as u32)
            .map(|text| format!("{text:?}")),
        ir::op::BLOB_REF | ir::op::CLOB_REF => generator
            .read_bytes_reference(position, data as u32)
            .map(|slice| format!("{} bytes", slice.len())),
        ir::op::SHORT_TIMESTAMP_REF => generator
            .read_short_timestamp_reference(position, data as u8)
            .map(|value| value.to_string()),
        ir::op::TIMESTAMP_REF => generator
            .read_timestamp_reference(position, data as u32)
            .map(|value| value.to_string()),
        ir::op::INT_REF => generator
            .read_big_integer_reference(position, data as u32)
            .map(|value| value.to_string()),
        ir::op::DECIMAL_REF => generator
            .read_decimal_reference(position, data as u32)
            .map(|value| value.to_string()),
        _ => return None,
    };
    match rendered {
        Ok(text) => Some(text),
        Err(error) => Some(format!("<unreadable: {error}>")),
    }
}
