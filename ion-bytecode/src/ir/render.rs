//! Human-readable rendering of instruction streams, for the disassembler
//! and for diagnostics.

use super::{data, describe, operand_count_bits, operation, DataFormat, OperandFormat};

fn combine(msb: i32, lsb: i32) -> i64 {
    ((msb as i64) << 32) | (lsb as i64 & 0xFFFF_FFFF)
}

fn render_data(format: DataFormat, data: i32) -> String {
    match format {
        DataFormat::None => String::new(),
        DataFormat::CpIndex => format!("{data}"),
        DataFormat::Sid => format!("${data}"),
        DataFormat::I16 => format!("{}", data as u16 as i16),
        DataFormat::Char => char::from_u32(data as u32)
            .map(|c| format!("{c:?}"))
            .unwrap_or_else(|| format!("\\u{{{data:x}}}")),
        DataFormat::Boolean => format!("{}", data == 1),
        DataFormat::BytecodeLength | DataFormat::RefLength => format!("L={data}"),
        DataFormat::Opcode => format!("0x{data:02X}"),
        DataFormat::MacroId => format!("{data}"),
        DataFormat::Ivm => format!("{}.{}", data >> 8, data & 0xFF),
    }
}

fn render_operands(format: OperandFormat, operands: &[i32]) -> String {
    match (format, operands) {
        (OperandFormat::None, _) => String::new(),
        (OperandFormat::I32, [value, ..]) => format!("{value}"),
        (OperandFormat::I64, [msb, lsb, ..]) => format!("{}", combine(*msb, *lsb)),
        (OperandFormat::F32, [bits, ..]) => format!("{:?}", f32::from_bits(*bits as u32)),
        (OperandFormat::F64, [msb, lsb, ..]) => {
            format!("{:?}", f64::from_bits(combine(*msb, *lsb) as u64))
        }
        (OperandFormat::Offset, [offset, ..]) => {
            format!("offset={}", *offset as i64 & 0xFFFF_FFFF)
        }
        (OperandFormat::Row, [row, ..]) => format!("row={row}"),
        // a truncated stream; render what we can see
        _ => "<missing operands>".to_string(),
    }
}

/// Renders a single instruction with its operand words (which may be empty
/// for zero-operand instructions).
pub fn render_instruction(instruction: i32, operands: &[i32]) -> String {
    let operation = operation(instruction);
    let Some(described) = describe(operation) else {
        return format!("<unknown operation 0x{operation:02X}>");
    };
    let mut line = format!("{:<20}", described.name);
    let data_text = render_data(described.data, data(instruction));
    if !data_text.is_empty() {
        line.push(' ');
        line.push_str(&data_text);
    }
    let operand_text = render_operands(described.operands, operands);
    if !operand_text.is_empty() {
        line.push(' ');
        line.push_str(&operand_text);
    }
    line.trim_end().to_string()
}

/// Renders a whole stream, one line per instruction, consuming operand
/// words as declared by each instruction's operand count.
pub fn render_stream(words: &[i32]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut index = 0;
    while index < words.len() {
        let instruction = words[index];
        index += 1;
        let operand_count = match operand_count_bits(instruction) {
            count @ 0..=2 => count as usize,
            // container contents are themselves instructions
            _ => 0,
        };
        let end = (index + operand_count).min(words.len());
        lines.push(render_instruction(instruction, &words[index..end]));
        index = end;
    }
    lines
}

#[cfg(test)]
mod tests {
    use crate::ir;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_immediates_and_references() {
        assert_eq!(
            super::render_instruction(ir::pack_data(ir::I_INT_I16, -105), &[]),
            "int_i16              -105"
        );
        assert_eq!(
            super::render_instruction(ir::pack_data(ir::I_STRING_REF, 11), &[2]),
            "string_ref           L=11 offset=2"
        );
        assert_eq!(
            super::render_instruction(ir::I_FLOAT_F64, &[0x3FF0_0000u32 as i32, 0]),
            "float_f64            1.0"
        );
        assert_eq!(
            super::render_instruction(ir::pack_data(ir::I_BOOL, 1), &[]),
            "bool                 true"
        );
        assert_eq!(
            super::render_instruction(ir::pack_data(ir::I_IVM, 0x0101), &[]),
            "ivm                  1.1"
        );
    }

    #[test]
    fn walks_a_stream_by_operand_count() {
        let words = [
            ir::pack_data(ir::I_INT_I16, 5),
            ir::I_INT_I64,
            0,
            -1,
            ir::I_END_OF_INPUT,
        ];
        let lines = super::render_stream(&words);
        assert_eq!(
            lines,
            vec![
                "int_i16              5".to_string(),
                "int_i64              4294967295".to_string(),
                "end_of_input".to_string(),
            ]
        );
    }
}
