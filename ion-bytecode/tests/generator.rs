//! End-to-end tests of the compile driver: full streams in, instruction
//! words out, and lazy materialization back through the source buffer.

use ion_bytecode::bin10;
use ion_bytecode::bin11::{Generator, MacroContext};
use ion_bytecode::ir;
use ion_bytecode::util::{BytecodeBuffer, ConstantPool};
use ion_bytecode::value::Timestamp;
use ion_bytecode::DecodeError;

use pretty_assertions::assert_eq;

fn bytes(hex: &str) -> Vec<u8> {
    hex::decode(hex.replace(' ', "")).unwrap()
}

fn flex_uint(value: u32) -> Vec<u8> {
    if value < 1 << 7 {
        vec![(value << 1 | 1) as u8]
    } else if value < 1 << 14 {
        ((value << 2 | 0b10) as u16).to_le_bytes().to_vec()
    } else {
        assert!(value < 1 << 21);
        (value << 3 | 0b100).to_le_bytes()[..3].to_vec()
    }
}

fn compile(source: &[u8]) -> (Generator<'_>, BytecodeBuffer, ConstantPool) {
    let mut generator = Generator::new(source, 0);
    let mut bytecode = BytecodeBuffer::new();
    let mut constants = ConstantPool::new();
    generator
        .refill(&mut bytecode, &mut constants, MacroContext::default(), &[])
        .expect("compile pass failed");
    (generator, bytecode, constants)
}

#[test]
fn single_values_compile_to_the_documented_words() {
    // the canonical single-value scenarios
    let source = bytes("60");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(bytecode.words(), &[ir::pack_data(ir::I_INT_I16, 0), ir::I_END_OF_INPUT]);
    assert_eq!(generator.position(), 1);

    let source = bytes("61 97");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(ir::data_as_i16(bytecode.get(0)), -105);
    assert_eq!(generator.position(), 2);

    let source = bytes("6B 00 3C");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(bytecode.words()[..2], [ir::I_FLOAT_F32, 0x3F80_0000]);
    assert_eq!(f32::from_bits(bytecode.get(1) as u32), 1.0);
    assert_eq!(generator.position(), 3);

    let source = bytes("68 00 00 00 00 00 00 00 00");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(bytecode.words()[..3], [ir::I_INT_I64, 0, 0]);
    assert_eq!(generator.position(), 9);

    let source = bytes("80 35");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(ir::data(bytecode.get(0)), 0);
    assert_eq!(bytecode.get(1), 1);
    let value = generator.read_short_timestamp_reference(1, 0).unwrap();
    assert_eq!(value, Timestamp::for_year(2023).unwrap());
}

#[test]
fn string_references_round_trip_through_utf8() {
    let cases = [
        "Hello world",
        "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n<root>\n<elem>hello</elem>\n</root>\n",
        "Love it! \u{1F60D}\u{2764}\u{FE0F}\u{1F495}\u{1F63B}\u{1F496}",
        "Ἀνέβην δέ με σῖτος εὐρυβίοιο Ἰλιάδης τε καὶ Ὀδυσσείας καὶ Φοινικίων",
        "",
        "   \tleading and trailing whitespace\u{c}\r\n",
    ];
    for text in cases {
        let payload = text.as_bytes();
        let mut source = vec![0xF8];
        source.extend_from_slice(&flex_uint(payload.len() as u32));
        let payload_start = source.len() as i32;
        source.extend_from_slice(payload);

        let (generator, bytecode, _) = compile(&source);
        assert_eq!(
            bytecode.words()[..2],
            [
                ir::pack_data(ir::I_STRING_REF, payload.len() as i32),
                payload_start
            ],
            "text {text:?}"
        );
        let read = generator
            .read_text_reference(bytecode.get(1) as u32, ir::data(bytecode.get(0)) as u32)
            .unwrap();
        assert_eq!(read, text);
    }
}

#[test]
fn lob_references_expose_raw_bytes_without_copying_eagerly() {
    let payloads = ["", "A5", "00 01 02 03 FC FD FE FF"];
    for payload_hex in payloads {
        let payload = bytes(payload_hex);
        let mut source = vec![0xFE];
        source.extend_from_slice(&flex_uint(payload.len() as u32));
        source.extend_from_slice(&payload);

        let (generator, bytecode, _) = compile(&source);
        let slice = generator
            .read_bytes_reference(bytecode.get(1) as u32, ir::data(bytecode.get(0)) as u32)
            .unwrap();
        assert_eq!(slice.as_slice(), &payload[..], "payload {payload_hex}");
    }
}

#[test]
fn int_and_decimal_references_materialize_lazily() {
    let source = bytes("F5 03 2A");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(
        generator
            .read_big_integer_reference(bytecode.get(1) as u32, ir::data(bytecode.get(0)) as u32)
            .unwrap(),
        num_bigint::BigInt::from(42)
    );

    let source = bytes("F6 05 C1 87");
    let (generator, bytecode, _) = compile(&source);
    let value = generator
        .read_decimal_reference(bytecode.get(1) as u32, ir::data(bytecode.get(0)) as u32)
        .unwrap();
    assert_eq!(value, ion_bytecode::value::Decimal::from_i64(-7, 1));

    let source = bytes("F7 07 C0 0F E7");
    let (generator, bytecode, _) = compile(&source);
    let value = generator
        .read_timestamp_reference(bytecode.get(1) as u32, ir::data(bytecode.get(0)) as u32)
        .unwrap();
    assert_eq!(value, Timestamp::for_year(2023).unwrap());
}

/// Every short-form mode must agree with the legacy encoding of the same
/// instant, field for field.
#[test]
fn short_and_legacy_timestamps_agree_on_the_same_instant() {
    let cases: &[(&str, &str)] = &[
        // (short form: opcode + payload, legacy field sequence)
        ("80 35", "C0 0F E7"),
        ("81 35 05", "C0 0F E7 8A"),
        ("82 35 7D", "C0 0F E7 8A 8F"),
        ("83 35 7D CB 0A", "80 0F E7 8A 8F 8B 96"),
        ("84 35 7D CB 1A 02", "80 0F E7 8A 8F 8B 96 A1"),
        ("84 35 7D CB 12 02", "C0 0F E7 8A 8F 8B 96 A1"),
        ("85 35 7D CB 12 F2 06", "C0 0F E7 8A 8F 8B 96 A1 C3 01 BC"),
        ("86 35 7D CB 12 2E 22 1B", "C0 0F E7 8A 8F 8B 96 A1 C6 06 C8 8B"),
        (
            "87 35 7D CB 12 4A 86 FD 69",
            "C0 0F E7 8A 8F 8B 96 A1 C9 1A 7F 61 92",
        ),
        ("88 35 7D CB EA 01", "00 CB 0F E7 8A 8F 8A 87"),
        ("89 35 7D CB EA 85", "00 CB 0F E7 8A 8F 8A 87 A1"),
        ("8A 35 7D CB EA 85 BC 01", "00 CB 0F E7 8A 8F 8A 87 A1 C3 01 BC"),
        (
            "8B 35 7D CB EA 85 8B C8 06",
            "00 CB 0F E7 8A 8F 8A 87 A1 C6 06 C8 8B",
        ),
        (
            "8C 35 7D CB EA 85 92 61 7F 1A",
            "00 CB 0F E7 8A 8F 8A 87 A1 C9 1A 7F 61 92",
        ),
    ];
    for (short_hex, legacy_hex) in cases {
        let source = bytes(short_hex);
        let (generator, bytecode, _) = compile(&source);
        let mode = ir::data(bytecode.get(0)) as u8;
        let position = bytecode.get(1) as u32;
        let short = generator
            .read_short_timestamp_reference(position, mode)
            .unwrap();

        let legacy_bytes = bytes(legacy_hex);
        let legacy = bin10::read_timestamp(&legacy_bytes, 0, legacy_bytes.len()).unwrap();

        assert_eq!(short, legacy, "short {short_hex} vs legacy {legacy_hex}");
    }
}

#[test]
fn a_stream_of_every_family_keeps_absolute_offsets() {
    // IVM, null, typed null, bool, ints at several widths, floats, a
    // string, a blob, an annotation, a symbol address, short timestamps
    let mut source = Vec::new();
    let mut expected = Vec::new();

    source.extend_from_slice(&bytes("E0 01 01 EA"));
    expected.push(ir::pack_data(ir::I_IVM, 0x0101));

    source.push(0x8E);
    expected.push(ir::I_NULL_NULL);

    source.extend_from_slice(&bytes("8F 05"));
    expected.push(ir::I_NULL_TIMESTAMP);

    source.push(0x6E);
    expected.push(ir::pack_data(ir::I_BOOL, 1));

    source.push(0x60);
    expected.push(ir::pack_data(ir::I_INT_I16, 0));

    source.extend_from_slice(&bytes("62 50 FC"));
    expected.push(ir::pack_data(ir::I_INT_I16, -944));

    source.extend_from_slice(&bytes("64 57 97 13 E9"));
    expected.extend_from_slice(&[ir::I_INT_I32, -384_592_041]);

    source.extend_from_slice(&bytes("6B FF 7B"));
    expected.extend_from_slice(&[ir::I_FLOAT_F32, 0x477F_E000]);

    let text_position = source.len() as i32 + 2;
    source.extend_from_slice(&bytes("F8 07 61 2F 62"));
    expected.extend_from_slice(&[ir::pack_data(ir::I_STRING_REF, 3), text_position]);

    let blob_position = source.len() as i32 + 2;
    source.extend_from_slice(&bytes("FE 05 A5 5A"));
    expected.extend_from_slice(&[ir::pack_data(ir::I_BLOB_REF, 2), blob_position]);

    let annotation_position = source.len() as i32 + 2;
    source.extend_from_slice(&bytes("59 05 68 69"));
    expected.extend_from_slice(&[ir::pack_data(ir::I_ANNOTATION_REF, 2), annotation_position]);

    source.extend_from_slice(&bytes("E2 2A 00"));
    expected.push(ir::pack_data(ir::I_SYMBOL_SID, 298));

    let timestamp_position = source.len() as i32 + 1;
    source.extend_from_slice(&bytes("83 35 7D CB 0A"));
    expected.extend_from_slice(&[
        ir::pack_data(ir::I_SHORT_TIMESTAMP_REF, 3),
        timestamp_position,
    ]);

    expected.push(ir::I_END_OF_INPUT);

    let (generator, bytecode, constants) = compile(&source);
    assert_eq!(bytecode.words(), &expected[..]);
    assert_eq!(generator.position(), source.len());
    assert!(constants.is_empty());

    // and the references resolve against the original buffer
    assert_eq!(
        generator.read_text_reference(text_position as u32, 3).unwrap(),
        "a/b"
    );
    assert_eq!(
        generator
            .read_bytes_reference(blob_position as u32, 2)
            .unwrap()
            .as_slice(),
        &[0xA5, 0x5A]
    );
    assert_eq!(
        generator
            .read_text_reference(annotation_position as u32, 2)
            .unwrap(),
        "hi"
    );
    assert_eq!(
        generator
            .read_short_timestamp_reference(timestamp_position as u32, 3)
            .unwrap(),
        Timestamp::for_minute(2023, 10, 15, 11, 22, Some(0)).unwrap()
    );
}

#[test]
fn errors_abort_the_pass_with_position_information() {
    let source = bytes("6E 01");
    let mut generator = Generator::new(&source, 0);
    let mut bytecode = BytecodeBuffer::new();
    let mut constants = ConstantPool::new();
    let error = generator
        .refill(&mut bytecode, &mut constants, MacroContext::default(), &[])
        .unwrap_err();
    assert_eq!(
        error,
        DecodeError::Unsupported {
            opcode: 0x01,
            position: 1
        }
    );

    // a truncated fixed-width payload names the missing range
    let source = bytes("64 01 02");
    let mut generator = Generator::new(&source, 0);
    let error = generator
        .refill(&mut bytecode, &mut constants, MacroContext::default(), &[])
        .unwrap_err();
    assert_eq!(
        error,
        DecodeError::Truncated {
            start: 1,
            length: 4,
            limit: 3
        }
    );
}

#[test]
fn compiling_does_not_touch_reference_payload_bytes() {
    // the string payload is invalid UTF-8; compiling must succeed anyway
    // because the payload is only validated on materialization
    let source = bytes("F8 05 FF FE");
    let (generator, bytecode, _) = compile(&source);
    assert_eq!(ir::data(bytecode.get(0)), 2);
    assert!(matches!(
        generator.read_text_reference(2, 2),
        Err(DecodeError::Malformed { .. })
    ));
}
