use questasm::{Build, Episode};
use questasm_assembler::{assemble, AssembleOptions};
use questasm_disassembler::{disassemble, find_episode, DisassemblyOptions};

fn assemble_ok(source: &str) -> Vec<u8> {
    assemble(source, &AssembleOptions::default())
        .unwrap_or_else(|err| panic!("assembly failed: {:#}", err))
}

fn reassembly_text(binary: &[u8], build: Build) -> String {
    let opts = DisassemblyOptions {
        reassembly: true,
        ..DisassemblyOptions::default()
    };
    disassemble(binary, build, &opts)
        .unwrap_or_else(|err| panic!("disassembly failed: {:#}", err))
}

fn annotated_text(binary: &[u8], build: Build) -> String {
    disassemble(binary, build, &DisassemblyOptions::default())
        .unwrap_or_else(|err| panic!("disassembly failed: {:#}", err))
}

fn code_region(binary: &[u8]) -> &[u8] {
    let code_offset = u32::from_le_bytes(binary[0..4].try_into().unwrap()) as usize;
    let table_offset = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
    &binary[code_offset..table_offset]
}

fn assert_round_trips(source: &str, build: Build) -> Vec<u8> {
    let first = assemble_ok(source);
    let text = reassembly_text(&first, build);
    let second = assemble(&text, &AssembleOptions::default())
        .unwrap_or_else(|err| panic!("reassembly failed: {:#}\n{}", err, text));
    assert_eq!(first, second, "round trip changed bytes:\n{}", text);
    first
}

#[test]
fn minimal_program_round_trips() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Hi\"
start:
  nop
  ret
";
    let binary = assert_round_trips(source, Build::BbV4);
    let text = reassembly_text(&binary, Build::BbV4);
    assert!(text.contains("nop"));
    assert!(text.contains("ret"));
}

#[test]
fn dc_nte_round_trips() {
    let source = "\
.version DC_NTE
.quest_num 0
.name \"Hi\"
start:
  nop
  ret
";
    assert_round_trips(source, Build::DcNte);
}

#[test]
fn round_trip_covers_labels_and_sets() {
    let source = "\
.version DC_V2
.quest_num 42
.language 1
.name \"Branches\"
.short_desc \"s\"
.long_desc \"l\"
start:
  leti r10, 0x00000002
  jmpi_eq r10, 0x00000002, target
  switch_jmp r10, [target, other]
  jmp_on target, [r1, r2, r3]
  ret
target:
  nop
  ret
other:
  ret
";
    assert_round_trips(source, Build::DcV2);
}

#[test]
fn round_trip_preserves_data_labels() {
    let source = "\
.version GC_V3
.quest_num 7
.name \"Data\"
start:
  get_physical_data stats
  ret
stats:
  .data 0102030405060708090A0B0C0D0E0F101112131415161718191A1B1C1D1E1F2021222324
";
    let binary = assert_round_trips(source, Build::GcV3);
    let annotated = annotated_text(&binary, Build::GcV3);
    assert!(annotated.contains("// As PlayerStats"));
}

#[test]
fn sjis_strings_round_trip() {
    let source = "\
.version DC_V2
.quest_num 3
.language 0
.name \"テスト\"
start:
  window_msg \"こんにちは\"
  ret
";
    assert_round_trips(source, Build::DcV2);
}

#[test]
fn episode_setter_is_detected() {
    let template = "\
.version GC_V3
.quest_num 1
.name \"E\"
start:
  set_episode {LITERAL}
  ret
";
    for (literal, expected) in [(0, Episode::Ep1), (1, Episode::Ep2), (2, Episode::Ep4)] {
        let source = template.replace("{LITERAL}", &literal.to_string());
        let binary = assemble_ok(&source);
        assert_eq!(find_episode(&binary, Build::GcV3).unwrap(), expected);
    }

    let source = template.replace("{LITERAL}", "3");
    let binary = assemble_ok(&source);
    assert!(find_episode(&binary, Build::GcV3).is_err());
}

#[test]
fn episode_falls_back_to_header() {
    let source = "\
.version GC_V3
.quest_num 1
.episode Episode2
.name \"E\"
start:
  nop
  ret
";
    let binary = assemble_ok(source);
    assert_eq!(find_episode(&binary, Build::GcV3).unwrap(), Episode::Ep2);
}

#[test]
fn conflicting_episodes_fail() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"E\"
start:
  set_episode 1
  set_episode 2
  ret
";
    let binary = assemble_ok(source);
    assert!(find_episode(&binary, Build::BbV4).is_err());
}

#[test]
fn dc_builds_are_always_episode_one() {
    let source = "\
.version DC_V2
.quest_num 1
.name \"E\"
start:
  ret
";
    let binary = assemble_ok(source);
    assert_eq!(find_episode(&binary, Build::DcV2).unwrap(), Episode::Ep1);
}

#[test]
fn two_byte_opcodes_encode_big_endian() {
    let source = "\
.version DC_V2
.quest_num 1
.name \"Q\"
start:
  get_difficulty_level_v2 r5
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    assert_eq!(&code[0..3], &[0xF8, 0x08, 0x05]);
    assert_round_trips(source, Build::DcV2);
}

#[test]
fn push_args_dispatch_emits_push_primitives() {
    let source = "\
.version GC_V3
.quest_num 1
.name \"Q\"
start:
  message 0x12, \"hello\"
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    // arg_pushb 0x12, arg_pushs "hello", then the message opcode itself.
    assert_eq!(&code[0..2], &[0x4A, 0x12]);
    assert_eq!(code[2], 0x4E);
    assert_eq!(&code[3..9], b"hello\0");
    assert_eq!(code[9], 0x50);
    assert_eq!(code[10], 0x01); // ret

    let text = reassembly_text(&binary, Build::GcV3);
    assert!(text.contains("arg_pushb"));
    assert!(text.contains("arg_pushs"));
    assert_round_trips(source, Build::GcV3);
}

#[test]
fn push_args_choose_width_by_magnitude() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  unlock_door2 0x300, 0x12345
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    // 0x300 needs 16 bits, 0x12345 needs 32.
    assert_eq!(&code[0..3], &[0x4B, 0x00, 0x03]);
    assert_eq!(&code[3..8], &[0x49, 0x45, 0x23, 0x01, 0x00]);
    assert_eq!(&code[8..10], &[0xF8, 0x2B]);
}

#[test]
fn register_adjacency_is_solved() {
    let source = "\
.version GC_V3
.quest_num 1
.name \"Q\"
start:
  set_shrink_size r:a, (r:b, r:c, r:d)
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    assert_eq!(&code[0..2], &[0xF8, 0xA7]);
    let a = code[2];
    let b = code[3];
    // a lands alone; b starts a three-register block placed after it.
    assert_eq!(a, 0);
    assert_eq!(b, 1);
}

#[test]
fn pinned_register_names_round_trip() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  leti r:counter@17, 0x00000005
  addi r:counter, 0x00000001
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    // leti opcode 0x09, then the pinned register number.
    assert_eq!(&code[0..2], &[0x09, 0x11]);
}

#[test]
fn unknown_opcodes_render_gracefully() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  .data AB
";
    let binary = assemble_ok(source);
    let text = reassembly_text(&binary, Build::BbV4);
    assert!(text.contains(".unknown 00AB"));

    let annotated = annotated_text(&binary, Build::BbV4);
    assert!(annotated.contains(".unknown 00AB"));
}

#[test]
fn annotated_mode_emits_offsets_and_references() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  jmp target
target:
  ret
";
    let binary = assemble_ok(source);
    let annotated = annotated_text(&binary, Build::BbV4);
    assert!(annotated.contains("start:"));
    assert!(annotated.contains("// Referenced by instruction at 0000"));
    assert!(annotated.contains("  0000  "));
}

#[test]
fn pinned_label_indexes_leave_sentinel_gaps() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  ret
blob@3:
  .data DEADBEEF
";
    let binary = assert_round_trips(source, Build::BbV4);
    let table_offset = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
    let entries: Vec<u32> = binary[table_offset..]
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[1], 0xFFFF_FFFF);
    assert_eq!(entries[2], 0xFFFF_FFFF);
}

#[test]
fn qedit_mnemonics_assemble_to_the_same_bytes() {
    let primary = "\
.version DC_V2
.quest_num 1
.name \"Q\"
start:
  jmpi_eq r1, 0x00000000, start
  ret
";
    let qedit = primary.replace("jmpi_eq", "jmpi_=");
    assert_eq!(assemble_ok(primary), assemble_ok(&qedit));
}

#[test]
fn wide_string_builds_use_utf16() {
    let source = "\
.version BB_V4
.quest_num 1
.name \"Q\"
start:
  window_msg \"Hi\"
  ret
";
    let binary = assemble_ok(source);
    let code = code_region(&binary);
    // arg_pushs, then "Hi" as UTF-16LE with a two-byte terminator.
    assert_eq!(code[0], 0x4E);
    assert_eq!(&code[1..7], &[0x48, 0x00, 0x69, 0x00, 0x00, 0x00]);
    assert_round_trips(source, Build::BbV4);
}
