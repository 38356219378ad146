mod code;
mod data;
mod episode;

pub use episode::find_episode;

use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result};
use byteorder::{ByteOrder, LittleEndian};
use questasm::header::QuestHeader;
use questasm::{text, Build, DataType, Error, HeaderKind};

/// Slot value marking an unused function-table entry.
pub const UNUSED_FUNCTION: u32 = 0xFFFF_FFFF;

/// Capability for decompressing PRS image data referenced by
/// `call_image_data`. The codec itself is an external collaborator; without
/// one, annotated listings fall back to the raw compressed bytes.
pub trait ImageDecoder {
    fn decompress(&self, data: &[u8]) -> Result<DecodedImage>;
}

pub struct DecodedImage {
    pub data: Vec<u8>,
    pub input_bytes_used: usize,
}

#[derive(Default)]
pub struct DisassemblyOptions<'a> {
    /// Overrides the header language byte when set.
    pub language_override: Option<u8>,
    /// Emit output that reassembles to identical bytes instead of the
    /// annotated listing.
    pub reassembly: bool,
    /// Prefer qedit mnemonics where a row has one.
    pub qedit_names: bool,
    pub image_decoder: Option<&'a dyn ImageDecoder>,
}

pub(crate) struct Label {
    pub name: String,
    pub offset: u32,
    pub index: u32,
    pub type_flags: u16,
    pub references: BTreeSet<u32>,
}

impl Label {
    pub fn add_data_type(&mut self, data_type: DataType) {
        self.type_flags |= data_type.bit();
    }

    pub fn has_data_type(&self, data_type: DataType) -> bool {
        self.type_flags & data_type.bit() != 0
    }
}

/// Disassembles a compiled quest into source text for the given build.
pub fn disassemble(data: &[u8], build: Build, opts: &DisassemblyOptions) -> Result<String> {
    if !build.is_quest_build() {
        return Err(Error::UnknownBuild.into());
    }
    let header = QuestHeader::read(data, build).context("failed to read quest header")?;
    let language = header.effective_language(build, opts.language_override);

    let mut lines: Vec<String> = vec![format!(".version {}", build)];
    emit_metadata(&mut lines, &header, build, language);

    let code_start = header.code_offset as usize;
    let table_start = header.function_table_offset as usize;
    if code_start > table_start || table_start > data.len() {
        return Err(Error::MalformedBinary(format!(
            "header offsets {:08X}/{:08X} fall outside the {} byte input",
            header.code_offset,
            header.function_table_offset,
            data.len()
        ))
        .into());
    }
    let code = &data[code_start..table_start];

    // The function table runs from its offset to the end of the input;
    // a trailing partial slot is ignored.
    let mut labels: Vec<Label> = Vec::new();
    for chunk in data[table_start..].chunks_exact(4) {
        let index = labels.len() as u32;
        let name = if index == 0 {
            "start".to_string()
        } else {
            format!("label{:04X}", index)
        };
        let mut label = Label {
            name,
            offset: LittleEndian::read_u32(chunk),
            index,
            type_flags: 0,
            references: BTreeSet::new(),
        };
        if index == 0 {
            label.add_data_type(DataType::Script);
        }
        labels.push(label);
    }

    let mut pending: BTreeSet<u32> = labels
        .iter()
        .filter(|label| (label.offset as usize) < code.len())
        .map(|label| label.offset)
        .collect();

    let decoded = code::decode_all(code, build, language, &mut labels, &mut pending, opts);

    render_labels(&mut lines, code, build, language, &mut labels, &decoded, opts);

    lines.push(String::new());
    Ok(lines.join("\n"))
}

fn emit_metadata(lines: &mut Vec<String>, header: &QuestHeader, build: Build, language: u8) {
    let name = text::escape_string(&header.name(build, language));
    match build.header_kind() {
        HeaderKind::DcNte => {
            // The header carries no quest number, but the directive is
            // mandatory on the way back in.
            lines.push(".quest_num 0".to_string());
            lines.push(format!(".name {}", name));
        }
        HeaderKind::Dc | HeaderKind::Pc => {
            lines.push(format!(".quest_num {}", header.quest_number));
            lines.push(format!(".language {}", header.language));
            lines.push(format!(".name {}", name));
            push_descriptions(lines, header, build, language);
        }
        HeaderKind::Gc => {
            lines.push(format!(".quest_num {}", header.quest_number));
            lines.push(format!(".language {}", header.language));
            lines.push(format!(".episode {}", episode_directive(header.episode)));
            lines.push(format!(".name {}", name));
            push_descriptions(lines, header, build, language);
        }
        HeaderKind::Bb => {
            lines.push(format!(".quest_num {}", header.quest_number));
            lines.push(format!(".episode {}", episode_directive(header.episode)));
            lines.push(format!(
                ".max_players {}",
                if header.max_players == 0 { 4 } else { header.max_players }
            ));
            if header.joinable {
                lines.push(".joinable".to_string());
            }
            lines.push(format!(".name {}", name));
            push_descriptions(lines, header, build, language);
        }
    }
}

fn push_descriptions(lines: &mut Vec<String>, header: &QuestHeader, build: Build, language: u8) {
    lines.push(format!(
        ".short_desc {}",
        text::escape_string(&header.short_description(build, language))
    ));
    lines.push(format!(
        ".long_desc {}",
        text::escape_string(&header.long_description(build, language))
    ));
}

fn episode_directive(episode: u8) -> &'static str {
    match episode {
        0x00 => "Episode1",
        0x01 => "Episode2",
        0x02 => "Episode4",
        _ => "Episode1 // invalid value in header",
    }
}

#[allow(clippy::too_many_arguments)]
fn render_labels(
    lines: &mut Vec<String>,
    code: &[u8],
    build: Build,
    language: u8,
    labels: &mut [Label],
    decoded: &BTreeMap<u32, code::DecodedLine>,
    opts: &DisassemblyOptions,
) {
    // Labels sorted by code offset; table order breaks ties so duplicate
    // offsets render every label header.
    let mut order: Vec<usize> = (0..labels.len())
        .filter(|&i| (labels[i].offset as usize) < code.len())
        .collect();
    order.sort_by_key(|&i| (labels[i].offset, labels[i].index));

    for (position, &label_idx) in order.iter().enumerate() {
        let offset = labels[label_idx].offset;
        let end = order
            .get(position + 1)
            .map(|&next| labels[next].offset)
            .unwrap_or(code.len() as u32);
        let size = end.saturating_sub(offset);

        if size > 0 {
            lines.push(String::new());
        }
        if opts.reassembly {
            lines.push(format!(
                "{}@0x{:04X}:",
                labels[label_idx].name, labels[label_idx].index
            ));
        } else {
            lines.push(format!("{}:", labels[label_idx].name));
            let references = &labels[label_idx].references;
            if references.len() == 1 {
                lines.push(format!(
                    "  // Referenced by instruction at {:04X}",
                    references.iter().next().unwrap()
                ));
            } else if !references.is_empty() {
                let tokens: Vec<String> =
                    references.iter().map(|r| format!("{:04X}", r)).collect();
                lines.push(format!(
                    "  // Referenced by instructions at {}",
                    tokens.join(", ")
                ));
            }
        }

        if labels[label_idx].type_flags == 0 {
            lines.push("  // Could not determine data type; disassembling as code".to_string());
            labels[label_idx].add_data_type(DataType::Script);
        }

        let region = &code[offset as usize..end as usize];
        let label = &labels[label_idx];
        if opts.reassembly {
            if label.has_data_type(DataType::Script) {
                push_script_lines(lines, code, decoded, offset, end, true);
            } else {
                lines.push(format!(".data {}", text::format_data_hex(region)));
            }
        } else {
            data::render_annotated(lines, label, region, build, language, opts);
            if label.has_data_type(DataType::Script) {
                push_script_lines(lines, code, decoded, offset, end, false);
            }
        }
    }
}

/// Emits decoded lines covering [start, end). Bytes no walk reached (e.g.
/// after an unconditional ret) are preserved as data.
fn push_script_lines(
    lines: &mut Vec<String>,
    code: &[u8],
    decoded: &BTreeMap<u32, code::DecodedLine>,
    start: u32,
    end: u32,
    reassembly: bool,
) {
    let mut position = start;
    while position < end {
        if let Some(line) = decoded.get(&position) {
            lines.push(line.text.clone());
            debug_assert!(line.next_offset > position);
            position = line.next_offset;
        } else {
            let gap_end = decoded
                .range(position + 1..end)
                .next()
                .map(|(&offset, _)| offset)
                .unwrap_or(end);
            let gap = &code[position as usize..gap_end as usize];
            if reassembly {
                lines.push(format!(".data {}", text::format_data_hex(gap)));
            } else {
                lines.push(format!("  // Unreachable bytes (0x{:X})", gap.len()));
                lines.push(text::format_data(gap, position as usize));
            }
            position = gap_end;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a DC NTE quest by hand: 0x30-byte header, then code, then the
    /// function table.
    fn dc_nte_quest(code: &[u8], table: &[u32]) -> Vec<u8> {
        let code_offset = 0x30u32;
        let table_offset = code_offset + code.len() as u32;
        let size = table_offset + 4 * table.len() as u32;
        let mut data = Vec::new();
        data.extend_from_slice(&code_offset.to_le_bytes());
        data.extend_from_slice(&table_offset.to_le_bytes());
        data.extend_from_slice(&size.to_le_bytes());
        data.extend_from_slice(&0u32.to_le_bytes());
        let mut name = [0u8; 0x20];
        name[..4].copy_from_slice(b"Test");
        data.extend_from_slice(&name);
        data.extend_from_slice(code);
        for &entry in table {
            data.extend_from_slice(&entry.to_le_bytes());
        }
        data
    }

    #[test]
    fn simple_listing_has_metadata_and_code() {
        let quest = dc_nte_quest(&[0x00, 0x01, 0x00, 0x00], &[0]);
        let opts = DisassemblyOptions {
            reassembly: true,
            ..DisassemblyOptions::default()
        };
        let listing = disassemble(&quest, Build::DcNte, &opts).unwrap();
        assert!(listing.contains(".version DC_NTE"));
        assert!(listing.contains(".name \"Test\""));
        assert!(listing.contains("start@0x0000:"));
        assert!(listing.contains("nop"));
        assert!(listing.contains("ret"));
    }

    #[test]
    fn truncated_instruction_renders_failed_line() {
        // 0x04 is `thread`, which expects a 16-bit label id that is not there.
        let quest = dc_nte_quest(&[0x04], &[0]);
        let listing =
            disassemble(&quest, Build::DcNte, &DisassemblyOptions::default()).unwrap();
        assert!(listing.contains(".failed ("));
    }

    #[test]
    fn unused_table_slots_are_skipped() {
        let quest = dc_nte_quest(&[0x01, 0x00, 0x00, 0x00], &[0, UNUSED_FUNCTION]);
        let listing =
            disassemble(&quest, Build::DcNte, &DisassemblyOptions::default()).unwrap();
        assert!(listing.contains("start:"));
        assert!(!listing.contains("label0001:"));
    }

    #[test]
    fn script_reference_enqueues_target() {
        // jmp label0001 at offset 0; function 1 at offset 3 holds ret.
        let quest = dc_nte_quest(&[0x28, 0x01, 0x00, 0x01], &[0, 3]);
        let listing =
            disassemble(&quest, Build::DcNte, &DisassemblyOptions::default()).unwrap();
        assert!(listing.contains("label0001:"));
        assert!(listing.contains("// Referenced by instruction at 0000"));
    }

    #[test]
    fn out_of_range_header_offsets_are_rejected() {
        let mut quest = dc_nte_quest(&[0x01], &[0]);
        quest[4..8].copy_from_slice(&0xFFFF_FFF0u32.to_le_bytes());
        let err = disassemble(&quest, Build::DcNte, &DisassemblyOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MalformedBinary(_))
        ));
    }

    #[test]
    fn patch_builds_are_rejected() {
        let err = disassemble(&[], Build::PcPatch, &DisassemblyOptions::default())
            .unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::UnknownBuild)));
    }

    #[test]
    fn dc_episode_is_always_one() {
        let quest = dc_nte_quest(&[0x01, 0x00, 0x00, 0x00], &[0]);
        assert_eq!(
            find_episode(&quest, Build::DcNte).unwrap(),
            questasm::Episode::Ep1
        );
    }
}
