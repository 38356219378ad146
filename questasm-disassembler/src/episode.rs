//! Episode detection: a linear decode of function 0 looking for the
//! `set_episode` opcode.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use byteorder::{ByteOrder, LittleEndian};
use questasm::header::QuestHeader;
use questasm::opcodes::opcodes_for_build;
use questasm::{text, ArgType, Build, Episode, Error, HeaderKind};

/// Determines which episode a compiled quest targets.
///
/// DC and PC builds predate episode selection and always run Episode 1.
/// For the rest, function 0 is scanned for `set_episode`; if the scan finds
/// nothing (or fails to decode), the header's episode byte is used.
pub fn find_episode(data: &[u8], build: Build) -> Result<Episode> {
    if !build.is_quest_build() {
        return Err(Error::UnknownBuild.into());
    }
    match build.header_kind() {
        HeaderKind::DcNte | HeaderKind::Dc | HeaderKind::Pc => return Ok(Episode::Ep1),
        HeaderKind::Gc | HeaderKind::Bb => {}
    }

    let header = QuestHeader::read(data, build)?;
    let header_episode = Episode::from_quest_number(header.episode as u32)?;

    let operands = match scan_function_zero(data, &header, build) {
        Ok(operands) => operands,
        Err(error) => {
            log::warn!("cannot determine episode from quest script ({})", error);
            return Ok(header_episode);
        }
    };

    // Structural decode failures fall back to the header, but a set_episode
    // with a nonsense operand is a real script defect and surfaces as one.
    // 0x00 and 0xFF both canonicalize to Episode 1.
    let mut found = BTreeSet::new();
    for operand in operands {
        found.insert(Episode::from_quest_number(operand)?.quest_number());
    }

    match found.len() {
        0 => Ok(header_episode),
        1 => Ok(Episode::from_quest_number(
            found.iter().next().copied().unwrap() as u32,
        )?),
        _ => Err(Error::MultipleEpisodes.into()),
    }
}

/// Walks function 0 skipping argument bytes by the disassembler's rules and
/// collects every `set_episode` operand. F_ARGS opcodes carry no inline
/// argument bytes on these builds.
fn scan_function_zero(data: &[u8], header: &QuestHeader, build: Build) -> Result<BTreeSet<u32>> {
    let table_offset = header.function_table_offset as usize;
    if table_offset + 4 > data.len() {
        bail!("function table is out of bounds");
    }
    let entry = LittleEndian::read_u32(&data[table_offset..table_offset + 4]) as usize;
    let start = header.code_offset as usize + entry;
    if start >= data.len() {
        bail!("function 0 offset is out of bounds");
    }

    let opcodes = opcodes_for_build(build);
    let wide = build.uses_wide_strings();
    let mut found = BTreeSet::new();
    let mut offset = start;
    while offset < data.len() {
        let mut opcode = data[offset] as u16;
        offset += 1;
        if opcode & 0xFE == 0xF8 {
            if offset >= data.len() {
                bail!("truncated two-byte opcode");
            }
            opcode = (opcode << 8) | data[offset] as u16;
            offset += 1;
        }

        let Some(def) = opcodes.get(&opcode).copied() else {
            bail!("unknown quest opcode {:04X}", opcode);
        };
        if def.is_ret() {
            break;
        }
        if def.consumes_args() {
            continue;
        }

        for arg in def.args {
            match arg.ty {
                ArgType::Label16 => skip(data, &mut offset, 2)?,
                ArgType::Label32 => skip(data, &mut offset, 4)?,
                ArgType::Label16Set => {
                    let count = byte_at(data, &mut offset)?;
                    skip(data, &mut offset, count as usize * 2)?;
                }
                ArgType::Reg => skip(data, &mut offset, 1)?,
                ArgType::Reg32 => skip(data, &mut offset, 4)?,
                ArgType::RegSet => {
                    let count = byte_at(data, &mut offset)?;
                    skip(data, &mut offset, count as usize)?;
                }
                ArgType::RegSetFixed => skip(data, &mut offset, 1)?,
                ArgType::Reg32SetFixed => skip(data, &mut offset, 4)?,
                ArgType::Int8 => skip(data, &mut offset, 1)?,
                ArgType::Int16 => skip(data, &mut offset, 2)?,
                ArgType::Int32 => {
                    if def.sets_episode() {
                        if offset + 4 > data.len() {
                            bail!("truncated set_episode operand");
                        }
                        found.insert(LittleEndian::read_u32(&data[offset..offset + 4]));
                        offset += 4;
                    } else {
                        skip(data, &mut offset, 4)?;
                    }
                }
                ArgType::Float32 => skip(data, &mut offset, 4)?,
                ArgType::CString => {
                    if wide {
                        text::read_cstring_wide(data, &mut offset)?;
                    } else {
                        text::read_cstring_narrow(data, &mut offset)?;
                    }
                }
            }
        }
    }
    Ok(found)
}

fn byte_at(data: &[u8], offset: &mut usize) -> Result<u8> {
    let Some(&value) = data.get(*offset) else {
        bail!("unexpected end of code");
    };
    *offset += 1;
    Ok(value)
}

fn skip(data: &[u8], offset: &mut usize, len: usize) -> Result<()> {
    if *offset + len > data.len() {
        bail!("unexpected end of code");
    }
    *offset += len;
    Ok(())
}
