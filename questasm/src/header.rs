//! The five packed quest-header layouts.
//!
//! All fields are little-endian. Text fields are fixed-width and NUL-padded;
//! their width is in bytes for the 8-bit families and doubled for the
//! UTF-16LE families (PC, BB).

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

use crate::{text, Build, Episode, Error, HeaderKind};

const NAME_UNITS: usize = 0x20;
const SHORT_DESC_UNITS: usize = 0x80;
const LONG_DESC_UNITS: usize = 0x120;

/// Byte length of the header for a build.
pub fn header_len(build: Build) -> usize {
    match build.header_kind() {
        HeaderKind::DcNte => 0x10 + NAME_UNITS,
        HeaderKind::Dc | HeaderKind::Gc => {
            0x14 + NAME_UNITS + SHORT_DESC_UNITS + LONG_DESC_UNITS
        }
        HeaderKind::Pc => 0x14 + 2 * (NAME_UNITS + SHORT_DESC_UNITS + LONG_DESC_UNITS),
        HeaderKind::Bb => 0x18 + 2 * (NAME_UNITS + SHORT_DESC_UNITS + LONG_DESC_UNITS),
    }
}

/// A decoded quest header. Text fields are kept as raw wire bytes because
/// their encoding depends on the effective language, which the caller may
/// override after reading.
#[derive(Debug)]
pub struct QuestHeader {
    pub code_offset: u32,
    pub function_table_offset: u32,
    pub size: u32,
    pub language: u8,
    pub quest_number: u16,
    pub episode: u8,
    pub max_players: u8,
    pub joinable: bool,
    name_raw: Vec<u8>,
    short_desc_raw: Vec<u8>,
    long_desc_raw: Vec<u8>,
}

impl QuestHeader {
    pub fn read(data: &[u8], build: Build) -> Result<QuestHeader> {
        if data.len() < header_len(build) {
            return Err(Error::MalformedBinary(format!(
                "quest data is shorter than the {} header",
                build
            ))
            .into());
        }
        let mut cursor = Cursor::new(data);
        let code_offset = cursor.read_u32::<LittleEndian>()?;
        let function_table_offset = cursor.read_u32::<LittleEndian>()?;
        let size = cursor.read_u32::<LittleEndian>()?;
        let _unused = cursor.read_u32::<LittleEndian>()?;

        let mut header = QuestHeader {
            code_offset,
            function_table_offset,
            size,
            language: 0,
            quest_number: 0,
            episode: 0,
            max_players: 0,
            joinable: false,
            name_raw: Vec::new(),
            short_desc_raw: Vec::new(),
            long_desc_raw: Vec::new(),
        };

        match build.header_kind() {
            HeaderKind::DcNte => {
                header.name_raw = read_text_field(&mut cursor, NAME_UNITS)?;
            }
            HeaderKind::Dc => {
                header.language = cursor.read_u8()?;
                let _unknown = cursor.read_u8()?;
                header.quest_number = cursor.read_u16::<LittleEndian>()?;
                header.read_text_fields(&mut cursor, 1)?;
            }
            HeaderKind::Pc => {
                header.language = cursor.read_u8()?;
                let _unknown = cursor.read_u8()?;
                header.quest_number = cursor.read_u16::<LittleEndian>()?;
                header.read_text_fields(&mut cursor, 2)?;
            }
            HeaderKind::Gc => {
                header.language = cursor.read_u8()?;
                let _unknown = cursor.read_u8()?;
                header.quest_number = cursor.read_u8()? as u16;
                header.episode = cursor.read_u8()?;
                header.read_text_fields(&mut cursor, 1)?;
            }
            HeaderKind::Bb => {
                header.quest_number = cursor.read_u16::<LittleEndian>()?;
                let _unused2 = cursor.read_u16::<LittleEndian>()?;
                header.episode = cursor.read_u8()?;
                header.max_players = cursor.read_u8()?;
                header.joinable = cursor.read_u8()? != 0;
                let _unknown = cursor.read_u8()?;
                header.read_text_fields(&mut cursor, 2)?;
            }
        }
        Ok(header)
    }

    fn read_text_fields(&mut self, cursor: &mut Cursor<&[u8]>, unit_size: usize) -> Result<()> {
        self.name_raw = read_text_field(cursor, NAME_UNITS * unit_size)?;
        self.short_desc_raw = read_text_field(cursor, SHORT_DESC_UNITS * unit_size)?;
        self.long_desc_raw = read_text_field(cursor, LONG_DESC_UNITS * unit_size)?;
        Ok(())
    }

    /// Language used to decode header and code strings: the override when
    /// given, else the header byte clamped to the build's supported range.
    pub fn effective_language(&self, build: Build, language_override: Option<u8>) -> u8 {
        if let Some(language) = language_override {
            return language;
        }
        match build.language_limit() {
            Some(limit) if self.language < limit => self.language,
            Some(_) => 1,
            None => match build.header_kind() {
                HeaderKind::DcNte => 0,
                _ => 1,
            },
        }
    }

    pub fn name(&self, build: Build, language: u8) -> String {
        decode_text_field(build, language, &self.name_raw)
    }

    pub fn short_description(&self, build: Build, language: u8) -> String {
        decode_text_field(build, language, &self.short_desc_raw)
    }

    pub fn long_description(&self, build: Build, language: u8) -> String {
        decode_text_field(build, language, &self.long_desc_raw)
    }
}

fn read_text_field(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; len];
    std::io::Read::read_exact(cursor, &mut buffer)?;
    Ok(buffer)
}

fn decode_text_field(build: Build, language: u8, raw: &[u8]) -> String {
    let trimmed = if build.uses_wide_strings() {
        let mut end = raw.len() & !1;
        while end >= 2 && raw[end - 2] == 0 && raw[end - 1] == 0 {
            end -= 2;
        }
        &raw[..end]
    } else {
        let mut end = raw.len();
        while end > 0 && raw[end - 1] == 0 {
            end -= 1;
        }
        &raw[..end]
    };
    text::decode_wire(build, language, trimmed).unwrap_or_else(|_| {
        // A garbled field should not sink the whole listing.
        trimmed.iter().map(|&b| b as char).collect()
    })
}

/// Metadata the assembler collects from directives, used to emit a header.
#[derive(Debug, Clone)]
pub struct QuestMeta {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub quest_number: u16,
    pub language: u8,
    pub episode: Episode,
    pub max_players: u8,
    pub joinable: bool,
}

/// Appends the build's header for a quest with the given code and function
/// table lengths.
pub fn write_header(
    out: &mut Vec<u8>,
    build: Build,
    meta: &QuestMeta,
    code_len: usize,
    function_table_len: usize,
) -> Result<()> {
    let code_offset = header_len(build) as u32;
    let function_table_offset = code_offset + code_len as u32;
    let size = function_table_offset + function_table_len as u32;

    out.write_u32::<LittleEndian>(code_offset)?;
    out.write_u32::<LittleEndian>(function_table_offset)?;
    out.write_u32::<LittleEndian>(size)?;
    out.write_u32::<LittleEndian>(0)?; // unused

    match build.header_kind() {
        HeaderKind::DcNte => {
            write_text_field(out, build, 0, &meta.name, NAME_UNITS)?;
        }
        HeaderKind::Dc | HeaderKind::Pc => {
            out.write_u8(meta.language)?;
            out.write_u8(0)?;
            out.write_u16::<LittleEndian>(meta.quest_number)?;
            write_text_fields(out, build, meta)?;
        }
        HeaderKind::Gc => {
            out.write_u8(meta.language)?;
            out.write_u8(0)?;
            out.write_u8(meta.quest_number as u8)?;
            // GC predates Episode 4; anything that is not Episode 2 writes 0.
            out.write_u8(if meta.episode == Episode::Ep2 { 1 } else { 0 })?;
            write_text_fields(out, build, meta)?;
        }
        HeaderKind::Bb => {
            out.write_u16::<LittleEndian>(meta.quest_number)?;
            out.write_u16::<LittleEndian>(0)?;
            out.write_u8(meta.episode.quest_number())?;
            out.write_u8(meta.max_players)?;
            out.write_u8(meta.joinable as u8)?;
            out.write_u8(0)?;
            write_text_fields(out, build, meta)?;
        }
    }
    Ok(())
}

fn write_text_fields(out: &mut Vec<u8>, build: Build, meta: &QuestMeta) -> Result<()> {
    let unit_size = if build.uses_wide_strings() { 2 } else { 1 };
    write_text_field(out, build, meta.language, &meta.name, NAME_UNITS * unit_size)?;
    write_text_field(
        out,
        build,
        meta.language,
        &meta.short_description,
        SHORT_DESC_UNITS * unit_size,
    )?;
    write_text_field(
        out,
        build,
        meta.language,
        &meta.long_description,
        LONG_DESC_UNITS * unit_size,
    )?;
    Ok(())
}

fn write_text_field(
    out: &mut Vec<u8>,
    build: Build,
    language: u8,
    value: &str,
    len: usize,
) -> Result<()> {
    let mut encoded = text::encode_wire(build, language, value)
        .with_context(|| format!("cannot encode header text {:?}", value))?;
    if encoded.len() > len {
        bail!("header text {:?} does not fit in {} bytes", value, len);
    }
    encoded.resize(len, 0);
    out.extend_from_slice(&encoded);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_meta() -> QuestMeta {
        QuestMeta {
            name: "Test Quest".to_string(),
            short_description: "short".to_string(),
            long_description: "long description".to_string(),
            quest_number: 0x0121,
            language: 1,
            episode: Episode::Ep2,
            max_players: 4,
            joinable: true,
        }
    }

    #[test]
    fn header_round_trip_bb() {
        let meta = sample_meta();
        let mut data = Vec::new();
        write_header(&mut data, Build::BbV4, &meta, 0x40, 0x10).unwrap();
        assert_eq!(data.len(), header_len(Build::BbV4));
        data.resize(data.len() + 0x50, 0);

        let header = QuestHeader::read(&data, Build::BbV4).unwrap();
        assert_eq!(header.code_offset, header_len(Build::BbV4) as u32);
        assert_eq!(header.function_table_offset, header.code_offset + 0x40);
        assert_eq!(header.size, header.function_table_offset + 0x10);
        assert_eq!(header.quest_number, 0x0121);
        assert_eq!(header.episode, 1);
        assert_eq!(header.max_players, 4);
        assert!(header.joinable);
        assert_eq!(header.name(Build::BbV4, 1), "Test Quest");
        assert_eq!(header.long_description(Build::BbV4, 1), "long description");
    }

    #[test]
    fn header_round_trip_gc() {
        let mut meta = sample_meta();
        meta.quest_number = 0x21;
        let mut data = Vec::new();
        write_header(&mut data, Build::GcV3, &meta, 8, 4).unwrap();
        data.resize(data.len() + 0x10, 0);

        let header = QuestHeader::read(&data, Build::GcV3).unwrap();
        assert_eq!(header.quest_number, 0x21);
        assert_eq!(header.episode, 1);
        assert_eq!(header.language, 1);
        assert_eq!(header.name(Build::GcV3, 1), "Test Quest");
    }

    #[test]
    fn effective_language_clamps() {
        let mut data = Vec::new();
        let mut meta = sample_meta();
        meta.language = 7;
        write_header(&mut data, Build::DcV2, &meta, 0, 0).unwrap();
        data.resize(data.len() + 4, 0);
        let header = QuestHeader::read(&data, Build::DcV2).unwrap();
        assert_eq!(header.effective_language(Build::DcV2, None), 1);
        assert_eq!(header.effective_language(Build::DcV2, Some(3)), 3);

        let mut data = Vec::new();
        meta.language = 7;
        write_header(&mut data, Build::PcV2, &meta, 0, 0).unwrap();
        data.resize(data.len() + 4, 0);
        let header = QuestHeader::read(&data, Build::PcV2).unwrap();
        assert_eq!(header.effective_language(Build::PcV2, None), 7);
    }

    #[test]
    fn short_input_is_rejected() {
        let data = vec![0u8; 8];
        assert!(QuestHeader::read(&data, Build::BbV4).is_err());
    }
}
