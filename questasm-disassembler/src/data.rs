//! Annotated renderings for non-code label regions.
//!
//! Each data-type flag set on a label produces its own section; a label
//! reached both as code and as typed data renders every interpretation.
//! Struct fields are dumped with their absolute code offsets so the listing
//! can be cross-checked against the raw hex.

use byteorder::{ByteOrder, LittleEndian};
use questasm::{text, Build, DataType};

use crate::{DisassemblyOptions, Label};

pub(crate) const PLAYER_STATS_SIZE: usize = 0x24;
pub(crate) const PLAYER_VISUAL_CONFIG_SIZE: usize = 0x51;
pub(crate) const RESIST_DATA_SIZE: usize = 0x20;
pub(crate) const ATTACK_DATA_SIZE: usize = 0x30;
pub(crate) const MOVEMENT_DATA_SIZE: usize = 0x30;
pub(crate) const F8F2_ENTRY_SIZE: usize = 0x10;

static SECTION_NAMES: [&str; 10] = [
    "Viridia", "Greenill", "Skyly", "Bluefull", "Purplenum", "Pinkal", "Redria", "Oran",
    "Yellowboze", "Whitill",
];

static CLASS_NAMES: [&str; 12] = [
    "HUmar", "HUnewearl", "HUcast", "RAmar", "RAcast", "RAcaseal", "FOmarl", "FOnewm",
    "FOnewearl", "HUcaseal", "FOmar", "RAmarl",
];

fn name_for_section_id(section_id: u8) -> &'static str {
    SECTION_NAMES.get(section_id as usize).copied().unwrap_or("unknown")
}

fn name_for_char_class(char_class: u8) -> &'static str {
    CLASS_NAMES.get(char_class as usize).copied().unwrap_or("unknown")
}

pub(crate) fn render_annotated(
    lines: &mut Vec<String>,
    label: &Label,
    region: &[u8],
    build: Build,
    language: u8,
    opts: &DisassemblyOptions,
) {
    let base = label.offset as usize;

    if label.has_data_type(DataType::Data) {
        lines.push(format!("  // As raw data (0x{:X} bytes)", region.len()));
        lines.push(text::format_data(region, base));
    }
    if label.has_data_type(DataType::CString) {
        lines.push(format!("  // As C string (0x{:X} bytes)", region.len()));
        let mut bytes = region.to_vec();
        while bytes.last() == Some(&0) {
            bytes.pop();
        }
        if build.uses_wide_strings() && bytes.len() % 2 != 0 {
            bytes.push(0);
        }
        lines.push(format!(
            "  {:04X}  {}",
            base,
            text::escape_wire(build, language, &bytes)
        ));
    }
    if label.has_data_type(DataType::PlayerVisualConfig) {
        render_struct(lines, region, base, PLAYER_VISUAL_CONFIG_SIZE, |lines, data| {
            render_visual_config(lines, data, base, language)
        });
    }
    if label.has_data_type(DataType::PlayerStats) {
        render_struct(lines, region, base, PLAYER_STATS_SIZE, |lines, data| {
            render_player_stats(lines, data, base)
        });
    }
    if label.has_data_type(DataType::ResistData) {
        render_struct(lines, region, base, RESIST_DATA_SIZE, |lines, data| {
            render_resist_data(lines, data, base)
        });
    }
    if label.has_data_type(DataType::AttackData) {
        render_struct(lines, region, base, ATTACK_DATA_SIZE, |lines, data| {
            render_attack_data(lines, data, base)
        });
    }
    if label.has_data_type(DataType::MovementData) {
        render_struct(lines, region, base, MOVEMENT_DATA_SIZE, |lines, data| {
            render_movement_data(lines, data, base)
        });
    }
    if label.has_data_type(DataType::ImageData) {
        render_image_data(lines, region, base, opts);
    }
    if label.has_data_type(DataType::UnknownF8F2Data) {
        render_f8f2_entries(lines, region, base);
    }
}

/// Dumps a struct interpretation, then any trailing bytes as raw data. A
/// region too small for the struct is dumped raw with a note instead.
fn render_struct(
    lines: &mut Vec<String>,
    region: &[u8],
    base: usize,
    struct_size: usize,
    render: impl FnOnce(&mut Vec<String>, &[u8]),
) {
    if region.len() < struct_size {
        lines.push(format!(
            "  // As raw data (0x{:X} bytes; too small for referenced type)",
            region.len()
        ));
        lines.push(text::format_data(region, base));
        return;
    }
    render(lines, &region[..struct_size]);
    if region.len() > struct_size {
        lines.push("  // Extra data after structure".to_string());
        lines.push(text::format_data(&region[struct_size..], base + struct_size));
    }
}

fn u16_at(data: &[u8], offset: usize) -> u16 {
    LittleEndian::read_u16(&data[offset..offset + 2])
}

fn i16_at(data: &[u8], offset: usize) -> i16 {
    LittleEndian::read_i16(&data[offset..offset + 2])
}

fn u32_at(data: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&data[offset..offset + 4])
}

fn f32_at(data: &[u8], offset: usize) -> f32 {
    f32::from_bits(u32_at(data, offset))
}

fn render_visual_config(lines: &mut Vec<String>, data: &[u8], base: usize, language: u8) {
    lines.push("  // As PlayerVisualConfig".to_string());
    let mut name = &data[0x00..0x10];
    while name.last() == Some(&0) {
        name = &name[..name.len() - 1];
    }
    let name = text::decode_narrow(language, name)
        .map(|decoded| text::escape_string(&decoded))
        .unwrap_or_else(|_| text::format_data_hex(name));
    lines.push(format!("  {:04X}  name              {}", base, name));
    lines.push(format!("  {:04X}  name_color        {:08X}", base + 0x10, u32_at(data, 0x10)));
    lines.push(format!(
        "  {:04X}  a2                {}",
        base + 0x14,
        text::format_data_hex(&data[0x14..0x1D])
    ));
    lines.push(format!("  {:04X}  extra_model       {:02X}", base + 0x1D, data[0x1D]));
    lines.push(format!(
        "  {:04X}  unused            {}",
        base + 0x1E,
        text::format_data_hex(&data[0x1E..0x2D])
    ));
    lines.push(format!("  {:04X}  name_color_cs     {:08X}", base + 0x2D, u32_at(data, 0x2D)));
    lines.push(format!(
        "  {:04X}  section_id        {:02X} ({})",
        base + 0x31,
        data[0x31],
        name_for_section_id(data[0x31])
    ));
    lines.push(format!(
        "  {:04X}  char_class        {:02X} ({})",
        base + 0x32,
        data[0x32],
        name_for_char_class(data[0x32])
    ));
    lines.push(format!("  {:04X}  validation_flags  {:02X}", base + 0x33, data[0x33]));
    lines.push(format!("  {:04X}  version           {:02X}", base + 0x34, data[0x34]));
    lines.push(format!("  {:04X}  class_flags       {:08X}", base + 0x35, u32_at(data, 0x35)));
    lines.push(format!("  {:04X}  costume           {:04X}", base + 0x39, u16_at(data, 0x39)));
    lines.push(format!("  {:04X}  skin              {:04X}", base + 0x3B, u16_at(data, 0x3B)));
    lines.push(format!("  {:04X}  face              {:04X}", base + 0x3D, u16_at(data, 0x3D)));
    lines.push(format!("  {:04X}  head              {:04X}", base + 0x3F, u16_at(data, 0x3F)));
    lines.push(format!("  {:04X}  hair              {:04X}", base + 0x41, u16_at(data, 0x41)));
    lines.push(format!(
        "  {:04X}  hair_color        {:04X}, {:04X}, {:04X}",
        base + 0x43,
        u16_at(data, 0x43),
        u16_at(data, 0x45),
        u16_at(data, 0x47)
    ));
    lines.push(format!(
        "  {:04X}  proportion        {}, {}",
        base + 0x49,
        f32_at(data, 0x49),
        f32_at(data, 0x4D)
    ));
}

fn render_player_stats(lines: &mut Vec<String>, data: &[u8], base: usize) {
    lines.push("  // As PlayerStats".to_string());
    for (offset, field) in [
        (0x00, "atp"),
        (0x02, "mst"),
        (0x04, "evp"),
        (0x06, "hp"),
        (0x08, "dfp"),
        (0x0A, "ata"),
        (0x0C, "lck"),
        (0x0E, "esp"),
    ] {
        let value = u16_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:04X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* {} */",
        base + 0x10,
        "height",
        u32_at(data, 0x10),
        f32_at(data, 0x10)
    ));
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* {} */",
        base + 0x14,
        "a3",
        u32_at(data, 0x14),
        f32_at(data, 0x14)
    ));
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* level {} */",
        base + 0x18,
        "level",
        u32_at(data, 0x18),
        u32_at(data, 0x18) + 1
    ));
    for (offset, field) in [(0x1C, "experience"), (0x20, "meseta")] {
        let value = u32_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:08X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
}

fn render_resist_data(lines: &mut Vec<String>, data: &[u8], base: usize) {
    lines.push("  // As ResistData".to_string());
    for (offset, field) in [
        (0x00, "evp_bonus"),
        (0x02, "efr"),
        (0x04, "eic"),
        (0x06, "eth"),
        (0x08, "elt"),
        (0x0A, "edk"),
    ] {
        let value = u16_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:04X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
    for (offset, field) in [
        (0x0C, "a6"),
        (0x10, "a7"),
        (0x14, "a8"),
        (0x18, "a9"),
        (0x1C, "dfp_bonus"),
    ] {
        let value = u32_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:08X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
}

fn render_attack_data(lines: &mut Vec<String>, data: &[u8], base: usize) {
    lines.push("  // As AttackData".to_string());
    for (offset, field) in [(0x00, "a1"), (0x02, "atp"), (0x04, "ata_bonus")] {
        let value = i16_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:04X} /* {} */",
            base + offset,
            field,
            value as u16,
            value
        ));
    }
    lines.push(format!(
        "  {:04X}  {:<16}  {:04X} /* {} */",
        base + 0x06,
        "a4",
        u16_at(data, 0x06),
        u16_at(data, 0x06)
    ));
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* {} */",
        base + 0x08,
        "distance_x",
        u32_at(data, 0x08),
        f32_at(data, 0x08)
    ));
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* {}/65536 */",
        base + 0x0C,
        "angle_x",
        u32_at(data, 0x0C),
        u32_at(data, 0x0C)
    ));
    lines.push(format!(
        "  {:04X}  {:<16}  {:08X} /* {} */",
        base + 0x10,
        "distance_y",
        u32_at(data, 0x10),
        f32_at(data, 0x10)
    ));
    for (offset, field) in [(0x14, "a8"), (0x16, "a9"), (0x18, "a10"), (0x1A, "a11")] {
        let value = u16_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:04X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
    for (offset, field) in [
        (0x1C, "a12"),
        (0x20, "a13"),
        (0x24, "a14"),
        (0x28, "a15"),
        (0x2C, "a16"),
    ] {
        let value = u32_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:08X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
}

fn render_movement_data(lines: &mut Vec<String>, data: &[u8], base: usize) {
    lines.push("  // As MovementData".to_string());
    for (offset, field) in [
        (0x00, "idle_move_speed"),
        (0x04, "idle_anim_speed"),
        (0x08, "move_speed"),
        (0x0C, "animation_speed"),
        (0x10, "a1"),
        (0x14, "a2"),
    ] {
        lines.push(format!(
            "  {:04X}  {:<16}  {:08X} /* {} */",
            base + offset,
            field,
            u32_at(data, offset),
            f32_at(data, offset)
        ));
    }
    for (offset, field) in [
        (0x18, "a3"),
        (0x1C, "a4"),
        (0x20, "a5"),
        (0x24, "a6"),
        (0x28, "a7"),
        (0x2C, "a8"),
    ] {
        let value = u32_at(data, offset);
        lines.push(format!(
            "  {:04X}  {:<16}  {:08X} /* {} */",
            base + offset,
            field,
            value,
            value
        ));
    }
}

fn render_image_data(lines: &mut Vec<String>, region: &[u8], base: usize, opts: &DisassemblyOptions) {
    let Some(decoder) = opts.image_decoder else {
        lines.push(format!(
            "  // As compressed image data (0x{:X} bytes; no image decoder available)",
            region.len()
        ));
        lines.push(text::format_data(region, base));
        return;
    };
    match decoder.decompress(region) {
        Ok(image) => {
            lines.push(format!(
                "  // As decompressed image data (0x{:X} bytes)",
                image.data.len()
            ));
            lines.push(text::format_data(&image.data, 0));
            if image.input_bytes_used < region.len() {
                lines.push("  // Extra data after compressed data".to_string());
                lines.push(text::format_data(
                    &region[image.input_bytes_used..],
                    base + image.input_bytes_used,
                ));
            }
        }
        Err(error) => {
            lines.push(format!("  // As compressed image data (decode failed: {})", error));
            lines.push(text::format_data(region, base));
        }
    }
}

fn render_f8f2_entries(lines: &mut Vec<String>, region: &[u8], base: usize) {
    lines.push("  // As F8F2 entries".to_string());
    let mut offset = 0;
    while offset + F8F2_ENTRY_SIZE <= region.len() {
        let entry = &region[offset..offset + F8F2_ENTRY_SIZE];
        lines.push(format!(
            "  {:04X}  entry        {}, {}, {}, {}",
            base + offset,
            f32_at(entry, 0x0),
            f32_at(entry, 0x4),
            f32_at(entry, 0x8),
            f32_at(entry, 0xC)
        ));
        offset += F8F2_ENTRY_SIZE;
    }
    if offset < region.len() {
        lines.push("  // Extra data after structures".to_string());
        lines.push(text::format_data(&region[offset..], base + offset));
    }
}
