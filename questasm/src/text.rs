//! Wire-text codecs and the small lexical helpers shared by the assembler
//! and disassembler.
//!
//! DC and GC family builds store C-strings in Shift-JIS when the language
//! byte is 0 and ISO-8859 otherwise; PC and BB store UTF-16LE. The ISO-8859
//! wire form is decoded through windows-1252, which is the WHATWG superset
//! every client in this family actually renders.

use anyhow::{bail, Result};
use encoding_rs::{SHIFT_JIS, WINDOWS_1252};

use crate::Build;

/// Decodes wire bytes to UTF-8 text, failing on malformed sequences.
pub fn decode_wire(build: Build, language: u8, bytes: &[u8]) -> Result<String> {
    if build.uses_wide_strings() {
        decode_utf16le(bytes)
    } else {
        decode_narrow(language, bytes)
    }
}

/// Decodes a language-selected 8-bit string regardless of build; used for
/// byte-encoded text embedded in data structures.
pub fn decode_narrow(language: u8, bytes: &[u8]) -> Result<String> {
    let encoding = if language == 0 { SHIFT_JIS } else { WINDOWS_1252 };
    let (text, _, malformed) = encoding.decode(bytes);
    if malformed {
        bail!("malformed {} byte sequence", encoding.name());
    }
    Ok(text.into_owned())
}

/// Encodes UTF-8 text to wire bytes, without a terminator.
pub fn encode_wire(build: Build, language: u8, text: &str) -> Result<Vec<u8>> {
    if build.uses_wide_strings() {
        Ok(text
            .encode_utf16()
            .flat_map(|unit| unit.to_le_bytes())
            .collect())
    } else {
        let encoding = if language == 0 { SHIFT_JIS } else { WINDOWS_1252 };
        let (bytes, _, unmappable) = encoding.encode(text);
        if unmappable {
            bail!("text is not representable in {}", encoding.name());
        }
        Ok(bytes.into_owned())
    }
}

fn decode_utf16le(bytes: &[u8]) -> Result<String> {
    if bytes.len() % 2 != 0 {
        bail!("odd-length UTF-16 byte sequence");
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    match char::decode_utf16(units).collect::<Result<String, _>>() {
        Ok(text) => Ok(text),
        Err(_) => bail!("unpaired UTF-16 surrogate"),
    }
}

/// Renders wire bytes as a quoted, escaped source literal. Malformed text
/// falls back to a `\xHH` escape of every raw byte so the listing never
/// fails over one bad string.
pub fn escape_wire(build: Build, language: u8, bytes: &[u8]) -> String {
    match decode_wire(build, language, bytes) {
        Ok(text) => escape_string(&text),
        Err(_) => {
            let mut out = String::from("\"");
            for &b in bytes {
                out.push_str(&format!("\\x{:02X}", b));
            }
            out.push('"');
            out
        }
    }
}

/// Quotes and escapes decoded text: `\n`, `\r`, `\t`, `\'`, `\"`, `\\`, and
/// `\xHH` for remaining control bytes.
pub fn escape_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            ch if (ch as u32) < 0x20 => out.push_str(&format!("\\x{:02X}", ch as u32)),
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}

/// Parses a quoted string literal with the escapes `escape_string` emits.
pub fn parse_string_literal(source: &str) -> Result<String> {
    let inner = source
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(|| anyhow::anyhow!("string literal must be quoted"))?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                let (Some(hi), Some(lo)) = (hi, lo) else {
                    bail!("truncated \\x escape");
                };
                let value = u8::from_str_radix(&format!("{}{}", hi, lo), 16)
                    .map_err(|_| anyhow::anyhow!("invalid \\x escape"))?;
                out.push(value as char);
            }
            Some(other) => bail!("unknown escape \\{}", other),
            None => bail!("trailing backslash in string literal"),
        }
    }
    Ok(out)
}

/// Parses the hex payload of a `.data` directive; whitespace between digits
/// is ignored.
pub fn parse_data_string(source: &str) -> Result<Vec<u8>> {
    let digits: String = source.chars().filter(|ch| !ch.is_whitespace()).collect();
    if digits.len() % 2 != 0 {
        bail!("odd number of hex digits in data string");
    }
    let mut out = Vec::with_capacity(digits.len() / 2);
    for pair in digits.as_bytes().chunks_exact(2) {
        let pair = std::str::from_utf8(pair).unwrap();
        out.push(
            u8::from_str_radix(pair, 16)
                .map_err(|_| anyhow::anyhow!("invalid hex digit in data string"))?,
        );
    }
    Ok(out)
}

/// Continuous uppercase hex, as emitted after `.data`.
pub fn format_data_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}

/// Multi-line hex dump with an ASCII sidebar, 16 bytes per row, every row
/// indented two spaces. Used for raw-data sections in annotated listings.
pub fn format_data(bytes: &[u8], start_address: usize) -> String {
    let mut lines = Vec::new();
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let mut hex = String::with_capacity(47);
        let mut ascii = String::with_capacity(16);
        for (i, &b) in chunk.iter().enumerate() {
            if i > 0 {
                hex.push(' ');
            }
            hex.push_str(&format!("{:02X}", b));
            ascii.push(if (0x20..0x7F).contains(&b) { b as char } else { '.' });
        }
        lines.push(format!(
            "  {:04X}  {:<47}  {}",
            start_address + row * 16,
            hex,
            ascii
        ));
    }
    lines.join("\n")
}

/// C-style integer literal: optional sign, then `0x` hex, leading-zero
/// octal, or decimal.
pub fn parse_c_int(source: &str) -> Result<i64> {
    let source = source.trim();
    let (negative, digits) = match source.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, source.strip_prefix('+').unwrap_or(source)),
    };
    if digits.is_empty() {
        bail!("empty numeric literal");
    }
    let magnitude = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        i64::from_str_radix(hex, 16)?
    } else if digits.len() > 1 && digits.starts_with('0') {
        i64::from_str_radix(&digits[1..], 8)?
    } else {
        digits.parse::<i64>()?
    };
    Ok(if negative { -magnitude } else { magnitude })
}

/// Reads a NUL-terminated 8-bit string; the terminator is consumed but not
/// returned.
pub fn read_cstring_narrow(data: &[u8], offset: &mut usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let Some(&b) = data.get(*offset) else {
            bail!("unterminated string at end of data");
        };
        *offset += 1;
        if b == 0 {
            return Ok(out);
        }
        out.push(b);
    }
}

/// Reads a NUL-terminated little-endian UTF-16 string, returning the raw
/// bytes without the two-byte terminator.
pub fn read_cstring_wide(data: &[u8], offset: &mut usize) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    loop {
        let (Some(&lo), Some(&hi)) = (data.get(*offset), data.get(*offset + 1)) else {
            bail!("unterminated wide string at end of data");
        };
        *offset += 2;
        if lo == 0 && hi == 0 {
            return Ok(out);
        }
        out.push(lo);
        out.push(hi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_round_trip() {
        let text = "line1\nline2\t\"quoted\"\\x";
        let escaped = escape_string(text);
        assert_eq!(parse_string_literal(&escaped).unwrap(), text);
    }

    #[test]
    fn wire_encoding_fidelity() {
        for (build, language) in [
            (Build::DcV2, 0u8),
            (Build::DcV2, 1),
            (Build::GcV3, 1),
            (Build::PcV2, 1),
            (Build::BbV4, 1),
        ] {
            let text = "Quest 12 \"go\"";
            let once = encode_wire(build, language, text).unwrap();
            let decoded = decode_wire(build, language, &once).unwrap();
            assert_eq!(encode_wire(build, language, &decoded).unwrap(), once);
        }
    }

    #[test]
    fn sjis_and_wide_differ() {
        let text = "テスト";
        let sjis = encode_wire(Build::GcV3, 0, text).unwrap();
        let wide = encode_wire(Build::BbV4, 1, text).unwrap();
        assert_ne!(sjis, wide);
        assert_eq!(decode_wire(Build::GcV3, 0, &sjis).unwrap(), text);
        assert_eq!(decode_wire(Build::BbV4, 1, &wide).unwrap(), text);
    }

    #[test]
    fn c_int_literals() {
        assert_eq!(parse_c_int("0x10").unwrap(), 16);
        assert_eq!(parse_c_int("010").unwrap(), 8);
        assert_eq!(parse_c_int("10").unwrap(), 10);
        assert_eq!(parse_c_int("-5").unwrap(), -5);
        assert_eq!(parse_c_int("0").unwrap(), 0);
        assert!(parse_c_int("10q").is_err());
    }

    #[test]
    fn data_string_round_trip() {
        let bytes = vec![0x00, 0xAB, 0xFF, 0x10];
        let hex = format_data_hex(&bytes);
        assert_eq!(hex, "00ABFF10");
        assert_eq!(parse_data_string(&hex).unwrap(), bytes);
        assert_eq!(parse_data_string("00 AB FF 10").unwrap(), bytes);
    }

    #[test]
    fn cstring_readers() {
        let data = [0x41, 0x42, 0x00, 0x43];
        let mut offset = 0;
        assert_eq!(read_cstring_narrow(&data, &mut offset).unwrap(), b"AB");
        assert_eq!(offset, 3);

        let wide = [0x41, 0x00, 0x42, 0x00, 0x00, 0x00];
        let mut offset = 0;
        assert_eq!(
            read_cstring_wide(&wide, &mut offset).unwrap(),
            vec![0x41, 0x00, 0x42, 0x00]
        );
        assert_eq!(offset, 6);

        let mut offset = 0;
        assert!(read_cstring_narrow(&[0x41], &mut offset).is_err());
    }
}
