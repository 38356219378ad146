//! Per-argument encoders for both dispatch styles.
//!
//! Direct mode writes each argument inline after the opcode. Push-args mode
//! (V3/V4 rows flagged as stack consumers) emits one push primitive per
//! argument before the opcode itself; the primitive is chosen by the
//! argument's syntax and the consumer's expected shape.

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use questasm::{text, ArgDef, ArgType, Error};

use crate::registers::RegisterAllocator;
use crate::{CodeGen, LabelTable};

const OP_ARG_PUSHR: u8 = 0x48;
const OP_ARG_PUSHL: u8 = 0x49;
const OP_ARG_PUSHB: u8 = 0x4A;
const OP_ARG_PUSHW: u8 = 0x4B;
const OP_ARG_PUSHA: u8 = 0x4C;
const OP_ARG_PUSHO: u8 = 0x4D;
const OP_ARG_PUSHS: u8 = 0x4E;

/// Splits an operand list on top-level commas; brackets, parentheses, and
/// string literals shield nested commas.
pub(crate) fn split_args(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for ch in input.chars() {
        if in_string {
            current.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => {
                in_string = true;
                current.push(ch);
            }
            '(' | '[' => {
                depth += 1;
                current.push(ch);
            }
            ')' | ']' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ',' if depth == 0 => {
                parts.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }
    if !current.trim().is_empty() || !parts.is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

/// Parses `rN`, `fN`, `r:name`, or `r:name@N`.
pub(crate) fn parse_reg(
    regs: &mut RegisterAllocator,
    arg: &str,
    allow_unnumbered: bool,
) -> Result<usize> {
    if arg.len() < 2 {
        return Err(Error::ArgTypeMismatch("register argument is too short".to_string()).into());
    }
    let mut chars = arg.chars();
    let first = chars.next().unwrap();
    if first != 'r' && first != 'f' {
        return Err(Error::ArgTypeMismatch(format!("a register is required, found {:?}", arg)).into());
    }

    let rest = &arg[1..];
    let (name, number) = if let Some(spec) = rest.strip_prefix(':') {
        match spec.split_once('@') {
            Some((name, number)) => (Some(name), Some(parse_reg_number(number)?)),
            None => (Some(spec), None),
        }
    } else {
        (None, Some(parse_reg_number(rest)?))
    };

    if let Some(name) = name {
        if name.is_empty() {
            return Err(Error::ArgTypeMismatch("register name is empty".to_string()).into());
        }
    }
    if !allow_unnumbered && number.is_none() {
        return Err(Error::ArgTypeMismatch("a numbered register is required".to_string()).into());
    }
    regs.get_or_create(name, number)
}

fn parse_reg_number(digits: &str) -> Result<u8> {
    let value = text::parse_c_int(digits)
        .map_err(|_| Error::ArgTypeMismatch(format!("invalid register number {:?}", digits)))?;
    if !(0..=0xFF).contains(&value) {
        return Err(Error::ArgTypeMismatch(format!("register number {} out of range", value)).into());
    }
    Ok(value as u8)
}

/// Parses a fixed adjacent register group: `(a, b, c)` with any mix of named
/// and numbered registers, `rA-rZ` with numbered endpoints, or a single
/// numbered `rA` implying the following `count - 1` registers.
pub(crate) fn parse_reg_set_fixed(
    regs: &mut RegisterAllocator,
    arg: &str,
    expected: usize,
) -> Result<Vec<usize>> {
    if expected == 0 || arg.is_empty() {
        return Err(
            Error::ArgTypeMismatch("no registers specified for fixed register set".to_string())
                .into(),
        );
    }

    let mut chain = Vec::with_capacity(expected);
    if arg.starts_with('(') && arg.ends_with(')') {
        let tokens: Vec<&str> = arg[1..arg.len() - 1].split(',').map(str::trim).collect();
        if tokens.len() != expected {
            return Err(Error::ArgCountMismatch { expected, found: tokens.len() }.into());
        }
        for token in tokens {
            chain.push(parse_reg(regs, token, true)?);
            if chain.len() > 1 {
                regs.constrain(chain[chain.len() - 2], chain[chain.len() - 1])?;
            }
        }
    } else {
        let tokens: Vec<&str> = arg.split('-').collect();
        match tokens.len() {
            1 => {
                chain.push(parse_reg(regs, tokens[0], false)?);
                while chain.len() < expected {
                    let next_number = regs
                        .number_of(*chain.last().unwrap())
                        .expect("range chain registers are always numbered")
                        .wrapping_add(1);
                    chain.push(regs.get_or_create(None, Some(next_number))?);
                    regs.constrain(chain[chain.len() - 2], chain[chain.len() - 1])?;
                }
            }
            2 => {
                chain.push(parse_reg(regs, tokens[0], false)?);
                while chain.len() < expected - 1 {
                    let next_number = regs
                        .number_of(*chain.last().unwrap())
                        .expect("range chain registers are always numbered")
                        .wrapping_add(1);
                    chain.push(regs.get_or_create(None, Some(next_number))?);
                    regs.constrain(chain[chain.len() - 2], chain[chain.len() - 1])?;
                }
                chain.push(parse_reg(regs, tokens[1], false)?);
                let first = regs.number_of(chain[0]).unwrap();
                let last = regs.number_of(*chain.last().unwrap()).unwrap();
                if last.wrapping_sub(first) as usize + 1 != expected {
                    return Err(Error::ArgTypeMismatch(format!(
                        "register range r{}-r{} does not cover {} registers",
                        first, last, expected
                    ))
                    .into());
                }
                regs.constrain(chain[chain.len() - 2], chain[chain.len() - 1])?;
            }
            _ => {
                return Err(
                    Error::ArgTypeMismatch("invalid fixed register set syntax".to_string()).into(),
                );
            }
        }
    }
    Ok(chain)
}

fn reg_byte(regs: &RegisterAllocator, idx: usize) -> u8 {
    // Placeholder for not-yet-numbered registers; patched after assignment.
    regs.number_of(idx).unwrap_or(0xFF)
}

fn lookup_label(labels: &LabelTable, name: &str) -> Result<u32> {
    labels
        .index_of(name)
        .ok_or_else(|| Error::UndefinedLabel(name.to_string()).into())
}

/// Writes the wire bytes for a string literal (`"…"` with escapes, or
/// `bin:"…"` raw bytes) followed by the build's NUL terminator.
fn encode_cstring(gen: &mut CodeGen, arg: &str) -> Result<()> {
    let bytes = if let Some(raw) = arg.strip_prefix("bin:") {
        let literal = text::parse_string_literal(raw.trim())?;
        let mut bytes = Vec::with_capacity(literal.len());
        for ch in literal.chars() {
            let code = ch as u32;
            if code > 0xFF {
                bail!("bin: literal contains a non-byte character {:?}", ch);
            }
            bytes.push(code as u8);
        }
        bytes
    } else {
        let literal = text::parse_string_literal(arg)?;
        text::encode_wire(gen.build, gen.language, &literal)?
    };
    gen.code.extend_from_slice(&bytes);
    gen.code.push(0);
    if gen.build.uses_wide_strings() {
        gen.code.push(0);
    }
    Ok(())
}

fn parse_int_arg(arg: &str) -> Result<i64> {
    text::parse_c_int(arg)
        .map_err(|_| Error::ArgTypeMismatch(format!("invalid integer literal {:?}", arg)).into())
}

/// Direct-mode encoder: one writer per argument type.
pub(crate) fn encode_direct(
    gen: &mut CodeGen,
    labels: &LabelTable,
    arg: &str,
    arg_def: &ArgDef,
) -> Result<()> {
    match arg_def.ty {
        ArgType::Label16 => {
            let index = lookup_label(labels, arg)?;
            gen.code.write_u16::<LittleEndian>(index as u16)?;
        }
        ArgType::Label32 => {
            let index = lookup_label(labels, arg)?;
            gen.code.write_u32::<LittleEndian>(index)?;
        }
        ArgType::Label16Set => {
            let inner = arg
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| {
                    Error::ArgTypeMismatch(
                        "set-valued argument requires [a, b, ...] syntax".to_string(),
                    )
                })?;
            let names: Vec<&str> = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            if names.len() > 0xFF {
                bail!("too many labels in set-valued argument");
            }
            gen.code.push(names.len() as u8);
            for name in names {
                let index = lookup_label(labels, name)?;
                gen.code.write_u16::<LittleEndian>(index as u16)?;
            }
        }
        ArgType::Reg => {
            let reg = parse_reg(&mut gen.regs, arg, true)?;
            gen.regs.record_patch(reg, gen.code.len());
            let byte = reg_byte(&gen.regs, reg);
            gen.code.push(byte);
        }
        ArgType::Reg32 => {
            let reg = parse_reg(&mut gen.regs, arg, true)?;
            gen.regs.record_patch(reg, gen.code.len());
            let byte = reg_byte(&gen.regs, reg);
            gen.code.write_u32::<LittleEndian>(byte as u32)?;
        }
        ArgType::RegSetFixed | ArgType::Reg32SetFixed => {
            let chain = parse_reg_set_fixed(&mut gen.regs, arg, arg_def.count as usize)?;
            gen.regs.record_patch(chain[0], gen.code.len());
            let byte = reg_byte(&gen.regs, chain[0]);
            if arg_def.ty == ArgType::Reg32SetFixed {
                gen.code.write_u32::<LittleEndian>(byte as u32)?;
            } else {
                gen.code.push(byte);
            }
        }
        ArgType::RegSet => {
            let inner = arg
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .ok_or_else(|| {
                    Error::ArgTypeMismatch(
                        "set-valued argument requires [r1, r2, ...] syntax".to_string(),
                    )
                })?;
            let tokens: Vec<&str> = if inner.trim().is_empty() {
                Vec::new()
            } else {
                inner.split(',').map(str::trim).collect()
            };
            if tokens.len() > 0xFF {
                bail!("too many registers in set-valued argument");
            }
            gen.code.push(tokens.len() as u8);
            for token in tokens {
                let reg = parse_reg(&mut gen.regs, token, true)?;
                gen.regs.record_patch(reg, gen.code.len());
                let byte = reg_byte(&gen.regs, reg);
                gen.code.push(byte);
            }
        }
        ArgType::Int8 => {
            let value = parse_int_arg(arg)?;
            gen.code.push(value as u8);
        }
        ArgType::Int16 => {
            let value = parse_int_arg(arg)?;
            gen.code.write_u16::<LittleEndian>(value as u16)?;
        }
        ArgType::Int32 => {
            let value = parse_int_arg(arg)?;
            gen.code.write_u32::<LittleEndian>(value as u32)?;
        }
        ArgType::Float32 => {
            let value: f32 = arg.parse().map_err(|_| {
                Error::ArgTypeMismatch(format!("invalid float literal {:?}", arg))
            })?;
            gen.code.write_f32::<LittleEndian>(value)?;
        }
        ArgType::CString => {
            encode_cstring(gen, arg).context("bad string literal")?;
        }
    }
    Ok(())
}

/// Push-args encoder: emits the push primitive matching the argument's
/// syntax and the consumer's expected shape.
pub(crate) fn encode_push(
    gen: &mut CodeGen,
    labels: &LabelTable,
    arg: &str,
    arg_def: &ArgDef,
) -> Result<()> {
    if arg.is_empty() {
        bail!("argument is empty");
    }

    if let Some(index) = labels.index_of(arg) {
        gen.code.push(OP_ARG_PUSHW);
        gen.code.write_u16::<LittleEndian>(index as u16)?;
        return Ok(());
    }

    let first = arg.chars().next().unwrap();
    if first == 'r' || first == 'f' || (first == '(' && arg.ends_with(')')) {
        // Register references to an out-param or register range push the
        // register number itself; everything else pushes the value.
        match arg_def.ty {
            ArgType::Reg | ArgType::Reg32 => {
                gen.code.push(OP_ARG_PUSHB);
                let reg = parse_reg(&mut gen.regs, arg, true)?;
                gen.regs.record_patch(reg, gen.code.len());
                let byte = reg_byte(&gen.regs, reg);
                gen.code.push(byte);
            }
            ArgType::RegSetFixed | ArgType::Reg32SetFixed => {
                let chain = parse_reg_set_fixed(&mut gen.regs, arg, arg_def.count as usize)?;
                gen.code.push(OP_ARG_PUSHB);
                gen.regs.record_patch(chain[0], gen.code.len());
                let byte = reg_byte(&gen.regs, chain[0]);
                gen.code.push(byte);
            }
            _ => {
                gen.code.push(OP_ARG_PUSHR);
                let reg = parse_reg(&mut gen.regs, arg, true)?;
                gen.regs.record_patch(reg, gen.code.len());
                let byte = reg_byte(&gen.regs, reg);
                gen.code.push(byte);
            }
        }
        return Ok(());
    }

    if let Some(target) = arg.strip_prefix('@') {
        if target.starts_with('r') || target.starts_with('f') {
            gen.code.push(OP_ARG_PUSHA);
            let reg = parse_reg(&mut gen.regs, target, true)?;
            gen.regs.record_patch(reg, gen.code.len());
            let byte = reg_byte(&gen.regs, reg);
            gen.code.push(byte);
            return Ok(());
        }
        if let Some(index) = labels.index_of(target) {
            gen.code.push(OP_ARG_PUSHO);
            gen.code.write_u16::<LittleEndian>(index as u16)?;
            return Ok(());
        }
        bail!("@ argument is neither a register nor a label");
    }

    if let Ok(value) = text::parse_c_int(arg) {
        if !(0..=0xFFFF).contains(&value) {
            gen.code.push(OP_ARG_PUSHL);
            gen.code.write_u32::<LittleEndian>(value as u32)?;
        } else if value > 0xFF {
            gen.code.push(OP_ARG_PUSHW);
            gen.code.write_u16::<LittleEndian>(value as u16)?;
        } else {
            gen.code.push(OP_ARG_PUSHB);
            gen.code.push(value as u8);
        }
        return Ok(());
    }

    if first == '"' || arg.starts_with("bin:") {
        gen.code.push(OP_ARG_PUSHS);
        encode_cstring(gen, arg).context("bad string literal")?;
        return Ok(());
    }

    bail!("invalid argument syntax {:?}", arg)
}
