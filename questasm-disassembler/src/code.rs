//! Pass 2: reachability decode over the code region.
//!
//! A worklist of offsets is seeded from the function table; script-typed
//! label arguments enqueue their targets. Each offset is decoded at most
//! once, so the walk is bounded by the code size. Decode failures render a
//! `.failed` line and stop only the chain they occurred on.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Cursor;

use anyhow::{anyhow, bail, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use questasm::opcodes::{opcodes_for_build, OpcodeDef};
use questasm::{text, ArgDef, ArgType, Build, DataType};

use crate::{DisassemblyOptions, Label};

/// Column where operands start in a rendered line.
const MNEMONIC_WIDTH: usize = 32;

pub(crate) struct DecodedLine {
    pub text: String,
    pub next_offset: u32,
}

/// One value on the push-args stack.
enum StackValue {
    Reg(u32),
    RegPtr(u32),
    Label(u32),
    Int(u32),
    Str(String),
}

pub(crate) fn decode_all(
    code: &[u8],
    build: Build,
    language: u8,
    labels: &mut Vec<Label>,
    pending: &mut BTreeSet<u32>,
    opts: &DisassemblyOptions,
) -> BTreeMap<u32, DecodedLine> {
    let mut walker = Walker {
        build,
        language,
        reassembly: opts.reassembly,
        qedit: opts.qedit_names,
        version_has_args: build.has_push_args(),
        labels,
        lines: BTreeMap::new(),
        arg_stack: Vec::new(),
    };

    while let Some(&start) = pending.iter().next() {
        pending.remove(&start);
        walker.arg_stack.clear();

        let mut cursor = Cursor::new(code);
        cursor.set_position(start as u64);
        while (cursor.position() as usize) < code.len()
            && !walker.lines.contains_key(&(cursor.position() as u32))
        {
            let opcode_start = cursor.position() as u32;
            let (line, chain_done) = match walker.decode_instruction(&mut cursor, code, pending) {
                Ok((line, is_ret)) => (line, is_ret),
                Err(error) => (format!(".failed ({})", error), true),
            };
            let next_offset = (cursor.position() as u32).max(opcode_start + 1);

            let text = if walker.reassembly {
                format!("  {}", line.trim_end())
            } else {
                let consumed =
                    &code[opcode_start as usize..next_offset as usize];
                let mut hex = text::format_data_hex(consumed);
                if hex.len() > 14 {
                    hex.truncate(12);
                    hex.push_str("...");
                }
                format!("  {:04X}  {:<16}  {}", opcode_start, hex, line.trim_end())
            };
            walker.lines.insert(opcode_start, DecodedLine { text, next_offset });
            if chain_done {
                break;
            }
        }
    }

    walker.lines
}

struct Walker<'a> {
    build: Build,
    language: u8,
    reassembly: bool,
    qedit: bool,
    version_has_args: bool,
    labels: &'a mut Vec<Label>,
    lines: BTreeMap<u32, DecodedLine>,
    arg_stack: Vec<StackValue>,
}

impl Walker<'_> {
    /// Decodes one instruction, returning its rendered text and whether it
    /// ends the straight-line chain.
    fn decode_instruction(
        &mut self,
        cursor: &mut Cursor<&[u8]>,
        code: &[u8],
        pending: &mut BTreeSet<u32>,
    ) -> Result<(String, bool)> {
        let opcode_start = cursor.position() as u32;
        let mut opcode = cursor.read_u8()? as u16;
        if opcode & 0xFE == 0xF8 {
            opcode = (opcode << 8) | cursor.read_u8()? as u16;
        }

        let Some(def) = opcodes_for_build(self.build).get(&opcode).copied() else {
            return Ok((format!(".unknown {:04X}", opcode), false));
        };

        let mnemonic = def.mnemonic(self.qedit);
        let line = if !(self.version_has_args && def.consumes_args()) {
            let mut rendered = Vec::with_capacity(def.args.len());
            for arg in def.args {
                rendered.push(self.decode_arg(cursor, code, pending, def, arg, opcode_start)?);
            }
            if rendered.is_empty() {
                mnemonic.to_string()
            } else {
                format!("{:<width$}{}", mnemonic, rendered.join(", "), width = MNEMONIC_WIDTH)
            }
        } else if self.reassembly {
            format!("{:<width$}...", mnemonic, width = MNEMONIC_WIDTH)
        } else {
            let consumed = self.render_consumed_args(def, opcode_start)?;
            format!("{:<width$}... {}", mnemonic, consumed, width = MNEMONIC_WIDTH)
        };

        if !def.pushes_arg() {
            self.arg_stack.clear();
        }
        Ok((line, def.is_ret()))
    }

    fn decode_arg(
        &mut self,
        cursor: &mut Cursor<&[u8]>,
        code: &[u8],
        pending: &mut BTreeSet<u32>,
        def: &OpcodeDef,
        arg: &ArgDef,
        opcode_start: u32,
    ) -> Result<String> {
        Ok(match arg.ty {
            ArgType::Label16 | ArgType::Label32 => {
                let label_id = if arg.ty == ArgType::Label32 {
                    cursor.read_u32::<LittleEndian>()?
                } else {
                    cursor.read_u16::<LittleEndian>()? as u32
                };
                if def.pushes_arg() {
                    self.arg_stack.push(StackValue::Label(label_id));
                }
                self.reference_label(code, pending, label_id, arg.data_type, opcode_start)
            }
            ArgType::Label16Set => {
                if def.pushes_arg() {
                    bail!("label set cannot be pushed to the args stack");
                }
                let count = cursor.read_u8()?;
                let mut parts = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    let label_id = cursor.read_u16::<LittleEndian>()? as u32;
                    parts.push(self.reference_label(
                        code,
                        pending,
                        label_id,
                        arg.data_type,
                        opcode_start,
                    ));
                }
                format!("[{}]", parts.join(", "))
            }
            ArgType::Reg => {
                let reg = cursor.read_u8()?;
                if def.pushes_arg() {
                    // arg_pusha pushes the register's address, not its value.
                    self.arg_stack.push(if def.opcode == 0x004C {
                        StackValue::RegPtr(reg as u32)
                    } else {
                        StackValue::Reg(reg as u32)
                    });
                }
                format!("r{}", reg)
            }
            ArgType::Reg32 => {
                let reg = cursor.read_u32::<LittleEndian>()?;
                format!("r{}", reg)
            }
            ArgType::RegSet => {
                if def.pushes_arg() {
                    bail!("register set cannot be pushed to the args stack");
                }
                let count = cursor.read_u8()?;
                let mut parts = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    parts.push(format!("r{}", cursor.read_u8()?));
                }
                format!("[{}]", parts.join(", "))
            }
            ArgType::RegSetFixed => {
                if def.pushes_arg() {
                    bail!("fixed register set cannot be pushed to the args stack");
                }
                let first = cursor.read_u8()?;
                format!("r{}-r{}", first, first.wrapping_add(arg.count - 1))
            }
            ArgType::Reg32SetFixed => {
                if def.pushes_arg() {
                    bail!("fixed register set cannot be pushed to the args stack");
                }
                let first = cursor.read_u32::<LittleEndian>()?;
                format!("r{}-r{}", first, first.wrapping_add(arg.count as u32 - 1))
            }
            ArgType::Int8 => {
                let value = cursor.read_u8()?;
                if def.pushes_arg() {
                    self.arg_stack.push(StackValue::Int(value as u32));
                }
                format!("0x{:02X}", value)
            }
            ArgType::Int16 => {
                let value = cursor.read_u16::<LittleEndian>()?;
                if def.pushes_arg() {
                    self.arg_stack.push(StackValue::Int(value as u32));
                }
                format!("0x{:04X}", value)
            }
            ArgType::Int32 => {
                let value = cursor.read_u32::<LittleEndian>()?;
                if def.pushes_arg() {
                    self.arg_stack.push(StackValue::Int(value));
                }
                format!("0x{:08X}", value)
            }
            ArgType::Float32 => {
                let value = cursor.read_f32::<LittleEndian>()?;
                if def.pushes_arg() {
                    self.arg_stack.push(StackValue::Int(value.to_bits()));
                }
                format!("{}", value)
            }
            ArgType::CString => {
                let position = cursor.position() as usize;
                let mut offset = position;
                let bytes = if self.build.uses_wide_strings() {
                    text::read_cstring_wide(code, &mut offset)?
                } else {
                    text::read_cstring_narrow(code, &mut offset)?
                };
                cursor.set_position(offset as u64);
                if def.pushes_arg() {
                    self.arg_stack
                        .push(StackValue::Str(text::decode_wire(self.build, self.language, &bytes)?));
                }
                text::escape_wire(self.build, self.language, &bytes)
            }
        })
    }

    /// Renders a label operand and records the reference and inferred data
    /// type; script targets join the decode worklist.
    fn reference_label(
        &mut self,
        code: &[u8],
        pending: &mut BTreeSet<u32>,
        label_id: u32,
        data_type: DataType,
        opcode_start: u32,
    ) -> String {
        let Some(label) = self.labels.get_mut(label_id as usize) else {
            return format!("label{:04X}", label_id);
        };
        let rendered = if self.reassembly {
            label.name.clone()
        } else {
            format!("{} /* {:04X} */", label.name, label.offset)
        };
        label.references.insert(opcode_start);
        label.add_data_type(data_type);
        if data_type == DataType::Script && (label.offset as usize) < code.len() {
            pending.insert(label.offset);
        }
        rendered
    }

    /// Renders the arguments of an F_ARGS opcode from the values pushed
    /// before it.
    fn render_consumed_args(&mut self, def: &OpcodeDef, opcode_start: u32) -> Result<String> {
        if def.args.len() != self.arg_stack.len() {
            return Ok(format!(
                "/* matching error: expected {} arguments, received {} arguments */",
                def.args.len(),
                self.arg_stack.len()
            ));
        }
        let mut parts = Vec::with_capacity(def.args.len());
        for (arg, value) in def.args.iter().zip(&self.arg_stack) {
            parts.push(match arg.ty {
                ArgType::Label16 | ArgType::Label32 => match value {
                    StackValue::Reg(n) => {
                        format!("r{} /* warning: cannot determine label data type */", n)
                    }
                    StackValue::Label(id) | StackValue::Int(id) => {
                        if let Some(label) = self.labels.get_mut(*id as usize) {
                            label.add_data_type(arg.data_type);
                            label.references.insert(opcode_start);
                            label.name.clone()
                        } else {
                            format!("label{:04X}", id)
                        }
                    }
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::Reg | ArgType::Reg32 => match value {
                    StackValue::Reg(n) => format!("regs[r{}]", n),
                    StackValue::Int(n) => format!("r{}", n),
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::RegSetFixed | ArgType::Reg32SetFixed => match value {
                    StackValue::Reg(n) => {
                        format!("regs[r{}]-regs[r{}+{}]", n, n, arg.count - 1)
                    }
                    StackValue::Int(n) => {
                        format!("r{}-r{}", n, (*n as u8).wrapping_add(arg.count - 1))
                    }
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::Int8 | ArgType::Int16 | ArgType::Int32 => match value {
                    StackValue::Reg(n) => format!("r{}", n),
                    StackValue::RegPtr(n) => format!("&r{}", n),
                    StackValue::Int(v) => format!("0x{:X} /* {} */", v, v),
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::Float32 => match value {
                    StackValue::Reg(n) => format!("f{}", n),
                    StackValue::Int(bits) => format!("{}", f32::from_bits(*bits)),
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::CString => match value {
                    StackValue::Str(s) => text::escape_string(s),
                    _ => "/* invalid-type */".to_string(),
                },
                ArgType::Label16Set | ArgType::RegSet => {
                    return Err(anyhow!("set-valued argument found on the args stack"));
                }
            });
        }
        Ok(parts.join(", "))
    }
}
