mod args;
mod native;
mod registers;

pub use native::{NativeAssembler, NativeAssemblers};

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use byteorder::{LittleEndian, WriteBytesExt};
use questasm::header::{self, QuestMeta};
use questasm::opcodes::mnemonics_for_build;
use questasm::{text, Build, Episode, Error};

use registers::RegisterAllocator;

/// Slot value emitted for function-table indexes with no label.
const UNUSED_FUNCTION: u32 = 0xFFFF_FFFF;

#[derive(Default)]
pub struct AssembleOptions<'a> {
    /// Directory searched by `.include_bin` and `.include_native`.
    pub include_dir: Option<&'a Path>,
    pub native: NativeAssemblers<'a>,
}

pub(crate) struct CodeGen {
    pub build: Build,
    pub language: u8,
    pub code: Vec<u8>,
    pub regs: RegisterAllocator,
}

struct LabelDef {
    name: String,
    index: Option<u32>,
    offset: Option<u32>,
}

pub(crate) struct LabelTable {
    arena: Vec<LabelDef>,
    by_name: BTreeMap<String, usize>,
    by_index: BTreeMap<u32, usize>,
}

impl LabelTable {
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).and_then(|&idx| self.arena[idx].index)
    }
}

struct Metadata {
    build: Build,
    meta: QuestMeta,
}

/// Assembles quest source text into a compiled quest binary. The target
/// build comes from the source's `.version` directive.
pub fn assemble(source: &str, opts: &AssembleOptions) -> Result<Vec<u8>> {
    let lines = strip_comments(source)?;
    let metadata = collect_metadata(&lines)?;
    let mut labels = collect_labels(&lines)?;
    assign_label_indexes(&mut labels);

    let build = metadata.build;
    let mut gen = CodeGen {
        build,
        // DC NTE predates the language byte; its strings are always SJIS.
        language: if build == Build::DcNte { 0 } else { metadata.meta.language },
        code: Vec::new(),
        regs: RegisterAllocator::default(),
    };
    emit_code(&mut gen, &lines, &mut labels, opts)?;

    while gen.code.len() % 4 != 0 {
        gen.code.push(0);
    }
    gen.regs.assign_all()?;
    gen.regs.patch(&mut gen.code);

    let function_table = build_function_table(&labels)?;
    let mut out = Vec::new();
    header::write_header(
        &mut out,
        build,
        &metadata.meta,
        gen.code.len(),
        function_table.len() * 4,
    )?;
    out.extend_from_slice(&gen.code);
    for entry in function_table {
        out.write_u32::<LittleEndian>(entry)?;
    }
    Ok(out)
}

/// Removes `/* ... */` and `// ...` comments and trims each line. Block
/// comments do not span lines; an unclosed one is an error.
fn strip_comments(source: &str) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (line_num, raw) in source.lines().enumerate() {
        let mut line = raw.to_string();
        while let Some(start) = line.find("/*") {
            match line[start + 2..].find("*/") {
                Some(end) => {
                    line.replace_range(start..start + 2 + end + 2, "");
                }
                None => {
                    return Err(Error::UnterminatedComment)
                        .with_context(|| format!("(line {})", line_num + 1));
                }
            }
        }
        if let Some(comment) = line.find("//") {
            line.truncate(comment);
        }
        lines.push(line.trim().to_string());
    }
    Ok(lines)
}

fn directive_parts(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    }
}

fn collect_metadata(lines: &[String]) -> Result<Metadata> {
    let mut build: Option<Build> = None;
    let mut name = String::new();
    let mut short_description = String::new();
    let mut long_description = String::new();
    let mut quest_number: Option<i64> = None;
    let mut language: u8 = 1;
    let mut episode = Episode::Ep1;
    let mut max_players: u8 = 4;
    let mut joinable = false;

    for (line_num, line) in lines.iter().enumerate() {
        if !line.starts_with('.') {
            continue;
        }
        let (head, rest) = directive_parts(line);
        (|| -> Result<()> {
            match head {
                ".version" => {
                    build = Some(Build::from_str(rest).map_err(|_| Error::UnknownBuild)?);
                }
                ".name" => name = text::parse_string_literal(rest)?,
                ".short_desc" => short_description = text::parse_string_literal(rest)?,
                ".long_desc" => long_description = text::parse_string_literal(rest)?,
                ".quest_num" => quest_number = Some(text::parse_c_int(rest)?),
                ".language" => language = text::parse_c_int(rest)? as u8,
                ".episode" => {
                    episode = Episode::from_str(rest)
                        .map_err(|_| anyhow::anyhow!("invalid episode name {:?}", rest))?;
                }
                ".max_players" => max_players = text::parse_c_int(rest)? as u8,
                ".joinable" => joinable = true,
                _ => {}
            }
            Ok(())
        })()
        .with_context(|| format!("(line {})", line_num + 1))?;
    }

    let build = match build {
        Some(build) if build.is_quest_build() => build,
        _ => return Err(Error::UnknownBuild.into()),
    };
    let quest_number = quest_number.ok_or(Error::MissingDirective(".quest_num"))?;
    if name.is_empty() {
        return Err(Error::MissingDirective(".name").into());
    }

    Ok(Metadata {
        build,
        meta: QuestMeta {
            name,
            short_description,
            long_description,
            quest_number: quest_number as u16,
            language,
            episode,
            max_players,
            joinable,
        },
    })
}

/// Records every `name:` / `name@N:` definition; `start` is pinned to
/// index 0.
fn collect_labels(lines: &[String]) -> Result<LabelTable> {
    let mut table = LabelTable {
        arena: Vec::new(),
        by_name: BTreeMap::new(),
        by_index: BTreeMap::new(),
    };
    for (line_num, line) in lines.iter().enumerate() {
        let Some(stem) = line.strip_suffix(':') else { continue };
        (|| -> Result<()> {
            let (name, index) = match stem.split_once('@') {
                Some((name, index)) => {
                    let index = text::parse_c_int(index)
                        .ok()
                        .filter(|&v| (0..=u32::MAX as i64).contains(&v))
                        .ok_or_else(|| {
                            anyhow::anyhow!("invalid index in label {:?}", stem)
                        })?;
                    (name, Some(index as u32))
                }
                None => (stem, None),
            };
            let index = if name == "start" {
                match index {
                    Some(0) | None => Some(0),
                    Some(_) => bail!("start label cannot have a nonzero label ID"),
                }
            } else {
                index
            };

            let arena_idx = table.arena.len();
            if table
                .by_name
                .insert(name.to_string(), arena_idx)
                .is_some()
            {
                return Err(Error::DuplicateLabel(name.to_string()).into());
            }
            if let Some(index) = index {
                if table.by_index.insert(index, arena_idx).is_some() {
                    return Err(Error::DuplicateIndex(index).into());
                }
            }
            table.arena.push(LabelDef {
                name: name.to_string(),
                index,
                offset: None,
            });
            Ok(())
        })()
        .with_context(|| format!("(line {})", line_num + 1))?;
    }
    if !table.by_name.contains_key("start") {
        return Err(Error::UndefinedLabel("start".to_string()).into());
    }
    Ok(table)
}

/// Gives every unpinned label the lowest free index, in ascending name
/// order.
fn assign_label_indexes(labels: &mut LabelTable) {
    let mut next_index = 0u32;
    for (_, &arena_idx) in labels.by_name.iter() {
        if labels.arena[arena_idx].index.is_some() {
            continue;
        }
        while labels.by_index.contains_key(&next_index) {
            next_index += 1;
        }
        labels.arena[arena_idx].index = Some(next_index);
        labels.by_index.insert(next_index, arena_idx);
        next_index += 1;
    }
}

fn emit_code(
    gen: &mut CodeGen,
    lines: &[String],
    labels: &mut LabelTable,
    opts: &AssembleOptions,
) -> Result<()> {
    let version_has_args = gen.build.has_push_args();
    let mnemonics = mnemonics_for_build(gen.build);

    for (line_num, line) in lines.iter().enumerate() {
        (|| -> Result<()> {
            if line.is_empty() {
                return Ok(());
            }

            if let Some(stem) = line.strip_suffix(':') {
                let name = stem.split('@').next().unwrap();
                let arena_idx = labels.by_name[name];
                labels.arena[arena_idx].offset = Some(gen.code.len() as u32);
                return Ok(());
            }

            if line.starts_with('.') {
                return emit_directive(gen, line, opts);
            }

            let (mnemonic, rest) = directive_parts(line);
            let def = mnemonics
                .get(mnemonic)
                .copied()
                .ok_or_else(|| Error::UnknownMnemonic(mnemonic.to_string()))?;
            let use_args = version_has_args && def.consumes_args();

            if !use_args {
                emit_opcode(&mut gen.code, def.opcode);
            }

            if def.args.is_empty() {
                if !rest.is_empty() {
                    bail!("arguments not allowed for {}", def.name);
                }
                return Ok(());
            }
            if rest.is_empty() {
                return Err(Error::ArgCountMismatch {
                    expected: def.args.len(),
                    found: 0,
                }
                .into());
            }

            if rest.starts_with("...") {
                // Arguments were pushed by explicit arg_push lines.
                if !use_args {
                    bail!("'...' is only valid for push-argument opcodes");
                }
            } else {
                let operands = args::split_args(rest);
                if operands.len() != def.args.len() {
                    return Err(Error::ArgCountMismatch {
                        expected: def.args.len(),
                        found: operands.len(),
                    }
                    .into());
                }
                for (position, (operand, arg_def)) in
                    operands.iter().zip(def.args).enumerate()
                {
                    (|| -> Result<()> {
                        if use_args {
                            args::encode_push(gen, labels, operand, arg_def)
                        } else {
                            args::encode_direct(gen, labels, operand, arg_def)
                        }
                    })()
                    .with_context(|| format!("(arg {})", position + 1))?;
                }
            }

            if use_args {
                emit_opcode(&mut gen.code, def.opcode);
            }
            Ok(())
        })()
        .with_context(|| format!("(line {})", line_num + 1))?;
    }
    Ok(())
}

fn emit_opcode(code: &mut Vec<u8>, opcode: u16) {
    if opcode & 0xFF00 != 0 {
        code.push((opcode >> 8) as u8);
    }
    code.push(opcode as u8);
}

fn emit_directive(gen: &mut CodeGen, line: &str, opts: &AssembleOptions) -> Result<()> {
    let (head, rest) = directive_parts(line);
    match head {
        ".data" => {
            let bytes = text::parse_data_string(rest)?;
            gen.code.extend_from_slice(&bytes);
        }
        ".zero" => {
            let count = parse_size(rest)?;
            gen.code.resize(gen.code.len() + count, 0);
        }
        ".zero_until" => {
            let target = parse_size(rest)?;
            if target > gen.code.len() {
                gen.code.resize(target, 0);
            }
        }
        ".align" => {
            let alignment = parse_size(rest)?;
            if alignment == 0 {
                bail!("alignment must be nonzero");
            }
            while gen.code.len() % alignment != 0 {
                gen.code.push(0);
            }
        }
        ".include_bin" => {
            let path = include_path(opts, rest)?;
            let bytes = std::fs::read(&path)
                .with_context(|| format!("cannot read include file {}", path.display()))?;
            gen.code.extend_from_slice(&bytes);
        }
        ".include_native" => {
            let Some(family) = gen.build.cpu_family() else {
                bail!("build {} has no native code architecture", gen.build);
            };
            let Some(backend) = opts.native.for_family(family) else {
                return Err(Error::ExternalAssemblerMissing(family).into());
            };
            let path = include_path(opts, rest)?;
            let source = std::fs::read_to_string(&path)
                .with_context(|| format!("cannot read include file {}", path.display()))?;
            let bytes = backend
                .assemble(&source)
                .with_context(|| format!("native assembly of {} failed", path.display()))?;
            gen.code.extend_from_slice(&bytes);
        }
        // Sentinels the disassembler emits for bytes it could not decode;
        // there is no faithful way to reassemble them.
        ".unknown" | ".failed" => {
            bail!("listing contains {} and cannot be reassembled", head);
        }
        // Metadata directives were consumed by the first pass; anything
        // else dot-prefixed is ignored here, matching the listing format's
        // tolerance for annotation directives.
        _ => {}
    }
    Ok(())
}

fn parse_size(rest: &str) -> Result<usize> {
    let value = text::parse_c_int(rest)?;
    if value < 0 {
        bail!("size must be nonnegative");
    }
    Ok(value as usize)
}

fn include_path(opts: &AssembleOptions, filename: &str) -> Result<std::path::PathBuf> {
    let Some(dir) = opts.include_dir else {
        bail!("no include directory was provided");
    };
    Ok(dir.join(filename.trim()))
}

/// Packs label offsets into the function table, with sentinels at indexes
/// no label claimed.
fn build_function_table(labels: &LabelTable) -> Result<Vec<u32>> {
    let max_index = *labels
        .by_index
        .keys()
        .next_back()
        .expect("start label guarantees at least one index");
    let mut table = Vec::with_capacity(max_index as usize + 1);
    for index in 0..=max_index {
        match labels.by_index.get(&index) {
            Some(&arena_idx) => {
                let label = &labels.arena[arena_idx];
                let offset = label.offset.ok_or_else(|| {
                    anyhow::anyhow!("label {} does not have a valid offset", label.name)
                })?;
                table.push(offset);
            }
            None => table.push(UNUSED_FUNCTION),
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assemble_source(source: &str) -> Result<Vec<u8>> {
        assemble(source, &AssembleOptions::default())
    }

    #[test]
    fn missing_version_is_rejected() {
        let err = assemble_source(".quest_num 1\n.name \"q\"\nstart:\n  ret\n").unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some());
    }

    #[test]
    fn missing_quest_num_is_rejected() {
        let err =
            assemble_source(".version BB_V4\n.name \"q\"\nstart:\n  ret\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::MissingDirective(".quest_num"))
        ));
    }

    #[test]
    fn unterminated_comment_is_rejected() {
        let err = assemble_source(".version BB_V4 /* oops\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnterminatedComment)
        ));
    }

    #[test]
    fn duplicate_labels_are_rejected() {
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart:\n  ret\nstart:\n";
        let err = assemble_source(source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DuplicateLabel(_))
        ));
    }

    #[test]
    fn duplicate_indexes_are_rejected() {
        let source =
            ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart:\n  ret\na@1:\nb@1:\n";
        let err = assemble_source(source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::DuplicateIndex(1))
        ));
    }

    #[test]
    fn unknown_mnemonic_is_rejected_with_line_context() {
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart:\n  frobnicate\n";
        let err = assemble_source(source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnknownMnemonic(_))
        ));
        assert!(format!("{:#}", err).contains("(line 5)"));
    }

    #[test]
    fn version_gated_mnemonics_are_rejected() {
        // letb only exists on V3/V4.
        let source = ".version DC_V2\n.quest_num 1\n.name \"q\"\nstart:\n  letb r1, 2\n  ret\n";
        assert!(assemble_source(source).is_err());
    }

    #[test]
    fn start_with_nonzero_index_is_rejected() {
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart@2:\n  ret\n";
        assert!(assemble_source(source).is_err());
    }

    #[test]
    fn label_auto_indexing_fills_gaps() {
        // "alpha" and "zeta" are unpinned; "mid" pins index 1. Ascending
        // name order assigns alpha=2 (0 and 1 taken), zeta=3.
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\n\
                      start:\n  ret\nmid@1:\n  ret\nalpha:\n  ret\nzeta:\n  ret\n";
        let binary = assemble_source(source).unwrap();
        let table_offset = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
        let entries: Vec<u32> = binary[table_offset..]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|&entry| entry != UNUSED_FUNCTION));
    }

    #[test]
    fn function_table_sentinels_mark_missing_indexes() {
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart:\n  ret\nfar@5:\n  ret\n";
        let binary = assemble_source(source).unwrap();
        let table_offset = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
        let entries: Vec<u32> = binary[table_offset..]
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(entries.len(), 6);
        for index in 1..5 {
            assert_eq!(entries[index], UNUSED_FUNCTION);
        }
        assert_ne!(entries[0], UNUSED_FUNCTION);
        assert_ne!(entries[5], UNUSED_FUNCTION);
    }

    #[test]
    fn code_is_padded_to_word_boundary() {
        let source = ".version BB_V4\n.quest_num 1\n.name \"q\"\nstart:\n  nop\n  ret\n";
        let binary = assemble_source(source).unwrap();
        let code_offset = u32::from_le_bytes(binary[0..4].try_into().unwrap()) as usize;
        let table_offset = u32::from_le_bytes(binary[4..8].try_into().unwrap()) as usize;
        assert_eq!((table_offset - code_offset) % 4, 0);
    }

    #[test]
    fn include_native_without_backend_fails() {
        let source = ".version GC_V3\n.quest_num 1\n.name \"q\"\nstart:\n  .include_native x.s\n  ret\n";
        let err = assemble_source(source).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::ExternalAssemblerMissing(_))
        ));
    }
}
