pub mod build;
pub mod header;
pub mod opcodes;
pub mod text;

pub use build::{Build, CpuFamily, Episode, HeaderKind};
pub use opcodes::{ArgDef, ArgType, DataType, OpcodeDef};

use thiserror::Error;

/// Failure classes surfaced by the toolchain. Internal plumbing wraps these
/// in `anyhow` errors so line/argument context can be layered on top.
#[derive(Debug, Error)]
pub enum Error {
    #[error(".version directive is missing or names an unsupported build")]
    UnknownBuild,

    #[error("{0} directive is missing or invalid")]
    MissingDirective(&'static str),

    #[error("unterminated inline comment")]
    UnterminatedComment,

    #[error("duplicate label name: {0}")]
    DuplicateLabel(String),

    #[error("duplicate label index: {0} (0x{0:X})")]
    DuplicateIndex(u32),

    #[error("label not defined: {0}")]
    UndefinedLabel(String),

    #[error("unknown opcode mnemonic: {0}")]
    UnknownMnemonic(String),

    #[error("incorrect argument count: expected {expected}, found {found}")]
    ArgCountMismatch { expected: usize, found: usize },

    #[error("{0}")]
    ArgTypeMismatch(String),

    #[error("{0}")]
    RegisterConflict(String),

    #[error("{0}")]
    MalformedBinary(String),

    #[error("script sets multiple distinct episodes")]
    MultipleEpisodes,

    #[error("no native assembler is available for {0}")]
    ExternalAssemblerMissing(CpuFamily),
}

/// Forces construction of every per-build opcode index, surfacing any
/// duplicate-definition rows up front instead of at first lookup.
pub fn validate_tables() {
    for build in Build::ALL_QUEST {
        let by_number = opcodes::opcodes_for_build(build);
        let by_name = opcodes::mnemonics_for_build(build);
        log::info!(
            "build {} has {} opcodes with {} mnemonics",
            build,
            by_number.len(),
            by_name.len()
        );
    }
}
