//! Native-CPU assembler capability for `.include_native`.
//!
//! The CPU backends themselves are external collaborators; each exposes a
//! single text-to-bytes contract and is selected by the target build's CPU
//! family (SH4 for DC, PPC for GC, x86 for XB).

use anyhow::Result;
use questasm::CpuFamily;

pub trait NativeAssembler {
    fn assemble(&self, source: &str) -> Result<Vec<u8>>;
}

/// Registry of available native backends, injected by the caller.
#[derive(Default)]
pub struct NativeAssemblers<'a> {
    pub sh4: Option<&'a dyn NativeAssembler>,
    pub ppc: Option<&'a dyn NativeAssembler>,
    pub x86: Option<&'a dyn NativeAssembler>,
}

impl<'a> NativeAssemblers<'a> {
    pub fn for_family(&self, family: CpuFamily) -> Option<&'a dyn NativeAssembler> {
        match family {
            CpuFamily::Sh4 => self.sh4,
            CpuFamily::Ppc => self.ppc,
            CpuFamily::X86 => self.x86,
        }
    }
}
