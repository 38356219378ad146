use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

use crate::Error;

/// One release variant of the client. The discriminant order is load-bearing:
/// each build's bit in the 16-bit version mask is `1 << (build as u16)`, and
/// the two patch placeholders occupy bits 0-1 so those positions can be reused
/// for the F_PASS/F_ARGS opcode flags.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
pub enum Build {
    #[strum(serialize = "PC_PATCH")]
    PcPatch,
    #[strum(serialize = "BB_PATCH")]
    BbPatch,
    #[strum(serialize = "DC_NTE")]
    DcNte,
    #[strum(serialize = "DC_11_2000")]
    Dc112000,
    #[strum(serialize = "DC_V1")]
    DcV1,
    #[strum(serialize = "DC_V2")]
    DcV2,
    #[strum(serialize = "PC_NTE")]
    PcNte,
    #[strum(serialize = "PC_V2")]
    PcV2,
    #[strum(serialize = "GC_NTE")]
    GcNte,
    #[strum(serialize = "GC_V3")]
    GcV3,
    #[strum(serialize = "GC_EP3_NTE")]
    GcEp3Nte,
    #[strum(serialize = "GC_EP3")]
    GcEp3,
    #[strum(serialize = "XB_V3")]
    XbV3,
    #[strum(serialize = "BB_V4")]
    BbV4,
}

/// Which packed header layout a build's quest binaries carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    DcNte,
    Dc,
    Pc,
    Gc,
    Bb,
}

/// CPU family targeted by `.include_native` blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum CpuFamily {
    #[strum(serialize = "SH4")]
    Sh4,
    #[strum(serialize = "PPC")]
    Ppc,
    #[strum(serialize = "x86")]
    X86,
}

impl Build {
    /// The twelve builds quests can actually target, in mask-bit order.
    pub const ALL_QUEST: [Build; 12] = [
        Build::DcNte,
        Build::Dc112000,
        Build::DcV1,
        Build::DcV2,
        Build::PcNte,
        Build::PcV2,
        Build::GcNte,
        Build::GcV3,
        Build::GcEp3Nte,
        Build::GcEp3,
        Build::XbV3,
        Build::BbV4,
    ];

    pub const fn mask_bit(self) -> u16 {
        1 << (self as u16)
    }

    pub const fn is_quest_build(self) -> bool {
        !matches!(self, Build::PcPatch | Build::BbPatch)
    }

    /// PC and BB carry C-strings as NUL-terminated UTF-16LE; everything else
    /// uses NUL-terminated bytes in a language-selected 8-bit encoding.
    pub const fn uses_wide_strings(self) -> bool {
        matches!(self, Build::PcNte | Build::PcV2 | Build::BbV4)
    }

    /// Builds that consume F_ARGS opcodes from the push-args stack.
    pub fn has_push_args(self) -> bool {
        self.mask_bit() & crate::opcodes::F_HAS_ARGS != 0
    }

    pub const fn header_kind(self) -> HeaderKind {
        match self {
            Build::DcNte => HeaderKind::DcNte,
            Build::Dc112000 | Build::DcV1 | Build::DcV2 => HeaderKind::Dc,
            Build::PcNte | Build::PcV2 => HeaderKind::Pc,
            Build::GcNte | Build::GcV3 | Build::GcEp3Nte | Build::GcEp3 | Build::XbV3 => {
                HeaderKind::Gc
            }
            Build::BbV4 => HeaderKind::Bb,
            // Patch placeholders have no quest header; callers reject them
            // before reaching here.
            Build::PcPatch | Build::BbPatch => HeaderKind::Bb,
        }
    }

    /// Highest header language byte the build accepts; values at or above
    /// this clamp to 1. None means the build carries no language byte.
    pub const fn language_limit(self) -> Option<u8> {
        match self.header_kind() {
            HeaderKind::DcNte => None,
            HeaderKind::Dc | HeaderKind::Gc => Some(5),
            HeaderKind::Pc => Some(8),
            HeaderKind::Bb => None,
        }
    }

    pub const fn cpu_family(self) -> Option<CpuFamily> {
        match self {
            Build::DcNte | Build::Dc112000 | Build::DcV1 | Build::DcV2 => Some(CpuFamily::Sh4),
            Build::GcNte | Build::GcV3 | Build::GcEp3Nte | Build::GcEp3 => Some(CpuFamily::Ppc),
            Build::XbV3 => Some(CpuFamily::X86),
            _ => None,
        }
    }
}

/// Game episode a quest targets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, Display, Serialize, Deserialize,
)]
pub enum Episode {
    #[strum(serialize = "Episode1")]
    Ep1,
    #[strum(serialize = "Episode2")]
    Ep2,
    #[strum(serialize = "Episode4")]
    Ep4,
}

impl Episode {
    /// Header and set_episode operands use the same numbering; 0xFF is the
    /// "unset" value some headers ship with and also means Episode 1.
    pub fn from_quest_number(value: u32) -> Result<Episode, Error> {
        match value {
            0x00 | 0xFF => Ok(Episode::Ep1),
            0x01 => Ok(Episode::Ep2),
            0x02 => Ok(Episode::Ep4),
            _ => Err(Error::MalformedBinary(format!(
                "invalid episode number {:02X}",
                value
            ))),
        }
    }

    pub const fn quest_number(self) -> u8 {
        match self {
            Episode::Ep1 => 0,
            Episode::Ep2 => 1,
            Episode::Ep4 => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn mask_bits_are_unique() {
        let mut seen = 0u16;
        for build in Build::ALL_QUEST {
            assert_eq!(seen & build.mask_bit(), 0);
            seen |= build.mask_bit();
        }
        assert_eq!(seen, 0xFFFC);
    }

    #[test]
    fn build_names_round_trip() {
        for build in Build::ALL_QUEST {
            assert_eq!(Build::from_str(&build.to_string()).unwrap(), build);
        }
    }

    #[test]
    fn episode_numbering() {
        assert_eq!(Episode::from_quest_number(0).unwrap(), Episode::Ep1);
        assert_eq!(Episode::from_quest_number(1).unwrap(), Episode::Ep2);
        assert_eq!(Episode::from_quest_number(2).unwrap(), Episode::Ep4);
        assert_eq!(Episode::from_quest_number(0xFF).unwrap(), Episode::Ep1);
        assert!(Episode::from_quest_number(3).is_err());
    }

    #[test]
    fn wide_string_builds() {
        assert!(Build::PcV2.uses_wide_strings());
        assert!(Build::BbV4.uses_wide_strings());
        assert!(!Build::GcV3.uses_wide_strings());
        assert!(!Build::DcV2.uses_wide_strings());
    }
}
