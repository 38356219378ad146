//! The opcode dictionary.
//!
//! One flat table covers every build; each row's flag word combines the
//! builds that accept it with the behavior bits below. Several opcode
//! numbers appear twice with disjoint version masks because later builds
//! reused the number with a different argument shape (the per-build index
//! resolves the right row). Rows are validated against duplicate
//! opcode/mnemonic collisions when a build's index is first built.

use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::Build;

/// Opcode is a push-args primitive (producer).
pub const F_PASS: u16 = 0x0001;
/// Opcode consumes its arguments from the push-args stack on V3/V4.
pub const F_ARGS: u16 = 0x0002;
/// Opcode unconditionally ends a straight-line decode chain.
pub const F_RET: u16 = 0x4000;
/// Opcode's INT32 operand selects the quest episode.
pub const F_SET_EPISODE: u16 = 0x8000;

const V_DC_NTE: u16 = Build::DcNte.mask_bit();
const V_DC_112000: u16 = Build::Dc112000.mask_bit();
const V_DC_V1: u16 = Build::DcV1.mask_bit();
const V_DC_V2: u16 = Build::DcV2.mask_bit();
const V_PC_NTE: u16 = Build::PcNte.mask_bit();
const V_PC_V2: u16 = Build::PcV2.mask_bit();
const V_GC_NTE: u16 = Build::GcNte.mask_bit();
const V_GC_V3: u16 = Build::GcV3.mask_bit();
const V_GC_EP3TE: u16 = Build::GcEp3Nte.mask_bit();
const V_GC_EP3: u16 = Build::GcEp3.mask_bit();
const V_XB_V3: u16 = Build::XbV3.mask_bit();
const V_BB_V4: u16 = Build::BbV4.mask_bit();

const F_V0_V2: u16 =
    V_DC_NTE | V_DC_112000 | V_DC_V1 | V_DC_V2 | V_PC_NTE | V_PC_V2 | V_GC_NTE;
const F_V0_V4: u16 = F_V0_V2 | F_V3_V4;
const F_V05_V2: u16 = V_DC_112000 | V_DC_V1 | V_DC_V2 | V_PC_NTE | V_PC_V2 | V_GC_NTE;
const F_V05_V4: u16 = F_V05_V2 | F_V3_V4;
const F_V1_V2: u16 = V_DC_V1 | V_DC_V2 | V_PC_NTE | V_PC_V2 | V_GC_NTE;
const F_V1_V4: u16 = F_V1_V2 | F_V3_V4;
const F_V2: u16 = V_DC_V2 | V_PC_NTE | V_PC_V2 | V_GC_NTE;
const F_V2_V4: u16 = F_V2 | F_V3_V4;
const F_V3: u16 = V_GC_V3 | V_GC_EP3TE | V_GC_EP3 | V_XB_V3;
const F_V3_V4: u16 = F_V3 | V_BB_V4;
const F_V4: u16 = V_BB_V4;
const F_GC3: u16 = V_GC_V3 | V_GC_EP3TE | V_GC_EP3;

/// Builds that use the push-args calling convention for F_ARGS opcodes.
pub const F_HAS_ARGS: u16 = F_V3_V4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Label16,
    Label16Set,
    Label32,
    Reg,
    RegSet,
    RegSetFixed,
    Reg32,
    Reg32SetFixed,
    Int8,
    Int16,
    Int32,
    Float32,
    CString,
}

/// Inferred content of a label target. Accumulated per label as a bitset;
/// a label can legitimately be reached both as code and as typed data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    None,
    Script,
    Data,
    CString,
    PlayerStats,
    PlayerVisualConfig,
    ResistData,
    AttackData,
    MovementData,
    ImageData,
    UnknownF8F2Data,
}

impl DataType {
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArgDef {
    pub ty: ArgType,
    /// Register count for the fixed-set types; 0 elsewhere.
    pub count: u8,
    pub data_type: DataType,
    pub name: Option<&'static str>,
}

#[derive(Debug)]
pub struct OpcodeDef {
    pub opcode: u16,
    pub name: &'static str,
    pub qedit_name: Option<&'static str>,
    pub args: &'static [ArgDef],
    pub flags: u16,
}

impl OpcodeDef {
    pub fn mnemonic(&self, qedit: bool) -> &'static str {
        if qedit {
            self.qedit_name.unwrap_or(self.name)
        } else {
            self.name
        }
    }

    pub fn is_ret(&self) -> bool {
        self.flags & F_RET != 0
    }

    pub fn pushes_arg(&self) -> bool {
        self.flags & F_PASS != 0
    }

    pub fn consumes_args(&self) -> bool {
        self.flags & F_ARGS != 0
    }

    pub fn sets_episode(&self) -> bool {
        self.flags & F_SET_EPISODE != 0
    }

    /// Opcodes with a zero high byte take one byte on the wire; the F8/F9
    /// pages take two, big-endian.
    pub fn is_two_byte(&self) -> bool {
        self.opcode & 0xFF00 != 0
    }
}

const fn arg(ty: ArgType) -> ArgDef {
    ArgDef { ty, count: 0, data_type: DataType::None, name: None }
}

const fn named(ty: ArgType, name: &'static str) -> ArgDef {
    ArgDef { ty, count: 0, data_type: DataType::None, name: Some(name) }
}

const fn label(ty: ArgType, data_type: DataType) -> ArgDef {
    ArgDef { ty, count: 0, data_type, name: None }
}

const fn named_label(data_type: DataType, name: &'static str) -> ArgDef {
    ArgDef { ty: ArgType::Label16, count: 0, data_type, name: Some(name) }
}

const fn regs(count: u8) -> ArgDef {
    ArgDef { ty: ArgType::RegSetFixed, count, data_type: DataType::None, name: None }
}

const fn regs32(count: u8) -> ArgDef {
    ArgDef { ty: ArgType::Reg32SetFixed, count, data_type: DataType::None, name: None }
}

const INT8: ArgDef = arg(ArgType::Int8);
const INT16: ArgDef = arg(ArgType::Int16);
const INT32: ArgDef = arg(ArgType::Int32);
const FLOAT32: ArgDef = arg(ArgType::Float32);
const REG: ArgDef = arg(ArgType::Reg);
const REG32: ArgDef = arg(ArgType::Reg32);
const REG_SET: ArgDef = arg(ArgType::RegSet);
const CSTRING: ArgDef = arg(ArgType::CString);
const LABEL16: ArgDef = arg(ArgType::Label16);

const SCRIPT16: ArgDef = label(ArgType::Label16, DataType::Script);
const SCRIPT16_SET: ArgDef = label(ArgType::Label16Set, DataType::Script);
const SCRIPT32: ArgDef = label(ArgType::Label32, DataType::Script);
const CSTRING_LABEL16: ArgDef = label(ArgType::Label16, DataType::CString);

const CLIENT_ID: ArgDef = named(ArgType::Int32, "client_id");
const ITEM_ID: ArgDef = named(ArgType::Int32, "item_id");
const AREA: ArgDef = named(ArgType::Int32, "area");

const VISUAL_CONFIG_LABEL: ArgDef = named_label(DataType::PlayerVisualConfig, "visual_config");
const STATS_LABEL: ArgDef = named_label(DataType::PlayerStats, "stats");
const ATTACK_LABEL: ArgDef = named_label(DataType::AttackData, "attack_data");
const RESIST_LABEL: ArgDef = named_label(DataType::ResistData, "resist_data");
const MOVEMENT_LABEL: ArgDef = named_label(DataType::MovementData, "movement_data");
const IMAGE_LABEL: ArgDef = label(ArgType::Label16, DataType::ImageData);
const F8F2_LABEL: ArgDef = label(ArgType::Label16, DataType::UnknownF8F2Data);

const fn def(
    opcode: u16,
    name: &'static str,
    args: &'static [ArgDef],
    flags: u16,
) -> OpcodeDef {
    OpcodeDef { opcode, name, qedit_name: None, args, flags }
}

const fn defq(
    opcode: u16,
    name: &'static str,
    qedit_name: &'static str,
    args: &'static [ArgDef],
    flags: u16,
) -> OpcodeDef {
    OpcodeDef { opcode, name, qedit_name: Some(qedit_name), args, flags }
}

static OPCODE_DEFS: &[OpcodeDef] = &[
    def(0x0000, "nop", &[], F_V0_V4),
    def(0x0001, "ret", &[], F_V0_V4 | F_RET),
    def(0x0002, "sync", &[], F_V0_V4),
    def(0x0003, "exit", &[INT32], F_V0_V4),
    def(0x0004, "thread", &[SCRIPT16], F_V0_V4),
    def(0x0005, "va_start", &[], F_V3_V4),
    def(0x0006, "va_end", &[], F_V3_V4),
    def(0x0007, "va_call", &[SCRIPT16], F_V3_V4),
    def(0x0008, "let", &[REG, REG], F_V0_V4),
    def(0x0009, "leti", &[REG, INT32], F_V0_V4),
    def(0x000A, "leta", &[REG, REG], F_V0_V2),
    def(0x000A, "letb", &[REG, INT8], F_V3_V4),
    def(0x000B, "letw", &[REG, INT16], F_V3_V4),
    def(0x000C, "leta", &[REG, REG], F_V3_V4),
    def(0x000D, "leto", &[REG, SCRIPT16], F_V3_V4),
    def(0x0010, "set", &[REG], F_V0_V4),
    def(0x0011, "clear", &[REG], F_V0_V4),
    def(0x0012, "rev", &[REG], F_V0_V4),
    def(0x0013, "gset", &[INT16], F_V0_V4),
    def(0x0014, "gclear", &[INT16], F_V0_V4),
    def(0x0015, "grev", &[INT16], F_V0_V4),
    def(0x0016, "glet", &[INT16, REG], F_V0_V4),
    def(0x0017, "gget", &[INT16, REG], F_V0_V4),
    def(0x0018, "add", &[REG, REG], F_V0_V4),
    def(0x0019, "addi", &[REG, INT32], F_V0_V4),
    def(0x001A, "sub", &[REG, REG], F_V0_V4),
    def(0x001B, "subi", &[REG, INT32], F_V0_V4),
    def(0x001C, "mul", &[REG, REG], F_V0_V4),
    def(0x001D, "muli", &[REG, INT32], F_V0_V4),
    def(0x001E, "div", &[REG, REG], F_V0_V4),
    def(0x001F, "divi", &[REG, INT32], F_V0_V4),
    def(0x0020, "and", &[REG, REG], F_V0_V4),
    def(0x0021, "andi", &[REG, INT32], F_V0_V4),
    def(0x0022, "or", &[REG, REG], F_V0_V4),
    def(0x0023, "ori", &[REG, INT32], F_V0_V4),
    def(0x0024, "xor", &[REG, REG], F_V0_V4),
    def(0x0025, "xori", &[REG, INT32], F_V0_V4),
    def(0x0026, "mod", &[REG, REG], F_V3_V4),
    def(0x0027, "modi", &[REG, INT32], F_V3_V4),
    def(0x0028, "jmp", &[SCRIPT16], F_V0_V4),
    def(0x0029, "call", &[SCRIPT16], F_V0_V4),
    def(0x002A, "jmp_on", &[SCRIPT16, REG_SET], F_V0_V4),
    def(0x002B, "jmp_off", &[SCRIPT16, REG_SET], F_V0_V4),
    defq(0x002C, "jmp_eq", "jmp_=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x002D, "jmpi_eq", "jmpi_=", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x002E, "jmp_ne", "jmp_!=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x002F, "jmpi_ne", "jmpi_!=", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x0030, "ujmp_gt", "ujmp_>", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x0031, "ujmpi_gt", "ujmpi_>", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x0032, "jmp_gt", "jmp_>", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x0033, "jmpi_gt", "jmpi_>", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x0034, "ujmp_lt", "ujmp_<", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x0035, "ujmpi_lt", "ujmpi_<", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x0036, "jmp_lt", "jmp_<", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x0037, "jmpi_lt", "jmpi_<", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x0038, "ujmp_ge", "ujmp_>=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x0039, "ujmpi_ge", "ujmpi_>=", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x003A, "jmp_ge", "jmp_>=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x003B, "jmpi_ge", "jmpi_>=", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x003C, "ujmp_le", "ujmp_<=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x003D, "ujmpi_le", "ujmpi_<=", &[REG, INT32, SCRIPT16], F_V0_V4),
    defq(0x003E, "jmp_le", "jmp_<=", &[REG, REG, SCRIPT16], F_V0_V4),
    defq(0x003F, "jmpi_le", "jmpi_<=", &[REG, INT32, SCRIPT16], F_V0_V4),
    def(0x0040, "switch_jmp", &[REG, SCRIPT16_SET], F_V0_V4),
    def(0x0041, "switch_call", &[REG, SCRIPT16_SET], F_V0_V4),
    def(0x0042, "nop_42", &[INT32], F_V0_V2),
    def(0x0042, "stack_push", &[REG], F_V3_V4),
    def(0x0043, "stack_pop", &[REG], F_V3_V4),
    def(0x0044, "stack_pushm", &[REG, INT32], F_V3_V4),
    def(0x0045, "stack_popm", &[REG, INT32], F_V3_V4),
    def(0x0048, "arg_pushr", &[REG], F_V3_V4 | F_PASS),
    def(0x0049, "arg_pushl", &[INT32], F_V3_V4 | F_PASS),
    def(0x004A, "arg_pushb", &[INT8], F_V3_V4 | F_PASS),
    def(0x004B, "arg_pushw", &[INT16], F_V3_V4 | F_PASS),
    def(0x004C, "arg_pusha", &[REG], F_V3_V4 | F_PASS),
    def(0x004D, "arg_pusho", &[LABEL16], F_V3_V4 | F_PASS),
    def(0x004E, "arg_pushs", &[CSTRING], F_V3_V4 | F_PASS),
    def(0x0050, "message", &[INT32, CSTRING], F_V0_V4 | F_ARGS),
    def(0x0051, "list", &[REG, CSTRING], F_V0_V4 | F_ARGS),
    def(0x0052, "fadein", &[], F_V0_V4),
    def(0x0053, "fadeout", &[], F_V0_V4),
    def(0x0054, "se", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0055, "bgm", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0056, "nop_56", &[], F_V0_V2),
    def(0x0057, "nop_57", &[], F_V0_V2),
    defq(0x0058, "nop_58", "enable", &[INT32], F_V0_V2),
    defq(0x0059, "nop_59", "disable", &[INT32], F_V0_V2),
    def(0x005A, "window_msg", &[CSTRING], F_V0_V4 | F_ARGS),
    def(0x005B, "add_msg", &[CSTRING], F_V0_V4 | F_ARGS),
    def(0x005C, "mesend", &[], F_V0_V4),
    def(0x005D, "gettime", &[REG], F_V0_V4),
    def(0x005E, "winend", &[], F_V0_V4),
    defq(0x0060, "npc_crt", "npc_crt_V1", &[INT32, INT32], F_V0_V2 | F_ARGS),
    defq(0x0060, "npc_crt", "npc_crt_V3", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0x0061, "npc_stop", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0062, "npc_play", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0063, "npc_kill", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0064, "npc_nont", &[], F_V0_V4),
    def(0x0065, "npc_talk", &[], F_V0_V4),
    defq(0x0066, "npc_crp", "npc_crp_V1", &[regs(6), INT32], F_V0_V2),
    defq(0x0066, "npc_crp", "npc_crp_V3", &[regs(6)], F_V3_V4),
    def(0x0068, "create_pipe", &[INT32], F_V0_V4 | F_ARGS),
    defq(0x0069, "p_hpstat", "p_hpstat_V1", &[REG, CLIENT_ID], F_V0_V2 | F_ARGS),
    defq(0x0069, "p_hpstat", "p_hpstat_V3", &[REG, CLIENT_ID], F_V3_V4 | F_ARGS),
    defq(0x006A, "p_dead", "p_dead_V1", &[REG, CLIENT_ID], F_V0_V2 | F_ARGS),
    defq(0x006A, "p_dead", "p_dead_V3", &[REG, CLIENT_ID], F_V3_V4 | F_ARGS),
    def(0x006B, "p_disablewarp", &[], F_V0_V4),
    def(0x006C, "p_enablewarp", &[], F_V0_V4),
    defq(0x006D, "p_move", "p_move_v1", &[regs(5), INT32], F_V0_V2),
    defq(0x006D, "p_move", "p_move_V3", &[regs(5)], F_V3_V4),
    def(0x006E, "p_look", &[CLIENT_ID], F_V0_V4 | F_ARGS),
    def(0x0070, "p_action_disable", &[], F_V0_V4),
    def(0x0071, "p_action_enable", &[], F_V0_V4),
    def(0x0072, "disable_movement1", &[CLIENT_ID], F_V0_V4 | F_ARGS),
    def(0x0073, "enable_movement1", &[CLIENT_ID], F_V0_V4 | F_ARGS),
    def(0x0074, "p_noncol", &[], F_V0_V4),
    def(0x0075, "p_col", &[], F_V0_V4),
    def(0x0076, "p_setpos", &[CLIENT_ID, regs(4)], F_V0_V4 | F_ARGS),
    def(0x0077, "p_return_guild", &[], F_V0_V4),
    def(0x0078, "p_talk_guild", &[CLIENT_ID], F_V0_V4 | F_ARGS),
    defq(0x0079, "npc_talk_pl", "npc_talk_pl_V1", &[regs32(8)], F_V0_V2),
    defq(0x0079, "npc_talk_pl", "npc_talk_pl_V3", &[regs(8)], F_V3_V4),
    def(0x007A, "npc_talk_kill", &[INT32], F_V0_V4 | F_ARGS),
    defq(0x007B, "npc_crtpk", "npc_crtpk_V1", &[INT32, INT32], F_V0_V2 | F_ARGS),
    defq(0x007B, "npc_crtpk", "npc_crtpk_V3", &[INT32, INT32], F_V3_V4 | F_ARGS),
    defq(0x007C, "npc_crppk", "npc_crppk_V1", &[regs32(7), INT32], F_V0_V2),
    defq(0x007C, "npc_crppk", "npc_crppk_V3", &[regs(7)], F_V3_V4),
    defq(0x007D, "npc_crptalk", "npc_crptalk_v1", &[regs32(6), INT32], F_V0_V2),
    defq(0x007D, "npc_crptalk", "npc_crptalk_V3", &[regs(6)], F_V3_V4),
    def(0x007E, "p_look_at", &[CLIENT_ID, CLIENT_ID], F_V0_V4 | F_ARGS),
    defq(0x007F, "npc_crp_id", "npc_crp_id_V1", &[regs32(7), INT32], F_V0_V2),
    defq(0x007F, "npc_crp_id", "npc_crp_id_v3", &[regs(7)], F_V3_V4),
    def(0x0080, "cam_quake", &[], F_V0_V4),
    def(0x0081, "cam_adj", &[], F_V0_V4),
    def(0x0082, "cam_zmin", &[], F_V0_V4),
    def(0x0083, "cam_zmout", &[], F_V0_V4),
    defq(0x0084, "cam_pan", "cam_pan_V1", &[regs32(5), INT32], F_V0_V2),
    defq(0x0084, "cam_pan", "cam_pan_V3", &[regs(5)], F_V3_V4),
    def(0x0085, "game_lev_super", &[], F_V0_V2),
    def(0x0085, "nop_85", &[], F_V3_V4),
    def(0x0086, "game_lev_reset", &[], F_V0_V2),
    def(0x0086, "nop_86", &[], F_V3_V4),
    defq(0x0087, "pos_pipe", "pos_pipe_V1", &[regs32(4), INT32], F_V0_V2),
    defq(0x0087, "pos_pipe", "pos_pipe_V3", &[regs(4)], F_V3_V4),
    def(0x0088, "if_zone_clear", &[REG, regs(2)], F_V0_V4),
    def(0x0089, "chk_ene_num", &[REG], F_V0_V4),
    def(0x008A, "unhide_obj", &[regs(3)], F_V0_V4),
    def(0x008B, "unhide_ene", &[regs(3)], F_V0_V4),
    def(0x008C, "at_coords_call", &[regs(5)], F_V0_V4),
    def(0x008D, "at_coords_talk", &[regs(5)], F_V0_V4),
    def(0x008E, "npc_coords_call", &[regs(5)], F_V0_V4),
    def(0x008F, "party_coords_call", &[regs(6)], F_V0_V4),
    def(0x0090, "switch_on", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0091, "switch_off", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0092, "playbgm_epi", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0093, "set_mainwarp", &[INT32], F_V0_V4 | F_ARGS),
    def(0x0094, "set_obj_param", &[regs(6), REG], F_V0_V4),
    def(0x0095, "set_floor_handler", &[AREA, SCRIPT32], F_V0_V2),
    def(0x0095, "set_floor_handler", &[AREA, SCRIPT16], F_V3_V4 | F_ARGS),
    def(0x0096, "clr_floor_handler", &[AREA], F_V0_V4 | F_ARGS),
    def(0x0097, "npc_check_straggle", &[regs(9)], F_V1_V4),
    def(0x0098, "hud_hide", &[], F_V0_V4),
    def(0x0099, "hud_show", &[], F_V0_V4),
    def(0x009A, "cine_enable", &[], F_V0_V4),
    def(0x009B, "cine_disable", &[], F_V0_V4),
    def(0x00A0, "nop_A0_debug", &[INT32, CSTRING], F_V0_V4 | F_ARGS),
    def(0x00A1, "set_qt_failure", &[SCRIPT32], F_V0_V2),
    def(0x00A1, "set_qt_failure", &[SCRIPT16], F_V3_V4),
    def(0x00A2, "set_qt_success", &[SCRIPT32], F_V0_V2),
    def(0x00A2, "set_qt_success", &[SCRIPT16], F_V3_V4),
    def(0x00A3, "clr_qt_failure", &[], F_V0_V4),
    def(0x00A4, "clr_qt_success", &[], F_V0_V4),
    def(0x00A5, "set_qt_cancel", &[SCRIPT32], F_V0_V2),
    def(0x00A5, "set_qt_cancel", &[SCRIPT16], F_V3_V4),
    def(0x00A6, "clr_qt_cancel", &[], F_V0_V4),
    defq(0x00A8, "pl_walk", "pl_walk_V1", &[regs32(4), INT32], F_V0_V2),
    defq(0x00A8, "pl_walk", "pl_walk_V3", &[regs(4)], F_V3_V4),
    def(0x00B0, "pl_add_meseta", &[CLIENT_ID, INT32], F_V0_V4 | F_ARGS),
    def(0x00B1, "thread_stg", &[SCRIPT16], F_V0_V4),
    def(0x00B2, "del_obj_param", &[REG], F_V0_V4),
    def(0x00B3, "item_create", &[regs(3), REG], F_V0_V4),
    def(0x00B4, "item_create2", &[regs(12), REG], F_V0_V4),
    def(0x00B5, "item_delete", &[REG, regs(12)], F_V0_V4),
    def(0x00B6, "item_delete2", &[regs(3), regs(12)], F_V0_V4),
    def(0x00B7, "item_check", &[regs(3), REG], F_V0_V4),
    def(0x00B8, "setevt", &[INT32], F_V05_V4 | F_ARGS),
    defq(0x00B9, "get_difficulty_level_v1", "get_difflvl", &[REG], F_V05_V4),
    def(0x00BA, "set_qt_exit", &[SCRIPT32], F_V05_V2),
    def(0x00BA, "set_qt_exit", &[SCRIPT16], F_V3_V4),
    def(0x00BB, "clr_qt_exit", &[], F_V05_V4),
    def(0x00BC, "nop_BC", &[CSTRING], F_V05_V4),
    defq(0x00C0, "particle", "particle_V1", &[regs32(5), INT32], F_V05_V2),
    defq(0x00C0, "particle", "particle_V3", &[regs(5)], F_V3_V4),
    def(0x00C1, "npc_text", &[INT32, CSTRING], F_V05_V4 | F_ARGS),
    def(0x00C2, "npc_chkwarp", &[], F_V05_V4),
    def(0x00C3, "pl_pkoff", &[], F_V05_V4),
    def(0x00C4, "map_designate", &[regs(4)], F_V05_V4),
    def(0x00C5, "masterkey_on", &[], F_V05_V4),
    def(0x00C6, "masterkey_off", &[], F_V05_V4),
    def(0x00C7, "window_time", &[], F_V05_V4),
    def(0x00C8, "winend_time", &[], F_V05_V4),
    def(0x00C9, "winset_time", &[REG], F_V05_V4),
    def(0x00CA, "getmtime", &[REG], F_V05_V4),
    def(0x00CB, "set_quest_board_handler", &[INT32, SCRIPT32, CSTRING], F_V05_V2),
    def(0x00CB, "set_quest_board_handler", &[INT32, SCRIPT16, CSTRING], F_V3_V4 | F_ARGS),
    def(0x00CC, "clear_quest_board_handler", &[INT32], F_V05_V4 | F_ARGS),
    defq(0x00CD, "particle_id", "particle_id_V1", &[regs32(4), INT32], F_V05_V2),
    defq(0x00CD, "particle_id", "particle_id_V3", &[regs(4)], F_V3_V4),
    defq(0x00CE, "npc_crptalk_id", "npc_crptalk_id_V1", &[regs32(7), INT32], F_V05_V2),
    defq(0x00CE, "npc_crptalk_id", "npc_crptalk_id_V3", &[regs(7)], F_V3_V4),
    def(0x00CF, "npc_lang_clean", &[], F_V05_V4),
    def(0x00D0, "pl_pkon", &[], F_V1_V4),
    def(0x00D1, "pl_chk_item2", &[regs(4), REG], F_V1_V4),
    def(0x00D2, "enable_mainmenu", &[], F_V1_V4),
    def(0x00D3, "disable_mainmenu", &[], F_V1_V4),
    def(0x00D4, "start_battlebgm", &[], F_V1_V4),
    def(0x00D5, "end_battlebgm", &[], F_V1_V4),
    def(0x00D6, "disp_msg_qb", &[CSTRING], F_V1_V4 | F_ARGS),
    def(0x00D7, "close_msg_qb", &[], F_V1_V4),
    defq(0x00D8, "set_eventflag", "set_eventflag_v1", &[INT32, INT32], F_V1_V2 | F_ARGS),
    defq(0x00D8, "set_eventflag", "set_eventflag_v3", &[INT32, INT32], F_V3_V4 | F_ARGS),
    defq(0x00D9, "sync_register", "sync_leti", &[INT32, INT32], F_V1_V4 | F_ARGS),
    def(0x00DA, "set_returnhunter", &[], F_V1_V4),
    def(0x00DB, "set_returncity", &[], F_V1_V4),
    def(0x00DC, "load_pvr", &[], F_V1_V4),
    def(0x00DD, "load_midi", &[], F_V1_V4),
    defq(0x00DE, "item_detect_bank", "unknownDE", &[regs(6), REG], F_V1_V4),
    defq(0x00DF, "npc_param", "npc_param_V1", &[regs32(14), INT32], F_V1_V2),
    defq(0x00DF, "npc_param", "npc_param_V3", &[regs(14), INT32], F_V3_V4 | F_ARGS),
    def(0x00E0, "pad_dragon", &[], F_V1_V4),
    def(0x00E1, "clear_mainwarp", &[INT32], F_V1_V4 | F_ARGS),
    defq(0x00E2, "pcam_param", "pcam_param_V1", &[regs32(6)], F_V1_V2),
    defq(0x00E2, "pcam_param", "pcam_param_V3", &[regs(6)], F_V3_V4),
    defq(0x00E3, "start_setevt", "start_setevt_v1", &[INT32, INT32], F_V1_V2 | F_ARGS),
    defq(0x00E3, "start_setevt", "start_setevt_v3", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0x00E4, "warp_on", &[], F_V1_V4),
    def(0x00E5, "warp_off", &[], F_V1_V4),
    defq(0x00E6, "get_client_id", "get_slotnumber", &[REG], F_V1_V4),
    defq(0x00E7, "get_leader_id", "get_servernumber", &[REG], F_V1_V4),
    def(0x00E8, "set_eventflag2", &[INT32, REG], F_V1_V4 | F_ARGS),
    defq(0x00E9, "mod2", "res", &[REG, REG], F_V1_V4),
    defq(0x00EA, "modi2", "unknownEA", &[REG, INT32], F_V1_V4),
    def(0x00EB, "enable_bgmctrl", &[INT32], F_V1_V4 | F_ARGS),
    def(0x00EC, "sw_send", &[regs(3)], F_V1_V4),
    def(0x00ED, "create_bgmctrl", &[], F_V1_V4),
    def(0x00EE, "pl_add_meseta2", &[INT32], F_V1_V4 | F_ARGS),
    defq(0x00EF, "sync_register2", "sync_let", &[INT32, REG32], F_V1_V2),
    def(0x00EF, "sync_register2", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0x00F0, "send_regwork", &[REG32, REG32], F_V1_V2),
    defq(0x00F1, "leti_fixed_camera", "leti_fixed_camera_V1", &[regs32(6)], F_V2),
    defq(0x00F1, "leti_fixed_camera", "leti_fixed_camera_V3", &[regs(6)], F_V3_V4),
    def(0x00F2, "default_camera_pos1", &[], F_V2_V4),
    def(0xF800, "debug_F800", &[], F_V2),
    defq(0xF801, "set_chat_callback", "set_chat_callback?", &[regs32(5), CSTRING], F_V2_V4 | F_ARGS),
    defq(0xF808, "get_difficulty_level_v2", "get_difflvl2", &[REG], F_V2_V4),
    defq(0xF809, "get_number_of_players", "get_number_of_player1", &[REG], F_V2_V4),
    def(0xF80A, "get_coord_of_player", &[regs(3), REG], F_V2_V4),
    def(0xF80B, "enable_map", &[], F_V2_V4),
    def(0xF80C, "disable_map", &[], F_V2_V4),
    def(0xF80D, "map_designate_ex", &[regs(5)], F_V2_V4),
    defq(0xF80E, "disable_weapon_drop", "unknownF80E", &[CLIENT_ID], F_V2_V4 | F_ARGS),
    defq(0xF80F, "enable_weapon_drop", "unknownF80F", &[CLIENT_ID], F_V2_V4 | F_ARGS),
    def(0xF810, "ba_initial_floor", &[AREA], F_V2_V4 | F_ARGS),
    def(0xF811, "set_ba_rules", &[], F_V2_V4),
    defq(0xF812, "ba_set_tech_disk_mode", "ba_set_tech", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF813, "ba_set_weapon_and_armor_mode", "ba_set_equip", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF814, "ba_set_forbid_mags", "ba_set_mag", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF815, "ba_set_tool_mode", "ba_set_item", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF816, "ba_set_trap_mode", "ba_set_trapmenu", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF817, "ba_set_unused_F817", "unknownF817", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF818, "ba_set_respawn", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF819, "ba_set_replace_char", "ba_set_char", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF81A, "ba_dropwep", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF81B, "ba_teams", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF81C, "ba_start", "ba_disp_msg", &[CSTRING], F_V2_V4 | F_ARGS),
    def(0xF81D, "death_lvl_up", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF81E, "ba_set_meseta_drop_mode", "ba_set_meseta", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF820, "cmode_stage", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF821, "nop_F821", &[regs(9)], F_V2_V4),
    def(0xF822, "nop_F822", &[REG], F_V2_V4),
    def(0xF823, "set_cmode_char_template", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF824, "set_cmode_difficulty", "set_cmode_diff", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF825, "exp_multiplication", &[regs(3)], F_V2_V4),
    defq(0xF826, "if_player_alive_cm", "exp_division?", &[REG], F_V2_V4),
    defq(0xF827, "get_user_is_dead", "get_user_is_dead?", &[REG], F_V2_V4),
    def(0xF828, "go_floor", &[REG, REG], F_V2_V4),
    def(0xF829, "get_num_kills", &[REG, REG], F_V2_V4),
    def(0xF82A, "reset_kills", &[REG], F_V2_V4),
    def(0xF82B, "unlock_door2", &[INT32, INT32], F_V2_V4 | F_ARGS),
    def(0xF82C, "lock_door2", &[INT32, INT32], F_V2_V4 | F_ARGS),
    def(0xF82D, "if_switch_not_pressed", &[regs(2)], F_V2_V4),
    def(0xF82E, "if_switch_pressed", &[regs(3)], F_V2_V4),
    def(0xF830, "control_dragon", &[REG], F_V2_V4),
    def(0xF831, "release_dragon", &[], F_V2_V4),
    def(0xF838, "shrink", &[REG], F_V2_V4),
    def(0xF839, "unshrink", &[REG], F_V2_V4),
    def(0xF83A, "set_shrink_cam1", &[regs(4)], F_V2_V4),
    def(0xF83B, "set_shrink_cam2", &[regs(4)], F_V2_V4),
    defq(0xF83C, "display_clock2", "display_clock2?", &[REG], F_V2_V4),
    defq(0xF83D, "set_area_total", "unknownF83D", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF83E, "delete_area_title", "delete_area_title?", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF840, "load_npc_data", &[], F_V2_V4),
    def(0xF841, "get_npc_data", &[VISUAL_CONFIG_LABEL], F_V2_V4),
    def(0xF848, "give_damage_score", &[regs(3)], F_V2_V4),
    def(0xF849, "take_damage_score", &[regs(3)], F_V2_V4),
    defq(0xF84A, "enemy_give_score", "unk_score_F84A", &[regs(3)], F_V2_V4),
    defq(0xF84B, "enemy_take_score", "unk_score_F84B", &[regs(3)], F_V2_V4),
    def(0xF84C, "kill_score", &[regs(3)], F_V2_V4),
    def(0xF84D, "death_score", &[regs(3)], F_V2_V4),
    defq(0xF84E, "enemy_kill_score", "unk_score_F84E", &[regs(3)], F_V2_V4),
    def(0xF84F, "enemy_death_score", &[regs(3)], F_V2_V4),
    def(0xF850, "meseta_score", &[regs(3)], F_V2_V4),
    defq(0xF851, "ba_set_trap_count", "unknownF851", &[regs(2)], F_V2_V4),
    defq(0xF852, "ba_set_target", "unknownF852", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF853, "reverse_warps", &[], F_V2_V4),
    def(0xF854, "unreverse_warps", &[], F_V2_V4),
    def(0xF855, "set_ult_map", &[], F_V2_V4),
    def(0xF856, "unset_ult_map", &[], F_V2_V4),
    def(0xF857, "set_area_title", &[CSTRING], F_V2_V4 | F_ARGS),
    defq(0xF858, "ba_show_self_traps", "BA_Show_Self_Traps", &[], F_V2_V4),
    defq(0xF859, "ba_hide_self_traps", "BA_Hide_Self_Traps", &[], F_V2_V4),
    defq(0xF85A, "equip_item", "equip_item_v2", &[regs32(4)], F_V2),
    defq(0xF85A, "equip_item", "equip_item_v3", &[regs(4)], F_V3_V4),
    defq(0xF85B, "unequip_item", "unequip_item_V2", &[CLIENT_ID, INT32], F_V2 | F_ARGS),
    defq(0xF85B, "unequip_item", "unequip_item_V3", &[CLIENT_ID, INT32], F_V3_V4 | F_ARGS),
    defq(0xF85C, "qexit2", "QEXIT2", &[INT32], F_V2_V4),
    defq(0xF85D, "set_allow_item_flags", "unknownF85D", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF85E, "ba_enable_sonar", "unknownF85E", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF85F, "ba_use_sonar", "unknownF85F", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF860, "clear_score_announce", "unknownF860", &[], F_V2_V4),
    defq(0xF861, "set_score_announce", "unknownF861", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF862, "give_s_rank_weapon", &[REG32, REG32, CSTRING], F_V2),
    def(0xF862, "give_s_rank_weapon", &[INT32, REG, CSTRING], F_V3_V4 | F_ARGS),
    def(0xF863, "get_mag_levels", &[regs32(4)], F_V2),
    def(0xF863, "get_mag_levels", &[regs(4)], F_V3_V4),
    defq(0xF864, "set_cmode_rank_result", "cmode_rank", &[INT32, CSTRING], F_V2_V4 | F_ARGS),
    defq(0xF865, "award_item_name", "award_item_name?", &[], F_V2_V4),
    defq(0xF866, "award_item_select", "award_item_select?", &[], F_V2_V4),
    defq(0xF867, "award_item_give_to", "award_item_give_to?", &[REG], F_V2_V4),
    defq(0xF868, "set_cmode_rank_threshold", "set_cmode_rank", &[REG, REG], F_V2_V4),
    def(0xF869, "check_rank_time", &[REG, REG], F_V2_V4),
    def(0xF86A, "item_create_cmode", &[regs(6), REG], F_V2_V4),
    defq(0xF86B, "ba_set_box_drop_area", "ba_box_drops", &[REG], F_V2_V4),
    defq(0xF86C, "award_item_ok", "award_item_ok?", &[REG], F_V2_V4),
    def(0xF86D, "ba_set_trapself", &[], F_V2_V4),
    defq(0xF86E, "ba_clear_trapself", "unknownF86E", &[], F_V2_V4),
    def(0xF86F, "ba_set_lives", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF870, "ba_set_max_tech_level", "ba_set_tech_lvl", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF871, "ba_set_char_level", "ba_set_lvl", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF872, "ba_set_time_limit", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF873, "dark_falz_is_dead", "boss_is_dead?", &[REG], F_V2_V4),
    def(0xF874, "set_cmode_rank_override", &[INT32, CSTRING], F_V2_V4 | F_ARGS),
    def(0xF875, "enable_stealth_suit_effect", &[REG], F_V2_V4),
    def(0xF876, "disable_stealth_suit_effect", &[REG], F_V2_V4),
    def(0xF877, "enable_techs", &[REG], F_V2_V4),
    def(0xF878, "disable_techs", &[REG], F_V2_V4),
    def(0xF879, "get_gender", &[REG, REG], F_V2_V4),
    def(0xF87A, "get_chara_class", &[REG, regs(2)], F_V2_V4),
    def(0xF87B, "take_slot_meseta", &[regs(2), REG], F_V2_V4),
    def(0xF87C, "get_guild_card_file_creation_time", &[REG], F_V2_V4),
    def(0xF87D, "kill_player", &[REG], F_V2_V4),
    def(0xF87E, "get_serial_number", &[REG], F_V2_V4),
    defq(0xF87F, "get_eventflag", "read_guildcard_flag", &[REG, REG], F_V2_V4),
    defq(0xF880, "set_trap_damage", "unknownF880", &[regs(3)], F_V2_V4),
    defq(0xF881, "get_pl_name", "get_pl_name?", &[REG], F_V2_V4),
    def(0xF882, "get_pl_job", &[REG], F_V2_V4),
    defq(0xF883, "get_player_proximity", "unknownF883", &[regs(2), REG], F_V2_V4),
    def(0xF884, "set_eventflag16", &[INT32, REG], F_V2),
    def(0xF884, "set_eventflag16", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF885, "set_eventflag32", &[INT32, REG], F_V2),
    def(0xF885, "set_eventflag32", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF886, "ba_get_place", &[REG, REG], F_V2_V4),
    def(0xF887, "ba_get_score", &[REG, REG], F_V2_V4),
    defq(0xF888, "enable_win_pfx", "ba_close_msg", &[], F_V2_V4),
    def(0xF889, "disable_win_pfx", &[], F_V2_V4),
    def(0xF88A, "get_player_status", &[REG, REG], F_V2_V4),
    def(0xF88B, "send_mail", &[REG, CSTRING], F_V2_V4 | F_ARGS),
    def(0xF88C, "get_game_version", &[REG], F_V2_V4),
    defq(0xF88D, "chl_set_timerecord", "chl_set_timerecord?", &[REG], F_V2 | F_V3),
    defq(0xF88D, "chl_set_timerecord", "chl_set_timerecord?", &[REG, REG], F_V4),
    defq(0xF88E, "chl_get_timerecord", "chl_get_timerecord?", &[REG], F_V2_V4),
    def(0xF88F, "set_cmode_grave_rates", &[regs(20)], F_V2_V4),
    defq(0xF890, "clear_mainwarp_all", "unknownF890", &[], F_V2_V4),
    def(0xF891, "load_enemy_data", &[INT32], F_V2_V4 | F_ARGS),
    def(0xF892, "get_physical_data", &[STATS_LABEL], F_V2_V4),
    def(0xF893, "get_attack_data", &[ATTACK_LABEL], F_V2_V4),
    def(0xF894, "get_resist_data", &[RESIST_LABEL], F_V2_V4),
    def(0xF895, "get_movement_data", &[MOVEMENT_LABEL], F_V2_V4),
    def(0xF896, "get_eventflag16", &[REG, REG], F_V2_V4),
    def(0xF897, "get_eventflag32", &[REG, REG], F_V2_V4),
    def(0xF898, "shift_left", &[REG, REG], F_V2_V4),
    def(0xF899, "shift_right", &[REG, REG], F_V2_V4),
    def(0xF89A, "get_random", &[regs(2), REG], F_V2_V4),
    def(0xF89B, "reset_map", &[], F_V2_V4),
    def(0xF89C, "disp_chl_retry_menu", &[REG], F_V2_V4),
    defq(0xF89D, "chl_reverser", "chl_reverser?", &[], F_V2_V4),
    defq(0xF89E, "ba_forbid_scape_dolls", "unknownF89E", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF89F, "player_recovery", "unknownF89F", &[REG], F_V2_V4),
    defq(0xF8A0, "disable_bosswarp_option", "unknownF8A0", &[], F_V2_V4),
    defq(0xF8A1, "enable_bosswarp_option", "unknownF8A1", &[], F_V2_V4),
    def(0xF8A2, "is_bosswarp_opt_disabled", &[REG], F_V2_V4),
    defq(0xF8A3, "load_serial_number_to_flag_buf", "init_online_key?", &[], F_V2_V4),
    defq(0xF8A4, "write_flag_buf_to_event_flags", "encrypt_gc_entry_auto", &[REG], F_V2_V4),
    def(0xF8A5, "set_chat_callback_no_filter", &[regs(5)], F_V2_V4),
    def(0xF8A6, "set_symbol_chat_collision", &[regs(10)], F_V2_V4),
    def(0xF8A7, "set_shrink_size", &[REG, regs(3)], F_V2_V4),
    def(0xF8A8, "death_tech_lvl_up2", &[INT32], F_V2_V4 | F_ARGS),
    defq(0xF8A9, "vol_opt_is_dead", "unknownF8A9", &[REG], F_V2_V4),
    def(0xF8AA, "is_there_grave_message", &[REG], F_V2_V4),
    def(0xF8AB, "get_ba_record", &[regs(7)], F_V2_V4),
    def(0xF8AC, "get_cmode_prize_rank", &[REG], F_V2_V4),
    def(0xF8AD, "get_number_of_players2", &[REG], F_V2_V4),
    def(0xF8AE, "party_has_name", &[REG], F_V2_V4),
    def(0xF8AF, "someone_has_spoken", &[REG], F_V2_V4),
    def(0xF8B0, "read1", &[REG, REG], F_V2),
    def(0xF8B0, "read1", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B1, "read2", &[REG, REG], F_V2),
    def(0xF8B1, "read2", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B2, "read4", &[REG, REG], F_V2),
    def(0xF8B2, "read4", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B3, "write1", &[REG, REG], F_V2),
    def(0xF8B3, "write1", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B4, "write2", &[REG, REG], F_V2),
    def(0xF8B4, "write2", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B5, "write4", &[REG, REG], F_V2),
    def(0xF8B5, "write4", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF8B6, "check_for_hacking", &[REG], F_V2_V4),
    def(0xF8B7, "unknown_F8B7", &[REG], F_V2_V4),
    defq(0xF8B8, "disable_retry_menu", "unknownF8B8", &[], F_V2_V4),
    defq(0xF8B9, "chl_recovery", "chl_recovery?", &[], F_V2_V4),
    def(0xF8BA, "load_guild_card_file_creation_time_to_flag_buf", &[], F_V2_V4),
    def(0xF8BB, "write_flag_buf_to_event_flags2", &[REG], F_V2_V4),
    def(0xF8BC, "set_episode", &[INT32], F_V3_V4 | F_SET_EPISODE),
    def(0xF8C0, "file_dl_req", &[INT32, CSTRING], F_V3 | F_ARGS),
    def(0xF8C0, "nop_F8C0", &[INT32, CSTRING], F_V4 | F_ARGS),
    def(0xF8C1, "get_dl_status", &[REG], F_V3),
    def(0xF8C1, "nop_F8C1", &[REG], F_V4),
    defq(0xF8C2, "prepare_gba_rom_from_download", "gba_unknown4?", &[], F_GC3),
    def(0xF8C2, "nop_F8C2", &[], V_XB_V3 | F_V4),
    defq(0xF8C3, "start_or_update_gba_joyboot", "get_gba_state?", &[REG], F_GC3),
    def(0xF8C3, "return_0_F8C3", &[REG], V_XB_V3),
    def(0xF8C3, "nop_F8C3", &[REG], F_V4),
    defq(0xF8C4, "congrats_msg_multi_cm", "unknownF8C4", &[REG], F_V3),
    def(0xF8C4, "nop_F8C4", &[REG], F_V4),
    defq(0xF8C5, "stage_end_multi_cm", "unknownF8C5", &[REG], F_V3),
    def(0xF8C5, "nop_F8C5", &[REG], F_V4),
    defq(0xF8C6, "qexit", "QEXIT", &[], F_V3_V4),
    def(0xF8C7, "use_animation", &[REG, REG], F_V3_V4),
    def(0xF8C8, "stop_animation", &[REG], F_V3_V4),
    def(0xF8C9, "run_to_coord", &[regs(4), REG], F_V3_V4),
    def(0xF8CA, "set_slot_invincible", &[REG, REG], F_V3_V4),
    defq(0xF8CB, "clear_slot_invincible", "unknownF8CB", &[REG], F_V3_V4),
    def(0xF8CC, "set_slot_poison", &[REG], F_V3_V4),
    def(0xF8CD, "set_slot_paralyze", &[REG], F_V3_V4),
    def(0xF8CE, "set_slot_shock", &[REG], F_V3_V4),
    def(0xF8CF, "set_slot_freeze", &[REG], F_V3_V4),
    def(0xF8D0, "set_slot_slow", &[REG], F_V3_V4),
    def(0xF8D1, "set_slot_confuse", &[REG], F_V3_V4),
    def(0xF8D2, "set_slot_shifta", &[REG], F_V3_V4),
    def(0xF8D3, "set_slot_deband", &[REG], F_V3_V4),
    def(0xF8D4, "set_slot_jellen", &[REG], F_V3_V4),
    def(0xF8D5, "set_slot_zalure", &[REG], F_V3_V4),
    def(0xF8D6, "fleti_fixed_camera", &[regs(6)], F_V3_V4 | F_ARGS),
    def(0xF8D7, "fleti_locked_camera", &[INT32, regs(3)], F_V3_V4 | F_ARGS),
    def(0xF8D8, "default_camera_pos2", &[], F_V3_V4),
    def(0xF8D9, "set_motion_blur", &[], F_V3_V4),
    defq(0xF8DA, "set_screen_bw", "set_screen_b&w", &[], F_V3_V4),
    defq(
        0xF8DB,
        "get_vector_from_path",
        "unknownF8DB",
        &[INT32, FLOAT32, FLOAT32, INT32, regs(4), SCRIPT16],
        F_V3_V4 | F_ARGS,
    ),
    defq(0xF8DC, "npc_action_string", "NPC_action_string", &[REG, REG, CSTRING_LABEL16], F_V3_V4),
    def(0xF8DD, "get_pad_cond", &[REG, REG], F_V3_V4),
    def(0xF8DE, "get_button_cond", &[REG, REG], F_V3_V4),
    def(0xF8DF, "freeze_enemies", &[], F_V3_V4),
    def(0xF8E0, "unfreeze_enemies", &[], F_V3_V4),
    def(0xF8E1, "freeze_everything", &[], F_V3_V4),
    def(0xF8E2, "unfreeze_everything", &[], F_V3_V4),
    def(0xF8E3, "restore_hp", &[REG], F_V3_V4),
    def(0xF8E4, "restore_tp", &[REG], F_V3_V4),
    def(0xF8E5, "close_chat_bubble", &[REG], F_V3_V4),
    defq(0xF8E6, "move_coords_object", "unknownF8E6", &[REG, regs(3)], F_V3_V4),
    defq(0xF8E7, "at_coords_call_ex", "unknownF8E7", &[regs(5), REG], F_V3_V4),
    defq(0xF8E8, "at_coords_talk_ex", "unknownF8E8", &[regs(5), REG], F_V3_V4),
    defq(0xF8E9, "walk_to_coord_call_ex", "unknownF8E9", &[regs(5), REG], F_V3_V4),
    defq(0xF8EA, "col_npcinr_ex", "unknownF8EA", &[regs(6), REG], F_V3_V4),
    defq(0xF8EB, "set_obj_param_ex", "unknownF8EB", &[regs(6), REG], F_V3_V4),
    defq(0xF8EC, "col_plinaw_ex", "unknownF8EC", &[regs(9), REG], F_V3_V4),
    def(0xF8ED, "animation_check", &[REG, REG], F_V3_V4),
    def(0xF8EE, "call_image_data", &[INT32, IMAGE_LABEL], F_V3_V4 | F_ARGS),
    defq(0xF8EF, "nop_F8EF", "unknownF8EF", &[], F_V3_V4),
    def(0xF8F0, "turn_off_bgm_p2", &[], F_V3_V4),
    def(0xF8F1, "turn_on_bgm_p2", &[], F_V3_V4),
    defq(
        0xF8F2,
        "unknown_F8F2",
        "load_unk_data",
        &[INT32, FLOAT32, FLOAT32, INT32, regs(4), F8F2_LABEL],
        F_V3_V4 | F_ARGS,
    ),
    def(0xF8F3, "particle2", &[regs(3), INT32, FLOAT32], F_V3_V4 | F_ARGS),
    def(0xF901, "dec2float", &[REG, REG], F_V3_V4),
    def(0xF902, "float2dec", &[REG, REG], F_V3_V4),
    def(0xF903, "flet", &[REG, REG], F_V3_V4),
    def(0xF904, "fleti", &[REG, FLOAT32], F_V3_V4),
    def(0xF908, "fadd", &[REG, REG], F_V3_V4),
    def(0xF909, "faddi", &[REG, FLOAT32], F_V3_V4),
    def(0xF90A, "fsub", &[REG, REG], F_V3_V4),
    def(0xF90B, "fsubi", &[REG, FLOAT32], F_V3_V4),
    def(0xF90C, "fmul", &[REG, REG], F_V3_V4),
    def(0xF90D, "fmuli", &[REG, FLOAT32], F_V3_V4),
    def(0xF90E, "fdiv", &[REG, REG], F_V3_V4),
    def(0xF90F, "fdivi", &[REG, FLOAT32], F_V3_V4),
    defq(0xF910, "get_total_deaths", "get_unknown_count?", &[CLIENT_ID, REG], F_V3_V4 | F_ARGS),
    def(0xF911, "get_stackable_item_count", &[regs(4), REG], F_V3_V4),
    def(0xF912, "freeze_and_hide_equip", &[], F_V3_V4),
    def(0xF913, "thaw_and_show_equip", &[], F_V3_V4),
    defq(0xF914, "set_palettex_callback", "set_paletteX_callback", &[CLIENT_ID, SCRIPT16], F_V3_V4 | F_ARGS),
    defq(0xF915, "activate_palettex", "activate_paletteX", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    defq(0xF916, "enable_palettex", "enable_paletteX", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    defq(0xF917, "restore_palettex", "restore_paletteX", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    defq(0xF918, "disable_palettex", "disable_paletteX", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    defq(0xF919, "get_palettex_activated", "get_paletteX_activated", &[CLIENT_ID, REG], F_V3_V4 | F_ARGS),
    defq(
        0xF91A,
        "get_unknown_palettex_status",
        "get_unknown_paletteX_status?",
        &[CLIENT_ID, INT32, REG],
        F_V3_V4 | F_ARGS,
    ),
    def(0xF91B, "disable_movement2", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    def(0xF91C, "enable_movement2", &[CLIENT_ID], F_V3_V4 | F_ARGS),
    def(0xF91D, "get_time_played", &[REG], F_V3_V4),
    def(0xF91E, "get_guildcard_total", &[REG], F_V3_V4),
    def(0xF91F, "get_slot_meseta", &[REG], F_V3_V4),
    def(0xF920, "get_player_level", &[CLIENT_ID, REG], F_V3_V4 | F_ARGS),
    defq(0xF921, "get_section_id", "get_Section_ID", &[CLIENT_ID, REG], F_V3_V4 | F_ARGS),
    def(0xF922, "get_player_hp", &[CLIENT_ID, regs(4)], F_V3_V4 | F_ARGS),
    def(0xF923, "get_floor_number", &[CLIENT_ID, regs(2)], F_V3_V4 | F_ARGS),
    def(0xF924, "get_coord_player_detect", &[regs(3), regs(4)], F_V3_V4),
    defq(0xF925, "read_counter", "read_global_flag", &[INT32, REG], F_V3_V4 | F_ARGS),
    defq(0xF926, "write_counter", "write_global_flag", &[INT32, INT32], F_V3_V4 | F_ARGS),
    defq(0xF927, "item_detect_bank2", "unknownF927", &[regs(4), REG], F_V3_V4),
    def(0xF928, "floor_player_detect", &[regs(4)], F_V3_V4),
    defq(0xF929, "prepare_gba_rom_from_disk", "read_disk_file?", &[CSTRING], F_V3 | F_ARGS),
    def(0xF929, "nop_F929", &[CSTRING], F_V4 | F_ARGS),
    def(0xF92A, "open_pack_select", &[], F_V3_V4),
    def(0xF92B, "item_select", &[REG], F_V3_V4),
    def(0xF92C, "get_item_id", &[REG], F_V3_V4),
    def(0xF92D, "color_change", &[INT32, INT32, INT32, INT32, INT32], F_V3_V4 | F_ARGS),
    defq(
        0xF92E,
        "send_statistic",
        "send_statistic?",
        &[INT32, INT32, INT32, INT32, INT32, INT32, INT32, INT32],
        F_V3_V4 | F_ARGS,
    ),
    defq(0xF92F, "gba_write_identifiers", "unknownF92F", &[INT32, INT32], F_V3 | F_ARGS),
    def(0xF92F, "nop_F92F", &[INT32, INT32], F_V4 | F_ARGS),
    def(0xF930, "chat_box", &[INT32, INT32, INT32, INT32, INT32, CSTRING], F_V3_V4 | F_ARGS),
    def(0xF931, "chat_bubble", &[INT32, CSTRING], F_V3_V4 | F_ARGS),
    def(0xF932, "set_episode2", &[REG], F_V3_V4),
    defq(0xF933, "item_create_multi_cm", "unknownF933", &[regs(7)], F_V3),
    def(0xF933, "nop_F933", &[regs(7)], F_V4),
    def(
        0xF934,
        "scroll_text",
        &[INT32, INT32, INT32, INT32, INT32, FLOAT32, REG, CSTRING],
        F_V3_V4 | F_ARGS,
    ),
    defq(0xF935, "gba_create_dl_graph", "gba_unknown1", &[], F_GC3),
    def(0xF935, "nop_F935", &[], V_XB_V3 | F_V4),
    defq(0xF936, "gba_destroy_dl_graph", "gba_unknown2", &[], F_GC3),
    def(0xF936, "nop_F936", &[], V_XB_V3 | F_V4),
    defq(0xF937, "gba_update_dl_graph", "gba_unknown3", &[], F_GC3),
    def(0xF937, "nop_F937", &[], V_XB_V3 | F_V4),
    defq(0xF938, "add_damage_to", "add_damage_to?", &[INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF939, "item_delete3", &[INT32], F_V3_V4 | F_ARGS),
    def(0xF93A, "get_item_info", &[ITEM_ID, regs(12)], F_V3_V4 | F_ARGS),
    def(0xF93B, "item_packing1", &[ITEM_ID], F_V3_V4 | F_ARGS),
    def(0xF93C, "item_packing2", &[ITEM_ID, INT32], F_V3_V4 | F_ARGS),
    defq(0xF93D, "get_lang_setting", "get_lang_setting?", &[REG], F_V3_V4 | F_ARGS),
    defq(0xF93E, "prepare_statistic", "prepare_statistic?", &[INT32, INT32, INT32], F_V3_V4 | F_ARGS),
    def(0xF93F, "keyword_detect", &[], F_V3_V4),
    def(0xF940, "keyword", &[REG, INT32, CSTRING], F_V3_V4 | F_ARGS),
    def(0xF941, "get_guildcard_num", &[CLIENT_ID, REG], F_V3_V4 | F_ARGS),
    def(0xF942, "get_recent_symbol_chat", &[INT32, regs(15)], F_V3_V4 | F_ARGS),
    def(0xF943, "create_symbol_chat_capture_buffer", &[], F_V3_V4),
    defq(0xF944, "get_item_stackability", "get_wrap_status", &[ITEM_ID, REG], F_V3_V4 | F_ARGS),
    def(0xF945, "initial_floor", &[INT32], F_V3_V4 | F_ARGS),
    def(0xF946, "sin", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF947, "cos", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF948, "tan", &[REG, INT32], F_V3_V4 | F_ARGS),
    def(0xF949, "atan2_int", &[REG, FLOAT32, FLOAT32], F_V3_V4 | F_ARGS),
    defq(0xF94A, "olga_flow_is_dead", "boss_is_dead2?", &[REG], F_V3_V4),
    defq(0xF94B, "particle_effect_nc", "particle3", &[regs(4)], F_V3_V4),
    defq(0xF94C, "player_effect_nc", "unknownF94C", &[regs(4)], F_V3_V4),
    def(0xF94D, "has_ep3_save_file", &[REG], V_GC_V3 | F_ARGS),
    defq(0xF94D, "give_card", "is_there_cardbattle?", &[REG], V_GC_EP3TE),
    defq(0xF94D, "give_or_take_card", "is_there_cardbattle?", &[regs(2)], V_GC_EP3),
    def(0xF94D, "unknown_F94D", &[INT32, REG], V_XB_V3 | F_ARGS),
    def(0xF94D, "nop_F94D", &[], F_V4),
    def(0xF94E, "nop_F94E", &[], F_V4),
    def(0xF94F, "nop_F94F", &[], F_V4),
    defq(0xF950, "bb_p2_menu", "BB_p2_menu", &[INT32], F_V4 | F_ARGS),
    defq(0xF951, "bb_map_designate", "BB_Map_Designate", &[INT8, INT8, INT8, INT8, INT8], F_V4),
    defq(0xF952, "bb_get_number_in_pack", "BB_get_number_in_pack", &[REG], F_V4),
    defq(
        0xF953,
        "bb_swap_item",
        "BB_swap_item",
        &[INT32, INT32, INT32, INT32, INT32, INT32, SCRIPT16, SCRIPT16],
        F_V4 | F_ARGS,
    ),
    defq(0xF954, "bb_check_wrap", "BB_check_wrap", &[INT32, REG], F_V4 | F_ARGS),
    defq(
        0xF955,
        "bb_exchange_pd_item",
        "BB_exchange_PD_item",
        &[INT32, INT32, INT32, LABEL16, LABEL16],
        F_V4 | F_ARGS,
    ),
    defq(
        0xF956,
        "bb_exchange_pd_srank",
        "BB_exchange_PD_srank",
        &[INT32, INT32, INT32, INT32, INT32, LABEL16, LABEL16],
        F_V4 | F_ARGS,
    ),
    defq(
        0xF957,
        "bb_exchange_pd_percent",
        "BB_exchange_PD_special",
        &[INT32, INT32, INT32, INT32, INT32, INT32, LABEL16, LABEL16],
        F_V4 | F_ARGS,
    ),
    defq(
        0xF958,
        "bb_exchange_ps_percent",
        "BB_exchange_PD_percent",
        &[INT32, INT32, INT32, INT32, INT32, INT32, LABEL16, LABEL16],
        F_V4 | F_ARGS,
    ),
    defq(0xF959, "bb_set_ep4_boss_can_escape", "unknownF959", &[INT32], F_V4 | F_ARGS),
    def(0xF95A, "bb_is_ep4_boss_dying", &[REG], F_V4),
    def(
        0xF95B,
        "bb_send_6xD9",
        &[INT32, INT32, INT32, INT32, LABEL16, LABEL16],
        F_V4 | F_ARGS,
    ),
    defq(0xF95C, "bb_exchange_slt", "BB_exchange_SLT", &[INT32, INT32, INT32, INT32], F_V4 | F_ARGS),
    defq(0xF95D, "bb_exchange_pc", "BB_exchange_PC", &[], F_V4),
    defq(0xF95E, "bb_box_create_bp", "BB_box_create_BP", &[INT32, FLOAT32, FLOAT32], F_V4 | F_ARGS),
    defq(0xF95F, "bb_exchange_pt", "BB_exchage_PT", &[INT32, INT32, INT32, INT32, INT32], F_V4 | F_ARGS),
    defq(0xF960, "bb_send_6xE2", "unknownF960", &[INT32], F_V4 | F_ARGS),
    defq(0xF961, "bb_get_6xE3_status", "unknownF961", &[REG], F_V4),
];

const NUM_BUILDS: usize = 14;

// Bits 0 and 1 of the flag word belong to the inert patch placeholders and
// are reused for F_PASS/F_ARGS, so those two slots stay empty.
lazy_static! {
    static ref OPCODES_BY_NUMBER: Vec<FxHashMap<u16, &'static OpcodeDef>> = {
        let mut indexes = vec![FxHashMap::default(); NUM_BUILDS];
        for build in Build::ALL_QUEST {
            let mask = build.mask_bit();
            let index = &mut indexes[build as usize];
            for opcode_def in OPCODE_DEFS {
                if opcode_def.flags & mask == 0 {
                    continue;
                }
                if index.insert(opcode_def.opcode, opcode_def).is_some() {
                    panic!(
                        "duplicate definition for opcode {:04X} in build {}",
                        opcode_def.opcode, build
                    );
                }
            }
        }
        indexes
    };
    static ref OPCODES_BY_NAME: Vec<FxHashMap<&'static str, &'static OpcodeDef>> = {
        let mut indexes: Vec<FxHashMap<&'static str, &'static OpcodeDef>> =
            vec![FxHashMap::default(); NUM_BUILDS];
        for build in Build::ALL_QUEST {
            let mask = build.mask_bit();
            let index = &mut indexes[build as usize];
            for opcode_def in OPCODE_DEFS {
                if opcode_def.flags & mask == 0 {
                    continue;
                }
                if index.insert(opcode_def.name, opcode_def).is_some() {
                    panic!(
                        "duplicate mnemonic {} for opcode {:04X} in build {}",
                        opcode_def.name, opcode_def.opcode, build
                    );
                }
                if let Some(qedit_name) = opcode_def.qedit_name {
                    if index.insert(qedit_name, opcode_def).is_some() {
                        panic!(
                            "duplicate mnemonic {} for opcode {:04X} in build {}",
                            qedit_name, opcode_def.opcode, build
                        );
                    }
                }
            }
        }
        indexes
    };
}

/// Opcode-number lookup for one build.
pub fn opcodes_for_build(build: Build) -> &'static FxHashMap<u16, &'static OpcodeDef> {
    &OPCODES_BY_NUMBER[build as usize]
}

/// Mnemonic lookup for one build; both primary and qedit names are indexed.
pub fn mnemonics_for_build(build: Build) -> &'static FxHashMap<&'static str, &'static OpcodeDef> {
    &OPCODES_BY_NAME[build as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_duplicate_opcodes_or_mnemonics() {
        // Building the indexes panics on a collision; touch every build.
        for build in Build::ALL_QUEST {
            assert!(!opcodes_for_build(build).is_empty());
            assert!(!mnemonics_for_build(build).is_empty());
        }
    }

    #[test]
    fn version_split_rows_resolve() {
        let v2 = opcodes_for_build(Build::DcV2);
        let v3 = opcodes_for_build(Build::GcV3);
        assert_eq!(v2[&0x000A].name, "leta");
        assert_eq!(v3[&0x000A].name, "letb");
        assert_eq!(v2[&0x0095].args[1].ty, ArgType::Label32);
        assert_eq!(v3[&0x0095].args[1].ty, ArgType::Label16);
    }

    #[test]
    fn qedit_names_are_indexed() {
        let names = mnemonics_for_build(Build::DcV2);
        assert_eq!(names["jmp_="].opcode, 0x002C);
        assert_eq!(names["jmp_eq"].opcode, 0x002C);
        assert_eq!(names["get_difflvl2"].opcode, 0xF808);
    }

    #[test]
    fn push_and_consume_flags() {
        let v4 = opcodes_for_build(Build::BbV4);
        assert!(v4[&0x0048].pushes_arg());
        assert!(v4[&0x0050].consumes_args());
        assert!(v4[&0x0001].is_ret());
        assert!(v4[&0xF8BC].sets_episode());
    }

    #[test]
    fn patch_builds_have_no_opcodes() {
        assert!(opcodes_for_build(Build::PcPatch).is_empty());
        assert!(opcodes_for_build(Build::BbPatch).is_empty());
    }

    #[test]
    fn two_byte_prefix_detection() {
        let v4 = opcodes_for_build(Build::BbV4);
        assert!(!v4[&0x0050].is_two_byte());
        assert!(v4[&0xF808].is_two_byte());
        assert!(v4[&0xF901].is_two_byte());
    }

    #[test]
    fn gc_only_rows_are_gated() {
        assert!(opcodes_for_build(Build::GcV3).contains_key(&0xF8C2));
        assert_eq!(
            opcodes_for_build(Build::GcV3)[&0xF8C2].name,
            "prepare_gba_rom_from_download"
        );
        assert_eq!(opcodes_for_build(Build::XbV3)[&0xF8C2].name, "nop_F8C2");
        assert_eq!(opcodes_for_build(Build::BbV4)[&0xF8C2].name, "nop_F8C2");
    }
}
