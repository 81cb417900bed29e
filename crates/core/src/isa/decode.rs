//! RISC-V instruction decoder.
//!
//! Decodes a raw 32-bit RV32I/M instruction into a [`Decoded`] struct,
//! extracting the register/function-code fields and sign-extending the
//! immediate for whichever of the five encodings (I/S/B/U/J) the opcode
//! uses. Narrowed from the teacher's `isa/decode.rs`: one instruction
//! width (32 bits), one register width (32 bits), and no floating-point
//! opcodes.

use crate::isa::instruction::{Decoded, InstructionBits};
use crate::isa::rv32i::opcodes;

const INSTRUCTION_WIDTH: u32 = 32;

const I_IMM_SHIFT: u32 = 20;

const S_IMM_LOW_SHIFT: u32 = 7;
const S_IMM_LOW_MASK: u32 = 0x1F;
const S_IMM_HIGH_SHIFT: u32 = 25;
const S_IMM_HIGH_MASK: u32 = 0x7F;
const S_IMM_COMBINED_SHIFT: u32 = 5;
const S_IMM_BITS: u32 = 12;

const B_IMM_11_SHIFT: u32 = 7;
const B_IMM_11_MASK: u32 = 1;
const B_IMM_4_1_SHIFT: u32 = 8;
const B_IMM_4_1_MASK: u32 = 0xF;
const B_IMM_10_5_SHIFT: u32 = 25;
const B_IMM_10_5_MASK: u32 = 0x3F;
const B_IMM_12_SHIFT: u32 = 31;
const B_IMM_12_MASK: u32 = 1;
const B_IMM_BITS: u32 = 13;
const B_IMM_12_POS: u32 = 12;
const B_IMM_11_POS: u32 = 11;
const B_IMM_10_5_POS: u32 = 5;
const B_IMM_4_1_POS: u32 = 1;

const U_IMM_MASK: u32 = 0xFFFF_F000;

const J_IMM_19_12_SHIFT: u32 = 12;
const J_IMM_19_12_MASK: u32 = 0xFF;
const J_IMM_11_SHIFT: u32 = 20;
const J_IMM_11_MASK: u32 = 1;
const J_IMM_10_1_SHIFT: u32 = 21;
const J_IMM_10_1_MASK: u32 = 0x3FF;
const J_IMM_20_SHIFT: u32 = 31;
const J_IMM_20_MASK: u32 = 1;
const J_IMM_BITS: u32 = 21;
const J_IMM_20_POS: u32 = 20;
const J_IMM_19_12_POS: u32 = 12;
const J_IMM_11_POS: u32 = 11;
const J_IMM_10_1_POS: u32 = 1;

/// Decodes a raw instruction word into its component fields.
#[must_use]
pub fn decode(inst: u32) -> Decoded {
    let opcode = inst.opcode();

    let imm = match opcode {
        opcodes::OP_IMM | opcodes::OP_LOAD | opcodes::OP_JALR => decode_i_type_imm(inst),
        opcodes::OP_STORE => decode_s_type_imm(inst),
        opcodes::OP_BRANCH => decode_b_type_imm(inst),
        opcodes::OP_LUI | opcodes::OP_AUIPC => decode_u_type_imm(inst),
        opcodes::OP_JAL => decode_j_type_imm(inst),
        _ => 0,
    };

    Decoded {
        raw: inst,
        opcode,
        rd: InstructionBits::rd(&inst),
        rs1: InstructionBits::rs1(&inst),
        rs2: InstructionBits::rs2(&inst),
        funct3: InstructionBits::funct3(&inst),
        funct7: InstructionBits::funct7(&inst),
        shamt: InstructionBits::shamt(&inst),
        imm,
    }
}

/// I-Type: `imm[11:0] | rs1 | funct3 | rd | opcode`. Loads, JALR, OP-IMM.
fn decode_i_type_imm(inst: u32) -> i32 {
    (inst as i32) >> I_IMM_SHIFT
}

/// S-Type: `imm[11:5] | rs2 | rs1 | funct3 | imm[4:0] | opcode`. Stores.
fn decode_s_type_imm(inst: u32) -> i32 {
    let low = (inst >> S_IMM_LOW_SHIFT) & S_IMM_LOW_MASK;
    let high = (inst >> S_IMM_HIGH_SHIFT) & S_IMM_HIGH_MASK;
    let combined = (high << S_IMM_COMBINED_SHIFT) | low;
    sign_extend(combined, S_IMM_BITS)
}

/// B-Type: `imm[12] | imm[10:5] | rs2 | rs1 | funct3 | imm[4:1] | imm[11] | opcode`. Branches.
fn decode_b_type_imm(inst: u32) -> i32 {
    let bit_11 = (inst >> B_IMM_11_SHIFT) & B_IMM_11_MASK;
    let bits_4_1 = (inst >> B_IMM_4_1_SHIFT) & B_IMM_4_1_MASK;
    let bits_10_5 = (inst >> B_IMM_10_5_SHIFT) & B_IMM_10_5_MASK;
    let bit_12 = (inst >> B_IMM_12_SHIFT) & B_IMM_12_MASK;

    let combined = (bit_12 << B_IMM_12_POS)
        | (bit_11 << B_IMM_11_POS)
        | (bits_10_5 << B_IMM_10_5_POS)
        | (bits_4_1 << B_IMM_4_1_POS);
    sign_extend(combined, B_IMM_BITS)
}

/// U-Type: `imm[31:12] | rd | opcode`. LUI, AUIPC. Not sign-extended further:
/// the top 20 bits already occupy their final position.
fn decode_u_type_imm(inst: u32) -> i32 {
    (inst & U_IMM_MASK) as i32
}

/// J-Type: `imm[20] | imm[10:1] | imm[11] | imm[19:12] | rd | opcode`. JAL.
fn decode_j_type_imm(inst: u32) -> i32 {
    let bits_19_12 = (inst >> J_IMM_19_12_SHIFT) & J_IMM_19_12_MASK;
    let bit_11 = (inst >> J_IMM_11_SHIFT) & J_IMM_11_MASK;
    let bits_10_1 = (inst >> J_IMM_10_1_SHIFT) & J_IMM_10_1_MASK;
    let bit_20 = (inst >> J_IMM_20_SHIFT) & J_IMM_20_MASK;

    let combined = (bit_20 << J_IMM_20_POS)
        | (bits_19_12 << J_IMM_19_12_POS)
        | (bit_11 << J_IMM_11_POS)
        | (bits_10_1 << J_IMM_10_1_POS);
    sign_extend(combined, J_IMM_BITS)
}

/// Sign-extends the low `bits` of `val` to a full 32-bit signed integer.
fn sign_extend(val: u32, bits: u32) -> i32 {
    let shift = INSTRUCTION_WIDTH - bits;
    ((val as i32) << shift) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isa::rv32i::{funct3, opcodes};
    use proptest::prelude::*;
    use rstest::rstest;

    fn encode_i(imm: i32, rs1: u32, funct3: u32, rd: u32, opcode: u32) -> u32 {
        (((imm as u32) & 0xFFF) << 20) | (rs1 << 15) | (funct3 << 12) | (rd << 7) | opcode
    }

    #[rstest]
    #[case(1)]
    #[case(-1)]
    #[case(2047)]
    #[case(-2048)]
    fn i_type_round_trips(#[case] imm: i32) {
        let inst = encode_i(imm, 1, funct3::ADD_SUB, 2, opcodes::OP_IMM);
        let d = decode(inst);
        assert_eq!(d.imm, imm);
        assert_eq!(d.rs1, 1);
        assert_eq!(d.rd, 2);
    }

    #[test]
    fn u_type_keeps_upper_bits_in_place() {
        let inst = 0xDEAD_B000 | opcodes::OP_LUI;
        let d = decode(inst);
        assert_eq!(d.imm as u32, 0xDEAD_B000);
    }

    #[test]
    fn b_type_is_even_and_sign_extends() {
        // beq x0, x0, -4
        let inst = 0b1_111111_00000_00000_000_1110_1_1100011u32;
        let d = decode(inst);
        assert_eq!(d.imm, -4);
    }

    #[test]
    fn shamt_reads_bits_20_24() {
        let inst = encode_i(17, 1, funct3::SLL, 2, opcodes::OP_IMM);
        assert_eq!(decode(inst).shamt, 17);
    }

    proptest::proptest! {
        #[test]
        fn i_type_imm_round_trips_for_any_twelve_bit_value(imm in -2048i32..2048) {
            let inst = encode_i(imm, 3, funct3::ADD_SUB, 4, opcodes::OP_IMM);
            assert_eq!(decode(inst).imm, imm);
        }

        #[test]
        fn s_type_imm_round_trips_for_any_twelve_bit_value(imm in -2048i32..2048) {
            let low = (imm as u32) & 0x1F;
            let high = ((imm as u32) >> 5) & 0x7F;
            let inst = (high << 25) | (0 << 20) | (0 << 15) | (0 << 12) | (low << 7) | opcodes::OP_STORE;
            assert_eq!(decode(inst).imm, imm);
        }

        #[test]
        fn b_type_imm_round_trips_and_stays_even(imm in (-4096i32..4096).prop_map(|v| v & !1)) {
            let v = imm as u32;
            let bit_12 = (v >> 12) & 1;
            let bit_11 = (v >> 11) & 1;
            let bits_10_5 = (v >> 5) & 0x3F;
            let bits_4_1 = (v >> 1) & 0xF;
            let inst = (bit_12 << 31)
                | (bits_10_5 << 25)
                | (0 << 20)
                | (0 << 15)
                | (0 << 12)
                | (bits_4_1 << 8)
                | (bit_11 << 7)
                | opcodes::OP_BRANCH;
            assert_eq!(decode(inst).imm, imm);
            assert_eq!(decode(inst).imm % 2, 0);
        }
    }
}
