//! The fetch-decode-execute loop and RV32I+M instruction dispatch.
//!
//! Grounded on `original_source/simulate.hpp`'s `CPU::Step`/`CPU::Execute`:
//! fetch one word through the cache, check for `ECALL`/`EBREAK` or the
//! halt-by-return-address condition, decode, then dispatch on
//! `opcode`/`funct3`/`funct7`. Narrowed from the teacher's `core/cpu`
//! trio (`mod.rs`/`execution.rs`/`memory.rs`, which additionally threaded
//! a pipeline, an MMU, and CSR state through every step): this CPU has no
//! privilege levels or virtual memory, so fetch/execute collapse into one
//! file and one `step` call per instruction.

use tracing::{error, trace};

use crate::common::{Addr, ExecError, RegisterFile, Width};
use crate::core::cache::{Access, CacheController};
use crate::core::ram::Ram;
use crate::isa::decode::decode;
use crate::isa::instruction::Decoded;
use crate::isa::rv32i::{funct3, funct7, opcodes};
use crate::isa::rv32m::{funct3 as m_funct3, opcodes as m_opcodes};
use crate::sim::image::RegisterImage;

const ECALL: u32 = 0x0000_0073;
const EBREAK: u32 = 0x0010_0073;

/// The register file, program counter, and halt condition for one run.
pub struct Cpu {
    regs: RegisterFile,
    pc: u32,
    /// The initial value of `x1` (`ra`): execution halts once the program
    /// counter returns to this address, matching a function-call-style
    /// entry point whose return address was never pushed.
    ra_init: u32,
}

impl Cpu {
    /// Builds a CPU from an image's initial register file: slot 0 is the
    /// starting program counter, slots 1-31 seed `x1`-`x31`.
    #[must_use]
    pub fn new(image: &RegisterImage) -> Self {
        let mut regs = RegisterFile::new();
        for (idx, &value) in image.regs.iter().enumerate().skip(1) {
            regs.write(idx, value);
        }
        Self {
            regs,
            pc: image.regs[0],
            ra_init: image.regs[1],
        }
    }

    /// The current program counter.
    #[must_use]
    pub const fn pc(&self) -> u32 {
        self.pc
    }

    /// Whether execution has reached its halt condition: the program
    /// counter returning to the initial value of `x1`.
    #[must_use]
    pub fn halted(&self) -> bool {
        self.pc == self.ra_init
    }

    /// A snapshot of all 32 registers, `x0..=x31`.
    #[must_use]
    pub fn dump_regs(&self) -> [u32; 32] {
        self.regs.dump()
    }

    /// Fetches, decodes, and executes one instruction.
    ///
    /// Returns `Ok(true)` if the machine should keep running, `Ok(false)`
    /// if it just executed `ECALL`/`EBREAK` and should halt.
    ///
    /// # Errors
    ///
    /// Returns [`ExecError::Memory`] if the fetch or any memory operand
    /// access falls outside RAM, and [`ExecError::UnsupportedOpcode`] if
    /// the decoded opcode/funct3/funct7 combination is not implemented.
    pub fn step(&mut self, ram: &mut Ram, cache: &mut CacheController) -> Result<bool, ExecError> {
        let word = cache.access(Addr::new(self.pc), Width::Word, false, Access::Read, ram)?;
        trace!(pc = self.pc, word, "fetch");

        if word == ECALL || word == EBREAK {
            return Ok(false);
        }

        let decoded = decode(word);
        self.execute(&decoded, ram, cache)?;
        Ok(true)
    }

    fn execute(
        &mut self,
        d: &Decoded,
        ram: &mut Ram,
        cache: &mut CacheController,
    ) -> Result<(), ExecError> {
        let pc = self.pc;
        let mut next_pc = pc.wrapping_add(4);

        match d.opcode {
            opcodes::OP_LUI => {
                self.regs.write(d.rd, d.imm as u32);
            }
            opcodes::OP_AUIPC => {
                self.regs.write(d.rd, pc.wrapping_add(d.imm as u32));
            }
            opcodes::OP_JAL => {
                self.regs.write(d.rd, next_pc);
                next_pc = pc.wrapping_add(d.imm as u32);
            }
            opcodes::OP_JALR => {
                let target = (self.regs.read(d.rs1).wrapping_add(d.imm as u32)) & !1u32;
                self.regs.write(d.rd, next_pc);
                next_pc = target;
            }
            opcodes::OP_BRANCH => {
                let rs1 = self.regs.read(d.rs1);
                let rs2 = self.regs.read(d.rs2);
                let taken = match d.funct3 {
                    funct3::BEQ => rs1 == rs2,
                    funct3::BNE => rs1 != rs2,
                    funct3::BLT => (rs1 as i32) < (rs2 as i32),
                    funct3::BGE => (rs1 as i32) >= (rs2 as i32),
                    funct3::BLTU => rs1 < rs2,
                    funct3::BGEU => rs1 >= rs2,
                    _ => {
                        return Err(self.unsupported(d.opcode));
                    }
                };
                if taken {
                    next_pc = pc.wrapping_add(d.imm as u32);
                }
            }
            opcodes::OP_LOAD => {
                let addr = Addr::new(self.regs.read(d.rs1).wrapping_add(d.imm as u32));
                let value = match d.funct3 {
                    funct3::LB => {
                        let raw = cache.access(addr, Width::Byte, true, Access::Read, ram)?;
                        (raw as u8 as i8) as i32 as u32
                    }
                    funct3::LH => {
                        let raw = cache.access(addr, Width::Half, true, Access::Read, ram)?;
                        (raw as u16 as i16) as i32 as u32
                    }
                    funct3::LW => cache.access(addr, Width::Word, true, Access::Read, ram)?,
                    funct3::LBU => cache.access(addr, Width::Byte, true, Access::Read, ram)?,
                    funct3::LHU => cache.access(addr, Width::Half, true, Access::Read, ram)?,
                    _ => {
                        return Err(self.unsupported(d.opcode));
                    }
                };
                self.regs.write(d.rd, value);
            }
            opcodes::OP_STORE => {
                let addr = Addr::new(self.regs.read(d.rs1).wrapping_add(d.imm as u32));
                let value = self.regs.read(d.rs2);
                let width = match d.funct3 {
                    funct3::SB => Width::Byte,
                    funct3::SH => Width::Half,
                    funct3::SW => Width::Word,
                    _ => {
                        return Err(self.unsupported(d.opcode));
                    }
                };
                cache.access(addr, width, true, Access::Write(value), ram)?;
            }
            opcodes::OP_IMM => {
                let rs1 = self.regs.read(d.rs1);
                let imm = d.imm;
                let result = match d.funct3 {
                    funct3::ADD_SUB => rs1.wrapping_add(imm as u32),
                    funct3::SLT => u32::from((rs1 as i32) < imm),
                    funct3::SLTU => u32::from(rs1 < (imm as u32)),
                    funct3::XOR => rs1 ^ (imm as u32),
                    funct3::OR => rs1 | (imm as u32),
                    funct3::AND => rs1 & (imm as u32),
                    funct3::SLL => rs1 << d.shamt,
                    funct3::SRL_SRA => {
                        if d.funct7 == funct7::SRA {
                            ((rs1 as i32) >> d.shamt) as u32
                        } else {
                            rs1 >> d.shamt
                        }
                    }
                    _ => {
                        return Err(self.unsupported(d.opcode));
                    }
                };
                self.regs.write(d.rd, result);
            }
            opcodes::OP_REG => {
                let rs1 = self.regs.read(d.rs1);
                let rs2 = self.regs.read(d.rs2);
                let result = if d.funct7 == funct7::DEFAULT {
                    match d.funct3 {
                        funct3::ADD_SUB => rs1.wrapping_add(rs2),
                        funct3::SLL => rs1 << (rs2 & 0x1F),
                        funct3::SLT => u32::from((rs1 as i32) < (rs2 as i32)),
                        funct3::SLTU => u32::from(rs1 < rs2),
                        funct3::XOR => rs1 ^ rs2,
                        funct3::SRL_SRA => rs1 >> (rs2 & 0x1F),
                        funct3::OR => rs1 | rs2,
                        funct3::AND => rs1 & rs2,
                        _ => {
                            return Err(self.unsupported(d.opcode));
                        }
                    }
                } else if d.funct7 == funct7::SUB {
                    match d.funct3 {
                        funct3::ADD_SUB => rs1.wrapping_sub(rs2),
                        funct3::SRL_SRA => ((rs1 as i32) >> (rs2 & 0x1F)) as u32,
                        _ => {
                            return Err(self.unsupported(d.opcode));
                        }
                    }
                } else if d.funct7 == m_opcodes::M_EXTENSION {
                    match d.funct3 {
                        m_funct3::MUL => (rs1 as i32).wrapping_mul(rs2 as i32) as u32,
                        m_funct3::MULH => {
                            (((rs1 as i32 as i64) * (rs2 as i32 as i64)) >> 32) as u32
                        }
                        m_funct3::MULHSU => {
                            (((rs1 as i32 as i64) * (u64::from(rs2) as i64)) >> 32) as u32
                        }
                        m_funct3::MULHU => {
                            ((u64::from(rs1) * u64::from(rs2)) >> 32) as u32
                        }
                        m_funct3::DIV => {
                            let (a, b) = (rs1 as i32, rs2 as i32);
                            if b == 0 {
                                u32::MAX
                            } else if a == i32::MIN && b == -1 {
                                i32::MIN as u32
                            } else {
                                (a.wrapping_div(b)) as u32
                            }
                        }
                        m_funct3::DIVU => {
                            if rs2 == 0 {
                                u32::MAX
                            } else {
                                rs1 / rs2
                            }
                        }
                        m_funct3::REM => {
                            let (a, b) = (rs1 as i32, rs2 as i32);
                            if b == 0 {
                                a as u32
                            } else if a == i32::MIN && b == -1 {
                                0
                            } else {
                                (a.wrapping_rem(b)) as u32
                            }
                        }
                        m_funct3::REMU => {
                            if rs2 == 0 {
                                rs1
                            } else {
                                rs1 % rs2
                            }
                        }
                        _ => {
                            return Err(self.unsupported(d.opcode));
                        }
                    }
                } else {
                    return Err(self.unsupported(d.opcode));
                };
                self.regs.write(d.rd, result);
            }
            opcodes::OP_MISC_MEM => {
                // FENCE/FENCE.I: this model has no reordering or separate
                // instruction cache to synchronize, so both are no-ops.
            }
            _ => {
                return Err(self.unsupported(d.opcode));
            }
        }

        self.pc = next_pc;
        Ok(())
    }

    fn unsupported(&self, opcode: u32) -> ExecError {
        error!(pc = self.pc, opcode, "unsupported opcode");
        ExecError::UnsupportedOpcode { pc: self.pc, opcode }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::CacheController;
    use crate::sim::simulator::PolicyKind;

    fn image_with_ra(ra: u32) -> RegisterImage {
        let mut regs = [0u32; 32];
        regs[0] = 0;
        regs[1] = ra;
        RegisterImage { regs }
    }

    #[test]
    fn halts_when_pc_returns_to_initial_ra() {
        let cpu = Cpu::new(&image_with_ra(0));
        assert!(cpu.halted());
    }

    #[test]
    fn addi_updates_register_and_advances_pc() {
        let mut regs = [0u32; 32];
        regs[1] = 0x1000; // ra, distinct from pc 0 so we don't halt immediately
        let image = RegisterImage { regs };
        let mut cpu = Cpu::new(&image);
        let mut ram = Ram::new();
        // addi x2, x0, 5
        let inst: u32 = (5u32 << 20) | (0 << 15) | (funct3::ADD_SUB << 12) | (2 << 7) | opcodes::OP_IMM;
        ram.write_line(0, &{
            let mut line = [0u8; 64];
            line[0..4].copy_from_slice(&inst.to_le_bytes());
            line
        })
        .unwrap();
        let mut cache = CacheController::new(PolicyKind::Lru);
        let cont = cpu.step(&mut ram, &mut cache).unwrap();
        assert!(cont);
        assert_eq!(cpu.dump_regs()[2], 5);
        assert_eq!(cpu.pc(), 4);
    }

    #[test]
    fn div_by_zero_yields_all_ones() {
        let mut regs = [0u32; 32];
        regs[1] = 0x1000;
        let image = RegisterImage { regs };
        let mut cpu = Cpu::new(&image);
        let mut ram = Ram::new();
        // div x3, x1, x2 (x2 == 0)
        let inst: u32 = (m_opcodes::M_EXTENSION << 25)
            | (2 << 20)
            | (1 << 15)
            | (m_funct3::DIV << 12)
            | (3 << 7)
            | opcodes::OP_REG;
        let mut line = [0u8; 64];
        line[0..4].copy_from_slice(&inst.to_le_bytes());
        ram.write_line(0, &line).unwrap();
        let mut cache = CacheController::new(PolicyKind::Lru);
        cpu.step(&mut ram, &mut cache).unwrap();
        assert_eq!(cpu.dump_regs()[3], u32::MAX);
    }

    #[test]
    fn ecall_halts_without_error() {
        let mut regs = [0u32; 32];
        regs[1] = 0x1000;
        let image = RegisterImage { regs };
        let mut cpu = Cpu::new(&image);
        let mut ram = Ram::new();
        let mut line = [0u8; 64];
        line[0..4].copy_from_slice(&ECALL.to_le_bytes());
        ram.write_line(0, &line).unwrap();
        let mut cache = CacheController::new(PolicyKind::Lru);
        let cont = cpu.step(&mut ram, &mut cache).unwrap();
        assert!(!cont);
    }
}
