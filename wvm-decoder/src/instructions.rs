//! Instruction immediate-operand table.
//!
//! For every opcode — including the two prefixed opcode spaces — this module
//! declares the shape of the trailing immediate operands. The control-flow
//! resolver and the execution engine must skip and consume immediates
//! identically, so this table is the single source of truth for both.
//!
//! Skipping never interprets an operand's value, only its length. The one
//! exception is the `0xFC`/`0xFD` prefixed spaces, where the varuint
//! sub-opcode has to be decoded before the right table row is known.

use crate::prelude::*;
use wvm_format::binary;

/// Shape of an instruction's trailing immediate operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateKind {
    /// No immediates
    None,
    /// One block-signature tag byte (`block`/`loop`/`if`)
    BlockSig,
    /// One unsigned varint (branch labels, indices)
    VarUint,
    /// Two unsigned varints (memory accesses: alignment hint + offset,
    /// `call_indirect`: type index + table index)
    TwoVarUints,
    /// One signed 32-bit varint (`i32.const`)
    VarInt32,
    /// One signed 64-bit varint (`i64.const`)
    VarInt64,
    /// One raw byte (`ref.null` type, memory index operands)
    Byte,
    /// Fixed four bytes (`f32.const`)
    Fixed4,
    /// Fixed eight bytes (`f64.const`)
    Fixed8,
    /// Fixed sixteen bytes (vector constants, shuffle masks)
    Fixed16,
    /// Varuint-prefixed vector of varuints plus one default (`br_table`)
    BrTable,
    /// Varuint-prefixed vector of fixed-width type tags (typed `select`)
    TypeVector,
    /// `0xFC` prefix: decode the varuint sub-opcode first
    PrefixedFc,
    /// `0xFD` prefix: decode the varuint sub-opcode first
    PrefixedFd,
}

/// The immediate-operand shape of a one-byte opcode
pub fn immediate_kind(opcode: u8) -> ImmediateKind {
    match opcode {
        binary::BLOCK | binary::LOOP | binary::IF => ImmediateKind::BlockSig,
        binary::BR | binary::BR_IF | binary::CALL | binary::REF_FUNC => ImmediateKind::VarUint,
        binary::BR_TABLE => ImmediateKind::BrTable,
        binary::CALL_INDIRECT => ImmediateKind::TwoVarUints,
        binary::REF_NULL => ImmediateKind::Byte,
        binary::SELECT_TYPE => ImmediateKind::TypeVector,
        binary::LOCAL_GET..=binary::GLOBAL_SET => ImmediateKind::VarUint,
        binary::TABLE_GET | binary::TABLE_SET => ImmediateKind::VarUint,
        binary::I32_LOAD..=binary::I64_STORE32 => ImmediateKind::TwoVarUints,
        binary::MEMORY_SIZE | binary::MEMORY_GROW => ImmediateKind::Byte,
        binary::I32_CONST => ImmediateKind::VarInt32,
        binary::I64_CONST => ImmediateKind::VarInt64,
        binary::F32_CONST => ImmediateKind::Fixed4,
        binary::F64_CONST => ImmediateKind::Fixed8,
        binary::PREFIX_FC => ImmediateKind::PrefixedFc,
        binary::PREFIX_FD => ImmediateKind::PrefixedFd,
        _ => ImmediateKind::None,
    }
}

/// Skip one instruction starting at `pos` (opcode plus immediates), returning
/// the offset of the next instruction.
pub fn skip_immediates(bytes: &[u8], pos: usize) -> Result<usize> {
    let (opcode, _) = binary::read_u8(bytes, pos)?;
    let mut pos = pos + 1;

    match immediate_kind(opcode) {
        ImmediateKind::None => {}
        ImmediateKind::BlockSig | ImmediateKind::Byte => {
            pos += 1;
        }
        ImmediateKind::VarUint => {
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        ImmediateKind::TwoVarUints => {
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        ImmediateKind::VarInt32 => {
            let (_, n) = binary::read_leb128_i32(bytes, pos)?;
            pos += n;
        }
        ImmediateKind::VarInt64 => {
            let (_, n) = binary::read_leb128_i64(bytes, pos)?;
            pos += n;
        }
        ImmediateKind::Fixed4 => pos += 4,
        ImmediateKind::Fixed8 => pos += 8,
        ImmediateKind::Fixed16 => pos += 16,
        ImmediateKind::BrTable => {
            // n target labels plus one default label
            let (count, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            for _ in 0..count {
                let (_, n) = binary::read_leb128_u32(bytes, pos)?;
                pos += n;
            }
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        ImmediateKind::TypeVector => {
            let (count, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n + count as usize;
        }
        ImmediateKind::PrefixedFc => {
            pos = skip_fc_immediates(bytes, pos)?;
        }
        ImmediateKind::PrefixedFd => {
            pos = skip_fd_immediates(bytes, pos)?;
        }
    }

    Ok(pos)
}

/// Skip the immediates of a `0xFC`-space instruction; `pos` is just past the
/// prefix byte.
fn skip_fc_immediates(bytes: &[u8], pos: usize) -> Result<usize> {
    let (sub_opcode, n) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + n;

    match sub_opcode {
        binary::FC_MEMORY_INIT => {
            // data index, then a one-byte memory index
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n + 1;
        }
        binary::FC_DATA_DROP | binary::FC_ELEM_DROP => {
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        binary::FC_MEMORY_COPY => pos += 2,
        binary::FC_MEMORY_FILL => pos += 1,
        binary::FC_TABLE_INIT | binary::FC_TABLE_COPY => {
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        binary::FC_TABLE_GROW | binary::FC_TABLE_SIZE | binary::FC_TABLE_FILL => {
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        // trunc_sat and anything else in the space carries no immediates
        _ => {}
    }

    Ok(pos)
}

/// Skip the immediates of a `0xFD`-space instruction; `pos` is just past the
/// prefix byte.
fn skip_fd_immediates(bytes: &[u8], pos: usize) -> Result<usize> {
    let (sub_opcode, n) = binary::read_leb128_u32(bytes, pos)?;
    let mut pos = pos + n;

    match sub_opcode {
        binary::FD_V128_LOAD..=binary::FD_V128_LOAD64_SPLAT
        | binary::FD_V128_STORE
        | binary::FD_V128_LOAD32_ZERO
        | binary::FD_V128_LOAD64_ZERO => {
            // memarg: alignment hint + offset
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
        }
        binary::FD_V128_LOAD8_LANE..=binary::FD_V128_STORE64_LANE => {
            // memarg plus a one-byte lane index
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n;
            let (_, n) = binary::read_leb128_u32(bytes, pos)?;
            pos += n + 1;
        }
        binary::FD_V128_CONST | binary::FD_I8X16_SHUFFLE => pos += 16,
        binary::FD_EXTRACT_LANE_FIRST..=binary::FD_REPLACE_LANE_LAST => pos += 1,
        _ => {}
    }

    Ok(pos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_opcodes_have_no_immediates() {
        for opcode in [binary::NOP, binary::UNREACHABLE, binary::DROP, binary::SELECT, 0x6A] {
            assert_eq!(immediate_kind(opcode), ImmediateKind::None);
            assert_eq!(skip_immediates(&[opcode], 0).unwrap(), 1);
        }
    }

    #[test]
    fn skips_varuint_operands() {
        // local.get 624485 (3-group varuint)
        let bytes = [binary::LOCAL_GET, 0xE5, 0x8E, 0x26];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 4);
    }

    #[test]
    fn skips_memarg_operands() {
        // i32.load align=2 offset=128
        let bytes = [binary::I32_LOAD, 0x02, 0x80, 0x01];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 4);
    }

    #[test]
    fn skips_const_operands() {
        let bytes = [binary::I32_CONST, 0x7F];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 2);

        let bytes = [binary::F64_CONST, 0, 0, 0, 0, 0, 0, 0, 0];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 9);
    }

    #[test]
    fn skips_br_table_with_default() {
        // br_table with 2 labels plus the default
        let bytes = [binary::BR_TABLE, 0x02, 0x00, 0x01, 0x00];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 5);
    }

    #[test]
    fn skips_typed_select() {
        let bytes = [binary::SELECT_TYPE, 0x01, 0x7F];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 3);
    }

    #[test]
    fn skips_prefixed_spaces() {
        // memory.fill: 0xFC 11, one-byte memory index
        let bytes = [binary::PREFIX_FC, 0x0B, 0x00];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 3);

        // memory.copy: 0xFC 10, two one-byte memory indices
        let bytes = [binary::PREFIX_FC, 0x0A, 0x00, 0x00];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 4);

        // v128.const: 0xFD 12, sixteen bytes
        let mut bytes = vec![binary::PREFIX_FD, 0x0C];
        bytes.extend_from_slice(&[0u8; 16]);
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 18);

        // v128.load: 0xFD 0, memarg
        let bytes = [binary::PREFIX_FD, 0x00, 0x04, 0x00];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 4);

        // i8x16.extract_lane_s: 0xFD 21, one-byte lane
        let bytes = [binary::PREFIX_FD, 0x15, 0x03];
        assert_eq!(skip_immediates(&bytes, 0).unwrap(), 3);
    }

    #[test]
    fn truncated_immediates_are_an_error() {
        let bytes = [binary::LOCAL_GET];
        assert!(skip_immediates(&bytes, 0).is_err());
    }
}
