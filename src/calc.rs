//! The calc-stack entry (C1 data model, C6 consumer): a tagged union written to the wire as a
//! 1-byte tag, a 1-byte sign, and an 8-byte payload.

use std::io;

use crate::asm::Assembler;
use crate::format::CalcEntryTag;
use crate::format::CalcOp;
use crate::io::WlavWrite;
use crate::maps::SymbolMap;
use crate::symbol::SymbolId;

/// A single entry in a complex relocation's postfix expression stack.
///
/// A single sum type with three variants — the on-wire tag byte is derived from the variant via
/// `match` in [`CalcStackEntry::write`], never stored redundantly alongside it.
#[derive(Debug, Clone, Copy)]
pub enum CalcStackEntry {
    /// An immediate value.
    Value(f64),
    /// An operator.
    Operator(CalcOp),
    /// A symbol reference. `sign` exists for wire-format fidelity with the original toolchain's
    /// `addSymb(Symbol, Invert)` API; this writer's relocation intake (§4.5) never inverts a
    /// symbol reference, so it is always constructed as `false` here, but a hand-built stack
    /// (e.g. in a test) may set it.
    Symbol(SymbolId, bool),
}

impl CalcStackEntry {
    /// Write this entry's tag, sign, and payload.
    pub fn write<W: WlavWrite>(
        &self,
        out: &mut W,
        asm: &Assembler,
        symbols: &SymbolMap,
    ) -> io::Result<()> {
        match *self {
            CalcStackEntry::Value(v) => {
                out.write_u8(CalcEntryTag::Value.code())?;
                out.write_u8(0)?;
                out.write_f64(v)
            }
            CalcStackEntry::Operator(op) => {
                out.write_u8(CalcEntryTag::Operator.code())?;
                out.write_u8(0)?;
                out.write_f64(op.code() as f64)
            }
            CalcStackEntry::Symbol(sym, sign) => {
                out.write_u8(CalcEntryTag::Symbol.code())?;
                out.write_u8(sign as u8)?;
                crate::symbol_name::write_mangled_symbol_name(out, asm, symbols, sym)?;
                out.write_u8(0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Assembler;
    use crate::maps::SymbolMap;

    #[test]
    fn value_entry_wire_shape() {
        let asm = Assembler::new();
        let symbols = SymbolMap::default();
        let mut buf = Vec::new();
        CalcStackEntry::Value(3.0)
            .write(&mut buf, &asm, &symbols)
            .unwrap();
        assert_eq!(buf[0], 0);
        assert_eq!(buf[1], 0);
        assert_eq!(&buf[2..10], 3.0_f64.to_be_bytes());
    }

    #[test]
    fn operator_entry_wire_shape() {
        let asm = Assembler::new();
        let symbols = SymbolMap::default();
        let mut buf = Vec::new();
        CalcStackEntry::Operator(CalcOp::Shr)
            .write(&mut buf, &asm, &symbols)
            .unwrap();
        assert_eq!(buf[0], 1);
        assert_eq!(buf[1], 0);
        assert_eq!(&buf[2..10], (10.0_f64).to_be_bytes());
    }
}
