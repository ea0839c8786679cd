//! Relocation model (C6): simple (single symbol ref) and complex (stack-machine expression)
//! relocation records, and the logic that decides which to build for a given fixup.

use crate::calc::CalcStackEntry;
use crate::format::CalcOp;
use crate::format::RelocKind;
use crate::section::SectionId;
use crate::symbol::SymbolId;

/// Two pure queries a target must answer for a fixup: its relocation kind and implicit shift.
///
/// Virtual dispatch over this in the original toolchain becomes a plain trait here — no runtime
/// downcasting is needed (see the design notes).
pub trait TargetObjectWriter {
    /// The relocation kind this fixup represents.
    fn reloc_type(&self, fixup: &crate::fixup::Fixup) -> RelocKind;
    /// The right-shift amount implicit in the fixup kind.
    fn fixup_shift(&self, fixup: &crate::fixup::Fixup) -> u32;
}

/// The only [`TargetObjectWriter`] this crate ships: it reads the kind and shift straight off
/// the fixup, since the out-of-scope instruction encoder is what would normally make this a
/// harder decision (e.g. disambiguating a "low byte of" fixup from a plain 8-bit one).
#[derive(Debug, Default, Clone, Copy)]
pub struct C65TargetWriter;

impl TargetObjectWriter for C65TargetWriter {
    fn reloc_type(&self, fixup: &crate::fixup::Fixup) -> RelocKind {
        fixup.kind
    }

    fn fixup_shift(&self, fixup: &crate::fixup::Fixup) -> u32 {
        fixup.shift
    }
}

/// The second symbol operand of a relocation target (`A [- B] [+ C] [>> shift]`).
#[derive(Debug, Clone, Copy)]
pub struct SymbolRefB {
    /// The symbol being subtracted.
    pub symbol: SymbolId,
    /// Whether the reference carries a modifier (e.g. `@plt`). WLAV's complex relocations only
    /// support a plain reference; asserted false in [`record_relocation`].
    pub has_modifier: bool,
}

/// The resolved value a fixup refers to: `A [- B] [+ C]`, to be right-shifted by the fixup's
/// implicit shift amount if any. The MCValue-equivalent of the original toolchain.
#[derive(Debug, Clone, Copy)]
pub struct RelocationTarget {
    /// The (required) primary symbol.
    pub sym_a: SymbolId,
    /// The (optional) subtracted symbol.
    pub sym_b: Option<SymbolRefB>,
    /// The constant term.
    pub constant: i64,
}

/// A direct, single-symbol relocation.
#[derive(Debug, Clone)]
pub struct SimpleRelocation {
    /// The section this relocation applies to.
    pub section: SectionId,
    /// The relocation's addressing mode.
    pub kind: RelocKind,
    /// Dense source-file id.
    pub file_id: u32,
    /// Source line number.
    pub line: u32,
    /// Byte offset within the section.
    pub offset: u64,
    /// The referenced symbol.
    pub symbol: SymbolId,
}

/// A postfix stack-machine-expression relocation.
#[derive(Debug, Clone)]
pub struct ComplexRelocation {
    /// The section this relocation applies to.
    pub section: SectionId,
    /// The relocation's addressing mode.
    pub kind: RelocKind,
    /// Dense source-file id.
    pub file_id: u32,
    /// Source line number.
    pub line: u32,
    /// Byte offset within the section.
    pub offset: u64,
    /// The expression stack, in push order.
    pub stack: Vec<CalcStackEntry>,
}

/// Either a simple or complex relocation, depending on what [`record_relocation`] decided.
#[derive(Debug, Clone)]
pub enum Relocation {
    /// See [`SimpleRelocation`].
    Simple(SimpleRelocation),
    /// See [`ComplexRelocation`].
    Complex(ComplexRelocation),
}

/// Build a relocation from a fixup and its resolved target (§4.5).
///
/// `fixed_value` is carried for interface fidelity with the original toolchain's
/// `recordRelocation(..., uint64_t &FixedValue)` signature — a real assembler might want an
/// in-place-patchable immediate back — but this writer never patches bytes in place (WLA-DX
/// resolves every relocation at link time), so it is accepted and left untouched here exactly
/// as the original leaves it untouched.
#[allow(clippy::too_many_arguments)]
pub fn record_relocation(
    asm: &crate::asm::Assembler,
    section: SectionId,
    fragment_offset: u64,
    fixup: &crate::fixup::Fixup,
    target: &RelocationTarget,
    target_writer: &dyn TargetObjectWriter,
    file_id: u32,
    line: u32,
    _fixed_value: &mut i64,
) -> Relocation {
    let offset = fragment_offset + fixup.offset;
    let kind = target_writer.reloc_type(fixup);
    let shift = target_writer.fixup_shift(fixup);
    let constant = target.constant;

    if shift != 0 || target.sym_b.is_some() || constant != 0 {
        let mut stack = vec![CalcStackEntry::Symbol(target.sym_a, false)];
        if let Some(sym_b) = target.sym_b {
            assert!(!sym_b.has_modifier, "complex relocation's B operand must be a plain reference");
            assert!(
                !asm.symbol(sym_b.symbol).is_absolute(),
                "complex relocation's B operand must not be absolute"
            );
            stack.push(CalcStackEntry::Symbol(sym_b.symbol, false));
            stack.push(CalcStackEntry::Operator(CalcOp::Sub));
        }
        if constant != 0 {
            stack.push(CalcStackEntry::Value(constant as f64));
            stack.push(CalcStackEntry::Operator(CalcOp::Add));
        }
        if shift != 0 {
            stack.push(CalcStackEntry::Value(shift as f64));
            stack.push(CalcStackEntry::Operator(CalcOp::Shr));
        }
        log::trace!("recorded complex relocation at section {:?} offset {offset}", section);
        Relocation::Complex(ComplexRelocation {
            section,
            kind,
            file_id,
            line,
            offset,
            stack,
        })
    } else {
        log::trace!("recorded simple relocation at section {:?} offset {offset}", section);
        Relocation::Simple(SimpleRelocation {
            section,
            kind,
            file_id,
            line,
            offset,
            symbol: target.sym_a,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Assembler;
    use crate::fixup::Fixup;
    use crate::format::SectionKind;

    #[test]
    fn no_extras_builds_simple_relocation() {
        let mut asm = Assembler::new();
        let section = asm.switch_section(".text", SectionKind::Text);
        let a = asm.intern_symbol("printf", false);
        let fixup = Fixup {
            offset: 0x10,
            kind: RelocKind::Direct16,
            shift: 0,
            loc: None,
        };
        let target = RelocationTarget {
            sym_a: a,
            sym_b: None,
            constant: 0,
        };
        let mut fixed_value = 0;
        let reloc = record_relocation(
            &asm,
            section,
            0,
            &fixup,
            &target,
            &C65TargetWriter,
            1,
            7,
            &mut fixed_value,
        );
        match reloc {
            Relocation::Simple(r) => {
                assert_eq!(r.offset, 0x10);
                assert_eq!(r.symbol, a);
                assert_eq!(r.kind, RelocKind::Direct16);
            }
            Relocation::Complex(_) => panic!("expected simple relocation"),
        }
    }

    #[test]
    fn a_minus_b_plus_c_shr_shift_builds_expected_stack() {
        let mut asm = Assembler::new();
        let section = asm.switch_section(".text", SectionKind::Text);
        let a = asm.intern_symbol("A", false);
        let b = asm.intern_symbol("B", false);
        let fixup = Fixup {
            offset: 0,
            kind: RelocKind::Direct16,
            shift: 1,
            loc: None,
        };
        let target = RelocationTarget {
            sym_a: a,
            sym_b: Some(SymbolRefB {
                symbol: b,
                has_modifier: false,
            }),
            constant: 3,
        };
        let mut fixed_value = 0;
        let reloc = record_relocation(
            &asm,
            section,
            0,
            &fixup,
            &target,
            &C65TargetWriter,
            1,
            0,
            &mut fixed_value,
        );
        let Relocation::Complex(r) = reloc else {
            panic!("expected complex relocation")
        };
        assert_eq!(r.stack.len(), 7);
        assert!(matches!(r.stack[2], CalcStackEntry::Operator(CalcOp::Sub)));
        assert!(matches!(r.stack[4], CalcStackEntry::Operator(CalcOp::Add)));
        assert!(matches!(r.stack[6], CalcStackEntry::Operator(CalcOp::Shr)));
    }
}
