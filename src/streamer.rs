//! Streamer (C4): receives instruction and directive events from the assembler, encodes
//! instructions into data fragments with fixups, and handles `global`/`common`/`zerofill`.

use crate::asm::Assembler;
use crate::asm::CodeEmitter;
use crate::asm::Instruction;
use crate::format::SectionKind;
use crate::symbol::SymbolId;

/// A symbol attribute the streamer can be asked to apply.
///
/// Only `Global` is representable on WLAV; see [`Streamer::emit_symbol_attribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolAttribute {
    /// Mark the symbol external (`.global`/`.globl`).
    Global,
    /// Any other attribute (`.local`, `.weak`, ...). Not representable on WLAV.
    Other,
}

/// Wraps an [`Assembler`], applying streamer-level semantics to symbol and instruction events.
pub struct Streamer<'a> {
    asm: &'a mut Assembler,
}

impl<'a> Streamer<'a> {
    /// Wrap `asm`.
    pub fn new(asm: &'a mut Assembler) -> Self {
        Self { asm }
    }

    /// Borrow the wrapped assembler.
    pub fn assembler(&self) -> &Assembler {
        self.asm
    }

    /// Apply a symbol attribute.
    ///
    /// For [`SymbolAttribute::Global`], marks the symbol external and returns `true`. Any other
    /// attribute is fatal: the original toolchain's `Not implemented yet.` abort, modeled here
    /// as a panic rather than a recoverable error (see §7 — `Local`/`Weak`/etc. simply have no
    /// wire representation on this format).
    pub fn emit_symbol_attribute(&mut self, symbol: SymbolId, attr: SymbolAttribute) -> bool {
        match attr {
            SymbolAttribute::Global => {
                self.asm.symbol_mut(symbol).set_external(true);
                log::trace!("{:?} marked external", symbol);
                true
            }
            SymbolAttribute::Other => panic!("symbol attribute not implemented for WLAV"),
        }
    }

    /// Bind a label to the current section.
    pub fn emit_label(&mut self, symbol: SymbolId) {
        self.asm.define_label(symbol);
    }

    /// Register a common symbol: mark it common with `(size, align)`, then emit alignment
    /// padding and `size` zero bytes into the current section.
    ///
    /// # Panics
    ///
    /// Panics if there is no current section.
    pub fn emit_common_symbol(&mut self, symbol: SymbolId, size: u64, align: u64) {
        let section = self
            .asm
            .current_section()
            .expect("emit_common_symbol with no current section");
        let current_len = self.asm.section(section).fragment().len() as u64;
        let padding = if align > 1 {
            current_len.next_multiple_of(align) - current_len
        } else {
            0
        };
        self.asm.symbol_mut(symbol).set_common(size, align);
        let fragment = &mut self.asm.section_mut(section).fragment;
        fragment.data.resize(fragment.data.len() + padding as usize, 0);
        self.asm.define_label(symbol);
        let fragment = &mut self.asm.section_mut(section).fragment;
        fragment.data.resize(fragment.data.len() + size as usize, 0);
        log::trace!("{:?} common, size={size} align={align}", symbol);
    }

    /// Zero-fill sections are not supported on WLAV; always fatal.
    pub fn emit_zerofill(&mut self, _symbol: SymbolId, _size: u64, _align: u64) -> ! {
        panic!("zerofill is not supported on WLAV")
    }

    /// Encode `inst` via `emitter`, appending its bytes to the current fragment and re-basing
    /// its fixups by the fragment's pre-append length.
    ///
    /// # Panics
    ///
    /// Panics if there is no current section.
    pub fn emit_inst_to_data(&mut self, inst: &Instruction, emitter: &dyn CodeEmitter) {
        let (bytes, mut fixups) = emitter.encode_instruction(inst);
        let section = self
            .asm
            .current_section()
            .expect("emit_inst_to_data with no current section");
        let fragment = &mut self.asm.section_mut(section).fragment;
        let base = fragment.data.len() as u64;
        for fixup in &mut fixups {
            fixup.offset += base;
        }
        fragment.fixups.extend(fixups);
        fragment.data.extend_from_slice(&bytes);
        fragment.has_instructions = true;
    }

    /// Switch the current section, creating it on first use (the effect of `.text`/`.data`/
    /// `.bss`; see [`crate::directive`]).
    pub fn switch_section(&mut self, name: &str, kind: SectionKind) {
        self.asm.switch_section(name, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::PassthroughEmitter;
    use crate::fixup::Fixup;
    use crate::format::RelocKind;

    #[test]
    fn emit_inst_to_data_rebases_fixups() {
        let mut asm = Assembler::new();
        asm.switch_section(".text", SectionKind::Text);
        let mut streamer = Streamer::new(&mut asm);
        let emitter = PassthroughEmitter;

        streamer.emit_inst_to_data(
            &Instruction {
                bytes: vec![0xEA],
                fixups: vec![],
            },
            &emitter,
        );
        streamer.emit_inst_to_data(
            &Instruction {
                bytes: vec![0x4C, 0x00, 0x00],
                fixups: vec![Fixup {
                    offset: 1,
                    kind: RelocKind::Direct16,
                    shift: 0,
                    loc: None,
                }],
            },
            &emitter,
        );

        let section = asm.current_section().unwrap();
        let fragment = asm.section(section).fragment();
        assert_eq!(fragment.len(), 4);
        assert_eq!(fragment.fixups[0].offset, 2);
    }

    #[test]
    fn common_symbol_aligned_into_current_section() {
        let mut asm = Assembler::new();
        asm.switch_section(".bss", SectionKind::Bss);
        let sym = asm.intern_symbol("buf", false);
        let mut streamer = Streamer::new(&mut asm);
        streamer.emit_common_symbol(sym, 4, 2);

        let section = asm.current_section().unwrap();
        assert_eq!(asm.section(section).fragment().len(), 4);
        assert_eq!(asm.symbol(sym).offset(), Some(0));
        assert!(asm.symbol(sym).is_common());
        assert!(asm.symbol(sym).is_in_section());
    }

    #[test]
    fn common_symbol_after_prior_content_lands_past_the_padding() {
        let mut asm = Assembler::new();
        asm.switch_section(".bss", SectionKind::Bss);
        let sym = asm.intern_symbol("buf", false);
        {
            let mut streamer = Streamer::new(&mut asm);
            streamer.emit_inst_to_data(
                &Instruction {
                    bytes: vec![0x00],
                    fixups: vec![],
                },
                &PassthroughEmitter,
            );
            streamer.emit_common_symbol(sym, 4, 4);
        }

        let section = asm.current_section().unwrap();
        // 1 byte of prior content, padded up to the next multiple of 4, then 4 bytes of common.
        assert_eq!(asm.section(section).fragment().len(), 8);
        assert_eq!(asm.symbol(sym).offset(), Some(4));
    }

    #[test]
    #[should_panic(expected = "not implemented")]
    fn unsupported_symbol_attribute_is_fatal() {
        let mut asm = Assembler::new();
        let sym = asm.intern_symbol("foo", false);
        let mut streamer = Streamer::new(&mut asm);
        streamer.emit_symbol_attribute(sym, SymbolAttribute::Other);
    }
}
