//! Assembler/AsmLayout stand-in (C9, ambient): a minimal, non-relaxing model of the toolchain's
//! post-layout assembly unit, built only deeply enough to drive and test the object writer.
//!
//! This is not a general-purpose assembler. It performs no macro expansion, no relaxation, and
//! no instruction encoding of its own; those belong to the real assembler framework and
//! instruction encoder, both out of scope for this crate.

use crate::fixup::Fixup;
use crate::fixup::SourceLoc;
use crate::fixup::SourceManager;
use crate::format::SectionKind;
use crate::section::Section;
use crate::section::SectionId;
use crate::symbol::Symbol;
use crate::symbol::SymbolId;

/// An already-encoded instruction: bytes plus the fixups they contain, at offsets relative to
/// the instruction's own first byte.
///
/// Real 65xx instruction encoding is out of scope here; callers construct this directly (as a
/// real encoder would) or go through a [`CodeEmitter`].
#[derive(Debug, Clone, Default)]
pub struct Instruction {
    /// The instruction's encoded bytes.
    pub bytes: Vec<u8>,
    /// Fixups within those bytes, offsets relative to `bytes[0]`.
    pub fixups: Vec<Fixup>,
}

/// Produces raw bytes and fixups from an instruction. The seam a real 65xx encoder would fill;
/// this crate ships only [`PassthroughEmitter`], which returns its input unchanged.
pub trait CodeEmitter {
    /// Encode `inst`, returning its bytes and fixups.
    fn encode_instruction(&self, inst: &Instruction) -> (Vec<u8>, Vec<Fixup>);
}

/// A [`CodeEmitter`] that returns its input unchanged — `inst` is treated as already encoded.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassthroughEmitter;

impl CodeEmitter for PassthroughEmitter {
    fn encode_instruction(&self, inst: &Instruction) -> (Vec<u8>, Vec<Fixup>) {
        (inst.bytes.clone(), inst.fixups.clone())
    }
}

/// The post-layout assembly unit: sections (each with one fragment), symbols, file names, and
/// an optional source manager.
#[derive(Debug, Default)]
pub struct Assembler {
    sections: Vec<Section>,
    symbols: Vec<Symbol>,
    by_name: std::collections::HashMap<String, SymbolId>,
    current_section: Option<SectionId>,
    file_names: Vec<String>,
    source_manager: Option<Box<dyn SourceManager>>,
}

impl Assembler {
    /// A fresh assembler with no sections or symbols.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a source manager to resolve fixup locations against.
    pub fn set_source_manager(&mut self, source_manager: impl SourceManager + 'static) {
        self.source_manager = Some(Box::new(source_manager));
    }

    /// The installed source manager, if any.
    pub fn source_manager(&self) -> Option<&dyn SourceManager> {
        self.source_manager.as_deref()
    }

    /// Record a `.file`-directive-equivalent name. The first entry in this list is what private
    /// symbols are mangled against (§4.4).
    pub fn add_file_name(&mut self, name: impl Into<String>) {
        self.file_names.push(name.into());
    }

    /// The recorded file names, in the order they were added.
    pub fn file_names(&self) -> &[String] {
        &self.file_names
    }

    /// All sections, in creation order — the same order [`crate::writer::ObjectWriter`] uses
    /// both to assign section ids and, later, to emit data-section records (see the resolved
    /// open question in the design notes).
    pub fn sections(&self) -> impl Iterator<Item = (SectionId, &Section)> {
        self.sections
            .iter()
            .enumerate()
            .map(|(i, s)| (SectionId(i as u32), s))
    }

    /// Look up a section by id.
    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0 as usize]
    }

    /// All symbols, in creation order.
    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Look up a symbol by id.
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0 as usize]
    }

    /// Mutably look up a symbol by id.
    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.0 as usize]
    }

    /// Intern a symbol by name (or create a fresh anonymous one if `name` is empty — used for
    /// section-begin anchors, which are never looked up by name).
    pub fn intern_symbol(&mut self, name: &str, temporary: bool) -> SymbolId {
        if name.is_empty() {
            let id = SymbolId(self.symbols.len() as u32);
            self.symbols.push(Symbol::new(String::new(), temporary));
            return id;
        }
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol::new(name.to_string(), temporary));
        self.by_name.insert(name.to_string(), id);
        id
    }

    /// Get or create the section of `kind` named `name`, and make it the current section.
    pub fn switch_section(&mut self, name: &str, kind: SectionKind) -> SectionId {
        if let Some(pos) = self.sections.iter().position(|s| s.name() == name) {
            let id = SectionId(pos as u32);
            self.current_section = Some(id);
            return id;
        }
        let begin_symbol = self.intern_symbol("", true);
        let id = SectionId(self.sections.len() as u32);
        self.sections.push(Section::new(name.to_string(), kind, begin_symbol));
        self.current_section = Some(id);
        log::trace!("created section {name} ({kind:?}) as id {}", id.0);
        id
    }

    /// The section currently being emitted into, if any.
    pub fn current_section(&self) -> Option<SectionId> {
        self.current_section
    }

    pub(crate) fn section_mut(&mut self, id: SectionId) -> &mut Section {
        &mut self.sections[id.0 as usize]
    }

    /// Bind `symbol` to the current section at the fragment's current length (emitting a label).
    ///
    /// Universal streamer behavior inherited from the general object-streamer base, not a
    /// WLAV-specific override — but necessary plumbing without which no symbol could ever be
    /// defined.
    ///
    /// # Panics
    ///
    /// Panics if there is no current section.
    pub fn define_label(&mut self, symbol: SymbolId) {
        let section = self.current_section.expect("emit_label with no current section");
        let offset = self.sections[section.0 as usize].fragment.len() as u64;
        self.symbols[symbol.0 as usize].define_at(section, offset);
        log::trace!("defined label {:?} at section {} offset {offset}", symbol, section.0);
    }

    /// Define `symbol` as an absolute value, detached from any section.
    pub fn define_symbol_absolute(&mut self, symbol: SymbolId, value: u64) {
        self.symbols[symbol.0 as usize].define_absolute(value);
    }
}

/// Read-only queries over a fully laid-out [`Assembler`]: section sizes, symbol offsets, and
/// fragment offsets.
///
/// Kept as a distinct type (rather than folding these queries into `Assembler` itself) because
/// the original toolchain hands the writer an `Assembler` *and* an `AsmLayout` as two separate
/// collaborators — layout being the result of a pass over the assembler, not the assembler's own
/// state.
pub struct AsmLayout<'a> {
    asm: &'a Assembler,
}

impl<'a> AsmLayout<'a> {
    /// Wrap `asm`, whose current fragment contents are treated as final.
    pub fn new(asm: &'a Assembler) -> Self {
        Self { asm }
    }

    /// The final byte size of a section's data.
    pub fn section_file_size(&self, section: SectionId) -> u64 {
        self.asm.section(section).fragment().len() as u64
    }

    /// The offset of `fragment` within its section. Always `0`: this assembler never splits a
    /// section into more than one fragment (see [`crate::section::Fragment`]).
    pub fn fragment_offset(&self, _section: SectionId) -> u64 {
        0
    }

    /// The symbol's resolved offset, or `None` if it cannot be resolved to an absolute value
    /// (e.g. it was never defined).
    pub fn symbol_offset(&self, symbol: SymbolId) -> Option<u64> {
        self.asm.symbol(symbol).offset()
    }
}

/// A location resolved directly against known buffer/line numbers, for constructing fixups in
/// tests without a full source manager.
pub fn loc(buffer_id: u32, line: u32) -> SourceLoc {
    SourceLoc { buffer_id, line }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switching_to_the_same_section_name_reuses_it() {
        let mut asm = Assembler::new();
        let a = asm.switch_section(".data", SectionKind::Data);
        let _ = asm.switch_section(".text", SectionKind::Text);
        let b = asm.switch_section(".data", SectionKind::Data);
        assert_eq!(a, b);
        assert_eq!(asm.sections().count(), 2);
        assert_eq!(asm.current_section(), Some(a));
    }
}
