//! Symbol representation (C3): a named symbol with `private`/`exported` classification derived
//! from its defined/external/section/temporary flags.

use bitflags::bitflags;

use crate::section::SectionId;

/// A dense, stable index into [`crate::asm::Assembler`]'s symbol list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SymbolId(pub(crate) u32);

bitflags! {
    /// The boolean facets a symbol's `private`/`exported` classification is derived from.
    ///
    /// A small set of independent booleans, so a bitflags type fits better than separate `bool`
    /// fields.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
    pub struct SymbolFlags: u8 {
        /// A compiler-generated label (e.g. a loop or jump-table label), never exported.
        const TEMPORARY  = 1 << 0;
        /// The symbol has been assigned a value (bound to a section offset, or common).
        const DEFINED    = 1 << 1;
        /// The symbol was declared `.global`/`.globl`.
        const EXTERNAL   = 1 << 2;
        /// The symbol currently resides in a section (as opposed to being only referenced).
        const IN_SECTION = 1 << 3;
        /// The symbol is a common symbol (size/align recorded, no initializer).
        const COMMON     = 1 << 4;
    }
}

/// A named symbol.
#[derive(Debug)]
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) flags: SymbolFlags,
    pub(crate) section: Option<SectionId>,
    /// Offset within `section`, once defined. `None` for a symbol that is only referenced.
    pub(crate) offset: Option<u64>,
    pub(crate) common_size: u64,
    pub(crate) common_align: u64,
}

impl Symbol {
    pub(crate) fn new(name: String, temporary: bool) -> Self {
        let mut flags = SymbolFlags::empty();
        flags.set(SymbolFlags::TEMPORARY, temporary);
        Self {
            name,
            flags,
            section: None,
            offset: None,
            common_size: 0,
            common_align: 0,
        }
    }

    /// The symbol's name. Empty for anonymous section-begin anchors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a compiler-generated temporary (e.g. a local numeric label).
    pub fn is_temporary(&self) -> bool {
        self.flags.contains(SymbolFlags::TEMPORARY)
    }

    /// Whether the symbol has been assigned a value.
    pub fn is_defined(&self) -> bool {
        self.flags.contains(SymbolFlags::DEFINED)
    }

    /// Whether the symbol was declared `.global`.
    pub fn is_external(&self) -> bool {
        self.flags.contains(SymbolFlags::EXTERNAL)
    }

    /// Whether the symbol currently resides in a section.
    pub fn is_in_section(&self) -> bool {
        self.flags.contains(SymbolFlags::IN_SECTION)
    }

    /// Whether the symbol is a common symbol.
    pub fn is_common(&self) -> bool {
        self.flags.contains(SymbolFlags::COMMON)
    }

    /// `exported ⇔ in_section ∧ name ≠ ""`.
    pub fn is_exported(&self) -> bool {
        self.is_in_section() && !self.name.is_empty()
    }

    /// `private ⇔ temporary ∨ (defined ∧ ¬external)`.
    pub fn is_private(&self) -> bool {
        self.is_temporary() || (self.is_defined() && !self.is_external())
    }

    /// A symbol defined with a fixed numeric value but not tied to any section. WLAV's complex
    /// relocation intake (§4.5) asserts the second operand of a subtraction is never absolute.
    pub fn is_absolute(&self) -> bool {
        self.is_defined() && !self.is_in_section()
    }

    /// The section this symbol is defined in, if any.
    pub fn section(&self) -> Option<SectionId> {
        self.section
    }

    /// The symbol's offset within its section, if defined.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub(crate) fn set_external(&mut self, external: bool) {
        self.flags.set(SymbolFlags::EXTERNAL, external);
    }

    pub(crate) fn define_at(&mut self, section: SectionId, offset: u64) {
        self.section = Some(section);
        self.offset = Some(offset);
        self.flags.insert(SymbolFlags::DEFINED | SymbolFlags::IN_SECTION);
    }

    /// Define the symbol as an absolute value (defined, but not tied to any section).
    pub(crate) fn define_absolute(&mut self, offset: u64) {
        self.section = None;
        self.offset = Some(offset);
        self.flags.insert(SymbolFlags::DEFINED);
        self.flags.remove(SymbolFlags::IN_SECTION);
    }

    pub(crate) fn set_common(&mut self, size: u64, align: u64) {
        self.common_size = size;
        self.common_align = align;
        self.flags.insert(SymbolFlags::COMMON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_matches_quantified_invariants() {
        let mut s = Symbol::new("foo".into(), false);
        assert!(!s.is_exported());
        assert!(!s.is_private());

        s.define_at(SectionId(0), 0);
        assert!(s.is_exported());
        assert!(s.is_private(), "defined and not external => private");

        s.set_external(true);
        assert!(s.is_exported());
        assert!(!s.is_private());
    }

    #[test]
    fn temporary_is_always_private() {
        let mut s = Symbol::new("L0".into(), true);
        s.set_external(true);
        assert!(s.is_private(), "temporary overrides external");
    }

    #[test]
    fn anonymous_in_section_is_not_exported() {
        let mut s = Symbol::new(String::new(), false);
        s.define_at(SectionId(0), 0);
        assert!(!s.is_exported());
    }
}
