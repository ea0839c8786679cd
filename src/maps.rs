//! Section and symbol maps (C5): the two side tables the object writer populates during
//! enumeration and post-layout binding.

use std::collections::HashMap;

use crate::asm::Assembler;
use crate::section::SectionId;
use crate::symbol::Symbol;
use crate::symbol::SymbolId;

/// Assigns dense, 1-based wire ids to sections in enumeration order.
#[derive(Debug, Default)]
pub struct SectionMap {
    ids: HashMap<SectionId, u32>,
    next_id: u32,
    /// The order sections were added in, reused verbatim for the final per-section emission
    /// pass (§4.7 item 9) so that section ids assigned here stay consistent with the order the
    /// writer later iterates in — see the resolved open question in the design notes.
    order: Vec<SectionId>,
}

impl SectionMap {
    /// Assign the next id (starting at 1) to `section`, if it hasn't been seen before.
    pub fn add(&mut self, section: SectionId) {
        self.ids.entry(section).or_insert_with(|| {
            self.next_id += 1;
            self.next_id
        });
        if !self.order.contains(&section) {
            self.order.push(section);
        }
    }

    /// The wire id for `section`, or `0` if it has never been added (used for sanity
    /// assertions, never emitted on the wire).
    pub fn lookup(&self, section: SectionId) -> u32 {
        self.ids.get(&section).copied().unwrap_or(0)
    }

    /// Sections in the order they were enumerated, for the final data-section emission pass.
    pub fn order(&self) -> &[SectionId] {
        &self.order
    }
}

/// A symbol's classification, snapshotted during post-layout binding.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolInfo {
    /// `exported ⇔ in_section ∧ name ≠ ""`.
    pub exported: bool,
    /// `private ⇔ temporary ∨ (defined ∧ ¬external)`.
    pub private: bool,
}

/// Snapshots every symbol's `{exported, private}` classification at post-layout-binding time.
#[derive(Debug, Default)]
pub struct SymbolMap {
    info: HashMap<SymbolId, SymbolInfo>,
}

impl SymbolMap {
    /// Snapshot `symbol`'s classification.
    pub fn add(&mut self, symbol: &Symbol, id: SymbolId) {
        self.info.insert(
            id,
            SymbolInfo {
                exported: symbol.is_exported(),
                private: symbol.is_private(),
            },
        );
    }

    /// Whether `symbol` was registered in this map at all.
    pub fn has_symbol(&self, symbol: SymbolId) -> bool {
        self.info.contains_key(&symbol)
    }

    /// Whether `symbol` is private. Panics if `symbol` was never registered — the asserted
    /// invariant from §7: every queried symbol in `is_private` must have been registered.
    pub fn is_private(&self, symbol: SymbolId) -> bool {
        self.info
            .get(&symbol)
            .unwrap_or_else(|| panic!("symbol not registered in symbol map"))
            .private
    }

    /// All symbols classified as exported, sorted by `(section_id, offset, name)` for
    /// deterministic, byte-reproducible output (see the design notes).
    pub fn exported_symbols<'a>(
        &self,
        asm: &'a Assembler,
        sections: &SectionMap,
    ) -> Vec<(SymbolId, &'a Symbol)> {
        let mut out: Vec<(SymbolId, &Symbol)> = self
            .info
            .iter()
            .filter(|(_, info)| info.exported)
            .map(|(&id, _)| (id, asm.symbol(id)))
            .collect();
        out.sort_by(|(_, a), (_, b)| {
            let section_key = |s: &Symbol| s.section().map(|sec| sections.lookup(sec)).unwrap_or(0);
            (section_key(a), a.offset().unwrap_or(0), a.name()).cmp(&(
                section_key(b),
                b.offset().unwrap_or(0),
                b.name(),
            ))
        });
        out
    }
}
