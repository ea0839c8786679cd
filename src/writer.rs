//! Object writer (C8): orchestrates post-layout binding, section enumeration, relocation
//! intake, and final serialization in the file layout mandated by §4.7.

use std::io;
use std::io::Write;

use crate::asm::Assembler;
use crate::asm::AsmLayout;
use crate::format;
use crate::io::CountingWriter;
use crate::io::WlavWrite;
use crate::maps::SectionMap;
use crate::maps::SymbolMap;
use crate::reloc::record_relocation;
use crate::reloc::ComplexRelocation;
use crate::reloc::Relocation;
use crate::reloc::RelocationTarget;
use crate::reloc::SimpleRelocation;
use crate::reloc::TargetObjectWriter;
use crate::section::SectionId;
use crate::source::SourceFileIndex;
use crate::symbol_name::write_mangled_symbol_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
enum WriterState {
    #[default]
    Init,
    SectionsEnumerated,
    SymbolsSnapshotted,
}

/// Accumulates section/symbol classification and relocations, then serializes a WLAV object.
///
/// Follows the state machine documented in §4.7: sections are enumerated, then symbols are
/// snapshotted during post-layout binding, then any number of relocations are recorded, then
/// `write_object` emits the file and the writer is spent. Each method's `debug_assert!` enforces
/// that order is a programmer error to violate, not a recoverable one (§7).
#[derive(Debug, Default)]
pub struct ObjectWriter {
    sections: SectionMap,
    symbols: SymbolMap,
    simple_relocations: Vec<SimpleRelocation>,
    complex_relocations: Vec<ComplexRelocation>,
    source_index: SourceFileIndex,
    state: WriterState,
}

impl ObjectWriter {
    /// A fresh writer with empty side tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign dense 1-based ids to every section in `asm`, in enumeration order.
    pub fn enumerate_sections(&mut self, asm: &Assembler) {
        debug_assert!(
            self.state <= WriterState::SectionsEnumerated,
            "enumerate_sections called out of order"
        );
        for (id, _) in asm.sections() {
            self.sections.add(id);
        }
        self.state = WriterState::SectionsEnumerated;
    }

    /// Snapshot every symbol's `{exported, private}` classification.
    pub fn execute_post_layout_binding(&mut self, asm: &Assembler) {
        debug_assert!(
            self.state <= WriterState::SymbolsSnapshotted,
            "execute_post_layout_binding called out of order"
        );
        for (id, symbol) in asm.symbols() {
            self.symbols.add(symbol, id);
        }
        self.state = WriterState::SymbolsSnapshotted;
        log::debug!("post-layout binding complete");
    }

    /// Record a relocation for `fixup`, resolving its source location against `asm`.
    ///
    /// # Panics
    ///
    /// Panics (an asserted invariant, §7) if called before [`Self::execute_post_layout_binding`]
    /// and `target.sym_a` would not resolve through the symbol map.
    pub fn record_relocation(
        &mut self,
        asm: &Assembler,
        section: SectionId,
        fragment_offset: u64,
        fixup: &crate::fixup::Fixup,
        target: &RelocationTarget,
        target_writer: &dyn TargetObjectWriter,
    ) {
        debug_assert!(
            self.symbols.has_symbol(target.sym_a),
            "relocation references a symbol absent from the symbol map"
        );
        let (file_id, line) = self.source_index.resolve_file_line(asm, fixup.loc);
        let mut fixed_value = 0;
        match record_relocation(
            asm,
            section,
            fragment_offset,
            fixup,
            target,
            target_writer,
            file_id,
            line,
            &mut fixed_value,
        ) {
            Relocation::Simple(r) => self.simple_relocations.push(r),
            Relocation::Complex(r) => self.complex_relocations.push(r),
        }
    }

    /// Serialize `asm`/`layout` as a WLAV object into `sink`, returning the number of bytes
    /// written.
    ///
    /// If sections have not yet been enumerated, does so first (idempotently), matching the
    /// original's tolerance for being driven either explicitly or implicitly.
    pub fn write_object<W: Write>(
        &mut self,
        asm: &Assembler,
        layout: &AsmLayout<'_>,
        sink: W,
    ) -> Result<u64, crate::Error> {
        if self.state == WriterState::Init {
            self.enumerate_sections(asm);
        }

        let mut out = CountingWriter::new(sink);
        out.write_bytes(&format::MAGIC)?;
        out.write_u8(format::MISC_BITS)?;

        self.source_index.write_source_files(asm, &mut out)?;

        out.write_u32(0)?; // exported-definitions count

        self.write_symbol_table(asm, layout, &mut out)?;
        self.write_simple_relocations(asm, &mut out)?;
        self.write_complex_relocations(asm, &mut out)?;

        out.write_u32(0)?; // label size-of list
        out.write_u32(0)?; // section appends

        self.write_data_sections(asm, layout, &mut out)?;

        log::debug!("wrote {} bytes", out.count());
        Ok(out.count())
    }

    fn write_symbol_table<W: Write>(
        &self,
        asm: &Assembler,
        layout: &AsmLayout<'_>,
        out: &mut CountingWriter<W>,
    ) -> io::Result<()> {
        let exported = self.symbols.exported_symbols(asm, &self.sections);
        out.write_u32(exported.len() as u32)?;
        for (id, symbol) in exported {
            write_mangled_symbol_name(out, asm, &self.symbols, id)?;
            out.write_u8(0)?; // NUL terminator
            out.write_u8(0)?; // kind: label
            let section = symbol.section().expect("exported symbol is always in_section");
            out.write_u32(self.sections.lookup(section))?;
            out.write_u8(1)?; // file_id: hard-coded, see §9/DESIGN.md
            out.write_u32(0)?; // line: hard-coded
            let offset = layout
                .symbol_offset(id)
                .expect("exported symbol must resolve to an absolute offset");
            out.write_u32(offset as u32)?;
        }
        Ok(())
    }

    fn write_simple_relocations<W: Write>(
        &self,
        asm: &Assembler,
        out: &mut CountingWriter<W>,
    ) -> io::Result<()> {
        out.write_u32(self.simple_relocations.len() as u32)?;
        for r in &self.simple_relocations {
            write_mangled_symbol_name(out, asm, &self.symbols, r.symbol)?;
            out.write_u8(0)?;
            out.write_u8(r.kind.simple_code())?;
            out.write_u8(0)?;
            out.write_u32(self.sections.lookup(r.section))?;
            out.write_u8(r.file_id as u8)?;
            out.write_u32(r.line)?;
            out.write_u32(r.offset as u32)?;
        }
        Ok(())
    }

    fn write_complex_relocations<W: Write>(
        &self,
        asm: &Assembler,
        out: &mut CountingWriter<W>,
    ) -> io::Result<()> {
        out.write_u32(self.complex_relocations.len() as u32)?;
        for (i, r) in self.complex_relocations.iter().enumerate() {
            out.write_u32((i + 1) as u32)?;
            out.write_u8(r.kind.complex_code())?;
            out.write_u8(0)?;
            out.write_u32(self.sections.lookup(r.section))?;
            out.write_u8(r.file_id as u8)?;
            out.write_u8(r.stack.len() as u8)?;
            out.write_u8(0)?;
            out.write_u32(r.offset as u32)?;
            out.write_u32(r.line)?;
            for entry in &r.stack {
                entry.write(out, asm, &self.symbols)?;
            }
        }
        Ok(())
    }

    fn write_data_sections<W: Write>(
        &self,
        asm: &Assembler,
        layout: &AsmLayout<'_>,
        out: &mut CountingWriter<W>,
    ) -> io::Result<()> {
        for &id in self.sections.order() {
            let section = asm.section(id);
            out.write_bytes(section.kind().wire_name())?;
            out.write_u8(format::SECTION_FREE)?;
            out.write_u8(0)?; // namespace
            out.write_u32(self.sections.lookup(id))?;
            out.write_u8(1)?; // file_id: constant
            out.write_u32(layout.section_file_size(id) as u32)?;
            out.write_u32(1)?; // alignment: constant
            out.write_u32(0)?; // priority: constant
            out.write_bytes(&section.fragment().data)?;
            out.write_u8(0)?; // no list-file info
        }
        Ok(())
    }
}
