//! Source-file index (C7): assigns dense, 1-based-from-zero file ids to source buffers
//! encountered via fixup locations, and emits the file table.

use std::io;

use crate::asm::Assembler;
use crate::fixup::SourceLoc;
use crate::io::WlavWrite;

/// Tracks which source buffers have been referenced by a fixup and assigns each a dense id, on
/// demand, the first time it is seen.
#[derive(Debug, Default)]
pub struct SourceFileIndex {
    unknown_file_id: Option<u32>,
    next_source_id: u32,
    /// `(buffer_id, dense_id)`, in discovery order.
    buffers: Vec<(u32, u32)>,
}

impl SourceFileIndex {
    /// A fresh index with no files resolved yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unknown_file_id(&mut self) -> u32 {
        *self.unknown_file_id.get_or_insert_with(|| {
            let id = self.next_source_id;
            self.next_source_id += 1;
            id
        })
    }

    /// Resolve a fixup's source location to `(file_id, line)`. If there is no source manager or
    /// the location is unknown, falls back to the lazily-assigned unknown-file id and line `0`.
    pub fn resolve_file_line(&mut self, asm: &Assembler, loc: Option<SourceLoc>) -> (u32, u32) {
        let (Some(loc), Some(source_manager)) = (loc, asm.source_manager()) else {
            return (self.ensure_unknown_file_id(), 0);
        };
        let buffer_id = source_manager.buffer_containing(loc);
        let line = source_manager.line_number(loc);
        if let Some(&(_, id)) = self.buffers.iter().find(|(b, _)| *b == buffer_id) {
            (id, line)
        } else {
            let id = self.next_source_id;
            self.next_source_id += 1;
            self.buffers.push((buffer_id, id));
            (id, line)
        }
    }

    /// Emit the source file table (§4.6).
    pub fn write_source_files<W: WlavWrite>(&mut self, asm: &Assembler, out: &mut W) -> io::Result<()> {
        if self.buffers.is_empty() {
            if let [only] = asm.file_names() {
                let id = self.ensure_unknown_file_id();
                out.write_u32(1)?;
                out.write_cstr(only)?;
                out.write_u8(id as u8)?;
                out.write_u32(0)?;
                return Ok(());
            }
            // No buffers were ever resolved against a source manager and there isn't exactly one
            // file name to fall back to: every object still needs at least one file-table row, so
            // force the lazily-assigned unknown-file entry into existence.
            self.ensure_unknown_file_id();
        }

        let count = self.buffers.len() as u32 + u32::from(self.unknown_file_id.is_some());
        out.write_u32(count)?;
        for &(buffer_id, source_id) in &self.buffers {
            match asm
                .source_manager()
                .and_then(|sm| sm.buffer_identifier(buffer_id))
            {
                Some(identifier) if !identifier.is_empty() => out.write_cstr(identifier)?,
                _ => out.write_cstr(&format!("anonymous file {buffer_id}"))?,
            }
            out.write_u8(source_id as u8)?;
            out.write_u32(0)?;
        }
        if let Some(unknown_file_id) = self.unknown_file_id {
            out.write_cstr("unknown file")?;
            out.write_u8(unknown_file_id as u8)?;
            out.write_u32(0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_unit_emits_single_unknown_file_entry() {
        let asm = Assembler::new();
        let mut index = SourceFileIndex::new();
        let mut buf = Vec::new();
        index.write_source_files(&asm, &mut buf).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&1_u32.to_be_bytes());
        expected.extend_from_slice(b"unknown file\0");
        expected.push(0);
        expected.extend_from_slice(&0_u32.to_be_bytes());
        assert_eq!(buf, expected);
    }

    #[test]
    fn single_known_file_name_short_circuits() {
        let mut asm = Assembler::new();
        asm.add_file_name("foo.s");
        let mut index = SourceFileIndex::new();
        let mut buf = Vec::new();
        index.write_source_files(&asm, &mut buf).unwrap();
        let mut expected = Vec::new();
        expected.extend_from_slice(&1_u32.to_be_bytes());
        expected.extend_from_slice(b"foo.s\0");
        expected.push(0);
        expected.extend_from_slice(&0_u32.to_be_bytes());
        assert_eq!(buf, expected);
    }
}
