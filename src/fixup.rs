//! Fixups and source locations: the unresolved references a fragment carries until the object
//! writer turns them into relocations.

use crate::format::RelocKind;

/// A location in a source buffer, as known to a [`crate::asm::SourceManager`].
///
/// The real toolchain resolves an opaque `SMLoc` against the source manager to find the
/// containing buffer and line number. This crate's assembler stand-in does not model macro
/// expansion or buffer concatenation, so a `SourceLoc` already carries the buffer id and line
/// directly; `SourceManager` exists as the seam a fuller front end would implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    /// Which source buffer this location is in.
    pub buffer_id: u32,
    /// 1-based line number within that buffer.
    pub line: u32,
}

/// An unresolved reference left behind by instruction encoding.
#[derive(Debug, Clone, Copy)]
pub struct Fixup {
    /// Byte offset within the fragment this fixup was emitted into (before any re-basing the
    /// streamer applies when appending to an already-nonempty fragment).
    pub offset: u64,
    /// The relocation kind this fixup will become.
    pub kind: RelocKind,
    /// The right-shift amount implicit in the fixup kind (e.g. a "high byte of a 16-bit value"
    /// fixup shifts by 8). Zero for a plain direct/relative reference.
    pub shift: u32,
    /// Where in the source this fixup originated, if known.
    pub loc: Option<SourceLoc>,
}

/// Maps source locations to buffer identifiers and line numbers.
///
/// External collaborator contract (see the crate's non-goals: no DWARF or line-table emission
/// beyond this). A minimal in-memory implementation, [`BufferTable`], is provided for testing
/// and for the CLI demo.
pub trait SourceManager {
    /// The buffer a location lies in.
    fn buffer_containing(&self, loc: SourceLoc) -> u32 {
        loc.buffer_id
    }

    /// The line number of a location within its buffer.
    fn line_number(&self, loc: SourceLoc) -> u32 {
        loc.line
    }

    /// A human-readable identifier for a buffer (typically its file name), if any.
    fn buffer_identifier(&self, buffer_id: u32) -> Option<&str>;
}

/// A trivial [`SourceManager`] backed by a list of named buffers, indexed by creation order.
#[derive(Debug, Default)]
pub struct BufferTable {
    identifiers: Vec<String>,
}

impl BufferTable {
    /// An empty buffer table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new buffer and return its id.
    pub fn add_buffer(&mut self, identifier: impl Into<String>) -> u32 {
        self.identifiers.push(identifier.into());
        (self.identifiers.len() - 1) as u32
    }
}

impl SourceManager for BufferTable {
    fn buffer_identifier(&self, buffer_id: u32) -> Option<&str> {
        self.identifiers.get(buffer_id as usize).map(String::as_str)
    }
}
