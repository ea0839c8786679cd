#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod asm;
mod calc;
mod directive;
mod error;
mod fixup;
mod format;
mod io;
mod maps;
mod reloc;
mod section;
mod source;
mod streamer;
mod symbol;
mod symbol_name;
mod target;
mod writer;

pub use self::asm::loc;
pub use self::asm::AsmLayout;
pub use self::asm::Assembler;
pub use self::asm::CodeEmitter;
pub use self::asm::Instruction;
pub use self::asm::PassthroughEmitter;
pub use self::directive::Directive;
pub use self::error::Error;
pub use self::fixup::BufferTable;
pub use self::fixup::Fixup;
pub use self::fixup::SourceLoc;
pub use self::fixup::SourceManager;
pub use self::format::CalcOp;
pub use self::format::RelocKind;
pub use self::format::SectionKind;
pub use self::reloc::record_relocation;
pub use self::reloc::C65TargetWriter;
pub use self::reloc::ComplexRelocation;
pub use self::reloc::Relocation;
pub use self::reloc::RelocationTarget;
pub use self::reloc::SimpleRelocation;
pub use self::reloc::SymbolRefB;
pub use self::reloc::TargetObjectWriter;
pub use self::section::Fragment;
pub use self::section::Section;
pub use self::section::SectionId;
pub use self::streamer::Streamer;
pub use self::streamer::SymbolAttribute;
pub use self::symbol::Symbol;
pub use self::symbol::SymbolFlags;
pub use self::symbol::SymbolId;
pub use self::target::Cpu;
pub use self::target::TargetInfo;
pub use self::writer::ObjectWriter;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
