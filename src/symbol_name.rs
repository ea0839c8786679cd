//! Name mangling (C4.4): private symbols are disambiguated across translation units by
//! prefixing them with the first known source file name, translating `_` to `~` (reserved by
//! the linker for section-local resolution) and terminating with `~`.

use std::io;

use crate::asm::Assembler;
use crate::io::WlavWrite;
use crate::maps::SymbolMap;
use crate::symbol::SymbolId;

/// Write `symbol`'s mangled name, without a trailing NUL — callers append the terminator
/// themselves, since every wire location that uses a mangled name also writes its own NUL (or,
/// in the complex-relocation calc stack, a following sign byte for the *next* entry makes a
/// shared terminator impossible to factor out cleanly).
pub fn write_mangled_symbol_name<W: WlavWrite>(
    out: &mut W,
    asm: &Assembler,
    symbols: &SymbolMap,
    symbol: SymbolId,
) -> io::Result<()> {
    if symbols.is_private(symbol) {
        match asm.file_names().first() {
            Some(first_file) => {
                for ch in first_file.chars() {
                    if ch == '_' {
                        out.write_u8(b'~')?;
                    } else {
                        let mut buf = [0_u8; 4];
                        out.write_bytes(ch.encode_utf8(&mut buf).as_bytes())?;
                    }
                }
                out.write_u8(b'~')?;
            }
            None => out.write_u8(b'_')?,
        }
    }
    out.write_bytes(asm.symbol(symbol).name().as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Assembler;
    use crate::maps::SymbolMap;

    #[test]
    fn non_private_symbol_is_identity() {
        let mut asm = Assembler::new();
        let sym = asm.intern_symbol("foo", false);
        asm.symbol_mut(sym).set_external(true);
        asm.define_symbol_absolute(sym, 0);
        let mut symbols = SymbolMap::default();
        symbols.add(asm.symbol(sym), sym);

        let mut buf = Vec::new();
        write_mangled_symbol_name(&mut buf, &asm, &symbols, sym).unwrap();
        assert_eq!(buf, b"foo");
    }

    #[test]
    fn private_symbol_with_one_file_name_is_mangled() {
        let mut asm = Assembler::new();
        asm.add_file_name("foo_bar.s");
        let sym = asm.intern_symbol("L0", true);
        let mut symbols = SymbolMap::default();
        symbols.add(asm.symbol(sym), sym);

        let mut buf = Vec::new();
        write_mangled_symbol_name(&mut buf, &asm, &symbols, sym).unwrap();
        assert_eq!(buf, b"foo~bar.s~L0");
    }

    #[test]
    fn private_symbol_with_no_file_name_gets_bare_underscore_prefix() {
        let mut asm = Assembler::new();
        let sym = asm.intern_symbol("L0", true);
        let mut symbols = SymbolMap::default();
        symbols.add(asm.symbol(sym), sym);

        let mut buf = Vec::new();
        write_mangled_symbol_name(&mut buf, &asm, &symbols, sym).unwrap();
        assert_eq!(buf, b"_L0");
    }
}
