//! Assembly-directive glue (C11, thin glue around an external collaborator): recognizes
//! `.text`, `.data`, `.bss`, an optional numeric subsection, and switches the current section.

use crate::format::SectionKind;
use crate::streamer::Streamer;

/// One of the three section-switching directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `.text`
    Text,
    /// `.data`
    Data,
    /// `.bss`
    Bss,
}

impl Directive {
    /// Recognize a directive token. Case-sensitive, matching the literal spellings `.text`,
    /// `.data`, `.bss`.
    pub fn parse(token: &str) -> Option<Directive> {
        match token {
            ".text" => Some(Directive::Text),
            ".data" => Some(Directive::Data),
            ".bss" => Some(Directive::Bss),
            _ => None,
        }
    }

    fn section_kind(self) -> SectionKind {
        match self {
            Directive::Text => SectionKind::Text,
            Directive::Data => SectionKind::Data,
            Directive::Bss => SectionKind::Bss,
        }
    }

    fn section_name(self, subsection: Option<i64>) -> String {
        let base = match self {
            Directive::Text => ".text",
            Directive::Data => ".data",
            Directive::Bss => ".bss",
        };
        match subsection {
            Some(n) => format!("{base}.{n}"),
            None => base.to_string(),
        }
    }

    /// Switch `streamer`'s current section to match this directive, creating it on first use.
    ///
    /// A real front end parses a full bracket expression for `subsection` (bracket expressions
    /// are enabled for this directive); this glue only accepts an already-evaluated integer,
    /// leaving expression parsing to the out-of-scope assembly parser.
    pub fn apply(self, streamer: &mut Streamer<'_>, subsection: Option<i64>) {
        let name = self.section_name(subsection);
        streamer.switch_section(&name, self.section_kind());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Assembler;
    use crate::format::SectionKind;

    #[test]
    fn directive_tokens_are_recognized() {
        assert_eq!(Directive::parse(".text"), Some(Directive::Text));
        assert_eq!(Directive::parse(".data"), Some(Directive::Data));
        assert_eq!(Directive::parse(".bss"), Some(Directive::Bss));
        assert_eq!(Directive::parse(".globl"), None);
    }

    #[test]
    fn switching_sections_round_trips_through_the_same_section() {
        let mut asm = Assembler::new();
        {
            let mut streamer = Streamer::new(&mut asm);
            Directive::Data.apply(&mut streamer, None);
            Directive::Text.apply(&mut streamer, None);
            Directive::Data.apply(&mut streamer, None);
        }
        assert_eq!(asm.sections().count(), 2);
        let first = asm.sections().next().unwrap();
        assert_eq!(first.1.kind(), SectionKind::Data);
        assert_eq!(asm.current_section(), Some(first.0));
    }
}
