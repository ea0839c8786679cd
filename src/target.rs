//! Target descriptor (C10, an external collaborator given a concrete, testable shape): CPU
//! selection, per-CPU data layout string, pointer width, and predefined macros.

/// The data layout shared by the 6502, 65C02 and 65802 (16-bit pointers only).
pub const DATA_LAYOUT_6502: &str = "e-m:e-p:16:8-i16:8-i32:8-i64:8-n8:16:32:64-S8";

/// The data layout for the 65816, which adds a 32-bit "far" pointer in address space 1.
pub const DATA_LAYOUT_65816: &str = "e-m:e-p:16:8-p1:32:8-i16:8-i32:8-i64:8-n8:16:32:64-S8";

/// A member of the 65xx processor family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cpu {
    /// The original 6502.
    Mos6502,
    /// The CMOS 65C02.
    W65C02,
    /// The 65802 (a 65816 in a 6502-compatible package).
    W65802,
    /// The 65816, with a 24-bit address space.
    W65816,
}

impl Cpu {
    /// Parse a CPU name. Matching is exact and case-sensitive, matching the original toolchain's
    /// `StringSwitch`.
    pub fn parse(name: &str) -> Option<Cpu> {
        match name {
            "6502" => Some(Cpu::Mos6502),
            "65C02" => Some(Cpu::W65C02),
            "65802" => Some(Cpu::W65802),
            "65816" => Some(Cpu::W65816),
            _ => None,
        }
    }

    /// The predefined macro identifying this CPU (e.g. `__65816__`).
    pub const fn macro_name(self) -> &'static str {
        match self {
            Cpu::Mos6502 => "__6502__",
            Cpu::W65C02 => "__65C02__",
            Cpu::W65802 => "__65802__",
            Cpu::W65816 => "__65816__",
        }
    }

    fn data_layout(self) -> &'static str {
        match self {
            Cpu::W65816 => DATA_LAYOUT_65816,
            _ => DATA_LAYOUT_6502,
        }
    }
}

/// The target-descriptor interface consumed by the front end: data layout, pointer widths, and
/// predefined macros.
#[derive(Debug)]
pub struct TargetInfo {
    cpu: Option<Cpu>,
    data_layout: &'static str,
}

impl Default for TargetInfo {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetInfo {
    /// Construct a target descriptor with no CPU selected yet (data layout defaults to the
    /// 65816's, matching the original constructor, which always resets to that layout first).
    ///
    /// Asserted invariant (§7): this target has no notion of an operating system ABI, so any
    /// caller constructing one from a target triple must first confirm the triple's OS and
    /// environment components are unknown. That check belongs to the triple-parsing front end
    /// (out of scope here); this constructor only documents the expectation.
    pub fn new() -> Self {
        Self {
            cpu: None,
            data_layout: DATA_LAYOUT_65816,
        }
    }

    /// The currently selected CPU, if any.
    pub fn cpu(&self) -> Option<Cpu> {
        self.cpu
    }

    /// The current data layout string.
    pub fn data_layout(&self) -> &'static str {
        self.data_layout
    }

    /// Select a CPU by name.
    ///
    /// The data layout is unconditionally reset to the 65816's first. If `name` does not match
    /// one of the four known CPU names exactly, the layout is left at that just-reset value and
    /// `false` is returned — there is no "previous CPU" to roll back to, because the reset
    /// already happened.
    pub fn set_cpu(&mut self, name: &str) -> bool {
        self.data_layout = DATA_LAYOUT_65816;
        let Some(cpu) = Cpu::parse(name) else {
            return false;
        };
        self.cpu = Some(cpu);
        self.data_layout = cpu.data_layout();
        true
    }

    /// Pointer width in bits for the given LLVM-style address space: 32 in address space 1 (the
    /// 65816's far pointers), 16 everywhere else.
    pub const fn pointer_width(&self, address_space: u32) -> u32 {
        if address_space == 1 {
            32
        } else {
            16
        }
    }

    /// The predefined macros for the current CPU selection: always `__c65__`, plus the CPU's own
    /// macro (defaulting to `__65816__` before any CPU has been selected, matching the original
    /// `switch`'s `default` arm).
    pub fn predefined_macros(&self) -> Vec<&'static str> {
        vec!["__c65__", self.cpu.map(Cpu::macro_name).unwrap_or("__65816__")]
    }

    /// Whether a target feature is present. Only `"c65"` is ever recognized.
    pub fn has_feature(&self, feature: &str) -> bool {
        feature == "c65"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_selection_is_case_sensitive() {
        let mut t = TargetInfo::new();
        assert!(!t.set_cpu("65c02"));
        assert_eq!(t.data_layout(), DATA_LAYOUT_65816);

        assert!(t.set_cpu("65C02"));
        assert_eq!(t.data_layout(), DATA_LAYOUT_6502);
        assert_eq!(t.predefined_macros(), vec!["__c65__", "__65C02__"]);
    }

    #[test]
    fn default_macros_before_any_cpu_selected() {
        let t = TargetInfo::new();
        assert_eq!(t.predefined_macros(), vec!["__c65__", "__65816__"]);
        assert_eq!(t.pointer_width(1), 32);
        assert_eq!(t.pointer_width(0), 16);
    }

    #[test]
    fn sixtyfive_eight_sixteen_data_layout_has_far_pointer_space() {
        let mut t = TargetInfo::new();
        t.set_cpu("65816");
        assert!(t.data_layout().contains("p1:32:8"));
    }
}
