/// Modifier bitset for a class or member.
///
/// Modeled as a plain bitset newtype rather than pulling in `bitflags`,
/// mirroring how the rest of this model represents flags (see
/// `nova-classfile`'s raw `access_flags: u16`) while still giving named
/// constants and combinators instead of raw integer literals at call sites.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Modifiers(u32);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const ABSTRACT: Modifiers = Modifiers(1 << 0);
    pub const FINAL: Modifiers = Modifiers(1 << 1);
    pub const SEALED: Modifiers = Modifiers(1 << 2);
    pub const IMPLICIT: Modifiers = Modifiers(1 << 3);
    pub const LAZY: Modifiers = Modifiers(1 << 4);
    pub const OVERRIDE: Modifiers = Modifiers(1 << 5);
    pub const MACRO: Modifiers = Modifiers(1 << 6);

    pub const fn contains(self, flag: Modifiers) -> bool {
        self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub const fn with(self, flag: Modifiers) -> Modifiers {
        Modifiers(self.0 | flag.0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn from_bits(bits: u32) -> Modifiers {
        Modifiers(bits)
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Modifiers;

    fn bitor(self, rhs: Modifiers) -> Modifiers {
        self.with(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combinators_compose() {
        let m = Modifiers::ABSTRACT | Modifiers::FINAL;
        assert!(m.contains(Modifiers::ABSTRACT));
        assert!(m.contains(Modifiers::FINAL));
        assert!(!m.contains(Modifiers::SEALED));
    }
}
