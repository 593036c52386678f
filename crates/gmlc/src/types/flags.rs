//! Signifier capability flags

use bitflags::bitflags;

bitflags! {
    /// Orthogonal capabilities of a [`Signifier`](super::Signifier).
    ///
    /// `LOCAL` and `GLOBAL` are mutually exclusive, `PARAMETER` implies
    /// `LOCAL`, and `STATIC` implies `INSTANCE`. The named setters keep these
    /// combinations consistent; raw `insert` does not.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct Flags: u16 {
        const READABLE = 1 << 0;
        const WRITABLE = 1 << 1;
        /// Member of an instance or struct
        const INSTANCE = 1 << 2;
        const DEPRECATED = 1 << 3;
        /// `static` struct member shared by every instance
        const STATIC = 1 << 4;
        const LOCAL = 1 << 5;
        const GLOBAL = 1 << 6;
        const PARAMETER = 1 << 7;
        /// Built into the runtime
        const NATIVE = 1 << 8;
        /// Parameter that may be omitted at call sites
        const OPTIONAL = 1 << 9;
        const MACRO = 1 << 10;
        const ASSET = 1 << 11;

        const READ_WRITE = Self::READABLE.bits() | Self::WRITABLE.bits();
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags::READ_WRITE
    }
}

macro_rules! flag_accessors {
    ($($getter:ident => $flag:ident),+ $(,)?) => {
        impl Flags {
            $(
                pub fn $getter(self) -> bool {
                    self.contains(Flags::$flag)
                }
            )+
        }
    };
}

flag_accessors!(
    readable => READABLE,
    writable => WRITABLE,
    instance => INSTANCE,
    deprecated => DEPRECATED,
    is_static => STATIC,
    local => LOCAL,
    global => GLOBAL,
    parameter => PARAMETER,
    native => NATIVE,
    optional => OPTIONAL,
    is_macro => MACRO,
    asset => ASSET,
);

impl Flags {
    pub fn set_local(&mut self, on: bool) {
        self.set(Flags::LOCAL, on);
        if on {
            self.remove(Flags::GLOBAL);
        } else {
            self.remove(Flags::PARAMETER);
        }
    }

    pub fn set_global(&mut self, on: bool) {
        self.set(Flags::GLOBAL, on);
        if on {
            self.remove(Flags::LOCAL | Flags::PARAMETER | Flags::INSTANCE | Flags::STATIC);
        }
    }

    pub fn set_parameter(&mut self, on: bool) {
        self.set(Flags::PARAMETER, on);
        if on {
            self.set_local(true);
        }
    }

    pub fn set_instance(&mut self, on: bool) {
        self.set(Flags::INSTANCE, on);
        if on {
            self.remove(Flags::GLOBAL | Flags::LOCAL | Flags::PARAMETER);
        } else {
            self.remove(Flags::STATIC);
        }
    }

    pub fn set_static(&mut self, on: bool) {
        self.set(Flags::STATIC, on);
        if on {
            self.set_instance(true);
        }
    }

    pub fn set_writable(&mut self, on: bool) {
        self.set(Flags::WRITABLE, on);
    }

    pub fn set_deprecated(&mut self, on: bool) {
        self.set(Flags::DEPRECATED, on);
    }

    pub fn set_native(&mut self, on: bool) {
        self.set(Flags::NATIVE, on);
    }

    pub fn set_optional(&mut self, on: bool) {
        self.set(Flags::OPTIONAL, on);
    }

    pub fn set_macro(&mut self, on: bool) {
        self.set(Flags::MACRO, on);
    }

    pub fn set_asset(&mut self, on: bool) {
        self.set(Flags::ASSET, on);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_read_write() {
        let flags = Flags::default();
        assert!(flags.readable());
        assert!(flags.writable());
        assert!(!flags.local());
        assert!(!flags.global());
    }

    #[test]
    fn test_local_and_global_are_exclusive() {
        let mut flags = Flags::default();
        flags.set_parameter(true);
        assert!(flags.parameter());
        assert!(flags.local());

        flags.set_global(true);
        assert!(flags.global());
        assert!(!flags.local());
        assert!(!flags.parameter());

        flags.set_local(true);
        assert!(flags.local());
        assert!(!flags.global());
    }

    #[test]
    fn test_static_implies_instance() {
        let mut flags = Flags::default();
        flags.set_static(true);
        assert!(flags.instance());
        assert!(flags.is_static());

        flags.set_instance(false);
        assert!(!flags.is_static());
    }
}
