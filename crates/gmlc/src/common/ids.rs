//! Arena indices for everything the project owns.
//!
//! Types, signifiers, selves and local scopes all live in flat vectors on the
//! [`Project`](crate::project::Project); cross references between them are
//! these plain `Copy` indices rather than shared pointers.

use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        pub struct $name(pub u32);

        impl $name {
            pub fn new(index: usize) -> Self {
                Self(index as u32)
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

arena_id!(
    /// A loaded source file
    FileId,
    "file"
);
arena_id!(
    /// A node in the type graph
    TypeId,
    "type"
);
arena_id!(
    /// A named entity: variable, function, macro, enum, member
    SignifierId,
    "sig"
);
arena_id!(
    /// A receiver context (global, instance, struct, asset)
    SelfId,
    "self"
);
arena_id!(
    /// A local-variable scope
    ScopeId,
    "scope"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_index() {
        let id = TypeId::new(7);
        assert_eq!(id.index(), 7);
        assert_eq!(id.to_string(), "type#7");
        assert_eq!(FileId::new(0).to_string(), "file#0");
    }
}
