//! Structural type model.
//!
//! GML has no static types, so everything here is inferred: each signifier
//! accumulates the types observed for it through [`TypeStore::merge_types`],
//! and doc comments contribute declared types through the feather codec.
//!
//! All types and signifiers live in one [`TypeStore`] arena and refer to each
//! other through [`TypeId`](crate::common::TypeId) and
//! [`SignifierId`](crate::common::SignifierId).

mod feather;
mod flags;
mod generics;
mod kind;
mod merge;
mod reclaim;
mod signifier;
mod store;
mod ty;

pub use feather::{normalize_feather_string, FeatherContext};
pub use flags::Flags;
pub use generics::GenericsMap;
pub use kind::{AssetKind, HandleKind, TypeKind};
pub use reclaim::Liveness;
pub use signifier::{Owner, Signifier};
pub use store::{TypeStore, DEFAULT_MAX_DEPTH};
pub use ty::{Members, Type};
