//! Type kinds and their canonical names

use std::fmt;

macro_rules! name_table {
    ($(#[$meta:meta])* $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
            }
        }
    };
}

name_table!(
    /// Resource types that can be referenced by name from code
    AssetKind {
        GMAnimCurve,
        GMAudioGroup,
        GMFont,
        GMObject,
        GMParticleSystem,
        GMPath,
        GMRoom,
        GMScript,
        GMSequence,
        GMShader,
        GMSound,
        GMSprite,
        GMTileSet,
        GMTimeline,
        Script,
    }
);

name_table!(
    /// Opaque runtime handles returned by engine functions
    HandleKind {
        AudioEmitter,
        AudioListener,
        AudioSyncGroup,
        BackgroundElement,
        BinaryFile,
        Buffer,
        Camera,
        DsGrid,
        DsList,
        DsMap,
        DsPriority,
        DsQueue,
        DsStack,
        ExternalCall,
        Gif,
        Instance,
        Layer,
        MpGrid,
        ParticleEmitter,
        ParticleSystem,
        ParticleType,
        PhysicsIndex,
        PhysicsParticleGroup,
        Sampler,
        SequenceElement,
        Socket,
        Sound,
        SpriteElement,
        Surface,
        TextFile,
        Texture,
        TileElementId,
        TileMapElement,
        TimeSource,
        Uniform,
        VertexBuffer,
        VertexFormat,
    }
);

impl HandleKind {
    /// The `ds_*` data structures, which carry an item type
    pub fn is_data_structure(self) -> bool {
        self.as_str().starts_with("Ds")
    }
}

/// Kind tag of a [`Type`](super::Type)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TypeKind {
    Any,
    Mixed,
    Unknown,
    Undefined,
    Bool,
    Real,
    String,
    Pointer,
    Array,
    Struct,
    Enum,
    Function,
    Constructor,
    Union,
    /// A named template placeholder such as `T` in `Array<T>`
    Generic,
    Asset(AssetKind),
    Id(HandleKind),
}

const SIMPLE_KINDS: &[TypeKind] = &[
    TypeKind::Any,
    TypeKind::Mixed,
    TypeKind::Unknown,
    TypeKind::Undefined,
    TypeKind::Bool,
    TypeKind::Real,
    TypeKind::String,
    TypeKind::Pointer,
    TypeKind::Array,
    TypeKind::Struct,
    TypeKind::Enum,
    TypeKind::Function,
    TypeKind::Constructor,
    TypeKind::Union,
];

impl TypeKind {
    /// Look up a kind by its canonical name, ignoring ASCII case.
    ///
    /// `Generic` has no spelling of its own: placeholders are declared by name.
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(rest) = strip_prefix_ignore_case(name, "Asset.") {
            return AssetKind::from_name(rest).map(TypeKind::Asset);
        }
        if let Some(rest) = strip_prefix_ignore_case(name, "Id.") {
            return HandleKind::from_name(rest).map(TypeKind::Id);
        }
        SIMPLE_KINDS
            .iter()
            .copied()
            .find(|kind| kind.simple_name().is_some_and(|n| n.eq_ignore_ascii_case(name)))
    }

    fn simple_name(self) -> Option<&'static str> {
        Some(match self {
            TypeKind::Any => "Any",
            TypeKind::Mixed => "Mixed",
            TypeKind::Unknown => "Unknown",
            TypeKind::Undefined => "Undefined",
            TypeKind::Bool => "Bool",
            TypeKind::Real => "Real",
            TypeKind::String => "String",
            TypeKind::Pointer => "Pointer",
            TypeKind::Array => "Array",
            TypeKind::Struct => "Struct",
            TypeKind::Enum => "Enum",
            TypeKind::Function => "Function",
            TypeKind::Constructor => "Constructor",
            TypeKind::Union => "Union",
            TypeKind::Generic => "Generic",
            TypeKind::Asset(_) | TypeKind::Id(_) => return None,
        })
    }

    /// Struct and Enum types hold named members
    pub fn can_have_members(self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Enum)
    }

    /// Container kinds parameterized by an item type
    pub fn can_have_items(self) -> bool {
        match self {
            TypeKind::Array | TypeKind::Struct => true,
            TypeKind::Id(handle) => handle.is_data_structure(),
            _ => false,
        }
    }

    pub fn is_function(self) -> bool {
        matches!(self, TypeKind::Function | TypeKind::Constructor)
    }

    /// Kinds that can be the target of a `with` statement
    pub fn is_withable(self) -> bool {
        matches!(
            self,
            TypeKind::Any
                | TypeKind::Struct
                | TypeKind::Id(HandleKind::Instance)
                | TypeKind::Asset(AssetKind::GMObject)
        )
    }

    /// Kinds that absorb every other type during merging
    pub fn is_maximal(self) -> bool {
        matches!(self, TypeKind::Any | TypeKind::Mixed)
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &text[prefix.len()..])
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Asset(asset) => write!(f, "Asset.{}", asset.as_str()),
            TypeKind::Id(handle) => write!(f, "Id.{}", handle.as_str()),
            other => f.write_str(other.simple_name().unwrap_or("Unknown")),
        }
    }
}
