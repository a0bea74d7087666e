//! Strongly tagged integer handles.
//!
//! A `Handle<Tag>` is a plain index with a reserved empty sentinel. Distinct
//! tags keep a `Piece` from being used where a `State` is expected even though
//! both are integers underneath.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker implemented by every handle category.
pub trait HandleTag: 'static {
    const NAME: &'static str;
}

const EMPTY_VALUE: i32 = -1;

pub struct Handle<Tag> {
    value: i32,
    _tag: PhantomData<fn() -> Tag>,
}

impl<Tag> Handle<Tag> {
    /// The empty handle.
    pub const EMPTY: Self = Self {
        value: EMPTY_VALUE,
        _tag: PhantomData,
    };

    /// Creates a handle for `value`. Negative values produce the empty handle.
    pub const fn new(value: i32) -> Self {
        Self {
            value: if value < 0 { EMPTY_VALUE } else { value },
            _tag: PhantomData,
        }
    }

    pub fn from_index(index: usize) -> Self {
        Self::new(index as i32)
    }

    pub const fn is_empty(self) -> bool {
        self.value == EMPTY_VALUE
    }

    /// Returns the underlying value. The handle must not be empty.
    pub fn value(self) -> i32 {
        debug_assert!(!self.is_empty(), "reading the value of an empty handle");
        self.value
    }

    /// Returns the value as an index. The handle must not be empty.
    pub fn index(self) -> usize {
        self.value() as usize
    }

    /// Returns `None` for the empty handle.
    pub fn get(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl<Tag> Default for Handle<Tag> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<Tag> Clone for Handle<Tag> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<Tag> Copy for Handle<Tag> {}

impl<Tag> PartialEq for Handle<Tag> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<Tag> Eq for Handle<Tag> {}

impl<Tag> PartialOrd for Handle<Tag> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<Tag> Ord for Handle<Tag> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<Tag> Hash for Handle<Tag> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<Tag: HandleTag> fmt::Debug for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "{}(empty)", Tag::NAME)
        } else {
            write!(f, "{}({})", Tag::NAME, self.value)
        }
    }
}

impl<Tag: HandleTag> fmt::Display for Handle<Tag> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Serialized as the raw integer; the empty handle is `-1`.
impl<Tag> Serialize for Handle<Tag> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_i32(self.value)
    }
}

impl<'de, Tag> Deserialize<'de> for Handle<Tag> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        i32::deserialize(deserializer).map(Self::new)
    }
}

macro_rules! handle_types {
    ($($(#[$meta:meta])* $alias:ident => $tag:ident),* $(,)?) => {
        $(
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub enum $tag {}

            impl HandleTag for $tag {
                const NAME: &'static str = stringify!($alias);
            }

            $(#[$meta])*
            pub type $alias = Handle<$tag>;
        )*
    };
}

handle_types! {
    /// An instantiated object on the grid.
    Piece => PieceTag,
    /// A named category of piece.
    State => StateTag,
    Sprite => SpriteTag,
    /// One of the parallel occupancy grids.
    Layer => LayerTag,
    Group => GroupTag,
    Contact => ContactTag,
    Hit => HitTag,
    /// An update pass bound to a group with `Grid::set_update_info`.
    Update => UpdateTag,
    /// Linear encoding of (position, layer).
    CellIndex => CellIndexTag,
}
