//! Conversion of raw tokens into typed targets.
//!
//! A target type implements [`Castable`]. Scalars are rebuilt from every
//! token they receive. Containers grow as tokens arrive and keep a cursor
//! describing which slot the next token lands in. When a container holds
//! other containers, [`Castable::request_addition`] opens a fresh inner slot,
//! which is how `-x a b -x c` fills `[[a, b], [c]]` instead of `[a, b, c]`.

use std::any::Any;
use std::collections::{BTreeSet, BinaryHeap, HashSet, LinkedList, VecDeque};
use std::ffi::OsString;
use std::hash::Hash;
use std::path::PathBuf;

use regex::Regex;
use thiserror::Error;

/// Why a token could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("Invalid number")]
    InvalidNumber,
    /// Filesystem failure; the text reads like a system error message.
    #[error("{0}")]
    Path(String),
    #[error("{0}")]
    Invalid(String),
}

impl CastError {
    pub fn is_path(&self) -> bool {
        matches!(self, Self::Path(_))
    }
}

/// A type the caster chain can fill from raw tokens.
pub trait Castable: Sized + 'static {
    /// Position state kept between tokens fed into the same value.
    type Cursor: Default;

    /// Whether the type collects several tokens.
    const IS_CONTAINER: bool = false;
    /// Values expected per occurrence when the range is derived from the target.
    const MIN_VALUES: usize = 1;
    const MAX_VALUES: usize = 1;

    /// Build a fresh value from its first token.
    fn from_token(cursor: &mut Self::Cursor, raw: &str) -> Result<Self, CastError>;

    /// Feed a further token into an existing value.
    fn cast(&mut self, cursor: &mut Self::Cursor, raw: &str) -> Result<(), CastError> {
        *self = Self::from_token(cursor, raw)?;
        Ok(())
    }

    /// A new occurrence started: containers of containers open a new slot.
    fn request_addition(&mut self, _cursor: &mut Self::Cursor) {}
}

/// Convert a single token with a fresh cursor.
pub fn try_type_cast<T: Castable>(raw: &str) -> Result<T, CastError> {
    T::from_token(&mut T::Cursor::default(), raw)
}

macro_rules! numeric_castable {
    ($($ty:ty),* $(,)?) => {$(
        impl Castable for $ty {
            type Cursor = ();

            fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
                raw.parse().map_err(|_| CastError::InvalidNumber)
            }
        }
    )*};
}

numeric_castable!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl Castable for bool {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        match raw {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CastError::Invalid("Invalid boolean".to_string())),
        }
    }
}

impl Castable for char {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(CastError::Invalid("Invalid character".to_string())),
        }
    }
}

impl Castable for String {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        Ok(raw.to_string())
    }
}

impl Castable for OsString {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        Ok(OsString::from(raw))
    }
}

impl Castable for PathBuf {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        Ok(PathBuf::from(raw))
    }
}

impl Castable for Regex {
    type Cursor = ();

    fn from_token(_: &mut (), raw: &str) -> Result<Self, CastError> {
        Regex::new(raw).map_err(|_| CastError::Invalid("Invalid regular expression".to_string()))
    }
}

/// Cursor of growable sequences.
#[derive(Debug, Default)]
pub struct SeqCursor<C> {
    inner: C,
    pending: bool,
}

macro_rules! sequence_castable {
    ($($seq:ident => $push:ident, $last:ident;)*) => {$(
        impl<T: Castable> Castable for $seq<T> {
            type Cursor = SeqCursor<T::Cursor>;

            const IS_CONTAINER: bool = true;
            const MIN_VALUES: usize = if T::IS_CONTAINER { T::MIN_VALUES } else { 1 };
            const MAX_VALUES: usize = if T::IS_CONTAINER { T::MAX_VALUES } else { usize::MAX };

            fn from_token(cursor: &mut Self::Cursor, raw: &str) -> Result<Self, CastError> {
                let mut seq = $seq::new();
                seq.cast(cursor, raw)?;
                Ok(seq)
            }

            fn cast(&mut self, cursor: &mut Self::Cursor, raw: &str) -> Result<(), CastError> {
                if !T::IS_CONTAINER {
                    let item = try_type_cast::<T>(raw)?;
                    self.$push(item);
                    return Ok(());
                }
                match self.$last() {
                    Some(open) if !cursor.pending => open.cast(&mut cursor.inner, raw),
                    _ => {
                        cursor.inner = T::Cursor::default();
                        let item = T::from_token(&mut cursor.inner, raw)?;
                        self.$push(item);
                        cursor.pending = false;
                        Ok(())
                    }
                }
            }

            fn request_addition(&mut self, cursor: &mut Self::Cursor) {
                if T::IS_CONTAINER {
                    cursor.pending = true;
                }
            }
        }
    )*};
}

sequence_castable! {
    Vec => push, last_mut;
    VecDeque => push_back, back_mut;
    LinkedList => push_back, back_mut;
}

impl<T: Castable + Ord> Castable for BTreeSet<T> {
    type Cursor = ();

    const IS_CONTAINER: bool = true;
    const MAX_VALUES: usize = usize::MAX;

    fn from_token(cursor: &mut (), raw: &str) -> Result<Self, CastError> {
        let mut set = BTreeSet::new();
        set.cast(cursor, raw)?;
        Ok(set)
    }

    fn cast(&mut self, _: &mut (), raw: &str) -> Result<(), CastError> {
        self.insert(try_type_cast(raw)?);
        Ok(())
    }
}

impl<T: Castable + Eq + Hash> Castable for HashSet<T> {
    type Cursor = ();

    const IS_CONTAINER: bool = true;
    const MAX_VALUES: usize = usize::MAX;

    fn from_token(cursor: &mut (), raw: &str) -> Result<Self, CastError> {
        let mut set = HashSet::new();
        set.cast(cursor, raw)?;
        Ok(set)
    }

    fn cast(&mut self, _: &mut (), raw: &str) -> Result<(), CastError> {
        self.insert(try_type_cast(raw)?);
        Ok(())
    }
}

impl<T: Castable + Ord> Castable for BinaryHeap<T> {
    type Cursor = ();

    const IS_CONTAINER: bool = true;
    const MAX_VALUES: usize = usize::MAX;

    fn from_token(cursor: &mut (), raw: &str) -> Result<Self, CastError> {
        let mut heap = BinaryHeap::new();
        heap.cast(cursor, raw)?;
        Ok(heap)
    }

    fn cast(&mut self, _: &mut (), raw: &str) -> Result<(), CastError> {
        self.push(try_type_cast(raw)?);
        Ok(())
    }
}

/// Cursor of fixed-size arrays and tuples. The index never passes the last
/// slot; once there, later tokens overwrite it.
#[derive(Debug, Default)]
pub struct SlotCursor<C> {
    index: usize,
    started: bool,
    pending: bool,
    inner: C,
}

impl<C: Default> SlotCursor<C> {
    fn advance(&mut self, len: usize) {
        if self.started && self.index + 1 < len {
            self.index += 1;
            self.inner = C::default();
        }
        self.started = true;
    }
}

impl<T: Castable + Default, const N: usize> Castable for [T; N] {
    type Cursor = SlotCursor<T::Cursor>;

    const IS_CONTAINER: bool = true;
    const MIN_VALUES: usize = if T::IS_CONTAINER { T::MIN_VALUES } else { N };
    const MAX_VALUES: usize = if T::IS_CONTAINER { T::MAX_VALUES } else { N };

    fn from_token(cursor: &mut Self::Cursor, raw: &str) -> Result<Self, CastError> {
        let mut array: [T; N] = std::array::from_fn(|_| T::default());
        array.cast(cursor, raw)?;
        Ok(array)
    }

    fn cast(&mut self, cursor: &mut Self::Cursor, raw: &str) -> Result<(), CastError> {
        if !T::IS_CONTAINER {
            cursor.advance(N);
        } else if cursor.pending || !cursor.started {
            cursor.advance(N);
            cursor.pending = false;
        }
        let Some(slot) = self.get_mut(cursor.index) else {
            return Err(CastError::Invalid("No room for value".to_string()));
        };
        slot.cast(&mut cursor.inner, raw)
    }

    fn request_addition(&mut self, cursor: &mut Self::Cursor) {
        if T::IS_CONTAINER {
            cursor.pending = true;
        }
    }
}

macro_rules! tuple_castable {
    ($len:expr; $($idx:tt $name:ident),+) => {
        impl<$($name: Castable + Default),+> Castable for ($($name,)+) {
            type Cursor = SlotCursor<($(<$name as Castable>::Cursor,)+)>;

            const IS_CONTAINER: bool = true;
            const MIN_VALUES: usize = $len;
            const MAX_VALUES: usize = $len;

            fn from_token(cursor: &mut Self::Cursor, raw: &str) -> Result<Self, CastError> {
                let mut tuple = ($($name::default(),)+);
                tuple.cast(cursor, raw)?;
                Ok(tuple)
            }

            fn cast(&mut self, cursor: &mut Self::Cursor, raw: &str) -> Result<(), CastError> {
                if cursor.started && cursor.index + 1 < $len {
                    cursor.index += 1;
                }
                cursor.started = true;
                match cursor.index {
                    $($idx => self.$idx.cast(&mut cursor.inner.$idx, raw),)+
                    _ => unreachable!("tuple cursor is pinned below its arity"),
                }
            }
        }
    };
}

tuple_castable!(2; 0 A, 1 B);
tuple_castable!(3; 0 A, 1 B, 2 C);
tuple_castable!(4; 0 A, 1 B, 2 C, 3 D);

/// Object-safe face of a [`TypeCaster`], stored inside value arguments.
pub trait DynCaster {
    fn try_cast(&mut self, raw: &str) -> Result<(), CastError>;
    fn request_addition(&mut self);
    fn reset(&mut self);
    fn is_container(&self) -> bool;
    fn as_any(&self) -> &dyn Any;
}

/// Owns a target value and the cursor used to keep filling it.
pub struct TypeCaster<T: Castable> {
    value: Option<T>,
    cursor: T::Cursor,
}

impl<T: Castable> TypeCaster<T> {
    pub fn new() -> Self {
        Self {
            value: None,
            cursor: T::Cursor::default(),
        }
    }

    /// The converted value, once at least one token was accepted.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<T> {
        self.value
    }
}

impl<T: Castable> Default for TypeCaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Castable> DynCaster for TypeCaster<T> {
    fn try_cast(&mut self, raw: &str) -> Result<(), CastError> {
        match &mut self.value {
            Some(value) => value.cast(&mut self.cursor, raw),
            None => match T::from_token(&mut self.cursor, raw) {
                Ok(value) => {
                    self.value = Some(value);
                    Ok(())
                }
                Err(err) => {
                    self.cursor = T::Cursor::default();
                    Err(err)
                }
            },
        }
    }

    fn request_addition(&mut self) {
        if let Some(value) = &mut self.value {
            value.request_addition(&mut self.cursor);
        }
    }

    fn reset(&mut self) {
        self.value = None;
        self.cursor = T::Cursor::default();
    }

    fn is_container(&self) -> bool {
        T::IS_CONTAINER
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
