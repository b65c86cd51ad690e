//! Small copyable bit sets with named members.

/// Declare a bit-set newtype with named constants.
///
/// ```
/// speed_argparse::flag_set! {
///     pub struct Perms: u8 {
///         READ = 0b01,
///         WRITE = 0b10,
///     }
/// }
///
/// let rw = Perms::READ | Perms::WRITE;
/// assert!(rw.contains(Perms::WRITE));
/// ```
#[macro_export]
macro_rules! flag_set {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident: $repr:ty {
            $($(#[$fmeta:meta])* $flag:ident = $value:expr),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name($repr);

        impl $name {
            $($(#[$fmeta])* pub const $flag: Self = Self($value);)*

            pub const fn empty() -> Self {
                Self(0)
            }

            pub const fn bits(self) -> $repr {
                self.0
            }

            pub const fn union(self, other: Self) -> Self {
                Self(self.0 | other.0)
            }

            /// Whether every bit of `other` is set.
            pub const fn contains(self, other: Self) -> bool {
                self.0 & other.0 == other.0
            }

            pub const fn intersects(self, other: Self) -> bool {
                self.0 & other.0 != 0
            }

            pub const fn is_empty(self) -> bool {
                self.0 == 0
            }

            pub fn insert(&mut self, other: Self) {
                self.0 |= other.0;
            }

            pub fn remove(&mut self, other: Self) {
                self.0 &= !other.0;
            }

            pub fn set(&mut self, other: Self, on: bool) {
                if on {
                    self.insert(other);
                } else {
                    self.remove(other);
                }
            }
        }

        impl ::std::ops::BitOr for $name {
            type Output = Self;

            fn bitor(self, rhs: Self) -> Self {
                Self(self.0 | rhs.0)
            }
        }

        impl ::std::ops::BitOrAssign for $name {
            fn bitor_assign(&mut self, rhs: Self) {
                self.0 |= rhs.0;
            }
        }

        impl ::std::fmt::Debug for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                let mut set = f.debug_set();
                $(
                    if $value != 0 && self.contains(Self::$flag) {
                        set.entry(&format_args!("{}", stringify!($flag)));
                    }
                )*
                set.finish()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    flag_set! {
        struct Sample: u8 {
            A = 0b001,
            B = 0b010,
            C = 0b100,
        }
    }

    #[test]
    fn insert_remove_and_contains() {
        let mut flags = Sample::A | Sample::C;
        assert!(flags.contains(Sample::A));
        assert!(!flags.contains(Sample::B));
        assert!(!flags.contains(Sample::A | Sample::B));

        flags.insert(Sample::B);
        flags.remove(Sample::A);
        assert_eq!(flags, Sample::B | Sample::C);

        flags.set(Sample::C, false);
        assert_eq!(flags, Sample::B);
        assert!(!flags.is_empty());
        assert!(Sample::empty().is_empty());
    }

    #[test]
    fn debug_lists_members() {
        assert_eq!(format!("{:?}", Sample::A | Sample::C), "{A, C}");
        assert_eq!(format!("{:?}", Sample::empty()), "{}");
    }
}
