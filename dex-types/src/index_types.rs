use core::fmt;

macro_rules! index_type {
    ($doc:literal, $i:ident, $t:ty) => {
        #[doc = $doc]
        #[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(transparent)]
        pub struct $i($t);

        impl $i {
            /// Index constructor.
            pub const fn new(index: $t) -> Self {
                Self(index)
            }

            /// The raw index value.
            pub const fn index(self) -> $t {
                self.0
            }

            /// Convert to `usize` for table lookups.
            pub const fn to_usize(self) -> usize {
                self.0 as usize
            }
        }

        impl From<$t> for $i {
            fn from(index: $t) -> Self {
                Self(index)
            }
        }

        impl From<$i> for $t {
            fn from(index: $i) -> $t {
                index.0
            }
        }

        impl fmt::Debug for $i {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($i), "({})"), self.0)
            }
        }

        impl fmt::Display for $i {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

index_type!("Index into the dex file type-id pool.", TypeIndex, u16);
index_type!("Index into the dex file field-id pool.", FieldIndex, u32);
index_type!("Index into the dex file method-id pool.", MethodIndex, u32);
index_type!("Index into the dex file string-id pool.", StringIndex, u32);
index_type!("Index into the dex file prototype-id pool.", ProtoIndex, u16);
index_type!("Index into the dex file call-site-id pool.", CallSiteIndex, u32);
index_type!(
    "Index into the dex file method-handle pool.",
    MethodHandleIndex,
    u32
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_index_round_trip() {
        let idx = TypeIndex::new(0x1234);
        assert_eq!(idx.index(), 0x1234);
        assert_eq!(u16::from(idx), 0x1234);
        assert_eq!(TypeIndex::from(0x1234u16), idx);
        assert_eq!(idx.to_usize(), 0x1234usize);
    }

    #[test]
    fn display_is_bare_number() {
        assert_eq!(MethodIndex::new(7).to_string(), "7");
        assert_eq!(format!("{:?}", FieldIndex::new(7)), "FieldIndex(7)");
    }
}
