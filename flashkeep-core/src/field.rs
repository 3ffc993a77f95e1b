//! Fixed-size field encoding
//!
//! Settings fields are stored little-endian at their natural width, with
//! no padding or tags. A serializer that writes `u16, f32, bool` uses
//! exactly 7 bytes of the store.

/// A value with a fixed-size byte encoding
pub trait StoreField: Sized {
    /// Encoded form, always the same length for a given type
    type Bytes: AsRef<[u8]> + AsMut<[u8]>;

    /// Encode the value
    fn to_bytes(&self) -> Self::Bytes;

    /// Decode a value
    fn from_bytes(bytes: Self::Bytes) -> Self;
}

macro_rules! impl_le_field {
    ($($ty:ty),*) => {
        $(
            impl StoreField for $ty {
                type Bytes = [u8; core::mem::size_of::<$ty>()];

                fn to_bytes(&self) -> Self::Bytes {
                    self.to_le_bytes()
                }

                fn from_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }
            }
        )*
    };
}

impl_le_field!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

impl StoreField for bool {
    type Bytes = [u8; 1];

    fn to_bytes(&self) -> Self::Bytes {
        [*self as u8]
    }

    // Any non-zero byte reads as true, so an erased (0xFF) slot is true
    fn from_bytes(bytes: Self::Bytes) -> Self {
        bytes[0] != 0
    }
}

impl<const N: usize> StoreField for [u8; N] {
    type Bytes = [u8; N];

    fn to_bytes(&self) -> Self::Bytes {
        *self
    }

    fn from_bytes(bytes: Self::Bytes) -> Self {
        bytes
    }
}
