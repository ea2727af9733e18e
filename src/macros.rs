//! # Internal Macros
//!
//! Boilerplate reduction for zerocopy struct fields that use little-endian
//! wrapper types (U16, U32).
//!
//! ## zerocopy_getters!
//!
//! ```ignore
//! use zerocopy::little_endian::U32;
//!
//! #[repr(C)]
//! struct Header {
//!     record_count: U32,
//! }
//!
//! impl Header {
//!     zerocopy_getters! {
//!         record_count: u32,
//!     }
//! }
//!
//! // Generates:
//! // pub fn record_count(&self) -> u32 { self.record_count.get() }
//! ```

/// Generates getter methods for zerocopy little-endian fields.
#[macro_export]
macro_rules! zerocopy_getters {
    ($($field:ident : $native_ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $field(&self) -> $native_ty {
                self.$field.get()
            }
        )*
    };
}
