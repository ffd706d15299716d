mod bitmask;

pub use bitmask::{Bitmask, Iter};

/// A fieldless enum whose variants occupy distinct bits of a `u32`.
///
/// Usually implemented with `#[derive(Bit)]` from `xpad-bit-derive`.
pub trait Bitable: Copy + 'static {
    /// Every variant, in bit order.
    const ALL: &'static [Self];

    fn index(&self) -> u32;
    fn bit(&self) -> u32;
}
