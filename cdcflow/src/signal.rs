//! Bit-representable values.

use std::collections::VecDeque;
use std::fmt;
use std::fmt::Debug;

use crate::utils::*;

/// Port names and bitwidths of a [`Signal`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortDecls {
    /// Collection of named members.
    Struct(Vec<(Option<String>, PortDecls)>),

    /// Single vector which contains its width.
    Bits(usize),
}

impl PortDecls {
    /// Width of `PortDecls`.
    pub fn width(&self) -> usize {
        match self {
            PortDecls::Struct(inner) => inner.iter().map(|(_, m)| m.width()).sum(),
            PortDecls::Bits(width) => *width,
        }
    }

    /// Iterator for `PortDecls`.
    ///
    /// # Note
    ///
    /// The iterator returns (name, width) for inner fields **ONLY** with nonzero width, in the
    /// same order as the bits returned by [`Signal::transl`].
    pub fn iter(&self) -> PortDeclsIterator { self.iter_with_prefix(None) }

    fn iter_with_prefix(&self, prefix: Option<String>) -> PortDeclsIterator {
        let mut iter_vec = VecDeque::new();

        match self {
            PortDecls::Struct(inner) => {
                for (name, member) in inner {
                    iter_vec.extend(member.iter_with_prefix(join_options("_", [prefix.clone(), name.clone()])).inner)
                }
            }
            PortDecls::Bits(width) => {
                if *width > 0 {
                    iter_vec.push_back((prefix, *width));
                }
            }
        }

        PortDeclsIterator { inner: iter_vec }
    }
}

/// Iterator for `PortDecls`.
#[derive(Debug)]
pub struct PortDeclsIterator {
    inner: VecDeque<(Option<String>, usize)>,
}

impl Iterator for PortDeclsIterator {
    type Item = (Option<String>, usize);

    fn next(&mut self) -> Option<Self::Item> { self.inner.pop_front() }
}

/// Bit-representable values.
///
/// Every register and port of a model is a `Signal`, so that it can be probed into a
/// [`Trace`](crate::Trace).
pub trait Signal: 'static + Debug + Clone {
    /// Signal's bit width.
    ///
    /// # Note
    ///
    /// `Self::WIDTH` and `Self::port_decls().width()` should be equal.
    const WIDTH: usize;

    /// Bits of the value, LSB first, members in declaration order.
    fn transl(self) -> Vec<bool>;

    /// Port names and bitwidths.
    fn port_decls() -> PortDecls;
}

impl Signal for () {
    const WIDTH: usize = 0;

    fn transl(self) -> Vec<bool> { vec![] }

    fn port_decls() -> PortDecls { PortDecls::Bits(0) }
}

impl Signal for bool {
    const WIDTH: usize = 1;

    fn transl(self) -> Vec<bool> { vec![self] }

    fn port_decls() -> PortDecls { PortDecls::Bits(1) }
}

macro_rules! impl_signal {
    ($typ:ty) => {
        impl Signal for $typ {
            const WIDTH: usize = ::std::mem::size_of::<$typ>() * 8;

            fn transl(self) -> Vec<bool> { u128_to_bitvec(Self::WIDTH, u128::from(self)) }

            fn port_decls() -> PortDecls { PortDecls::Bits(Self::WIDTH) }
        }
    };
}

impl_signal!(u8);
impl_signal!(u16);
impl_signal!(u32);
impl_signal!(u64);
impl_signal!(u128);

/// Fixed-width unsigned word, e.g. a FIFO data port.
///
/// The value is always kept masked to `N` bits. `N` must be in `1..=128`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Word<const N: usize> {
    value: u128,
}

impl<const N: usize> Word<N> {
    const WIDTH_CHECK: () = assert!(N >= 1 && N <= 128, "word width should be in 1..=128");

    /// Mask of the valid bits.
    pub const MASK: u128 = if N >= 128 { u128::MAX } else { (1u128 << N) - 1 };

    /// Creates a new word, truncating `value` to `N` bits.
    pub fn new(value: u128) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::WIDTH_CHECK;
        Self { value: value & Self::MASK }
    }

    /// Returns the value.
    pub fn value(self) -> u128 { self.value }

    /// Returns the word width.
    pub const fn width(self) -> usize { N }
}

impl<const N: usize> fmt::Debug for Word<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}'h{:x}", N, self.value) }
}

impl<const N: usize> fmt::Display for Word<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "0x{:x}", self.value) }
}

impl<const N: usize> From<u128> for Word<N> {
    fn from(value: u128) -> Self { Self::new(value) }
}

impl<const N: usize> Signal for Word<N> {
    const WIDTH: usize = N;

    fn transl(self) -> Vec<bool> { u128_to_bitvec(N, self.value) }

    fn port_decls() -> PortDecls { PortDecls::Bits(N) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_masked() {
        let word = Word::<4>::from(0x1f);
        assert_eq!(word.value(), 0xf);
        assert_eq!(word.width(), 4);
        assert_eq!(Word::<128>::new(u128::MAX).value(), u128::MAX);
        assert_eq!(format!("{:?}", Word::<12>::new(0xabc)), "12'habc");
    }

    #[test]
    fn word_transl_is_lsb_first() {
        assert_eq!(Word::<3>::new(0b011).transl(), vec![true, true, false]);
        assert_eq!(<Word<112>>::WIDTH, 112);
    }

    #[test]
    fn port_decls_flatten_with_prefix() {
        let decls = PortDecls::Struct(vec![
            (Some("state".to_string()), PortDecls::Bits(1)),
            (None, PortDecls::Struct(vec![(Some("count".to_string()), PortDecls::Bits(8))])),
            (Some("unit".to_string()), PortDecls::Bits(0)),
        ]);
        assert_eq!(decls.width(), 9);
        assert_eq!(decls.iter().collect::<Vec<_>>(), vec![(Some("state".to_string()), 1), (Some("count".to_string()), 8)]);
    }

    #[test]
    fn integer_signals() {
        assert_eq!(<u8>::WIDTH, 8);
        assert_eq!(5u8.transl(), vec![true, false, true, false, false, false, false, false]);
    }
}
