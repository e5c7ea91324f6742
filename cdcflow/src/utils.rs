//! Utilities.

/// Returns bit-represented value of an integer, LSB first.
pub fn u128_to_bitvec(n: usize, value: u128) -> Vec<bool> {
    (0..n).map(|i| if i >= 128 { false } else { (value >> i) & 1 != 0 }).collect::<Vec<_>>()
}

/// Returns the integer represented by `bits`, LSB first.
pub fn bitvec_to_u128(bits: &[bool]) -> u128 {
    assert!(bits.len() <= 128, "{} bits do not fit in u128", bits.len());
    bits.iter().rev().fold(0, |acc, bit| (acc << 1) | u128::from(*bit))
}

/// Combines all elements into one String, separated by `sep`. Returns `None` if all elements are `None`.
pub fn join_options<I>(sep: &str, iterable: I) -> Option<String>
where I: IntoIterator<Item = Option<String>> {
    let iterable = iterable.into_iter().flatten().collect::<Vec<_>>();
    if iterable.is_empty() {
        None
    } else {
        Some(iterable.join(sep))
    }
}

/// Some or executing the given expression.
#[macro_export]
macro_rules! some_or {
    ($e:expr, $err:expr) => {{
        match $e {
            Some(r) => r,
            None => $err,
        }
    }};
}
