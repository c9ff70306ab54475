//! Sizing of the substitution search space.

/// Number of leaf candidates the search engine evaluates when it substitutes
/// exactly `depth` of `len` bytes and never finds a match:
/// `C(len, depth) * 256^depth`.
///
/// Saturates at `u64::MAX`; the value only sizes progress reporting.
pub fn count_iterations(len: usize, depth: usize) -> u64 {
    if depth > len {
        return 0;
    }

    let total = binomial(len as u128, depth as u128)
        .and_then(|combinations| combinations.checked_mul(256u128.checked_pow(depth as u32)?));

    total
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(u64::MAX)
}

fn binomial(n: u128, k: u128) -> Option<u128> {
    if k > n {
        return Some(0);
    }

    let k = k.min(n - k);
    let mut result = 1u128;
    for i in 0..k {
        // Exact at every step: result holds C(n, i) before the update.
        result = result.checked_mul(n - i)? / (i + 1);
    }

    Some(result)
}
