//! Question-text similarity.
//!
//! Ratcliff/Obershelp sequence matching: repeatedly take the longest
//! common block, recurse on the pieces to its left and right, and score
//! `2 * matched / (len_a + len_b)`. The result is in [0, 1] and is 1.0
//! only for identical sequences.
//!
//! Titles are compared after `normalize`, so case and runs of whitespace
//! do not affect the score.

/// Lowercase and collapse all whitespace runs to a single space.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Similarity of two normalized strings, in [0, 1].
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio_chars(&a, &b)
}

/// Same as `ratio`, on pre-split characters.
pub fn ratio_chars(a: &[char], b: &[char]) -> f64 {
    score(matching_chars(a, b), a.len() + b.len())
}

/// Cheap upper bound on `ratio_chars`: shared character multiset only.
///
/// Ignores order, so `quick_ratio_chars(a, b) >= ratio_chars(a, b)`.
pub fn quick_ratio_chars(a: &[char], b: &[char]) -> f64 {
    let mut available = std::collections::HashMap::<char, usize>::new();
    for &c in b {
        *available.entry(c).or_default() += 1;
    }

    let mut shared = 0;
    for c in a {
        if let Some(n) = available.get_mut(c) {
            if *n > 0 {
                *n -= 1;
                shared += 1;
            }
        }
    }

    score(shared, a.len() + b.len())
}

#[allow(clippy::cast_precision_loss)]
fn score(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 1.0;
    }
    2.0 * matched as f64 / total as f64
}

/// Total characters covered by the recursive longest-block decomposition.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_block(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, len)`. Among equally long blocks the one starting
/// earliest in `a` wins, then earliest in `b`.
fn longest_block(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    // run[x + 1] = length of the common run ending at a[i], b[blo + x]
    let mut prev = vec![0usize; width + 1];
    let mut curr = vec![0usize; width + 1];
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);

    for i in alo..ahi {
        for x in 0..width {
            curr[x + 1] = if a[i] == b[blo + x] { prev[x] + 1 } else { 0 };
            if curr[x + 1] > best_len {
                best_len = curr[x + 1];
                best_i = i + 1 - best_len;
                best_j = blo + x + 1 - best_len;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    (best_i, best_j, best_len)
}
