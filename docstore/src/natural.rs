//! Natural ordering for version strings.
//!
//! Runs of ASCII digits compare by numeric value, everything else compares
//! byte-wise, so `1.2.0 < 1.10.0` and `v9 < v10`. Digit runs of any length are
//! supported because values are compared as trimmed digit strings rather than
//! parsed integers.

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let bytes = s.as_bytes();
    let mut start = 0;

    while start < bytes.len() {
        let digit = bytes[start].is_ascii_digit();
        let mut end = start + 1;
        while end < bytes.len() && bytes[end].is_ascii_digit() == digit {
            end += 1;
        }
        // Boundaries fall on ASCII digits, so slicing stays on char boundaries.
        let part = &s[start..end];
        out.push(if digit {
            Chunk::Digits(part)
        } else {
            Chunk::Text(part)
        });
        start = end;
    }

    out
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

/// Compare two strings in natural order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert_eq!(natural_cmp("1.2.0", "1.10.0"), Ordering::Less);
        assert_eq!(natural_cmp("1.10.0", "1.9.9"), Ordering::Greater);
        assert_eq!(natural_cmp("v9", "v10"), Ordering::Less);
        assert_eq!(natural_cmp("2.0", "2.0"), Ordering::Equal);
    }

    #[test]
    fn test_leading_zeros_and_long_runs() {
        assert_eq!(natural_cmp("1.01", "1.1"), Ordering::Greater);
        assert_eq!(
            natural_cmp("99999999999999999999999", "100000000000000000000000"),
            Ordering::Less
        );
    }

    #[test]
    fn test_prefix_sorts_first() {
        assert_eq!(natural_cmp("1.0.0", "1.0.0-rc1"), Ordering::Less);
        assert_eq!(natural_cmp("1.0", "1.0.1"), Ordering::Less);
    }

    #[test]
    fn test_reverse_sort_puts_newest_first() {
        let mut versions = vec!["1.0.0", "1.10.0", "1.2.0", "0.9"];
        versions.sort_by(|a, b| natural_cmp(b, a));
        assert_eq!(versions, vec!["1.10.0", "1.2.0", "1.0.0", "0.9"]);
    }
}
