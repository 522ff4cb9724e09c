//! Dotted version comparison.
//!
//! Segments are compared as numbers where both sides are numeric, so
//! `0.9.10` sorts after `0.9.9`. Missing trailing segments count as zero.

use std::cmp::Ordering;

/// Compare two dotted version strings.
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = a.trim().split('.').collect();
    let right: Vec<&str> = b.trim().split('.').collect();

    for i in 0..left.len().max(right.len()) {
        let l = left.get(i).copied().unwrap_or("0");
        let r = right.get(i).copied().unwrap_or("0");

        let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
            (Ok(l), Ok(r)) => l.cmp(&r),
            _ => l.cmp(r),
        };

        if ordering != Ordering::Equal {
            return ordering;
        }
    }

    Ordering::Equal
}

/// Whether `version` is at least `minimum`.
#[must_use]
pub fn satisfies(version: &str, minimum: &str) -> bool {
    compare(version, minimum) != Ordering::Less
}
