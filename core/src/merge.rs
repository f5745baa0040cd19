//! Linear merges over postings lists.
//!
//! Every input must be strictly ascending (sorted, no duplicates). This is
//! only checked with `debug_assert!`; [`validate_postings`] performs the
//! same check for callers assembling lists by hand.

use crate::error::{Result, SearchError};
use crate::DocId;

fn is_strictly_ascending(list: &[DocId]) -> bool {
    list.windows(2).all(|w| w[0] < w[1])
}

pub fn validate_postings(list: &[DocId]) -> Result<()> {
    match list.windows(2).position(|w| w[0] >= w[1]) {
        None => Ok(()),
        Some(i) => Err(SearchError::InvalidInput(format!(
            "postings not strictly ascending at position {}: {} then {}",
            i + 1,
            list[i],
            list[i + 1]
        ))),
    }
}

/// AND of two lists.
pub fn intersect(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_strictly_ascending(a) && is_strictly_ascending(b));
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        if x < y {
            i += 1;
        } else if x > y {
            j += 1;
        } else {
            out.push(x);
            i += 1;
            j += 1;
        }
    }
    out
}

/// OR of two lists.
pub fn union(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_strictly_ascending(a) && is_strictly_ascending(b));
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        if x < y {
            out.push(x);
            i += 1;
        } else if x > y {
            out.push(y);
            j += 1;
        } else {
            out.push(x);
            i += 1;
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Elements of `a` that are not in `b` (NOT).
pub fn difference(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    debug_assert!(is_strictly_ascending(a) && is_strictly_ascending(b));
    let mut out = Vec::with_capacity(a.len());
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        let (x, y) = (a[i], b[j]);
        if x < y {
            out.push(x);
            i += 1;
        } else if x > y {
            j += 1;
        } else {
            i += 1;
            j += 1;
        }
    }
    out.extend_from_slice(&a[i..]);
    out
}

/// AND over any number of lists, folded left to right from the first.
/// No lists, or any empty list, gives an empty result.
pub fn intersect_all<'a, I>(lists: I) -> Vec<DocId>
where
    I: IntoIterator<Item = &'a [DocId]>,
{
    let mut lists = lists.into_iter();
    let mut acc = match lists.next() {
        Some(first) => first.to_vec(),
        None => return Vec::new(),
    };
    for list in lists {
        if acc.is_empty() {
            break;
        }
        acc = intersect(&acc, list);
    }
    acc
}

/// OR over any number of lists.
pub fn union_all<'a, I>(lists: I) -> Vec<DocId>
where
    I: IntoIterator<Item = &'a [DocId]>,
{
    lists.into_iter().fold(Vec::new(), |acc, list| union(&acc, list))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect_keeps_common_ids() {
        assert_eq!(intersect(&[1, 2, 3, 4, 5], &[2, 3, 5, 7]), vec![2, 3, 5]);
        assert!(intersect(&[1, 2], &[]).is_empty());
    }

    #[test]
    fn union_drains_remainders() {
        assert_eq!(union(&[1, 2, 4, 5], &[2, 3, 5, 7]), vec![1, 2, 3, 4, 5, 7]);
        assert_eq!(union(&[], &[9]), vec![9]);
    }

    #[test]
    fn difference_removes_matches() {
        assert_eq!(difference(&[1, 2, 4, 5, 9], &[2, 3, 5, 7]), vec![1, 4, 9]);
        assert_eq!(difference(&[1, 2], &[]), vec![1, 2]);
        assert!(difference(&[], &[1]).is_empty());
    }

    #[test]
    fn folds_over_many_lists() {
        let a: &[DocId] = &[1, 3, 5, 7];
        let b: &[DocId] = &[3, 4, 5];
        let c: &[DocId] = &[5, 6];
        assert_eq!(intersect_all([a, b, c]), vec![5]);
        assert_eq!(union_all([a, b, c]), vec![1, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn empty_list_short_circuits_and() {
        let a: &[DocId] = &[1, 2];
        let empty: &[DocId] = &[];
        assert!(intersect_all([a, empty, a]).is_empty());
        assert!(intersect_all(std::iter::empty::<&[DocId]>()).is_empty());
        assert!(union_all(std::iter::empty::<&[DocId]>()).is_empty());
    }

    #[test]
    fn validate_rejects_unsorted_or_duplicate() {
        assert!(validate_postings(&[1, 4, 9]).is_ok());
        assert!(validate_postings(&[]).is_ok());
        assert!(validate_postings(&[1, 1]).is_err());
        assert!(validate_postings(&[3, 2]).is_err());
    }
}
