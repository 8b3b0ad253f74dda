//! Natural ordering for page and container names
//!
//! Case-insensitive, digit runs compared by numeric value (`page2` before
//! `page10`), and path separators treated as segment boundaries so that
//! `a/b` sorts with its directory rather than by the separator character.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::path::{Path, PathBuf};
use std::str::Chars;

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Compare two names naturally
///
/// Names that compare equal ignoring case fall back to a plain comparison,
/// so the ordering is total and sorting is deterministic.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.split(is_separator);
    let mut right = b.split(is_separator);

    loop {
        match (left.next(), right.next()) {
            (Some(x), Some(y)) => match compare_segment(x, y) {
                Ordering::Equal => continue,
                other => return other,
            },
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (None, None) => return a.cmp(b),
        }
    }
}

/// [`natural_cmp`] over the lossy string form of two paths
pub fn natural_path_cmp(a: &Path, b: &Path) -> Ordering {
    natural_cmp(&a.to_string_lossy(), &b.to_string_lossy())
}

/// Sort names in place with [`natural_cmp`]
pub fn sort_names(names: &mut [String]) {
    names.sort_by(|a, b| natural_cmp(a, b));
}

/// Sort paths in place with [`natural_path_cmp`]
pub fn sort_paths(paths: &mut [PathBuf]) {
    paths.sort_by(|a, b| natural_path_cmp(a, b));
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let mut left = a.chars().peekable();
    let mut right = b.chars().peekable();

    loop {
        let (x, y) = match (left.peek().copied(), right.peek().copied()) {
            (Some(x), Some(y)) => (x, y),
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
        };

        match (x.is_ascii_digit(), y.is_ascii_digit()) {
            (true, true) => {
                let ord = compare_numbers(&take_digits(&mut left), &take_digits(&mut right));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {
                let ord = x.to_lowercase().cmp(y.to_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                left.next();
                right.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        chars.next();
    }
    digits
}

/// Numeric comparison of two digit runs of any length; equal values with
/// fewer leading zeros sort first.
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');

    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}
