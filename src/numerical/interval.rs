//! Brackets for the root search.
//!
//! An `IntervalSet` is written as `"(a;b)&(c;d)"`. The characters `( ) [ ]` carry no
//! meaning and are stripped, `&` separates entries and `;` separates the two bounds.
//! Entries with `a >= b` are dropped, so every stored pair is a proper interval.
use log::warn;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// closed interval `[a, b]` with `a < b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericPair {
    a: f64,
    b: f64,
}

impl NumericPair {
    /// `None` unless `a < b` (NaN bounds included)
    pub fn new(a: f64, b: f64) -> Option<NumericPair> {
        if a < b { Some(NumericPair { a, b }) } else { None }
    }

    pub fn a(&self) -> f64 {
        self.a
    }

    pub fn b(&self) -> f64 {
        self.b
    }

    pub fn width(&self) -> f64 {
        self.b - self.a
    }

    /// both endpoints inclusive
    pub fn contains(&self, x: f64) -> bool {
        self.a <= x && x <= self.b
    }
}

impl fmt::Display for NumericPair {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({};{})", self.a, self.b)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntervalSet {
    entries: Vec<NumericPair>,
}

impl IntervalSet {
    pub fn new() -> IntervalSet {
        IntervalSet {
            entries: Vec::new(),
        }
    }

    /// appends `[a, b]`; returns false and stores nothing when `a >= b`
    pub fn push(&mut self, a: f64, b: f64) -> bool {
        match NumericPair::new(a, b) {
            Some(pair) => {
                self.entries.push(pair);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&NumericPair> {
        self.entries.get(index)
    }

    /// membership in the union of all entries
    pub fn contains(&self, x: f64) -> bool {
        self.entries.iter().any(|pair| pair.contains(x))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NumericPair> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a IntervalSet {
    type Item = &'a NumericPair;
    type IntoIter = std::slice::Iter<'a, NumericPair>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromStr for IntervalSet {
    type Err = Infallible;

    /// Never fails: malformed entries are skipped, the result may be empty.
    fn from_str(s: &str) -> Result<IntervalSet, Infallible> {
        let cleaned: String = s
            .chars()
            .filter(|c| !matches!(c, '(' | ')' | '[' | ']'))
            .collect();
        let mut set = IntervalSet::new();
        for entry in cleaned.split('&') {
            let mut bounds = entry.split(';');
            let (Some(a), Some(b)) = (bounds.next(), bounds.next()) else {
                continue;
            };
            match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
                (Ok(a), Ok(b)) => {
                    set.push(a, b);
                }
                _ => warn!("cannot read interval entry '{}', skipped", entry),
            }
        }
        Ok(set)
    }
}

impl fmt::Display for IntervalSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, pair) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, "&")?;
            }
            write!(f, "{}", pair)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> IntervalSet {
        s.parse().unwrap()
    }

    #[test]
    fn test_two_entries() {
        let set = parse("(1;2)&(3;4)");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0), NumericPair::new(1.0, 2.0).as_ref());
        assert_eq!(set.get(1).map(|pair| pair.b()), Some(4.0));
        assert_eq!(set.get(2), None);
    }

    #[test]
    fn test_reversed_entry_dropped() {
        assert!(parse("(5;1)").is_empty());
        assert!(parse("(1;1)").is_empty());
        assert_eq!(parse("(5;1)&(0;1)").len(), 1);
    }

    #[test]
    fn test_brackets_and_spaces_are_ignored() {
        let set = parse("[ -1.5 ; 2 ]&(3;4]");
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).map(|pair| pair.a()), Some(-1.5));
    }

    #[test]
    fn test_malformed_entries_skipped() {
        assert!(parse("").is_empty());
        assert!(parse("(1,2)").is_empty());
        assert_eq!(parse("(a;2)&(0;1)").len(), 1);
        assert_eq!(parse("(0;1;7)").len(), 1);
    }

    #[test]
    fn test_membership_is_inclusive_union() {
        let set = parse("(1;2)&(3;4)");
        assert!(set.contains(1.0));
        assert!(set.contains(2.0));
        assert!(set.contains(3.5));
        assert!(!set.contains(2.5));
        assert!(!set.contains(4.1));
    }

    #[test]
    fn test_push_keeps_order() {
        let mut set = IntervalSet::new();
        assert!(set.push(3.0, 4.0));
        assert!(!set.push(2.0, 1.0));
        assert!(set.push(-1.0, 0.0));
        let lower: Vec<f64> = set.iter().map(|pair| pair.a()).collect();
        assert_eq!(lower, vec![3.0, -1.0]);
        assert_eq!(set.to_string(), "(3;4)&(-1;0)");
    }
}
