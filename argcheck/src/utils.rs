use indexmap::IndexSet;
use std::hash::Hash;

/// An iterator that removes duplicate elements from `iter`. This will yield the elements in
/// `iter` in order, skipping elements that have already been seen before.
pub struct Dedup<T, I> {
    seen: IndexSet<T>,
    iter: I,
}

impl<T, I> Iterator for Dedup<T, I>
where
    T: Clone + Hash + Eq,
    I: Iterator<Item = T>,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let got = self.iter.next()?;
            let is_new = self.seen.insert(got.clone());
            if is_new {
                return Some(got);
            }
        }
    }
}

pub trait DedupIterator<T> {
    /// Creates an iterator that skips duplicate elements.
    fn dedup(self) -> Dedup<T, Self>
    where
        Self: Sized;
}

impl<T, I: Iterator<Item = T>> DedupIterator<T> for I {
    fn dedup(self) -> Dedup<T, Self>
    where
        Self: Sized,
    {
        Dedup { seen: IndexSet::new(), iter: self }
    }
}

/// Returns the elements that occur more than once in `iter`, in order of their first repetition.
pub fn duplicates<T, I>(iter: I) -> Vec<T>
where
    T: Clone + Hash + Eq,
    I: IntoIterator<Item = T>,
{
    let mut seen = IndexSet::new();
    let mut repeated = IndexSet::new();
    for item in iter {
        if !seen.insert(item.clone()) {
            repeated.insert(item);
        }
    }
    repeated.into_iter().collect()
}

/// Joins all whitespace-separated words of `text` with single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Removes all whitespace from `text`.
pub fn strip_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Collapses whitespace and truncates `text` at a word boundary so that it fits in `width`
/// characters, marking the truncation with `" [...]"`.
pub fn shorten(text: &str, width: usize) -> String {
    const PLACEHOLDER: &str = " [...]";

    let collapsed = collapse_whitespace(text);
    if collapsed.chars().count() <= width {
        return collapsed;
    }
    let mut result = String::new();
    let mut len = 0;
    for word in collapsed.split(' ') {
        let extra = word.chars().count() + usize::from(!result.is_empty());
        if len + extra + PLACEHOLDER.len() > width {
            break;
        }
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
        len += extra;
    }
    if result.is_empty() {
        PLACEHOLDER.trim_start().to_owned()
    } else {
        result + PLACEHOLDER
    }
}

/// The Damerau-Levenshtein distance between `a` and `b` (unrestricted, with adjacent
/// transpositions), counted in characters.
pub fn damerau_levenshtein(a: &str, b: &str) -> usize {
    use ahash::AHashMap;

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    let max_dist = n + m;

    // `d` is offset by one row and column to hold the `max_dist` sentinels
    let mut d = vec![vec![0usize; m + 2]; n + 2];
    d[0][0] = max_dist;
    for i in 0..=n {
        d[i + 1][0] = max_dist;
        d[i + 1][1] = i;
    }
    for j in 0..=m {
        d[0][j + 1] = max_dist;
        d[1][j + 1] = j;
    }

    let mut last_row: AHashMap<char, usize> = AHashMap::new();
    for i in 1..=n {
        let mut last_match_col = 0;
        for j in 1..=m {
            let k = last_row.get(&b[j - 1]).copied().unwrap_or(0);
            let l = last_match_col;
            let cost = usize::from(a[i - 1] != b[j - 1]);
            if cost == 0 {
                last_match_col = j;
            }
            let transposition = d[k][l] + (i - k - 1) + 1 + (j - l - 1);
            d[i + 1][j + 1] = (d[i][j] + cost)
                .min(d[i + 1][j] + 1)
                .min(d[i][j + 1] + 1)
                .min(transposition);
        }
        last_row.insert(a[i - 1], i);
    }
    d[n + 1][m + 1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorten() {
        assert_eq!(shorten("Hello  world!", 40), "Hello world!");
        assert_eq!(shorten("Hello world, how are you today?", 20), "Hello world, [...]");
        assert_eq!(shorten("Supercalifragilistic", 10), "[...]");
    }

    #[test]
    fn test_damerau_levenshtein() {
        assert_eq!(damerau_levenshtein("", ""), 0);
        assert_eq!(damerau_levenshtein("abc", ""), 3);
        assert_eq!(damerau_levenshtein("kitten", "sitting"), 3);
        assert_eq!(damerau_levenshtein("ca", "ac"), 1);
        assert_eq!(damerau_levenshtein("ca", "abc"), 2);
        assert_eq!(damerau_levenshtein("abcdef", "abdcef"), 1);
    }

    #[test]
    fn test_duplicates() {
        assert_eq!(duplicates(["a", "b", "a", "c", "b", "a"]), ["a", "b"]);
        assert!(duplicates(Vec::<u8>::new()).is_empty());
    }
}
