//! Pluggable string similarity for directory name matching.

/// A symmetric-ish similarity score in `[0.0, 1.0]`, 1.0 meaning identical.
pub trait Similarity: Send + Sync {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Ratcliff/Obershelp sequence ratio over Unicode scalar values:
/// `2 * M / T` where `M` is the number of characters in matching blocks
/// and `T` the combined length.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequenceRatio;

impl Similarity for SequenceRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        let total = a.len() + b.len();
        if total == 0 {
            return 1.0;
        }
        2.0 * matching_chars(&a, &b) as f64 / total as f64
    }
}

/// Sum of matching block sizes: take the longest common block, recurse on
/// both sides of it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common block in `a[alo..ahi]` × `b[blo..bhi]`.
/// Ties resolve to the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width + 1];
    let mut cur = vec![0usize; width + 1];

    for i in alo..ahi {
        for j in blo..bhi {
            let col = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[col - 1] + 1;
                cur[col] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[col] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}

/// A candidate accepted by a [`NameMatcher`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f64,
}

/// Single-best-candidate matcher with a cutoff.
pub struct NameMatcher {
    similarity: Box<dyn Similarity>,
    cutoff: f64,
}

impl NameMatcher {
    pub fn new(similarity: Box<dyn Similarity>, cutoff: f64) -> Self {
        Self { similarity, cutoff }
    }

    pub fn score(&self, a: &str, b: &str) -> f64 {
        self.similarity.ratio(a, b)
    }

    /// Best candidate scoring at least the cutoff. Equal scores keep the
    /// earlier candidate.
    pub fn best_match<'a, T, F>(&self, query: &str, candidates: &'a [T], key: F) -> Option<Scored<&'a T>>
    where
        F: Fn(&T) -> &str,
    {
        let mut best: Option<Scored<&'a T>> = None;
        for candidate in candidates {
            let score = self.similarity.ratio(query, key(candidate));
            if score < self.cutoff {
                continue;
            }
            if best.map_or(true, |b| score > b.score) {
                best = Some(Scored { item: candidate, score });
            }
        }
        best
    }
}

impl Default for NameMatcher {
    fn default() -> Self {
        Self::new(Box::new(SequenceRatio), 0.6)
    }
}
