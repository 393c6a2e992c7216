// Bucketed text pools and their rolling character cursors.
//
// Each bucket keeps at most `max_lines` lines. Once full, a new line overwrites a
// uniformly random slot. Every bucket has a cursor that streams its lines forever,
// one character per read, with a single space between lines.

use crate::classify::Bucket;
use crate::rng::Rng32;

/// Position of a rolling cursor. `ch == line.len()` addresses the separator space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub ch: usize,
}

#[derive(Clone, Debug, Default)]
pub struct TextPool {
    // Lines are pre-split into chars so each read is O(1).
    lines: Vec<Box<[char]>>,
    cursor: Cursor,
    version: u64,
}

impl TextPool {
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Bumped on every accepted submission.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.lines.iter().map(|l| l.iter().collect())
    }

    fn insert(&mut self, line: &str, max_lines: usize, rng: &mut Rng32) -> Inserted {
        let chars: Box<[char]> = line.chars().collect();
        if self.lines.len() < max_lines {
            self.lines.push(chars);
            self.version += 1;
            return Inserted::Appended;
        }
        if self.lines.is_empty() {
            return Inserted::Ignored;
        }
        let slot = rng.index(self.lines.len());
        self.lines[slot] = chars;
        self.version += 1;
        Inserted::Replaced { slot }
    }

    /// Stream the next character. An empty pool yields a space and leaves the cursor alone.
    pub fn next_char(&mut self) -> char {
        if self.lines.is_empty() {
            return ' ';
        }
        // The pool may have changed since the last read.
        if self.cursor.line >= self.lines.len() {
            self.cursor = Cursor::default();
        }
        let line = &self.lines[self.cursor.line];
        if self.cursor.ch > line.len() {
            self.cursor.ch = 0;
        }
        let out = line.get(self.cursor.ch).copied().unwrap_or(' ');
        if self.cursor.ch >= line.len() {
            self.cursor.line = (self.cursor.line + 1) % self.lines.len();
            self.cursor.ch = 0;
        } else {
            self.cursor.ch += 1;
        }
        out
    }

    #[cfg(test)]
    pub(crate) fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }
}

/// Outcome of a submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inserted {
    Appended,
    Replaced { slot: usize },
    Ignored,
}

pub struct TextPools {
    pools: [TextPool; 3],
    max_lines: usize,
    rng: Rng32,
}

impl TextPools {
    pub fn new(max_lines: usize, rng: Rng32) -> Self {
        Self { pools: Default::default(), max_lines, rng }
    }

    pub fn pool(&self, bucket: Bucket) -> &TextPool {
        &self.pools[bucket.slot()]
    }

    pub fn len(&self, bucket: Bucket) -> usize {
        self.pool(bucket).len()
    }

    pub fn is_empty(&self, bucket: Bucket) -> bool {
        self.pool(bucket).is_empty()
    }

    /// Add a line to a bucket. Empty or whitespace-only input is ignored.
    pub fn submit(&mut self, bucket: Bucket, line: &str) -> Inserted {
        let line = line.trim();
        if line.is_empty() {
            return Inserted::Ignored;
        }
        self.pools[bucket.slot()].insert(line, self.max_lines, &mut self.rng)
    }

    pub fn next_char(&mut self, bucket: Bucket) -> char {
        self.pools[bucket.slot()].next_char()
    }

    #[cfg(test)]
    pub(crate) fn pool_mut(&mut self, bucket: Bucket) -> &mut TextPool {
        &mut self.pools[bucket.slot()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pools(max: usize) -> TextPools {
        TextPools::new(max, Rng32::from_seed(9))
    }

    #[test]
    fn streams_with_separator_forever() {
        let mut p = pools(4);
        p.submit(Bucket::Neutral, "ab");
        let got: String = (0..9).map(|_| p.next_char(Bucket::Neutral)).collect();
        assert_eq!(got, "ab ab ab ");
    }

    #[test]
    fn wraps_across_lines() {
        let mut p = pools(4);
        p.submit(Bucket::Positive, "hi");
        p.submit(Bucket::Positive, "yo");
        let got: String = (0..8).map(|_| p.next_char(Bucket::Positive)).collect();
        assert_eq!(got, "hi yo hi");
    }

    #[test]
    fn empty_pool_yields_space_without_moving() {
        let mut p = pools(4);
        assert_eq!(p.next_char(Bucket::Negative), ' ');
        assert_eq!(p.pool(Bucket::Negative).cursor(), Cursor::default());
    }

    #[test]
    fn whitespace_submission_ignored() {
        let mut p = pools(4);
        assert_eq!(p.submit(Bucket::Neutral, "   \t"), Inserted::Ignored);
        assert!(p.is_empty(Bucket::Neutral));
    }

    #[test]
    fn stale_cursor_resets_to_start() {
        let mut p = pools(4);
        p.submit(Bucket::Neutral, "xyz");
        p.pool_mut(Bucket::Neutral).set_cursor(Cursor { line: 7, ch: 2 });
        assert_eq!(p.next_char(Bucket::Neutral), 'x');
        p.pool_mut(Bucket::Neutral).set_cursor(Cursor { line: 0, ch: 99 });
        assert_eq!(p.next_char(Bucket::Neutral), 'x');
    }

    #[test]
    fn overwrite_at_capacity_replaces_exactly_one() {
        let mut p = pools(3);
        for l in ["one", "two", "three"] {
            assert_eq!(p.submit(Bucket::Neutral, l), Inserted::Appended);
        }
        let before: Vec<String> = p.pool(Bucket::Neutral).lines().collect();
        let out = p.submit(Bucket::Neutral, "four");
        let after: Vec<String> = p.pool(Bucket::Neutral).lines().collect();

        assert!(matches!(out, Inserted::Replaced { .. }));
        assert_eq!(after.len(), 3);
        let changed = before.iter().zip(&after).filter(|(a, b)| a != b).count();
        assert_eq!(changed, 1);
        assert!(after.iter().any(|l| l == "four"));
    }

    #[test]
    fn version_bumps_per_accepted_submission() {
        let mut p = pools(1);
        p.submit(Bucket::Neutral, "a");
        p.submit(Bucket::Neutral, "b");
        p.submit(Bucket::Neutral, " ");
        assert_eq!(p.pool(Bucket::Neutral).version(), 2);
    }

    proptest! {
        #[test]
        fn never_exceeds_capacity(
            max in 1usize..12,
            subs in proptest::collection::vec((0usize..3, "[a-z ]{0,8}"), 0..64),
        ) {
            let mut p = pools(max);
            for (b, line) in subs {
                p.submit(Bucket::ALL[b], &line);
                for bucket in Bucket::ALL {
                    prop_assert!(p.len(bucket) <= max);
                }
            }
        }

        #[test]
        fn reads_survive_interleaved_submissions(
            ops in proptest::collection::vec(prop_oneof![Just(None::<String>), "[a-z]{1,5}".prop_map(Some)], 1..80),
        ) {
            let mut p = pools(4);
            for op in ops {
                match op {
                    Some(line) => { p.submit(Bucket::Neutral, &line); }
                    None => {
                        let c = p.next_char(Bucket::Neutral);
                        prop_assert!(c == ' ' || c.is_ascii_lowercase());
                    }
                }
            }
        }
    }
}
