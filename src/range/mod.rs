//! Byte-range extraction.
//!
//! A [`Window`] is the logical interval `[start, end)` a caller wants out of
//! a value; `end` may be unbounded. When a value is consumed chunk by chunk,
//! every chunk `[chunk_start, chunk_start + len)` is classified against the
//! window with [`Window::classify`]:
//!
//! | case | condition | emits | window satisfied |
//! |------|-----------|-------|------------------|
//! | [`Overlap::Inside`] | `chunk_start <= start` and `end <= chunk_end` | `chunk[start - chunk_start .. end - chunk_start]` | yes |
//! | [`Overlap::Tail`] | `start < chunk_start < end <= chunk_end` | `chunk[.. end - chunk_start]` | yes |
//! | [`Overlap::Covers`] | `start <= chunk_start` and `chunk_end < end` | whole chunk | no |
//! | [`Overlap::Head`] | `chunk_start <= start < chunk_end < end` | `chunk[start - chunk_start ..]` | no |
//! | [`Overlap::Before`] | `chunk_end <= start` | nothing | no |
//! | [`Overlap::After`] | `end <= chunk_start` | nothing | yes |
//!
//! Boundary rule: a chunk ending exactly at `end` always satisfies the
//! window, so consumption never reads one chunk past what it needs. With an
//! unbounded `end`, `Covers` and `Head` take the place of `Inside` and `Tail`.
//!
//! [`RangeStream`] applies the classification to a push stream and drops
//! the source as soon as the window is satisfied.

mod stream;

use std::ops::Range;

pub use stream::RangeStream;
pub(crate) use stream::limit;

use crate::config::ConvertOptions;

/// Logical byte window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    start: u64,
    end: Option<u64>,
}

impl Window {
    /// Creates a window starting at `start`, `length` bytes long or unbounded.
    pub const fn new(start: u64, length: Option<u64>) -> Self {
        let end = match length {
            Some(length) => Some(start.saturating_add(length)),
            None => None,
        };
        Self { start, end }
    }

    /// The window covering everything.
    pub const fn unbounded() -> Self {
        Self {
            start: 0,
            end: None,
        }
    }

    /// Builds the window requested by `options` (`start` defaults to 0).
    pub fn from_options(options: &ConvertOptions) -> Self {
        Self::new(options.start().unwrap_or(0), options.length())
    }

    /// Inclusive start.
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Exclusive end, `None` if unbounded.
    pub const fn end(&self) -> Option<u64> {
        self.end
    }

    /// Requested length, `None` if unbounded.
    pub fn length(&self) -> Option<u64> {
        self.end.map(|end| end - self.start)
    }

    /// Returns true if the window selects everything.
    pub const fn is_unbounded_full(&self) -> bool {
        self.start == 0 && self.end.is_none()
    }

    /// Returns true if the window selects no bytes.
    pub fn is_empty(&self) -> bool {
        self.end == Some(self.start)
    }

    /// Clips the window against a value of `size` bytes.
    ///
    /// A start past the end yields the empty range `size..size`; an end past
    /// the end is clamped to `size`.
    pub fn clip(&self, size: u64) -> Range<u64> {
        let start = self.start.min(size);
        let end = self.end.map_or(size, |end| end.min(size)).max(start);
        start..end
    }

    /// Clips the window against an in-memory length.
    pub fn clip_usize(&self, size: usize) -> Range<usize> {
        let r = self.clip(size as u64);
        r.start as usize..r.end as usize
    }

    /// Classifies the chunk `[chunk_start, chunk_start + chunk_len)`.
    pub fn classify(&self, chunk_start: u64, chunk_len: u64) -> Overlap {
        let chunk_end = chunk_start + chunk_len;
        let start = self.start;

        match self.end {
            Some(end) => {
                if chunk_start <= start && end <= chunk_end {
                    Overlap::Inside(start - chunk_start..end - chunk_start)
                } else if end <= chunk_start {
                    Overlap::After
                } else if start < chunk_start && end <= chunk_end {
                    Overlap::Tail(end - chunk_start)
                } else if start <= chunk_start {
                    Overlap::Covers
                } else if start < chunk_end {
                    Overlap::Head(start - chunk_start)
                } else {
                    Overlap::Before
                }
            }
            None => {
                if start <= chunk_start {
                    Overlap::Covers
                } else if start < chunk_end {
                    Overlap::Head(start - chunk_start)
                } else {
                    Overlap::Before
                }
            }
        }
    }

    /// The part of the chunk inside the window, in chunk coordinates.
    pub fn intersect(&self, chunk_start: u64, chunk_len: u64) -> Option<Range<u64>> {
        self.classify(chunk_start, chunk_len)
            .emit_range(chunk_len)
            .filter(|r| !r.is_empty())
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// How one chunk relates to a [`Window`]. Offsets are relative to the chunk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlap {
    /// The window lies inside the chunk.
    Inside(Range<u64>),
    /// The chunk lies inside the window.
    Covers,
    /// The window starts inside the chunk and continues past it.
    Head(u64),
    /// The window started earlier and ends inside the chunk.
    Tail(u64),
    /// The chunk ends at or before the window start.
    Before,
    /// The chunk starts at or after the window end.
    After,
}

impl Overlap {
    /// Range of the chunk to emit, `None` if nothing overlaps.
    pub fn emit_range(&self, chunk_len: u64) -> Option<Range<u64>> {
        match self {
            Overlap::Inside(r) => Some(r.clone()),
            Overlap::Covers => Some(0..chunk_len),
            Overlap::Head(from) => Some(*from..chunk_len),
            Overlap::Tail(to) => Some(0..*to),
            Overlap::Before | Overlap::After => None,
        }
    }

    /// Returns true if no later chunk can contribute to the window.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, Overlap::Inside(_) | Overlap::Tail(_) | Overlap::After)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: u64, length: u64) -> Window {
        Window::new(start, Some(length))
    }

    #[test]
    fn test_inside() {
        // chunk [10, 20), window [12, 15)
        assert_eq!(window(12, 3).classify(10, 10), Overlap::Inside(2..5));
        // window equal to chunk
        assert_eq!(window(10, 10).classify(10, 10), Overlap::Inside(0..10));
    }

    #[test]
    fn test_tail_includes_exact_end() {
        // window [5, 20) ends exactly at chunk end
        let overlap = window(5, 15).classify(10, 10);
        assert_eq!(overlap, Overlap::Tail(10));
        assert!(overlap.is_satisfied());
        assert_eq!(overlap.emit_range(10), Some(0..10));
    }

    #[test]
    fn test_covers_and_head() {
        assert_eq!(window(5, 30).classify(10, 10), Overlap::Covers);
        assert_eq!(window(12, 30).classify(10, 10), Overlap::Head(2));
        assert!(!Overlap::Covers.is_satisfied());
        assert!(!Overlap::Head(2).is_satisfied());
    }

    #[test]
    fn test_no_overlap() {
        // chunk ends exactly at window start
        assert_eq!(window(20, 5).classify(10, 10), Overlap::Before);
        // chunk starts exactly at window end
        assert_eq!(window(0, 10).classify(10, 10), Overlap::After);
        assert!(Overlap::After.is_satisfied());
        assert!(!Overlap::Before.is_satisfied());
    }

    #[test]
    fn test_unbounded() {
        let w = Window::new(12, None);
        assert_eq!(w.classify(10, 10), Overlap::Head(2));
        assert_eq!(w.classify(20, 10), Overlap::Covers);
        assert_eq!(w.classify(0, 12), Overlap::Before);
    }

    #[test]
    fn test_empty_chunk() {
        assert_eq!(window(0, 4).classify(2, 0), Overlap::Covers);
        assert_eq!(window(0, 4).intersect(2, 0), None);
        assert_eq!(window(5, 4).classify(2, 0), Overlap::Before);
    }

    #[test]
    fn test_clip() {
        assert_eq!(window(2, 3).clip(10), 2..5);
        assert_eq!(window(8, 5).clip(10), 8..10);
        assert_eq!(window(12, 5).clip(10), 10..10);
        assert_eq!(Window::new(3, None).clip(10), 3..10);
        assert_eq!(Window::unbounded().clip(0), 0..0);
    }

    #[test]
    fn test_classification_matches_brute_force() {
        // Every window and chunk placement over a 12-byte space.
        for start in 0..12u64 {
            for len in 0..=12u64 {
                let w = window(start, len);
                for chunk_start in 0..12u64 {
                    for chunk_len in 0..=(12 - chunk_start) {
                        let chunk_end = chunk_start + chunk_len;
                        let expected: Vec<u64> = (chunk_start..chunk_end)
                            .filter(|p| *p >= start && *p < start + len)
                            .map(|p| p - chunk_start)
                            .collect();
                        let got: Vec<u64> = w
                            .classify(chunk_start, chunk_len)
                            .emit_range(chunk_len)
                            .map(|r| r.collect())
                            .unwrap_or_default();
                        assert_eq!(got, expected, "window {w:?} chunk {chunk_start}+{chunk_len}");

                        let satisfied = w.classify(chunk_start, chunk_len).is_satisfied();
                        assert_eq!(satisfied, start + len <= chunk_end, "window {w:?} chunk {chunk_start}+{chunk_len}");
                    }
                }
            }
        }
    }
}
