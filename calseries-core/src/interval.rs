//! Interval arithmetic over time spans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A time span with `start <= end` expected but not enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Span {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Span { start, end }
    }

    /// Whether `instant` lies in the closed range `[start, end]`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Half-open overlap test: touching endpoints do not overlap.
pub fn overlaps(a: &Span, b: &Span) -> bool {
    a.start < b.end && b.start < a.end
}

/// Closed overlap test: touching endpoints count.
pub fn touches(a: &Span, b: &Span) -> bool {
    a.start <= b.end && b.start <= a.end
}

/// Length of a span in whole minutes, sub-minute remainder dropped.
pub fn duration_minutes(span: &Span) -> i64 {
    (span.end - span.start).num_minutes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, min, 0).unwrap()
    }

    fn span(start: (u32, u32), end: (u32, u32)) -> Span {
        Span::new(at(start.0, start.1), at(end.0, end.1))
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let cases = [
            (span((9, 0), (10, 0)), span((9, 30), (11, 0))),
            (span((9, 0), (10, 0)), span((10, 0), (11, 0))),
            (span((9, 0), (12, 0)), span((10, 0), (11, 0))),
            (span((9, 0), (10, 0)), span((13, 0), (14, 0))),
        ];
        for (a, b) in cases {
            assert_eq!(overlaps(&a, &b), overlaps(&b, &a), "{:?} vs {:?}", a, b);
            assert_eq!(touches(&a, &b), touches(&b, &a), "{:?} vs {:?}", a, b);
        }
    }

    #[test]
    fn test_touching_endpoints_do_not_overlap() {
        let a = span((9, 0), (10, 0));
        let b = span((10, 0), (11, 0));
        assert!(!overlaps(&a, &b));
        assert!(touches(&a, &b));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = span((9, 0), (12, 0));
        let inner = span((10, 0), (11, 0));
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&outer, &outer));
    }

    #[test]
    fn test_disjoint_spans() {
        let a = span((9, 0), (10, 0));
        let before = span((7, 0), (8, 59));
        let after = span((10, 1), (11, 0));
        assert!(!overlaps(&a, &before));
        assert!(!overlaps(&a, &after));
        assert!(!touches(&a, &after));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(duration_minutes(&span((9, 0), (10, 30))), 90);
        let partial = Span::new(at(9, 0), at(9, 0) + chrono::Duration::seconds(119));
        assert_eq!(duration_minutes(&partial), 1);
    }

    #[test]
    fn test_contains_is_inclusive() {
        let s = span((9, 0), (10, 0));
        assert!(s.contains(at(9, 0)));
        assert!(s.contains(at(10, 0)));
        assert!(!s.contains(at(10, 1)));
    }
}
