//! Steering angle distribution over a set of labelled images

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use std::fmt;

use util::label::parse_angle;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Angles counted by the distribution, one per steering position.
pub const ANGLE_BUCKETS: [i32; 5] = [30, 60, 90, 120, 150];

/// Width of the longest bar when rendered.
const BAR_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Number of images labelled with each of the [`ANGLE_BUCKETS`].
///
/// Images labelled with any other angle are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AngleDistribution {
    counts: [usize; 5]
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl AngleDistribution {

    /// Build the distribution from a list of file names.
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>
    {
        let mut dist = Self::default();

        for name in names {
            let angle = parse_angle(name);
            if let Some(i) = ANGLE_BUCKETS.iter().position(|&b| b == angle) {
                dist.counts[i] += 1;
            }
        }

        dist
    }

    /// Count for one bucket, `None` if the angle is not a bucket.
    pub fn count(&self, angle_deg: i32) -> Option<usize> {
        ANGLE_BUCKETS.iter()
            .position(|&b| b == angle_deg)
            .map(|i| self.counts[i])
    }

    /// Iterate over `(angle, count)` pairs in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (i32, usize)> + '_ {
        ANGLE_BUCKETS.iter().copied().zip(self.counts.iter().copied())
    }

    /// Number of images counted in a bucket.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl fmt::Display for AngleDistribution {
    /// Horizontal bar chart, bars scaled so the largest bucket fills [`BAR_WIDTH`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let max = self.counts.iter().copied().max().unwrap_or(0);

        for (angle, count) in self.iter() {
            let len = match max {
                0 => 0,
                m => (count * BAR_WIDTH + m - 1) / m
            };
            writeln!(f, "{:>4} | {:<width$} {}", angle, "#".repeat(len), count, width = BAR_WIDTH)?;
        }

        write!(f, "total: {}", self.total())
    }
}
