use std::{fmt::Display, str::FromStr};

use anyhow::anyhow;
use serde::Serialize;

/// Highest level a cell can be shaded with.
pub const MAX_LEVEL: u8 = 4;

/// Boundaries of the fixed scale the dashboard heatmap uses: 1, 2-3, 4-5, 6+.
pub const DEFAULT_THRESHOLDS: [u64; 4] = [1, 3, 5, 7];

/// Strategy used to turn a day total into a shade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityPolicy {
    /// Levels are relative to the busiest day of the grid.
    #[default]
    Quartile,
    /// Levels use externally supplied ascending boundaries.
    Thresholds([u64; 4]),
}

impl IntensityPolicy {
    pub fn classify(&self, count: u64, max_count: u64) -> u8 {
        match self {
            IntensityPolicy::Quartile => classify(count, max_count, None),
            IntensityPolicy::Thresholds(thresholds) => classify(count, max_count, Some(thresholds)),
        }
    }

    pub(crate) fn is_ascending(&self) -> bool {
        match self {
            IntensityPolicy::Quartile => true,
            IntensityPolicy::Thresholds(t) => t.windows(2).all(|w| w[0] <= w[1]),
        }
    }
}

/// Buckets a day total into a level between 0 and [MAX_LEVEL].
///
/// 0 is reserved for days without activity. With `thresholds` a count falls into the first
/// boundary it doesn't exceed, anything above the third boundary is level 4. Without them the
/// boundaries are multiples of a quarter of `max_count`, rounded up.
pub fn classify(count: u64, max_count: u64, thresholds: Option<&[u64; 4]>) -> u8 {
    if count == 0 {
        return 0;
    }

    let bounds = match thresholds {
        Some(t) => [t[0], t[1], t[2]],
        None => {
            if max_count == 0 {
                return 1;
            }
            let step = max_count.div_ceil(4).max(1);
            [
                step,
                step.saturating_mul(2),
                step.saturating_mul(3),
            ]
        }
    };

    bounds
        .iter()
        .position(|bound| count <= *bound)
        .map(|idx| idx as u8 + 1)
        .unwrap_or(MAX_LEVEL)
}

impl Display for IntensityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntensityPolicy::Quartile => write!(f, "quartile"),
            IntensityPolicy::Thresholds([a, b, c, d]) => write!(f, "{a},{b},{c},{d}"),
        }
    }
}

impl FromStr for IntensityPolicy {
    type Err = anyhow::Error;

    /// Accepts either `quartile` or four comma separated boundaries, e.g. `1,3,5,7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("quartile") {
            return Ok(IntensityPolicy::Quartile);
        }
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<u64>())
            .collect::<Result<Vec<_>, _>>()?;
        let thresholds: [u64; 4] = values
            .try_into()
            .map_err(|v: Vec<u64>| anyhow!("Expected 4 thresholds, got {}", v.len()))?;
        let policy = IntensityPolicy::Thresholds(thresholds);
        if !policy.is_ascending() {
            return Err(anyhow!("Thresholds {s} should be ascending"));
        }
        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::{classify, IntensityPolicy, DEFAULT_THRESHOLDS, MAX_LEVEL};

    #[test]
    fn zero_is_always_level_zero() {
        for max in [0, 1, 4, 100, u64::MAX] {
            assert_eq!(classify(0, max, None), 0);
            assert_eq!(classify(0, max, Some(&DEFAULT_THRESHOLDS)), 0);
        }
    }

    #[test]
    fn fixed_thresholds() {
        let levels = (0..=8)
            .map(|c| classify(c, 0, Some(&DEFAULT_THRESHOLDS)))
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![0, 1, 2, 2, 3, 3, 4, 4, 4]);
    }

    #[test]
    fn quartiles_of_max() {
        // max 10 -> step 3: 1..=3, 4..=6, 7..=9, 10
        let levels = (0..=10).map(|c| classify(c, 10, None)).collect::<Vec<_>>();
        assert_eq!(levels, vec![0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4]);

        // max below 4 still steps by one
        let levels = (0..=3).map(|c| classify(c, 3, None)).collect::<Vec<_>>();
        assert_eq!(levels, vec![0, 1, 2, 3]);
    }

    #[test]
    fn positive_count_without_max() {
        assert_eq!(classify(5, 0, None), 1);
    }

    #[test]
    fn classification_is_monotonic() {
        for max in [0, 1, 2, 7, 13, 52] {
            let mut previous = 0;
            for count in 0..=(max * 2 + 3) {
                let level = classify(count, max, None);
                assert!(level >= previous, "count {count} max {max}");
                assert!(level <= MAX_LEVEL);
                previous = level;
            }
        }
    }

    #[test]
    fn extreme_values_do_not_overflow() {
        assert_eq!(classify(u64::MAX, u64::MAX, None), MAX_LEVEL);
        assert_eq!(classify(1, u64::MAX, None), 1);
    }

    #[test]
    fn policy_parsing() {
        assert_eq!(
            "quartile".parse::<IntensityPolicy>().unwrap(),
            IntensityPolicy::Quartile
        );
        assert_eq!(
            "1, 2,3,4".parse::<IntensityPolicy>().unwrap(),
            IntensityPolicy::Thresholds([1, 2, 3, 4])
        );
        assert!("1,2,3".parse::<IntensityPolicy>().is_err());
        assert!("4,3,2,1".parse::<IntensityPolicy>().is_err());
        assert!("a,b,c,d".parse::<IntensityPolicy>().is_err());
    }
}
