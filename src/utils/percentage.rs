use std::{fmt::Display, ops::Deref, str::FromStr};

use anyhow::anyhow;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0.round())
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || !value.is_finite() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Progress values coming from the backend are free form, so they're forced into 0..=100.
    pub fn clamped(value: f64) -> Percentage {
        if value.is_nan() {
            Percentage(0.)
        } else {
            Percentage(value.clamp(0., 100.))
        }
    }
}

impl FromStr for Percentage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // This means that 100%% also works, but I think I'm fine with that
        let s = s.trim_end_matches("%");
        let v = s.parse::<f64>()?;
        Percentage::new_opt(v).ok_or_else(|| anyhow!("Can't parse {s} into percentage"))
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Share of `part` in `whole`. There is no meaningful share of nothing.
pub fn ratio_percentage(part: usize, whole: usize) -> Option<Percentage> {
    if whole == 0 {
        return None;
    }
    Percentage::new_opt(part as f64 / whole as f64 * 100.)
}
