use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One count of tracked actions on a calendar day, as exported from the backend.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize, Clone, Copy)]
pub struct ActivityRecord {
    #[serde(alias = "activity_date")]
    pub date: NaiveDate,
    /// Malformed or missing counts are read as 0.
    #[serde(default, deserialize_with = "lenient_count::deserialize")]
    pub count: u64,
}

impl ActivityRecord {
    pub fn new(date: NaiveDate, count: u64) -> Self {
        Self { date, count }
    }
}

/// Total count of every record sharing a date.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Clone, Copy)]
pub struct AggregatedDay {
    pub date: NaiveDate,
    pub total_count: u64,
}

/// Sums counts per distinct date. Duplicated dates add up instead of replacing each other.
pub fn aggregate_totals<'a>(
    records: impl IntoIterator<Item = &'a ActivityRecord>,
) -> BTreeMap<NaiveDate, u64> {
    let mut totals = BTreeMap::<NaiveDate, u64>::new();
    for record in records {
        let total = totals.entry(record.date).or_default();
        *total = total.saturating_add(record.count);
    }
    totals
}

/// Same as [aggregate_totals] but in chronological list form.
pub fn aggregate_days<'a>(
    records: impl IntoIterator<Item = &'a ActivityRecord>,
) -> Vec<AggregatedDay> {
    aggregate_totals(records)
        .into_iter()
        .map(|(date, total_count)| AggregatedDay { date, total_count })
        .collect()
}

mod lenient_count {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(from_value(&value))
    }

    fn from_value(value: &Value) -> u64 {
        match value {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|v| v.is_finite() && *v >= 0.)
                        .map(|v| v as u64)
                })
                .unwrap_or(0),
            Value::String(s) => s.trim().parse::<u64>().unwrap_or(0),
            _ => 0,
        }
    }
}
