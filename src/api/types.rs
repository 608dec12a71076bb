use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An identifier the API may send as a JSON number or a string.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceId {
    Int(i64),
    Text(String),
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceId::Int(n) => write!(f, "{n}"),
            ResourceId::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for ResourceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(s.parse::<i64>()
            .map_or_else(|_| ResourceId::Text(s.to_owned()), ResourceId::Int))
    }
}

#[derive(Clone, Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub owner_email: &'a str,
    pub owner_password: &'a str,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct TokenPair {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct StoreIdentity {
    #[serde(default)]
    pub store_id: Option<ResourceId>,
    #[serde(default)]
    pub store_name: Option<String>,
}

/// Reservation schedule for today and tomorrow.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    #[serde(default)]
    pub today: Option<DaySchedule>,
    #[serde(default)]
    pub tomorrow: Option<DaySchedule>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    #[serde(default)]
    pub spaces: Vec<Space>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub space_name: Option<String>,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    #[serde(default)]
    pub slot_id: Option<ResourceId>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub is_reserved: bool,
    #[serde(default)]
    pub reservation_info: Option<ReservationInfo>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationInfo {
    #[serde(default)]
    pub reservation_id: Option<ResourceId>,
    #[serde(default)]
    pub user_email: Option<String>,
    #[serde(default)]
    pub menu_name: Option<String>,
}

/// Performance statistics for a period.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub total_revenue: Kpi,
    #[serde(default)]
    pub total_reservations_count: Kpi,
    #[serde(default)]
    pub total_discount_amount: Kpi,
    #[serde(default)]
    pub time_idx_and_discount_rate: Vec<DiscountSample>,
    /// Reservation counts keyed by hour of day, `"0"` to `"23"`.
    #[serde(default)]
    pub hourly_statistics: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub menu_statistics: Option<Vec<MenuStat>>,
}

/// A headline figure. Amounts may be fractional or sent as strings; anything
/// that is not a number reads as `0`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Kpi {
    #[serde(default, deserialize_with = "lenient_amount")]
    pub value: f64,
    #[serde(default, deserialize_with = "lenient_delta")]
    pub delta: Delta,
}

/// Change against the previous period. The API sends `"-"` when there is
/// nothing to compare against. A null delta reads as no change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Delta {
    Number(f64),
    Text(String),
}

impl Default for Delta {
    fn default() -> Self {
        Delta::Number(0.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct DiscountSample {
    #[serde(default, deserialize_with = "lenient_number")]
    pub discount_rate: Option<f64>,
    /// Remaining time before the slot, in 10 minute steps.
    #[serde(default, deserialize_with = "lenient_number")]
    pub time_offset_idx: Option<f64>,
}

/// One row of per-menu statistics. The count is the first column after `name`.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MenuStat {
    pub name: String,
    #[serde(flatten)]
    pub columns: serde_json::Map<String, serde_json::Value>,
}

impl MenuStat {
    /// The first column coerced to a number, `0` when missing or not numeric.
    pub fn count(&self) -> f64 {
        self.columns
            .values()
            .next()
            .and_then(coerce_number)
            .unwrap_or(0.0)
    }
}

/// Reporting window for statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Period {
    #[default]
    LastWeek,
    LastMonth,
}

impl Period {
    pub fn days(self) -> u32 {
        match self {
            Period::LastWeek => 7,
            Period::LastMonth => 30,
        }
    }
}

impl TryFrom<u32> for Period {
    type Error = String;

    fn try_from(days: u32) -> Result<Self, Self::Error> {
        match days {
            7 => Ok(Period::LastWeek),
            30 => Ok(Period::LastMonth),
            other => Err(format!("unsupported period of {other} days, expected 7 or 30")),
        }
    }
}

impl From<Period> for u32 {
    fn from(period: Period) -> Self {
        period.days()
    }
}

/// Manual change to a slot's availability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotAction {
    /// Mark the slot sold out.
    Close,
    /// Put the slot back on sale.
    Open,
}

impl SlotAction {
    pub(crate) fn endpoint(self) -> &'static str {
        match self {
            SlotAction::Close => "sold_out",
            SlotAction::Open => "restock",
        }
    }
}

fn coerce_number(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or_default())
}

fn lenient_delta<'de, D>(deserializer: D) -> Result<Delta, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Delta::Text(s),
        Some(other) => coerce_number(&other).map(Delta::Number).unwrap_or_default(),
        None => Delta::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_id_accepts_numbers_and_strings() {
        let identity: StoreIdentity =
            serde_json::from_value(json!({"store_id": 12, "store_name": "Cafe"})).unwrap();
        assert_eq!(identity.store_id, Some(ResourceId::Int(12)));

        let identity: StoreIdentity =
            serde_json::from_value(json!({"store_id": "s-12"})).unwrap();
        assert_eq!(identity.store_id, Some(ResourceId::Text("s-12".into())));
        assert!(identity.store_name.is_none());
    }

    #[test]
    fn discount_samples_coerce_loosely() {
        let samples: Vec<DiscountSample> = serde_json::from_value(json!([
            {"discount_rate": "0.2", "time_offset_idx": 3},
            {"discount_rate": null},
            {"discount_rate": "n/a", "time_offset_idx": "7"},
        ]))
        .unwrap();

        assert_eq!(samples[0].discount_rate, Some(0.2));
        assert_eq!(samples[0].time_offset_idx, Some(3.0));
        assert_eq!(samples[1].discount_rate, None);
        assert_eq!(samples[1].time_offset_idx, None);
        assert_eq!(samples[2].discount_rate, None);
        assert_eq!(samples[2].time_offset_idx, Some(7.0));
    }

    #[test]
    fn menu_count_uses_first_column() {
        let stat: MenuStat =
            serde_json::from_value(json!({"name": "Latte", "count": 4, "revenue": 20000})).unwrap();
        assert_eq!(stat.count(), 4.0);

        let stat: MenuStat = serde_json::from_value(json!({"name": "Tea", "count": "x"})).unwrap();
        assert_eq!(stat.count(), 0.0);
    }

    #[test]
    fn stats_tolerate_missing_sections() {
        let stats: Stats = serde_json::from_value(json!({
            "total_revenue": {"value": 120000, "delta": "-"},
        }))
        .unwrap();

        assert_eq!(stats.total_revenue.value, 120000.0);
        assert_eq!(stats.total_revenue.delta, Delta::Text("-".into()));
        assert_eq!(stats.total_reservations_count, Kpi::default());
        assert!(stats.hourly_statistics.is_none());
    }

    #[test]
    fn kpis_tolerate_fractions_and_null_deltas() {
        let stats: Stats = serde_json::from_value(json!({
            "total_revenue": {"value": "98000", "delta": null},
            "total_reservations_count": {"value": null, "delta": "4.5"},
            "total_discount_amount": {"value": 1500.5},
        }))
        .unwrap();

        assert_eq!(stats.total_revenue.value, 98000.0);
        assert_eq!(stats.total_revenue.delta, Delta::default());
        assert_eq!(stats.total_reservations_count.value, 0.0);
        assert_eq!(stats.total_reservations_count.delta, Delta::Text("4.5".into()));
        assert_eq!(stats.total_discount_amount.value, 1500.5);
    }

    #[test]
    fn period_only_accepts_known_windows() {
        assert_eq!(Period::try_from(30), Ok(Period::LastMonth));
        assert!(Period::try_from(14).is_err());
    }
}
