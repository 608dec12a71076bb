//! Statistics view: KPIs and the data series behind the dashboard charts.
//!
//! Nothing here draws anything. Each function turns a section of [`Stats`]
//! into the series a chart would plot.

use serde::Serialize;

use crate::api::{Delta, DiscountSample, Kpi, MenuStat, Period, Stats};

const DISCOUNT_STEP: u32 = 5;
const MAX_DISCOUNT_PERCENT: f64 = 100.0;
const MINUTES_PER_OFFSET: i64 = 10;
const TIME_BIN_MINUTES: i64 = 60;
const TIME_WINDOW_MINUTES: i64 = 720;
const TOP_MENUS: usize = 3;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsView {
    pub period_days: u32,
    pub revenue: KpiView,
    pub reservations: KpiView,
    pub discount: KpiView,
    pub discount_distribution: Vec<DiscountBin>,
    pub remaining_time_distribution: Vec<TimeBin>,
    pub hourly: Option<HourlyDistribution>,
    pub menus: Option<MenuRanking>,
}

impl StatsView {
    pub fn build(stats: &Stats, period: Period) -> Self {
        Self {
            period_days: period.days(),
            revenue: KpiView::with_delta(&stats.total_revenue, "won"),
            reservations: KpiView::with_delta(&stats.total_reservations_count, "reservations"),
            discount: KpiView::without_delta(&stats.total_discount_amount, "won"),
            discount_distribution: discount_distribution(&stats.time_idx_and_discount_rate),
            remaining_time_distribution: remaining_time_distribution(
                &stats.time_idx_and_discount_rate,
            ),
            hourly: stats
                .hourly_statistics
                .as_ref()
                .and_then(|hours| hourly_distribution(hours.iter().map(|(h, c)| (h.as_str(), *c)))),
            menus: stats.menu_statistics.as_deref().and_then(menu_ranking),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KpiView {
    pub value: f64,
    /// `value` with thousands separators.
    pub display: String,
    pub delta: Option<String>,
    pub unit: &'static str,
}

impl KpiView {
    fn with_delta(kpi: &Kpi, unit: &'static str) -> Self {
        Self {
            delta: Some(format_delta(&kpi.delta)),
            ..Self::without_delta(kpi, unit)
        }
    }

    fn without_delta(kpi: &Kpi, unit: &'static str) -> Self {
        Self {
            value: kpi.value,
            display: group_thousands(kpi.value),
            delta: None,
            unit,
        }
    }
}

/// Formats a KPI delta as a percentage. A `"-"` delta reads as no change.
pub fn format_delta(delta: &Delta) -> String {
    match delta {
        Delta::Text(s) if s == "-" => "0%".to_string(),
        Delta::Text(s) => format!("{s}%"),
        Delta::Number(n) => format!("{n}%"),
    }
}

/// Inserts thousands separators into the whole part, keeping any fraction:
/// `1500.5` becomes `1,500.5`.
pub fn group_thousands(value: f64) -> String {
    let formatted = value.abs().to_string();
    let (whole, fraction) = match formatted.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + whole.len() / 3 + 1);
    if value < 0.0 {
        grouped.push('-');
    }
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(fraction) = fraction {
        grouped.push('.');
        grouped.push_str(fraction);
    }
    grouped
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DiscountBin {
    pub label: String,
    pub start: u32,
    pub end: u32,
    pub count: u64,
}

/// Counts reservations per 5 point discount band.
///
/// Rates are percentages; when every rate is at most 1 they are read as
/// fractions and scaled to percent. Bands run from 0 up to the first multiple
/// of 5 at or above the largest rate, capped at 100%, and the last band
/// includes its upper edge. Rates above 100% fall outside every band. Empty
/// bands are kept so the series has no gaps.
pub fn discount_distribution(samples: &[DiscountSample]) -> Vec<DiscountBin> {
    let mut rates: Vec<f64> = samples.iter().filter_map(|s| s.discount_rate).collect();
    let Some(max) = rates.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };

    let max = if max <= 1.0 {
        rates.iter_mut().for_each(|r| *r *= 100.0);
        max * 100.0
    } else {
        max
    };

    let step = f64::from(DISCOUNT_STEP);
    let end = ((max / step).ceil() * step).clamp(step, MAX_DISCOUNT_PERCENT) as u32;

    (0..end)
        .step_by(DISCOUNT_STEP as usize)
        .map(|start| {
            let upper = start + DISCOUNT_STEP;
            let last = upper == end;
            let count = rates
                .iter()
                .filter(|&&r| {
                    r >= f64::from(start)
                        && (r < f64::from(upper) || (last && r == f64::from(upper)))
                })
                .count() as u64;
            DiscountBin {
                label: format!("{start:02}–{upper:02}%"),
                start,
                end: upper,
                count,
            }
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeBin {
    /// Left edge of the band, in minutes before the slot.
    pub minutes: i64,
    pub count: u64,
}

/// Counts reservations per hour of remaining time before the slot.
///
/// Offsets are in 10 minute steps. Bands are an hour wide over the first
/// twelve hours, closed on the left; offsets outside that window are dropped.
pub fn remaining_time_distribution(samples: &[DiscountSample]) -> Vec<TimeBin> {
    let minutes: Vec<i64> = samples
        .iter()
        .filter_map(|s| s.time_offset_idx)
        .map(|idx| (idx.trunc() as i64).saturating_mul(MINUTES_PER_OFFSET))
        .collect();
    if minutes.is_empty() {
        return Vec::new();
    }

    (0..TIME_WINDOW_MINUTES)
        .step_by(TIME_BIN_MINUTES as usize)
        .map(|start| TimeBin {
            minutes: start,
            count: minutes
                .iter()
                .filter(|&&m| m >= start && m < start + TIME_BIN_MINUTES)
                .count() as u64,
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HourlyDistribution {
    /// Reservation count for each hour of the day, index 0 to 23.
    pub counts: Vec<i64>,
    pub axis: Axis,
    pub peak: HourCount,
    pub low: HourCount,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: i64,
}

/// Integer y-axis of roughly five ticks.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Axis {
    pub top: i64,
    pub ticks: Vec<i64>,
}

impl Axis {
    pub fn for_max(max: i64) -> Self {
        if max <= 0 {
            return Self {
                top: 1,
                ticks: vec![0, 1],
            };
        }

        let step = ((max + 4) / 5).max(1);
        let top = (max + step - 1) / step * step;
        Self {
            top,
            ticks: (0..=top).step_by(step as usize).collect(),
        }
    }
}

/// Spreads per-hour counts over all 24 hours, filling missing hours with 0.
///
/// Keys that are not an hour of the day are ignored. Returns `None` when there
/// are no entries at all.
pub fn hourly_distribution<'a>(
    hours: impl IntoIterator<Item = (&'a str, i64)>,
) -> Option<HourlyDistribution> {
    let mut counts = vec![0i64; 24];
    let mut any = false;
    for (hour, count) in hours {
        any = true;
        match hour.trim().parse::<usize>() {
            Ok(h) if h < 24 => counts[h] = count,
            _ => tracing::debug!(hour, "ignoring hourly statistic outside 0-23"),
        }
    }
    if !any {
        return None;
    }

    let mut peak = HourCount { hour: 0, count: counts[0] };
    let mut low = peak;
    for (hour, &count) in counts.iter().enumerate() {
        if count > peak.count {
            peak = HourCount { hour: hour as u32, count };
        }
        if count < low.count {
            low = HourCount { hour: hour as u32, count };
        }
    }

    Some(HourlyDistribution {
        axis: Axis::for_max(peak.count),
        counts,
        peak,
        low,
    })
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuCount {
    pub name: String,
    pub count: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuRanking {
    /// Top entries padded with blank rows so the chart always has three bars.
    pub chart: Vec<MenuCount>,
    /// Only the real top entries, best first.
    pub ranking: Vec<MenuCount>,
    pub y_max: i64,
}

/// Ranks menus by their count, keeping the top three.
pub fn menu_ranking(menus: &[MenuStat]) -> Option<MenuRanking> {
    if menus.is_empty() {
        return None;
    }

    let mut counted: Vec<(&str, f64)> = menus.iter().map(|m| (m.name.as_str(), m.count())).collect();
    counted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let ranking: Vec<MenuCount> = counted
        .into_iter()
        .take(TOP_MENUS)
        .map(|(name, count)| MenuCount {
            name: name.to_owned(),
            count: count as i64,
        })
        .collect();

    let mut chart = ranking.clone();
    while chart.len() < TOP_MENUS {
        chart.push(MenuCount {
            name: String::new(),
            count: 0,
        });
    }

    let highest = chart.iter().map(|m| m.count).max().unwrap_or(0);
    let y_max = ((highest as f64 * 1.2) as i64).max(5);

    Some(MenuRanking {
        chart,
        ranking,
        y_max,
    })
}
