use crate::models::{CallAnalytics, CallIntent, CallOutcome};
use crate::utils::format::{
    format_avg_duration, format_date_label, format_hour_label, format_percent, humanize_key, EMPTY,
};

pub const PERIOD_OPTIONS: [u32; 3] = [7, 30, 90];
pub const DEFAULT_PERIOD: u32 = 30;

/// Period selected on the analytics page; anything unexpected falls back
/// to the default.
pub fn parse_period(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|days| PERIOD_OPTIONS.contains(days))
        .unwrap_or(DEFAULT_PERIOD)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: i64,
    /// Height relative to the tallest bar, 0..=100.
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub label: String,
    pub count: i64,
    pub percent_label: String,
    pub width: u32,
    pub css_class: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PeriodTab {
    pub days: u32,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct AnalyticsView {
    pub days: u32,
    pub tabs: Vec<PeriodTab>,
    pub total_calls: i64,
    pub avg_duration: String,
    pub resolution_rate: String,
    pub peak_hour: String,
    pub day_bars: Vec<Bar>,
    pub hour_bars: Vec<Bar>,
    pub outcomes: Vec<BreakdownRow>,
    pub intents: Vec<BreakdownRow>,
}

impl AnalyticsView {
    pub fn new(analytics: &CallAnalytics, days: u32) -> Self {
        let day_counts: Vec<(String, i64)> = analytics
            .calls_by_day
            .iter()
            .map(|day| (format_date_label(&day.date), day.count))
            .collect();

        let hourly = hour_counts(analytics);
        let peak_hour = peak_hour(&hourly)
            .map(format_hour_label)
            .unwrap_or_else(|| EMPTY.to_string());
        let hour_counts: Vec<(String, i64)> = hourly
            .iter()
            .enumerate()
            .map(|(hour, count)| (format_hour_label(hour as u32), *count))
            .collect();

        let outcomes = breakdown(analytics.outcomes.iter(), |key| {
            let outcome = CallOutcome::from_label(key);
            match outcome {
                CallOutcome::Unknown => (humanize_key(&key.to_lowercase()), outcome.badge_class()),
                known => (known.label().to_string(), known.badge_class()),
            }
        });
        let intents = breakdown(analytics.intents.iter(), |key| {
            match CallIntent::from_label(key) {
                CallIntent::Unknown => (humanize_key(&key.to_lowercase()), "bar-intent"),
                known => (known.label().to_string(), "bar-intent"),
            }
        });

        Self {
            days,
            tabs: PERIOD_OPTIONS
                .iter()
                .map(|option| PeriodTab {
                    days: *option,
                    label: format!("{option} days"),
                    selected: *option == days,
                })
                .collect(),
            total_calls: analytics.total_calls,
            avg_duration: format_avg_duration(analytics.avg_duration_seconds),
            resolution_rate: if analytics.total_calls > 0 {
                format_percent(analytics.resolution_rate.clamp(0.0, 100.0))
            } else {
                EMPTY.to_string()
            },
            peak_hour,
            day_bars: bars(day_counts),
            hour_bars: bars(hour_counts),
            outcomes,
            intents,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_calls == 0
    }
}

/// Calls per hour of day; hours missing from the response count as zero.
fn hour_counts(analytics: &CallAnalytics) -> [i64; 24] {
    let mut hours = [0i64; 24];
    for (key, count) in &analytics.calls_by_hour {
        if let Ok(hour) = key.trim().parse::<usize>() {
            if hour < 24 {
                hours[hour] += (*count).max(0);
            }
        }
    }
    hours
}

/// Busiest hour; the earliest wins a tie. `None` when there were no calls.
fn peak_hour(hours: &[i64; 24]) -> Option<u32> {
    let mut peak: Option<(usize, i64)> = None;
    for (hour, count) in hours.iter().enumerate() {
        if *count > 0 && peak.map_or(true, |(_, best)| *count > best) {
            peak = Some((hour, *count));
        }
    }
    peak.map(|(hour, _)| hour as u32)
}

fn bars(counts: Vec<(String, i64)>) -> Vec<Bar> {
    let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
    counts
        .into_iter()
        .map(|(label, count)| Bar {
            label,
            count,
            height: relative(count, max),
        })
        .collect()
}

fn relative(count: i64, max: i64) -> u32 {
    if max <= 0 || count <= 0 {
        0
    } else {
        ((count as f64 / max as f64) * 100.0).round().min(100.0) as u32
    }
}

/// Rows sorted by count, largest first; ties by label.
fn breakdown<'a, I, F>(entries: I, describe: F) -> Vec<BreakdownRow>
where
    I: Iterator<Item = (&'a String, &'a i64)>,
    F: Fn(&str) -> (String, &'static str),
{
    let mut rows: Vec<(String, i64, &'static str)> = entries
        .filter(|(_, count)| **count > 0)
        .map(|(key, count)| {
            let (label, css_class) = describe(key);
            (label, *count, css_class)
        })
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total: i64 = rows.iter().map(|(_, count, _)| count).sum();
    rows.into_iter()
        .map(|(label, count, css_class)| {
            let percent = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            BreakdownRow {
                label,
                count,
                percent_label: format_percent(percent),
                width: percent.round() as u32,
                css_class,
            }
        })
        .collect()
}
