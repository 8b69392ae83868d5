//! Next-year paper-count forecasts with a fixed model per conference.

pub mod regression;
pub mod smoothing;

use std::collections::BTreeMap;

use paperpulse_core::{Conference, ConferenceYearCount};
use tracing::{debug, info, warn};

use crate::TrendError;

pub use regression::{QuadraticFit, fit_quadratic};
pub use smoothing::{DampedTrendFit, fit_damped_trend};

/// Distance within which a fitted value snaps to the nearest integer before
/// truncation, so floating-point residue does not drop a whole paper.
const SNAP_EPSILON: f64 = 1e-6;

/// Growth model used for a conference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastModel {
    /// Second-degree least-squares polynomial in the year.
    Quadratic,
    /// Holt's additive damped-trend exponential smoothing.
    DampedTrend,
    /// Last count plus the mean year-over-year change.
    LinearIncrement,
}

impl ForecastModel {
    /// The dispatch table. Conferences outside the built-in set have no model.
    pub fn for_conference(conference: &Conference) -> Option<Self> {
        match conference {
            Conference::Cvpr | Conference::Icml => Some(Self::Quadratic),
            Conference::Iclr => Some(Self::DampedTrend),
            Conference::Kdd => Some(Self::LinearIncrement),
            Conference::Other(_) => None,
        }
    }

    /// Observed years the model needs before it is used.
    pub fn min_points(self) -> usize {
        match self {
            Self::Quadratic => 3,
            Self::DampedTrend => 2,
            Self::LinearIncrement => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Quadratic => "quadratic",
            Self::DampedTrend => "damped-trend",
            Self::LinearIncrement => "linear-increment",
        }
    }

    /// Forecast the count for `target` from a year-sorted, non-empty series.
    ///
    /// Falls back to the linear increment when the series is shorter than
    /// [`min_points`](Self::min_points) or the fit is degenerate.
    pub fn predict(self, series: &[(i64, i64)], target: i64) -> i64 {
        let Some(&(last_year, _)) = series.last() else {
            return 0;
        };
        if series.len() < self.min_points() {
            warn!(
                model = self.name(),
                points = series.len(),
                "series too short, using linear increment"
            );
            return linear_increment(series, target - last_year);
        }
        let ys: Vec<f64> = series.iter().map(|&(_, c)| c as f64).collect();
        match self {
            Self::Quadratic => {
                let xs: Vec<f64> = series.iter().map(|&(y, _)| y as f64).collect();
                match fit_quadratic(&xs, &ys) {
                    Some(fit) => to_count(fit.evaluate(target as f64)),
                    None => {
                        warn!("singular quadratic fit, using linear increment");
                        linear_increment(series, target - last_year)
                    }
                }
            }
            Self::DampedTrend => match fit_damped_trend(&ys) {
                Some(fit) => {
                    debug!(
                        alpha = fit.alpha,
                        beta = fit.beta,
                        phi = fit.phi,
                        sse = fit.sse,
                        "damped trend fitted"
                    );
                    let horizon = u32::try_from(target - last_year).unwrap_or(1);
                    to_count(fit.forecast(horizon))
                }
                None => linear_increment(series, target - last_year),
            },
            Self::LinearIncrement => linear_increment(series, target - last_year),
        }
    }
}

/// `last + trunc(mean(diffs))` per year ahead. One point forecasts itself.
fn linear_increment(series: &[(i64, i64)], horizon: i64) -> i64 {
    let (Some(&(_, first)), Some(&(_, last))) = (series.first(), series.last()) else {
        return 0;
    };
    if series.len() < 2 {
        return last.max(0);
    }
    let mean_step = (last - first) as f64 / (series.len() - 1) as f64;
    (last + mean_step.trunc() as i64 * horizon.max(1)).max(0)
}

/// Truncate a fitted value to a non-negative count.
fn to_count(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    let rounded = value.round();
    let snapped = if (value - rounded).abs() < SNAP_EPSILON {
        rounded
    } else {
        value.trunc()
    };
    (snapped as i64).max(0)
}

/// Append one forecast row per conference to the observed paper counts.
///
/// Every conference is resolved to a model before any forecast runs; an
/// unknown conference aborts with the first year it was observed in. The
/// forecast year defaults to the newest observed year + 1 and must lie after
/// every conference's last observed year. Output is sorted by conference then
/// year, so each conference's forecast row follows its observed rows.
pub fn forecast_paper_counts(
    observed: &[ConferenceYearCount],
    forecast_year: Option<i64>,
) -> Result<Vec<ConferenceYearCount>, TrendError> {
    let Some(newest) = observed.iter().map(|r| r.year).max() else {
        return Err(TrendError::NoData("paper counts table is empty"));
    };
    let target = forecast_year.unwrap_or(newest + 1);

    let mut series: BTreeMap<&Conference, BTreeMap<i64, i64>> = BTreeMap::new();
    for row in observed {
        *series
            .entry(&row.conference)
            .or_default()
            .entry(row.year)
            .or_insert(0) += row.count;
    }

    // ── Dispatch ──
    let mut plan = Vec::with_capacity(series.len());
    for (conference, by_year) in &series {
        let points: Vec<(i64, i64)> = by_year.iter().map(|(&y, &c)| (y, c)).collect();
        let (first_year, last_year) = match (points.first(), points.last()) {
            (Some(&(first, _)), Some(&(last, _))) => (first, last),
            _ => continue,
        };
        let model = ForecastModel::for_conference(conference).ok_or_else(|| {
            TrendError::UnknownConference {
                conference: (*conference).clone(),
                year: first_year,
            }
        })?;
        if target <= last_year {
            return Err(TrendError::ForecastYear {
                conference: (*conference).clone(),
                forecast_year: target,
                last_observed: last_year,
            });
        }
        plan.push((*conference, model, points));
    }

    // ── Forecast ──
    let mut rows: Vec<ConferenceYearCount> = series
        .iter()
        .flat_map(|(conference, by_year)| {
            by_year.iter().map(move |(&year, &count)| ConferenceYearCount {
                conference: (*conference).clone(),
                year,
                count,
            })
        })
        .collect();
    for (conference, model, points) in plan {
        let count = model.predict(&points, target);
        info!(
            %conference,
            model = model.name(),
            year = target,
            count,
            "forecast paper count"
        );
        rows.push(ConferenceYearCount {
            conference: conference.clone(),
            year: target,
            count,
        });
    }
    rows.sort_by(|a, b| a.conference.cmp(&b.conference).then(a.year.cmp(&b.year)));
    Ok(rows)
}
