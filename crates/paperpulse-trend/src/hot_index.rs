//! Hot-index ranking: newest-year prevalence boosted by the normalised
//! least-squares trend over the observation window.

use std::collections::BTreeMap;

use paperpulse_core::{Conference, HotKeyword, KeywordCount, ScoringConfig};
use tracing::{debug, info};

use crate::TrendError;

/// Inclusive range of years scored, ending at the newest year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub oldest: i64,
    pub newest: i64,
}

impl YearWindow {
    pub fn ending_at(newest: i64, years: u32) -> Self {
        Self {
            oldest: newest - i64::from(years.max(1)) + 1,
            newest,
        }
    }

    pub fn contains(&self, year: i64) -> bool {
        (self.oldest..=self.newest).contains(&year)
    }

    pub fn years(&self) -> impl Iterator<Item = i64> {
        self.oldest..=self.newest
    }
}

/// Ordinary least-squares slope of `ys` against `xs`.
///
/// Zero when there are fewer than two points or the x values do not vary.
pub fn ols_slope(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let dx = x - mean_x;
        sxx += dx * dx;
        sxy += dx * (y - mean_y);
    }
    if sxx == 0.0 { 0.0 } else { sxy / sxx }
}

/// Rank keywords per conference by hot index and keep the top `top_k`.
///
/// Only keywords counted in the newest year are scored. Missing years inside
/// the window count as zero. Slopes are divided by the conference's largest
/// absolute slope, or treated as zero when every keyword is flat. Output is
/// grouped by conference (ascending) and sorted by hot index descending, ties
/// broken by keyword.
pub fn rank_hot_keywords(
    counts: &[KeywordCount],
    config: &ScoringConfig,
) -> Result<Vec<HotKeyword>, TrendError> {
    let Some(latest) = counts.iter().map(|r| r.year).max() else {
        return Err(TrendError::NoData("keyword counts table is empty"));
    };
    let window = YearWindow::ending_at(config.newest_year.unwrap_or(latest), config.window_years);

    // conference -> keyword -> year -> count
    let mut grouped: BTreeMap<&Conference, BTreeMap<&str, BTreeMap<i64, i64>>> = BTreeMap::new();
    for row in counts.iter().filter(|r| window.contains(r.year)) {
        *grouped
            .entry(&row.conference)
            .or_default()
            .entry(row.phrase.as_str())
            .or_default()
            .entry(row.year)
            .or_insert(0) += row.count;
    }

    let xs: Vec<f64> = window.years().map(|y| y as f64).collect();
    let mut ranked = Vec::new();
    for (conference, keywords) in grouped {
        let scored = score_conference(&keywords, &window, &xs, config.alpha);
        if scored.is_empty() {
            debug!(%conference, newest = window.newest, "no keywords in newest year");
            continue;
        }
        let kept = scored.len().min(config.top_k);
        info!(
            %conference,
            candidates = scored.len(),
            kept,
            "ranked hot keywords"
        );
        ranked.extend(
            scored
                .into_iter()
                .take(config.top_k)
                .map(|(keyword, hot_index)| HotKeyword {
                    conference: conference.clone(),
                    keyword: keyword.to_string(),
                    hot_index,
                }),
        );
    }
    Ok(ranked)
}

/// Hot index of every newest-year keyword of one conference, best first.
fn score_conference<'a>(
    keywords: &BTreeMap<&'a str, BTreeMap<i64, i64>>,
    window: &YearWindow,
    xs: &[f64],
    alpha: f64,
) -> Vec<(&'a str, f64)> {
    let trends: Vec<(&str, f64, f64)> = keywords
        .iter()
        .filter_map(|(keyword, by_year)| {
            let newest = *by_year.get(&window.newest)?;
            if newest <= 0 {
                return None;
            }
            let ys: Vec<f64> = window
                .years()
                .map(|y| by_year.get(&y).copied().unwrap_or(0) as f64)
                .collect();
            Some((*keyword, ols_slope(xs, &ys), newest as f64))
        })
        .collect();

    let max_abs = trends.iter().map(|(_, s, _)| s.abs()).fold(0.0, f64::max);
    let mut scored: Vec<(&str, f64)> = trends
        .into_iter()
        .map(|(keyword, slope, newest)| {
            let normalised = if max_abs > 0.0 { slope / max_abs } else { 0.0 };
            (keyword, (1.0 + alpha * normalised) * newest)
        })
        .collect();
    scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
}
