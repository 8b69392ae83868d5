//! Holt's additive damped-trend exponential smoothing.

/// Smoothing grid for level (α) and trend (β): 0.05, 0.10, ..., 0.95.
const LEVEL_TREND_STEPS: usize = 19;
/// Damping grid (φ): 0.80, 0.82, ..., 0.98.
const DAMPING_STEPS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DampedTrendFit {
    pub alpha: f64,
    pub beta: f64,
    pub phi: f64,
    /// Final smoothed level.
    pub level: f64,
    /// Final smoothed trend.
    pub trend: f64,
    /// In-sample sum of squared one-step errors.
    pub sse: f64,
}

impl DampedTrendFit {
    /// `h`-step-ahead forecast: level + (φ + φ² + ... + φʰ)·trend.
    pub fn forecast(&self, h: u32) -> f64 {
        let mut damping = 0.0;
        let mut power = 1.0;
        for _ in 0..h {
            power *= self.phi;
            damping += power;
        }
        self.level + damping * self.trend
    }
}

/// Fit a damped-trend model by grid search over (α, β, φ), minimising the
/// in-sample one-step squared error. The first parameter triple reaching the
/// minimum wins, so the result is deterministic.
///
/// Initial state: level = y₀, trend = y₁ − y₀. Needs at least two points.
pub fn fit_damped_trend(ys: &[f64]) -> Option<DampedTrendFit> {
    if ys.len() < 2 {
        return None;
    }
    let mut best: Option<DampedTrendFit> = None;
    for i in 1..=LEVEL_TREND_STEPS {
        let alpha = i as f64 * 0.05;
        for j in 1..=LEVEL_TREND_STEPS {
            let beta = j as f64 * 0.05;
            for k in 0..DAMPING_STEPS {
                let phi = 0.80 + k as f64 * 0.02;
                let fit = run(ys, alpha, beta, phi);
                if best.is_none_or(|b| fit.sse < b.sse) {
                    best = Some(fit);
                }
            }
        }
    }
    best
}

fn run(ys: &[f64], alpha: f64, beta: f64, phi: f64) -> DampedTrendFit {
    let mut level = ys[0];
    let mut trend = ys[1] - ys[0];
    let mut sse = 0.0;
    for &y in &ys[1..] {
        let predicted = level + phi * trend;
        let error = y - predicted;
        sse += error * error;
        let next_level = alpha * y + (1.0 - alpha) * predicted;
        trend = beta * (next_level - level) + (1.0 - beta) * phi * trend;
        level = next_level;
    }
    DampedTrendFit {
        alpha,
        beta,
        phi,
        level,
        trend,
        sse,
    }
}
