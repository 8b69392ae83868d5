//! Least-squares polynomial fits for the accelerating-growth conferences.

/// Pivots smaller than this (relative to the matrix scale) mark a singular system.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// `y = c0 + c1·u + c2·u²` with `u = x − x_mean`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraticFit {
    pub x_mean: f64,
    pub coefficients: [f64; 3],
}

impl QuadraticFit {
    pub fn evaluate(&self, x: f64) -> f64 {
        let u = x - self.x_mean;
        let [c0, c1, c2] = self.coefficients;
        c0 + c1 * u + c2 * u * u
    }
}

/// Fit a second-degree polynomial by least squares.
///
/// Returns `None` for fewer than three points or when the normal equations
/// are singular (fewer than three distinct x values).
pub fn fit_quadratic(xs: &[f64], ys: &[f64]) -> Option<QuadraticFit> {
    let n = xs.len().min(ys.len());
    if n < 3 {
        return None;
    }
    let x_mean = xs[..n].iter().sum::<f64>() / n as f64;

    // Power sums of the centred x values: s[k] = Σ u^k, k = 0..4.
    let mut s = [0.0f64; 5];
    let mut t = [0.0f64; 3];
    for (x, y) in xs[..n].iter().zip(&ys[..n]) {
        let u = x - x_mean;
        let mut p = 1.0;
        for (k, sk) in s.iter_mut().enumerate() {
            *sk += p;
            if k < 3 {
                t[k] += p * y;
            }
            p *= u;
        }
    }

    let mut a = [
        [s[0], s[1], s[2]],
        [s[1], s[2], s[3]],
        [s[2], s[3], s[4]],
    ];
    let coefficients = solve3(&mut a, t)?;
    Some(QuadraticFit {
        x_mean,
        coefficients,
    })
}

/// Gaussian elimination with partial pivoting on a 3×3 system.
fn solve3(a: &mut [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    let scale = a
        .iter()
        .flatten()
        .fold(0.0f64, |m, v| m.max(v.abs()))
        .max(1.0);

    for col in 0..3 {
        let pivot = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot][col].abs() < SINGULAR_TOLERANCE * scale {
            return None;
        }
        a.swap(col, pivot);
        b.swap(col, pivot);
        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0f64; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Some(x)
}
