//! Statistical utilities for model inference.
//!
//! Provides statistical functions including:
//! - Log gamma function (Lanczos approximation)
//! - Regularized incomplete beta function
//! - Student t and F distribution tail probabilities
//! - Student t critical values by bisection on the tail probability

use std::f64::consts::PI;

/// Log gamma function using Lanczos approximation.
///
/// # Arguments
/// * `x` - Input value (must be positive)
///
/// # Returns
/// * ln(Gamma(x))
#[must_use]
pub fn ln_gamma(x: f64) -> f64 {
    if x <= 0.0 {
        return f64::INFINITY;
    }

    // Lanczos approximation coefficients (g=7)
    const G: f64 = 7.0;
    const COEFFICIENTS: [f64; 9] = [
        0.999_999_999_999_809_93,
        676.520_368_121_885_1,
        -1259.139_216_722_402_8,
        771.323_428_777_653_13,
        -176.615_029_162_140_59,
        12.507_343_278_686_905,
        -0.138_571_095_265_720_12,
        9.984_369_578_019_571_6e-6,
        1.505_632_735_149_311_6e-7,
    ];

    let x = x - 1.0;
    let mut sum = COEFFICIENTS[0];
    for (i, &c) in COEFFICIENTS.iter().enumerate().skip(1) {
        sum += c / (x + i as f64);
    }

    let t = x + G + 0.5;
    0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + sum.ln()
}

/// Regularized incomplete beta function I_x(a, b).
///
/// Evaluates the continued fraction 1 / (1 + d1 / (1 + d2 / ...)) with
/// Lentz's algorithm. The iteration starts one level above that fraction,
/// so the leading `1` is subtracted at the end.
///
/// # Arguments
/// * `x` - Integration bound (0 <= x <= 1)
/// * `a` - First shape parameter (> 0)
/// * `b` - Second shape parameter (> 0)
#[must_use]
pub fn regularized_incomplete_beta(x: f64, a: f64, b: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    // Use symmetry relation for better convergence
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - regularized_incomplete_beta(1.0 - x, b, a);
    }

    let ln_beta = ln_gamma(a) + ln_gamma(b) - ln_gamma(a + b);
    let front = (x.ln() * a + (1.0 - x).ln() * b - ln_beta).exp() / a;

    let mut f = 1.0;
    let mut c = 1.0;
    let mut d = 0.0;
    const EPSILON: f64 = 1e-30;
    const TOLERANCE: f64 = 1e-12;
    const MAX_ITERATIONS: usize = 300;

    for m in 0..MAX_ITERATIONS {
        let m_f = m as f64;

        // Even step: d_{2m}
        let numerator = if m == 0 {
            1.0
        } else {
            (m_f * (b - m_f) * x) / ((a + 2.0 * m_f - 1.0) * (a + 2.0 * m_f))
        };

        d = 1.0 + numerator * d;
        if d.abs() < EPSILON {
            d = EPSILON;
        }
        d = 1.0 / d;

        c = 1.0 + numerator / c;
        if c.abs() < EPSILON {
            c = EPSILON;
        }

        f *= d * c;

        // Odd step: d_{2m+1}
        let numerator = -((a + m_f) * (a + b + m_f) * x)
            / ((a + 2.0 * m_f) * (a + 2.0 * m_f + 1.0));

        d = 1.0 + numerator * d;
        if d.abs() < EPSILON {
            d = EPSILON;
        }
        d = 1.0 / d;

        c = 1.0 + numerator / c;
        if c.abs() < EPSILON {
            c = EPSILON;
        }

        let delta = d * c;
        f *= delta;

        if (delta - 1.0).abs() < TOLERANCE {
            break;
        }
    }

    front * (f - 1.0)
}

/// Two-sided p-value of a Student t statistic.
///
/// Returns P(|T| > |t|) for T with `df` degrees of freedom, or NaN when
/// `df` is zero.
#[must_use]
pub fn t_distribution_p_value(t: f64, df: usize) -> f64 {
    if df == 0 || t.is_nan() {
        return f64::NAN;
    }
    if t.is_infinite() {
        return 0.0;
    }

    let df = df as f64;
    regularized_incomplete_beta(df / (df + t * t), df / 2.0, 0.5)
}

/// Calculate p-value from F-distribution.
///
/// Returns P(F > f) for the F-distribution with df1 and df2 degrees of freedom.
#[must_use]
pub fn f_distribution_p_value(f: f64, df1: usize, df2: usize) -> f64 {
    if f <= 0.0 || df1 == 0 || df2 == 0 {
        return 1.0;
    }
    if f.is_infinite() {
        return 0.0;
    }

    // P(F > f) = I_x(df2/2, df1/2) where x = df2/(df2 + df1*f)
    let x = df2 as f64 / (df2 as f64 + df1 as f64 * f);
    regularized_incomplete_beta(x, df2 as f64 / 2.0, df1 as f64 / 2.0)
}

/// Two-sided critical value of the Student t distribution.
///
/// Returns the t with P(|T| > t) = 1 - `confidence` for T with `df` degrees
/// of freedom, found by bisection on [`t_distribution_p_value`].
///
/// # Arguments
/// * `confidence` - Confidence level, strictly between 0 and 1
/// * `df` - Degrees of freedom
///
/// # Returns
/// * NaN when `confidence` is outside (0, 1), infinity when `df` is zero
#[must_use]
pub fn t_critical_value(confidence: f64, df: usize) -> f64 {
    const MAX_ITERATIONS: usize = 200;
    const TOLERANCE: f64 = 1e-12;

    if !(confidence > 0.0 && confidence < 1.0) {
        return f64::NAN;
    }
    if df == 0 {
        return f64::INFINITY;
    }

    // The p-value falls from 1 at t = 0 towards 0 as t grows.
    let alpha = 1.0 - confidence;
    let mut low = 0.0;
    let mut high = 1.0;
    while t_distribution_p_value(high, df) > alpha {
        low = high;
        high *= 2.0;
        if high.is_infinite() {
            return f64::INFINITY;
        }
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        if t_distribution_p_value(mid, df) > alpha {
            low = mid;
        } else {
            high = mid;
        }
        if high - low <= TOLERANCE * high {
            break;
        }
    }

    0.5 * (low + high)
}
