//! Pareto ranking of fitted effects.
//!
//! Effects are ordered by absolute magnitude, smallest first, which is the
//! order a horizontal bar chart draws them bottom to top. Reverse the result
//! for a largest-first listing.
//!
//! ```
//! use factorial::{lm, pareto_rank, ExperimentTable, Sign};
//!
//! let table = ExperimentTable::new()
//!     .with_column("A", &[-1.0, 1.0, -1.0, 1.0]).unwrap()
//!     .with_column("B", &[-1.0, -1.0, 1.0, 1.0]).unwrap()
//!     .with_column("y", &[52.0, 74.0, 62.0, 80.0]).unwrap();
//! let model = lm("y ~ A*B", &table).unwrap();
//!
//! let ranked = pareto_rank(&model);
//! let labels: Vec<_> = ranked.iter().map(|e| e.label.as_str()).collect();
//! assert_eq!(labels, ["A:B", "B", "A"]);
//! assert_eq!(ranked[0].sign, Sign::Negative);
//! ```

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::model::FittedModel;

/// Sign category of an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Sign {
    /// Strictly positive coefficient.
    Positive,
    /// Negative or zero coefficient.
    Negative,
}

impl Sign {
    /// Classify a coefficient. Zero is `Negative`.
    #[must_use]
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            Self::Positive
        } else {
            Self::Negative
        }
    }
}

impl fmt::Display for Sign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("Positive"),
            Self::Negative => f.write_str("Negative"),
        }
    }
}

/// One ranked effect.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoEntry {
    /// Term label, e.g. `"A:B"`.
    pub label: String,
    /// Signed coefficient.
    pub value: f64,
    /// Absolute value of the coefficient.
    pub magnitude: f64,
    /// Sign category.
    pub sign: Sign,
}

impl ParetoEntry {
    /// Signed value formatted to four significant digits with an explicit
    /// `+` for positive values (e.g. `+10`, `-0.5`).
    #[must_use]
    pub fn signed_label(&self) -> String {
        let formatted = format_significant(self.value, 4);
        match self.sign {
            Sign::Positive => format!("+{formatted}"),
            Sign::Negative => formatted,
        }
    }
}

/// Rank the non-intercept coefficients of `model` by ascending magnitude.
///
/// Equal magnitudes keep the model's term order.
#[must_use]
pub fn pareto_rank(model: &FittedModel) -> Vec<ParetoEntry> {
    let mut entries: Vec<ParetoEntry> = model
        .coefficients()
        .iter()
        .filter(|c| !c.term.is_intercept())
        .map(|c| ParetoEntry {
            label: c.label(),
            value: c.estimate,
            magnitude: c.estimate.abs(),
            sign: Sign::of(c.estimate),
        })
        .collect();

    // sort_by is stable
    entries.sort_by(|a, b| a.magnitude.total_cmp(&b.magnitude));
    entries
}

/// Legend text and bar colour for one sign category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignStyle {
    /// Legend text.
    pub legend: String,
    /// Bar colour.
    pub colour: String,
}

impl SignStyle {
    /// Create a style.
    #[must_use]
    pub fn new(legend: impl Into<String>, colour: impl Into<String>) -> Self {
        Self {
            legend: legend.into(),
            colour: colour.into(),
        }
    }
}

/// Presentation settings for a Pareto bar chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoConfig {
    /// Chart title (default: "Pareto plot").
    pub title: String,
    /// Label on the effect-name axis (default: "Effect name").
    pub y_label: String,
    /// Label on the magnitude axis (default: "Magnitude of effect").
    pub x_label: String,
    /// Legend title (default: "Sign of coefficients").
    pub legend_title: String,
    /// Style of negative bars (default: "Negative", "grey").
    pub negative: SignStyle,
    /// Style of positive bars (default: "Positive", "black").
    pub positive: SignStyle,
    /// Chart width in pixels (default: 500).
    pub width: u32,
    /// Chart height in pixels. `None` sizes the chart to the number of bars.
    pub height: Option<u32>,
    /// Smallest automatic height (default: 200).
    pub min_height: u32,
}

impl Default for ParetoConfig {
    fn default() -> Self {
        Self {
            title: "Pareto plot".to_string(),
            y_label: "Effect name".to_string(),
            x_label: "Magnitude of effect".to_string(),
            legend_title: "Sign of coefficients".to_string(),
            negative: SignStyle::new("Negative", "grey"),
            positive: SignStyle::new("Positive", "black"),
            width: 500,
            height: None,
            min_height: 200,
        }
    }
}

impl ParetoConfig {
    /// Style for a sign category.
    #[must_use]
    pub fn style(&self, sign: Sign) -> &SignStyle {
        match sign {
            Sign::Positive => &self.positive,
            Sign::Negative => &self.negative,
        }
    }

    /// Chart height for `bars` bars: 500 px for eight bars, 20 px more or
    /// less per bar, never below `min_height`.
    #[must_use]
    pub fn resolve_height(&self, bars: usize) -> u32 {
        if let Some(height) = self.height {
            return height;
        }
        let bars = i64::try_from(bars).unwrap_or(i64::MAX);
        let auto = 500_i64.saturating_add((bars - 8).saturating_mul(20));
        let floor = i64::from(self.min_height);
        u32::try_from(auto.max(floor)).unwrap_or(u32::MAX)
    }
}

/// Everything a renderer needs to draw a Pareto chart.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ParetoChart {
    /// Effects in ascending magnitude.
    pub entries: Vec<ParetoEntry>,
    /// Bar colour per entry, taken from the entry's [`Sign`]. A coefficient
    /// of exactly zero is classed [`Sign::Negative`] and so is drawn in the
    /// negative colour.
    pub colours: Vec<String>,
    /// Legend text per entry.
    pub legends: Vec<String>,
    /// Upper bound of the magnitude axis (largest magnitude + 5%).
    pub x_max: f64,
    /// Chart width in pixels.
    pub width: u32,
    /// Chart height in pixels.
    pub height: u32,
    /// Chart title.
    pub title: String,
    /// Magnitude axis label.
    pub x_label: String,
    /// Effect-name axis label.
    pub y_label: String,
    /// Legend title.
    pub legend_title: String,
}

impl ParetoChart {
    /// Rank the effects of `model` and resolve presentation settings.
    #[must_use]
    pub fn new(model: &FittedModel, config: &ParetoConfig) -> Self {
        let entries = pareto_rank(model);
        let colours = entries
            .iter()
            .map(|e| config.style(e.sign).colour.clone())
            .collect();
        let legends = entries
            .iter()
            .map(|e| config.style(e.sign).legend.clone())
            .collect();
        let x_max = entries.iter().map(|e| e.magnitude).fold(0.0, f64::max) * 1.05;
        let title = match model.spec().response() {
            Some(response) => format!("{}: {response}", config.title),
            None => config.title.clone(),
        };

        Self {
            height: config.resolve_height(entries.len()),
            entries,
            colours,
            legends,
            x_max,
            width: config.width,
            title,
            x_label: config.x_label.clone(),
            y_label: config.y_label.clone(),
            legend_title: config.legend_title.clone(),
        }
    }

    /// Bar positions on the effect-name axis (1 for the smallest effect).
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        (1..=self.entries.len()).collect()
    }
}

/// Format `value` with `digits` significant digits, trimming trailing zeros.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{value}");
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (digits as i32 - 1 - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
