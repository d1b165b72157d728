// Trend between two consecutive readings

const STEADY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Up,
    Down,
    Steady,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendResult {
    pub direction: TrendDirection,
    /// Absolute delta rounded to the channel's display precision. Zero unless up/down.
    pub magnitude: f64,
    precision: usize,
}

impl TrendResult {
    pub fn unknown() -> Self {
        Self {
            direction: TrendDirection::Unknown,
            magnitude: 0.0,
            precision: 0,
        }
    }

    pub fn label(&self) -> String {
        match self.direction {
            TrendDirection::Unknown => "—".to_string(),
            TrendDirection::Steady => "steady".to_string(),
            TrendDirection::Up => format!("up {:.*}", self.precision, self.magnitude),
            TrendDirection::Down => format!("down {:.*}", self.precision, self.magnitude),
        }
    }

    /// Visual class applied to the trend target, if any.
    pub fn class(&self) -> Option<&'static str> {
        match self.direction {
            TrendDirection::Up => Some("up"),
            TrendDirection::Down => Some("down"),
            TrendDirection::Steady => Some("equal"),
            TrendDirection::Unknown => None,
        }
    }
}

impl Default for TrendResult {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Pure trend computation. `precision` is the number of decimal places kept
/// in the magnitude.
pub fn compute_trend(previous: Option<f64>, next: Option<f64>, precision: usize) -> TrendResult {
    let (Some(previous), Some(next)) = (previous, next) else {
        return TrendResult::unknown();
    };

    let delta = next - previous;
    let direction = if delta.abs() < STEADY_EPSILON {
        TrendDirection::Steady
    } else if delta > 0.0 {
        TrendDirection::Up
    } else {
        TrendDirection::Down
    };
    let magnitude = match direction {
        TrendDirection::Up | TrendDirection::Down => round_to(delta.abs(), precision),
        _ => 0.0,
    };

    TrendResult {
        direction,
        magnitude,
        precision,
    }
}

fn round_to(value: f64, precision: usize) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}
