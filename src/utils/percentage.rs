use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}

impl Percentage {
    pub fn new_opt(value: f64) -> Option<Percentage> {
        if value < 0. || !value.is_finite() {
            None
        } else {
            Some(Percentage(value))
        }
    }

    /// Rates are stored as ratios, `0.0425` is shown as `4.25%`.
    pub fn from_ratio(ratio: f64) -> Option<Percentage> {
        Self::new_opt(ratio * 100.)
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
