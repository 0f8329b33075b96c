//! Five-step ratings for profile-click and follow rates.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Best,
    Good,
    Fair,
    Poor,
    Worst,
}

impl Rating {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Rating::Best => "◎",
            Rating::Good => "○",
            Rating::Fair => "△",
            Rating::Poor => "✕",
            Rating::Worst => "💀",
        }
    }
}

impl std::fmt::Display for Rating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Thresholds are inclusive lower bounds; NaN and negatives fall through.
fn classify(rate: f64, thresholds: [f64; 4]) -> Rating {
    let [best, good, fair, poor] = thresholds;
    if rate >= best {
        Rating::Best
    } else if rate >= good {
        Rating::Good
    } else if rate >= fair {
        Rating::Fair
    } else if rate >= poor {
        Rating::Poor
    } else {
        Rating::Worst
    }
}

#[must_use]
pub fn profile_click_rating(rate: f64) -> Rating {
    classify(rate, [5.0, 3.0, 2.0, 1.0])
}

#[must_use]
pub fn follow_rate_rating(rate: f64) -> Rating {
    classify(rate, [3.0, 2.0, 1.0, 0.6])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_click_boundaries_are_inclusive() {
        assert_eq!(profile_click_rating(5.0), Rating::Best);
        assert_eq!(profile_click_rating(4.999), Rating::Good);
        assert_eq!(profile_click_rating(3.0), Rating::Good);
        assert_eq!(profile_click_rating(2.0), Rating::Fair);
        assert_eq!(profile_click_rating(1.0), Rating::Poor);
        assert_eq!(profile_click_rating(0.999), Rating::Worst);
    }

    #[test]
    fn follow_rate_boundaries_are_inclusive() {
        assert_eq!(follow_rate_rating(3.0), Rating::Best);
        assert_eq!(follow_rate_rating(2.5), Rating::Good);
        assert_eq!(follow_rate_rating(1.0), Rating::Fair);
        assert_eq!(follow_rate_rating(0.6), Rating::Poor);
        assert_eq!(follow_rate_rating(0.599), Rating::Worst);
    }

    #[test]
    fn negative_and_nan_rates_are_worst() {
        assert_eq!(profile_click_rating(-1.0), Rating::Worst);
        assert_eq!(follow_rate_rating(-25.0), Rating::Worst);
        assert_eq!(profile_click_rating(f64::NAN), Rating::Worst);
        assert_eq!(follow_rate_rating(f64::NAN), Rating::Worst);
    }

    #[test]
    fn infinity_is_best() {
        assert_eq!(profile_click_rating(f64::INFINITY), Rating::Best);
    }

    #[test]
    fn symbols_render() {
        let rendered: Vec<String> = [
            Rating::Best,
            Rating::Good,
            Rating::Fair,
            Rating::Poor,
            Rating::Worst,
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, ["◎", "○", "△", "✕", "💀"]);
    }
}
