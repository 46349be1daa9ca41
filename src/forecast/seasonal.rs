//! Monthly consumption multipliers

/// Jan..Dec multipliers relative to an average month
pub const SEASONAL_FACTORS: [f64; 12] = [
    1.15, 1.10, 1.05, 0.95, 1.00, 1.20, 1.25, 1.25, 1.15, 1.00, 1.05, 1.10,
];

pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Multiplier for a 1-based month. Out-of-range months are neutral.
pub fn seasonal_factor(month: u32) -> f64 {
    match month {
        1..=12 => SEASONAL_FACTORS[(month - 1) as usize],
        _ => 1.0,
    }
}

/// Human label for how the month compares with an average one.
pub fn season_label(factor: f64) -> &'static str {
    if factor > 1.1 {
        "high consumption season"
    } else if factor < 0.9 {
        "low consumption season"
    } else {
        "moderate consumption season"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seasonal_factor_lookup() {
        assert_eq!(seasonal_factor(1), 1.15);
        assert_eq!(seasonal_factor(7), 1.25);
        assert_eq!(seasonal_factor(12), 1.10);
        assert_eq!(seasonal_factor(0), 1.0);
        assert_eq!(seasonal_factor(13), 1.0);
    }

    #[test]
    fn test_season_label() {
        assert_eq!(season_label(1.25), "high consumption season");
        assert_eq!(season_label(1.1), "moderate consumption season");
        assert_eq!(season_label(0.85), "low consumption season");
    }
}
