use serde::{Deserialize, Serialize};

/// Consumption band a household falls into, by monthly kWh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageBand {
    VeryHigh,
    High,
    Moderate,
    Low,
    Efficient,
}

impl UsageBand {
    pub fn from_energy(monthly_kwh: f64) -> Self {
        if monthly_kwh > 800.0 {
            UsageBand::VeryHigh
        } else if monthly_kwh > 600.0 {
            UsageBand::High
        } else if monthly_kwh > 400.0 {
            UsageBand::Moderate
        } else if monthly_kwh > 200.0 {
            UsageBand::Low
        } else {
            UsageBand::Efficient
        }
    }

    fn tips(&self) -> [&'static str; 3] {
        match self {
            UsageBand::VeryHigh => [
                "🏠 Consider solar panels - your high usage makes it cost-effective",
                "❄️ Upgrade to inverter AC - can save 30-40% on cooling costs",
                "💡 Install smart home automation to optimize device scheduling",
            ],
            UsageBand::High => [
                "🌡️ Set AC to 24°C instead of 18°C - saves 20% energy",
                "⚡ Replace old appliances with 5-star rated models",
                "🔌 Use power strips to eliminate phantom loads",
            ],
            UsageBand::Moderate => [
                "💡 Switch all bulbs to LED - 80% energy savings",
                "🌀 Use ceiling fans with AC to feel cooler at higher temperatures",
                "📺 Enable power saving mode on electronics",
            ],
            UsageBand::Low => [
                "🔋 Unplug chargers when not in use",
                "🌞 Use natural light during daytime",
                "❄️ Keep refrigerator at optimal temperature (3-4°C)",
            ],
            UsageBand::Efficient => [
                "✅ Great job! Your energy usage is very efficient",
                "📊 Monitor usage patterns to maintain efficiency",
                "🌱 Consider sharing your energy-saving tips with others",
            ],
        }
    }
}

fn seasonal_tip(month: u32) -> Option<&'static str> {
    match month {
        6..=8 => Some("☀️ Summer tip: Use curtains to block sunlight and reduce AC load"),
        12 | 1 | 2 => Some("❄️ Winter tip: Use programmable thermostats for heating efficiency"),
        _ => None,
    }
}

/// Saving tips for the consumption level, plus a seasonal tip in summer and winter.
pub fn recommendations(monthly_kwh: f64, month: u32) -> Vec<String> {
    UsageBand::from_energy(monthly_kwh)
        .tips()
        .into_iter()
        .chain(seasonal_tip(month))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(900.0, UsageBand::VeryHigh)]
    #[case(800.0, UsageBand::High)]
    #[case(601.0, UsageBand::High)]
    #[case(450.0, UsageBand::Moderate)]
    #[case(200.1, UsageBand::Low)]
    #[case(200.0, UsageBand::Efficient)]
    #[case(0.0, UsageBand::Efficient)]
    fn test_bands(#[case] kwh: f64, #[case] band: UsageBand) {
        assert_eq!(UsageBand::from_energy(kwh), band);
    }

    #[test]
    fn test_seasonal_tips() {
        let summer = recommendations(900.0, 7);
        assert_eq!(summer.len(), 4);
        assert!(summer[0].contains("solar panels"));
        assert!(summer[3].starts_with("☀️ Summer tip"));

        assert!(recommendations(100.0, 1)[3].contains("Winter tip"));
        assert_eq!(recommendations(100.0, 10).len(), 3);
    }
}
