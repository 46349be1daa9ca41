use serde::{Deserialize, Serialize};
use tracing::debug;

use super::BillingError;
use crate::domain::{RegionalTariff, TariffCatalog, TariffKind, TariffStructure, TariffTier};

/// Share of consumption assumed to fall in peak hours when none is given
pub const DEFAULT_PEAK_SHARE: f64 = 0.3;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TierUsage {
    pub tier: String,
    pub energy_kwh: f64,
    pub rate: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeOfUseSplit {
    pub peak_energy: f64,
    pub off_peak_energy: f64,
    pub peak_cost: f64,
    pub off_peak_cost: f64,
}

/// Full bill breakdown for one billing period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillBreakdown {
    pub country: String,
    pub currency: String,
    pub currency_symbol: String,
    pub tariff_type: TariffKind,
    pub energy_kwh: f64,
    pub energy_cost: f64,
    pub fixed_charge: f64,
    pub subtotal: f64,
    pub tax_amount: f64,
    pub tax_rate_percent: f64,
    pub total_bill: f64,
    pub effective_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier_breakdown: Option<Vec<TierUsage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_use: Option<TimeOfUseSplit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavingsEstimate {
    pub energy_reduction_kwh: f64,
    pub energy_reduction_percent: f64,
    pub cost_savings: f64,
    pub cost_savings_percent: f64,
    pub current_bill: f64,
    pub reduced_bill: f64,
}

/// Energy cost under a flat rate
pub fn flat_energy_cost(energy_kwh: f64, rate: f64) -> f64 {
    energy_kwh * rate
}

/// Walks the tiers in order; each consumes up to its band width and the
/// unbounded tier takes whatever is left.
pub fn tiered_energy_cost(energy_kwh: f64, tiers: &[TariffTier]) -> (f64, Vec<TierUsage>) {
    let mut remaining = energy_kwh;
    let mut cost = 0.0;
    let mut usage = Vec::new();

    for tier in tiers {
        if remaining <= 0.0 {
            break;
        }
        let tier_energy = match tier.max_kwh {
            Some(max) => remaining.min(max),
            None => remaining,
        };
        let tier_cost = tier_energy * tier.rate_per_kwh;
        cost += tier_cost;
        usage.push(TierUsage {
            tier: tier.description.clone(),
            energy_kwh: tier_energy,
            rate: tier.rate_per_kwh,
            cost: tier_cost,
        });
        remaining = (remaining - tier_energy).max(0.0);
    }
    (cost, usage)
}

/// Peak/off-peak split for time-of-use tariffs
pub fn time_of_use_cost(
    energy_kwh: f64,
    peak_share: f64,
    base_rate: f64,
    peak_multiplier: f64,
) -> TimeOfUseSplit {
    let peak_energy = energy_kwh * peak_share;
    let off_peak_energy = energy_kwh * (1.0 - peak_share);
    TimeOfUseSplit {
        peak_energy,
        off_peak_energy,
        peak_cost: peak_energy * base_rate * peak_multiplier,
        off_peak_cost: off_peak_energy * base_rate,
    }
}

/// Regional billing calculator over a tariff catalog
#[derive(Debug, Clone)]
pub struct BillingEngine {
    catalog: TariffCatalog,
}

impl Default for BillingEngine {
    fn default() -> Self {
        Self::new(TariffCatalog::builtin().clone())
    }
}

impl BillingEngine {
    pub fn new(catalog: TariffCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &TariffCatalog {
        &self.catalog
    }

    pub fn available_countries(&self) -> Vec<&str> {
        self.catalog.countries()
    }

    pub fn tariff(&self, country: &str) -> Result<&RegionalTariff, BillingError> {
        self.catalog
            .get(country)
            .ok_or_else(|| BillingError::UnknownCountry(country.to_string()))
    }

    /// Bill for `energy_kwh` under the country's rules.
    ///
    /// `peak_share` only matters for time-of-use tariffs.
    pub fn calculate_bill(
        &self,
        energy_kwh: f64,
        country: &str,
        peak_share: Option<f64>,
    ) -> Result<BillBreakdown, BillingError> {
        let tariff = self.tariff(country)?;
        calculate_with_tariff(tariff, energy_kwh, peak_share)
    }

    pub fn estimate_savings(
        &self,
        current_kwh: f64,
        reduced_kwh: f64,
        country: &str,
    ) -> Result<SavingsEstimate, BillingError> {
        let current = self.calculate_bill(current_kwh, country, None)?;
        let reduced = self.calculate_bill(reduced_kwh, country, None)?;

        let energy_reduction = current_kwh - reduced_kwh;
        let cost_savings = current.total_bill - reduced.total_bill;

        Ok(SavingsEstimate {
            energy_reduction_kwh: energy_reduction,
            energy_reduction_percent: percent_of(energy_reduction, current_kwh),
            cost_savings,
            cost_savings_percent: percent_of(cost_savings, current.total_bill),
            current_bill: current.total_bill,
            reduced_bill: reduced.total_bill,
        })
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

/// Validates a user-supplied tariff before billing against it.
pub fn calculate_custom(
    tariff: &RegionalTariff,
    energy_kwh: f64,
    peak_share: Option<f64>,
) -> Result<BillBreakdown, BillingError> {
    let errors = tariff.validate();
    if !errors.is_empty() {
        return Err(BillingError::InvalidTariff(errors));
    }
    calculate_with_tariff(tariff, energy_kwh, peak_share)
}

/// Bill against an explicit tariff, skipping configuration checks.
pub fn calculate_with_tariff(
    tariff: &RegionalTariff,
    energy_kwh: f64,
    peak_share: Option<f64>,
) -> Result<BillBreakdown, BillingError> {
    if energy_kwh < 0.0 || !energy_kwh.is_finite() {
        return Err(BillingError::NegativeEnergy(energy_kwh));
    }

    let mut tier_breakdown = None;
    let mut time_of_use = None;

    let energy_cost = match &tariff.structure {
        TariffStructure::Flat => flat_energy_cost(energy_kwh, tariff.base_rate),
        TariffStructure::Tiered { tiers } if tiers.is_empty() => {
            flat_energy_cost(energy_kwh, tariff.base_rate)
        }
        TariffStructure::Tiered { tiers } => {
            let (cost, usage) = tiered_energy_cost(energy_kwh, tiers);
            tier_breakdown = Some(usage);
            cost
        }
        TariffStructure::TimeOfUse { peak_multiplier } => {
            let share = peak_share.unwrap_or(DEFAULT_PEAK_SHARE);
            if !(0.0..=1.0).contains(&share) {
                return Err(BillingError::InvalidPeakShare(share));
            }
            let split = time_of_use_cost(energy_kwh, share, tariff.base_rate, *peak_multiplier);
            let cost = split.peak_cost + split.off_peak_cost;
            time_of_use = Some(split);
            cost
        }
    };

    let subtotal = energy_cost + tariff.fixed_charge;
    let tax_amount = subtotal * tariff.tax_rate;
    let total_bill = subtotal + tax_amount;

    debug!(
        country = %tariff.country,
        tariff = %tariff.kind(),
        energy_kwh,
        total_bill,
        "bill calculated"
    );

    Ok(BillBreakdown {
        country: tariff.country.clone(),
        currency: tariff.currency.clone(),
        currency_symbol: tariff.currency_symbol.clone(),
        tariff_type: tariff.kind(),
        energy_kwh,
        energy_cost,
        fixed_charge: tariff.fixed_charge,
        subtotal,
        tax_amount,
        tax_rate_percent: tariff.tax_rate * 100.0,
        total_bill,
        effective_rate: if energy_kwh > 0.0 { total_bill / energy_kwh } else { 0.0 },
        tier_breakdown,
        time_of_use,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    fn tou_tariff() -> RegionalTariff {
        RegionalTariff {
            country: "Testland".to_string(),
            currency: "TST".to_string(),
            currency_symbol: "T".to_string(),
            structure: TariffStructure::TimeOfUse { peak_multiplier: 1.5 },
            base_rate: 2.0,
            fixed_charge: 10.0,
            tax_rate: 0.1,
            peak_rate: None,
            climate: None,
        }
    }

    #[test]
    fn test_flat_bill_nigeria() {
        let engine = BillingEngine::default();
        let bill = engine.calculate_bill(100.0, "Nigeria", None).unwrap();
        // 100 * 68 = 6800, + 1000 = 7800, tax 585
        assert!(approx(bill.energy_cost, 6800.0));
        assert!(approx(bill.subtotal, 7800.0));
        assert!(approx(bill.tax_amount, 585.0));
        assert!(approx(bill.total_bill, 8385.0));
        assert!(approx(bill.effective_rate, 83.85));
        assert_eq!(bill.tariff_type, TariffKind::Flat);
        assert!(bill.tier_breakdown.is_none());
    }

    #[test]
    fn test_tiered_bill_usa() {
        let engine = BillingEngine::default();
        let bill = engine.calculate_bill(700.0, "USA", None).unwrap();
        let tiers = bill.tier_breakdown.as_ref().unwrap();
        // bands are widths: 300 then up to 600 more, so the top tier is untouched
        assert_eq!(tiers.len(), 2);
        assert!(approx(tiers[0].energy_kwh, 300.0));
        assert!(approx(tiers[1].energy_kwh, 400.0));
        // 300 * 0.12 + 400 * 0.15 = 96
        assert!(approx(bill.energy_cost, 96.0));
    }

    #[test]
    fn test_tiered_walk_consumes_each_band() {
        let tiers = vec![
            TariffTier::new(Some(50.0), 30.0, "Lifeline"),
            TariffTier::new(Some(100.0), 50.0, "R1"),
            TariffTier::new(None, 85.0, "Top"),
        ];
        let (cost, usage) = tiered_energy_cost(40.0, &tiers);
        assert_eq!(usage.len(), 1);
        assert!(approx(cost, 1200.0));

        let (cost, usage) = tiered_energy_cost(200.0, &tiers);
        assert_eq!(usage.len(), 3);
        assert!(approx(usage[2].energy_kwh, 50.0));
        assert!(approx(cost, 50.0 * 30.0 + 100.0 * 50.0 + 50.0 * 85.0));
    }

    #[test]
    fn test_zero_energy_bill() {
        let engine = BillingEngine::default();
        let bill = engine.calculate_bill(0.0, "UK", None).unwrap();
        assert!(approx(bill.total_bill, 26.25));
        assert_eq!(bill.effective_rate, 0.0);
    }

    #[test]
    fn test_time_of_use_default_share() {
        let bill = calculate_with_tariff(&tou_tariff(), 100.0, None).unwrap();
        let split = bill.time_of_use.unwrap();
        assert!(approx(split.peak_energy, 30.0));
        assert!(approx(split.off_peak_energy, 70.0));
        // 30 * 3 + 70 * 2
        assert!(approx(bill.energy_cost, 230.0));
        assert!(approx(bill.total_bill, (230.0 + 10.0) * 1.1));
    }

    #[rstest]
    #[case(-0.1)]
    #[case(1.5)]
    fn test_time_of_use_rejects_bad_share(#[case] share: f64) {
        assert_eq!(
            calculate_with_tariff(&tou_tariff(), 100.0, Some(share)),
            Err(BillingError::InvalidPeakShare(share))
        );
    }

    #[test]
    fn test_errors() {
        let engine = BillingEngine::default();
        assert_eq!(
            engine.calculate_bill(10.0, "Atlantis", None),
            Err(BillingError::UnknownCountry("Atlantis".to_string()))
        );
        assert_eq!(
            engine.calculate_bill(-1.0, "Kenya", None),
            Err(BillingError::NegativeEnergy(-1.0))
        );
    }

    #[test]
    fn test_empty_tiers_fall_back_to_flat() {
        let mut tariff = tou_tariff();
        tariff.structure = TariffStructure::Tiered { tiers: vec![] };
        let bill = calculate_with_tariff(&tariff, 10.0, None).unwrap();
        assert!(approx(bill.energy_cost, 20.0));
        assert!(bill.tier_breakdown.is_none());
    }

    #[test]
    fn test_calculate_custom_validates() {
        let mut tariff = tou_tariff();
        tariff.tax_rate = 2.0;
        assert_eq!(
            calculate_custom(&tariff, 10.0, None),
            Err(BillingError::InvalidTariff(vec![
                "Tax rate must be between 0 and 1".to_string()
            ]))
        );
        assert!(calculate_custom(&tou_tariff(), 10.0, None).is_ok());

        tariff.tax_rate = 0.1;
        tariff.structure = TariffStructure::Tiered {
            tiers: vec![TariffTier::new(None, -4.0, "Negative")],
        };
        assert_eq!(
            calculate_custom(&tariff, 10.0, None),
            Err(BillingError::InvalidTariff(vec![
                "Tier 1 rate must not be negative".to_string()
            ]))
        );
    }

    #[test]
    fn test_estimate_savings() {
        let engine = BillingEngine::default();
        let savings = engine.estimate_savings(200.0, 150.0, "Kenya").unwrap();
        assert!(approx(savings.energy_reduction_kwh, 50.0));
        assert!(approx(savings.energy_reduction_percent, 25.0));
        // 50 kWh * 24 * 1.16
        assert!(approx(savings.cost_savings, 1392.0));
        assert!(savings.cost_savings_percent > 0.0);
    }

    #[test]
    fn test_estimate_savings_zero_baseline() {
        let engine = BillingEngine::default();
        let savings = engine.estimate_savings(0.0, 0.0, "Ghana").unwrap();
        assert_eq!(savings.energy_reduction_percent, 0.0);
        assert_eq!(savings.cost_savings, 0.0);
    }

    proptest! {
        #[test]
        fn prop_bill_is_monotonic_in_energy(a in 0.0f64..5000.0, b in 0.0f64..5000.0) {
            let engine = BillingEngine::default();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            for country in ["Nigeria", "Nigeria (Tiered)", "USA", "India"] {
                let low = engine.calculate_bill(lo, country, None).unwrap();
                let high = engine.calculate_bill(hi, country, None).unwrap();
                prop_assert!(low.total_bill <= high.total_bill + 1e-9);
            }
        }

        #[test]
        fn prop_tier_usage_sums_to_energy(energy in 0.0f64..5000.0) {
            let engine = BillingEngine::default();
            let bill = engine.calculate_bill(energy, "India", None).unwrap();
            let used: f64 = bill.tier_breakdown.unwrap_or_default().iter().map(|t| t.energy_kwh).sum();
            prop_assert!((used - energy).abs() < 1e-6);
        }
    }
}
