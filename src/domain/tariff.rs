use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::{Display, EnumString};

/// Band of a tiered tariff; `max_kwh == None` marks the unbounded top tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TariffTier {
    pub max_kwh: Option<f64>,
    pub rate_per_kwh: f64,
    pub description: String,
}

impl TariffTier {
    pub fn new(max_kwh: Option<f64>, rate_per_kwh: f64, description: impl Into<String>) -> Self {
        Self {
            max_kwh,
            rate_per_kwh,
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TariffKind {
    Flat,
    Tiered,
    TimeOfUse,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TariffStructure {
    Flat,
    Tiered { tiers: Vec<TariffTier> },
    TimeOfUse { peak_multiplier: f64 },
}

impl TariffStructure {
    pub fn kind(&self) -> TariffKind {
        match self {
            TariffStructure::Flat => TariffKind::Flat,
            TariffStructure::Tiered { .. } => TariffKind::Tiered,
            TariffStructure::TimeOfUse { .. } => TariffKind::TimeOfUse,
        }
    }
}

/// Complete billing rules of one country or utility schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionalTariff {
    pub country: String,
    /// ISO 4217 code
    pub currency: String,
    pub currency_symbol: String,
    pub structure: TariffStructure,
    pub base_rate: f64,
    pub fixed_charge: f64,
    /// Fraction, e.g. 0.075 for 7.5%
    pub tax_rate: f64,
    pub peak_rate: Option<f64>,
    pub climate: Option<String>,
}

impl RegionalTariff {
    #[allow(clippy::too_many_arguments)]
    fn flat(
        country: &str,
        currency: &str,
        symbol: &str,
        rate: f64,
        fixed: f64,
        tax: f64,
        peak_rate: f64,
        climate: &str,
    ) -> Self {
        Self {
            country: country.to_string(),
            currency: currency.to_string(),
            currency_symbol: symbol.to_string(),
            structure: TariffStructure::Flat,
            base_rate: rate,
            fixed_charge: fixed,
            tax_rate: tax,
            peak_rate: Some(peak_rate),
            climate: Some(climate.to_string()),
        }
    }

    pub fn kind(&self) -> TariffKind {
        self.structure.kind()
    }

    /// Configuration errors, all of them
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.base_rate <= 0.0 {
            errors.push("Base rate must be positive".to_string());
        }
        if self.fixed_charge < 0.0 {
            errors.push("Fixed charge must not be negative".to_string());
        }
        if !(0.0..=1.0).contains(&self.tax_rate) {
            errors.push("Tax rate must be between 0 and 1".to_string());
        }
        if let TariffStructure::Tiered { tiers } = &self.structure {
            if tiers.is_empty() {
                errors.push("Tiered tariff requires tier definitions".to_string());
            }
            for (i, tier) in tiers.iter().enumerate() {
                if tier.rate_per_kwh < 0.0 {
                    errors.push(format!("Tier {} rate must not be negative", i + 1));
                }
                if tier.max_kwh.is_some_and(|max| max <= 0.0) {
                    errors.push(format!("Tier {} limit must be positive", i + 1));
                }
            }
        }
        if self.peak_rate.is_some_and(|rate| rate < 0.0) {
            errors.push("Peak rate must not be negative".to_string());
        }
        if let TariffStructure::TimeOfUse { peak_multiplier } = self.structure {
            if peak_multiplier <= 0.0 {
                errors.push("Peak multiplier must be positive".to_string());
            }
        }
        errors
    }
}

static BUILTIN: Lazy<TariffCatalog> = Lazy::new(|| {
    let mut tariffs = vec![
        RegionalTariff::flat("Nigeria", "NGN", "₦", 68.0, 1000.0, 0.075, 85.0, "tropical"),
        RegionalTariff::flat("South Africa", "ZAR", "R", 1.85, 150.0, 0.15, 2.50, "temperate"),
        RegionalTariff::flat("Egypt", "EGP", "£E", 1.45, 50.0, 0.10, 2.20, "arid"),
        RegionalTariff::flat("Kenya", "KES", "KSh", 24.0, 200.0, 0.16, 35.0, "tropical"),
        RegionalTariff::flat("Ghana", "GHS", "₵", 1.20, 25.0, 0.125, 1.80, "tropical"),
        RegionalTariff::flat("Morocco", "MAD", "DH", 1.15, 30.0, 0.20, 1.65, "mediterranean"),
        RegionalTariff::flat("Ethiopia", "ETB", "Br", 6.50, 15.0, 0.15, 9.75, "highland"),
        RegionalTariff::flat("Tanzania", "TZS", "TSh", 280.0, 5000.0, 0.18, 420.0, "tropical"),
        RegionalTariff::flat("Uganda", "UGX", "USh", 420.0, 8000.0, 0.18, 630.0, "tropical"),
        RegionalTariff::flat("Algeria", "DZD", "DA", 18.5, 200.0, 0.19, 27.8, "arid"),
        RegionalTariff::flat("Cameroon", "XAF", "Xaf", 18.5, 200.0, 0.19, 27.8, "arid"),
    ];

    tariffs.push(RegionalTariff {
        country: "Nigeria (Tiered)".to_string(),
        currency: "NGN".to_string(),
        currency_symbol: "₦".to_string(),
        structure: TariffStructure::Tiered {
            tiers: vec![
                TariffTier::new(Some(50.0), 30.0, "Lifeline tariff"),
                TariffTier::new(Some(100.0), 50.0, "Residential R1"),
                TariffTier::new(Some(300.0), 68.0, "Residential R2"),
                TariffTier::new(None, 85.0, "Residential R3"),
            ],
        },
        base_rate: 68.0,
        fixed_charge: 1000.0,
        tax_rate: 0.075,
        peak_rate: None,
        climate: Some("tropical".to_string()),
    });
    tariffs.push(RegionalTariff {
        country: "USA".to_string(),
        currency: "USD".to_string(),
        currency_symbol: "$".to_string(),
        structure: TariffStructure::Tiered {
            tiers: vec![
                TariffTier::new(Some(300.0), 0.12, "Baseline"),
                TariffTier::new(Some(600.0), 0.15, "Tier 1"),
                TariffTier::new(None, 0.25, "Tier 2"),
            ],
        },
        base_rate: 0.15,
        fixed_charge: 10.0,
        tax_rate: 0.08,
        peak_rate: None,
        climate: None,
    });
    tariffs.push(RegionalTariff {
        country: "UK".to_string(),
        currency: "GBP".to_string(),
        currency_symbol: "£".to_string(),
        structure: TariffStructure::Flat,
        base_rate: 0.28,
        fixed_charge: 25.0,
        tax_rate: 0.05,
        peak_rate: None,
        climate: None,
    });
    tariffs.push(RegionalTariff {
        country: "India".to_string(),
        currency: "INR".to_string(),
        currency_symbol: "₹".to_string(),
        structure: TariffStructure::Tiered {
            tiers: vec![
                TariffTier::new(Some(100.0), 3.0, "Domestic LT-1A"),
                TariffTier::new(Some(200.0), 4.5, "Domestic LT-1B"),
                TariffTier::new(Some(300.0), 6.0, "Domestic LT-1C"),
                TariffTier::new(None, 7.5, "Domestic LT-1D"),
            ],
        },
        base_rate: 6.0,
        fixed_charge: 50.0,
        tax_rate: 0.12,
        peak_rate: None,
        climate: None,
    });

    TariffCatalog::new(tariffs)
});

/// Tariff lookup keyed by country name
#[derive(Debug, Clone)]
pub struct TariffCatalog {
    tariffs: BTreeMap<String, RegionalTariff>,
}

impl TariffCatalog {
    pub fn new(tariffs: Vec<RegionalTariff>) -> Self {
        Self {
            tariffs: tariffs.into_iter().map(|t| (t.country.clone(), t)).collect(),
        }
    }

    pub fn builtin() -> &'static TariffCatalog {
        &BUILTIN
    }

    pub fn get(&self, country: &str) -> Option<&RegionalTariff> {
        self.tariffs.get(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.tariffs.contains_key(country)
    }

    pub fn countries(&self) -> Vec<&str> {
        self.tariffs.keys().map(String::as_str).collect()
    }

    pub fn tariffs(&self) -> impl Iterator<Item = &RegionalTariff> {
        self.tariffs.values()
    }

    /// Adds or replaces a schedule
    pub fn insert(&mut self, tariff: RegionalTariff) {
        self.tariffs.insert(tariff.country.clone(), tariff);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tariffs_are_valid() {
        let catalog = TariffCatalog::builtin();
        assert_eq!(catalog.countries().len(), 15);
        for tariff in catalog.tariffs() {
            assert!(tariff.validate().is_empty(), "{} invalid", tariff.country);
        }
    }

    #[test]
    fn test_lookup() {
        let catalog = TariffCatalog::builtin();
        let nigeria = catalog.get("Nigeria").unwrap();
        assert_eq!(nigeria.currency_symbol, "₦");
        assert_eq!(nigeria.kind(), TariffKind::Flat);
        assert_eq!(catalog.get("USA").unwrap().kind(), TariffKind::Tiered);
        assert!(catalog.get("Atlantis").is_none());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let tariff = RegionalTariff {
            country: "Broken".to_string(),
            currency: "XXX".to_string(),
            currency_symbol: "X".to_string(),
            structure: TariffStructure::Tiered { tiers: vec![] },
            base_rate: 0.0,
            fixed_charge: 0.0,
            tax_rate: 1.5,
            peak_rate: None,
            climate: None,
        };
        assert_eq!(
            tariff.validate(),
            vec![
                "Base rate must be positive",
                "Tax rate must be between 0 and 1",
                "Tiered tariff requires tier definitions",
            ]
        );
    }

    #[test]
    fn test_validate_rejects_negative_amounts() {
        let tariff = RegionalTariff {
            country: "Upside Down".to_string(),
            currency: "XXX".to_string(),
            currency_symbol: "X".to_string(),
            structure: TariffStructure::Tiered {
                tiers: vec![
                    TariffTier::new(Some(-10.0), 5.0, "Broken limit"),
                    TariffTier::new(None, -2.0, "Broken rate"),
                ],
            },
            base_rate: 5.0,
            fixed_charge: -1.0,
            tax_rate: 0.1,
            peak_rate: Some(-3.0),
            climate: None,
        };
        assert_eq!(
            tariff.validate(),
            vec![
                "Fixed charge must not be negative",
                "Tier 1 limit must be positive",
                "Tier 2 rate must not be negative",
                "Peak rate must not be negative",
            ]
        );
    }

    #[test]
    fn test_structure_serialization_is_tagged() {
        let json = serde_json::to_value(TariffStructure::TimeOfUse { peak_multiplier: 1.5 }).unwrap();
        assert_eq!(json["type"], "time_of_use");
        assert_eq!(json["peak_multiplier"], 1.5);
    }
}
