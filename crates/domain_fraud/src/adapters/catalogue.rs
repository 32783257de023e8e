//! Catalogue-based vehicle valuation
//!
//! Estimates a market value from a make/model base price, depreciated by
//! 15% in the first year and 10% per year after that, never below 1000.
//! The reference year is fixed at construction so estimates are repeatable.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;
use std::time::Duration;

use core_kernel::{Currency, DomainPort, Money, PortError};

use crate::context::VehicleDescriptor;
use crate::ports::VehicleValuationService;

const FIRST_YEAR_RETAINED: Decimal = dec!(0.85);
const YEARLY_RETAINED: Decimal = dec!(0.90);
const MINIMUM_VALUE: Decimal = dec!(1000);
/// Beyond this age every catalogue entry has reached the minimum anyway
const MAX_DEPRECIATION_YEARS: i32 = 60;

#[derive(Debug, Clone, Default)]
struct MakeEntry {
    default: Option<Decimal>,
    models: BTreeMap<String, Decimal>,
}

#[derive(Debug, Clone)]
pub struct CatalogueValuationService {
    as_of_year: i32,
    currency: Currency,
    fallback: Decimal,
    makes: BTreeMap<String, MakeEntry>,
}

impl CatalogueValuationService {
    /// Empty catalogue valuing every vehicle from `fallback`
    pub fn new(as_of_year: i32, currency: Currency, fallback: Decimal) -> Self {
        Self {
            as_of_year,
            currency,
            fallback,
            makes: BTreeMap::new(),
        }
    }

    /// Catalogue with common US models priced in USD
    pub fn standard(as_of_year: i32) -> Self {
        Self::new(as_of_year, Currency::USD, dec!(30000))
            .with_make_default("toyota", dec!(25000))
            .with_model("toyota", "camry", dec!(25000))
            .with_model("toyota", "corolla", dec!(22000))
            .with_model("toyota", "rav4", dec!(28000))
            .with_model("toyota", "highlander", dec!(36000))
            .with_model("toyota", "tacoma", dec!(32000))
            .with_make_default("honda", dec!(28000))
            .with_model("honda", "accord", dec!(27000))
            .with_model("honda", "civic", dec!(24000))
            .with_model("honda", "cr-v", dec!(30000))
            .with_model("honda", "pilot", dec!(38000))
            .with_model("honda", "odyssey", dec!(36000))
            .with_make_default("ford", dec!(30000))
            .with_model("ford", "f-150", dec!(38000))
            .with_model("ford", "explorer", dec!(35000))
            .with_model("ford", "escape", dec!(28000))
            .with_model("ford", "mustang", dec!(32000))
    }

    pub fn with_make_default(mut self, make: &str, base: Decimal) -> Self {
        self.makes.entry(catalogue_key(make)).or_default().default = Some(base);
        self
    }

    pub fn with_model(mut self, make: &str, model: &str, base: Decimal) -> Self {
        self.makes
            .entry(catalogue_key(make))
            .or_default()
            .models
            .insert(catalogue_key(model), base);
        self
    }

    /// New-vehicle price for the descriptor's make and model
    pub fn base_value(&self, vehicle: &VehicleDescriptor) -> Decimal {
        let Some(make) = self.makes.get(&catalogue_key(&vehicle.make)) else {
            return self.fallback;
        };
        make.models
            .get(&catalogue_key(&vehicle.model))
            .copied()
            .or(make.default)
            .unwrap_or(self.fallback)
    }

    /// Value of a vehicle worth `base` when new, after `age` years
    pub fn depreciate(base: Decimal, age: i32) -> Decimal {
        let mut value = base * FIRST_YEAR_RETAINED;
        for _ in 1..age.clamp(0, MAX_DEPRECIATION_YEARS) {
            value *= YEARLY_RETAINED;
        }
        value.max(MINIMUM_VALUE).round_dp(2)
    }
}

impl DomainPort for CatalogueValuationService {}

#[async_trait]
impl VehicleValuationService for CatalogueValuationService {
    async fn estimate_value(
        &self,
        vehicle: &VehicleDescriptor,
        _timeout: Duration,
    ) -> Result<Money, PortError> {
        if vehicle.model_year > self.as_of_year + 1 {
            return Err(PortError::invalid_request(format!(
                "model year {} is after catalogue year {}",
                vehicle.model_year, self.as_of_year
            )));
        }
        let age = (self.as_of_year - vehicle.model_year).max(0);
        let value = Self::depreciate(self.base_value(vehicle), age);
        tracing::debug!(
            make = %vehicle.make,
            model = %vehicle.model,
            model_year = vehicle.model_year,
            %value,
            "catalogue valuation"
        );
        Ok(Money::new(value, self.currency))
    }
}

/// Lowercase alphanumerics only, so "CR-V" and "crv" share an entry
fn catalogue_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depreciation_schedule() {
        assert_eq!(CatalogueValuationService::depreciate(dec!(25000), 0), dec!(21250.00));
        assert_eq!(CatalogueValuationService::depreciate(dec!(25000), 1), dec!(21250.00));
        assert_eq!(CatalogueValuationService::depreciate(dec!(25000), 2), dec!(19125.00));
        assert_eq!(CatalogueValuationService::depreciate(dec!(25000), 50), dec!(1000));
    }

    #[test]
    fn test_lookup_falls_back() {
        let catalogue = CatalogueValuationService::standard(2024);
        assert_eq!(
            catalogue.base_value(&VehicleDescriptor::new("Honda", "CR-V", 2020)),
            dec!(30000)
        );
        assert_eq!(
            catalogue.base_value(&VehicleDescriptor::new("Toyota", "Supra", 2020)),
            dec!(25000)
        );
        assert_eq!(
            catalogue.base_value(&VehicleDescriptor::new("Lada", "Niva", 1995)),
            dec!(30000)
        );
    }

    #[tokio::test]
    async fn test_estimate_value() {
        let catalogue = CatalogueValuationService::standard(2024);
        let value = catalogue
            .estimate_value(&VehicleDescriptor::new("toyota", "camry", 2022), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, Money::new(dec!(19125.00), Currency::USD));
    }

    #[tokio::test]
    async fn test_future_model_year_rejected() {
        let catalogue = CatalogueValuationService::standard(2024);
        let result = catalogue
            .estimate_value(&VehicleDescriptor::new("ford", "escape", 2030), Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(PortError::InvalidRequest { .. })));
    }
}
