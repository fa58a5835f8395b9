//! YAML configuration: household, current property, offers, city statistics
//! and candidate goods. Everything is validated here so that the evaluation
//! only ever sees sane numbers.

use std::{collections::HashSet, fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    Assumptions, CityStats, CurrentProperty, FamilyContext, Good, Household, MortgageOffer,
};

/// Longest loan term accepted, in years.
pub const MAX_MORTGAGE_YEARS: u32 = 50;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
    #[error("config directory unavailable, pass --config or set JIMI_CONFIG")]
    NoConfigDir,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub family: FamilyContext,
    pub current_property: CurrentProperty,
    #[serde(default)]
    pub assumptions: Assumptions,
    pub mortgages: Vec<MortgageOffer>,
    #[serde(default)]
    pub city_stats: Vec<CityStats>,
    pub goods: Vec<Good>,
}

impl Config {
    pub fn household(&self) -> Household<'_> {
        Household {
            family: &self.family,
            current_property: &self.current_property,
            assumptions: &self.assumptions,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config = parse_config(&content)?;
    tracing::info!(
        path = %path.display(),
        goods = config.goods.len(),
        mortgages = config.mortgages.len(),
        city_stats = config.city_stats.len(),
        "loaded configuration"
    );
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let family = &config.family;
    non_negative("family.total_assets", family.total_assets)?;
    non_negative("family.total_liabilities", family.total_liabilities)?;
    non_negative("family.contribution_threshold", family.contribution_threshold)?;
    non_negative("family.monthly_expenses", family.monthly_expenses)?;
    non_negative("family.monthly_parking_fee", family.monthly_parking_fee)?;
    non_negative(
        "family.secondary_residence_monthly_cost",
        family.secondary_residence_monthly_cost,
    )?;
    non_negative("family.monthly_electricity_cost", family.monthly_electricity_cost)?;

    let current = &config.current_property;
    non_negative("current_property.monthly_mortgage", current.monthly_mortgage)?;
    positive("current_property.surface", current.surface)?;
    non_negative(
        "current_property.monthly_rental_income",
        current.monthly_rental_income,
    )?;
    non_negative("current_property.monthly_charges", current.monthly_charges)?;
    in_range(
        "current_property.management_fee_rate",
        current.management_fee_rate,
        0.0..=1.0,
    )?;
    non_negative(
        "current_property.annual_property_tax",
        current.annual_property_tax,
    )?;

    let rate = config.assumptions.notary_fee_rate;
    if !(rate.is_finite() && (0.0..1.0).contains(&rate)) {
        return Err(invalid("assumptions.notary_fee_rate", "must be in [0, 1)"));
    }

    if config.mortgages.is_empty() {
        return Err(invalid("mortgages", "at least one mortgage offer is required"));
    }
    for (index, offer) in config.mortgages.iter().enumerate() {
        validate_mortgage(&format!("mortgages[{index}]"), offer)?;
    }

    let mut zip_codes = HashSet::new();
    for (index, stats) in config.city_stats.iter().enumerate() {
        let field = format!("city_stats[{index}]");
        if stats.zip_code.is_empty() {
            return Err(invalid(&format!("{field}.zip_code"), "must not be empty"));
        }
        if !zip_codes.insert(stats.zip_code.as_str()) {
            return Err(invalid(
                &format!("{field}.zip_code"),
                &format!("duplicate zip code {}", stats.zip_code),
            ));
        }
        non_negative(&format!("{field}.house_price_per_m2"), stats.house_price_per_m2)?;
        non_negative(
            &format!("{field}.apartment_price_per_m2"),
            stats.apartment_price_per_m2,
        )?;
    }

    if config.goods.is_empty() {
        return Err(invalid("goods", "at least one good is required"));
    }
    let mut ids = HashSet::new();
    for good in &config.goods {
        if !ids.insert(good.id.as_str()) {
            return Err(invalid(
                &format!("goods.{}", good.id),
                "duplicate good id",
            ));
        }
        validate_good(good)?;
    }

    Ok(())
}

fn validate_mortgage(field: &str, offer: &MortgageOffer) -> Result<(), ConfigError> {
    if offer.bank.trim().is_empty() {
        return Err(invalid(&format!("{field}.bank"), "must not be empty"));
    }
    non_negative(&format!("{field}.amount"), offer.amount)?;
    let rate = offer.interest_rate;
    if !(rate.is_finite() && (0.0..1.0).contains(&rate)) {
        return Err(invalid(
            &format!("{field}.interest_rate"),
            "must be a fraction in [0, 1), e.g. 0.035 for 3.5%",
        ));
    }
    if !(1..=MAX_MORTGAGE_YEARS).contains(&offer.duration_years) {
        return Err(invalid(
            &format!("{field}.duration_years"),
            &format!(
                "must be between 1 and {MAX_MORTGAGE_YEARS}, got {}",
                offer.duration_years
            ),
        ));
    }
    if let Some(cost) = offer.monthly_cost {
        non_negative(&format!("{field}.monthly_cost"), cost)?;
    }
    non_negative(&format!("{field}.monthly_insurance"), offer.monthly_insurance)
}

fn validate_good(good: &Good) -> Result<(), ConfigError> {
    if good.id.trim().is_empty() {
        return Err(invalid("goods.id", "must not be empty"));
    }
    let field = |name: &str| format!("goods.{}.{name}", good.id);

    non_negative(&field("price"), good.price)?;
    positive(&field("living_space"), good.living_space)?;
    positive(&field("carrez_living_space"), good.carrez_living_space)?;
    non_negative(&field("land_area"), good.land_area)?;
    if good.zip_code.is_empty() {
        return Err(invalid(&field("zip_code"), "must not be empty"));
    }
    non_negative(&field("annual_property_tax"), good.annual_property_tax)?;
    non_negative(&field("furniture_cost"), good.furniture_cost)?;
    non_negative(&field("energy_consumption_cost"), good.energy_consumption_cost)?;
    non_negative(&field("energy_consumption"), good.energy_consumption)?;

    if let Some(renovation) = &good.renovation {
        non_negative(&field("renovation.cost"), renovation.cost)?;
    }
    if good.post_renovation_rating().is_some() {
        match good.post_renovation_consumption() {
            Some(consumption) => {
                non_negative(&field("renovation.energy_consumption"), consumption)?
            }
            None => {
                return Err(invalid(
                    &field("renovation.energy_consumption"),
                    "required when an energy rating is set",
                ))
            }
        }
        positive(&field("energy_consumption"), good.energy_consumption)?;
    }

    Ok(())
}

fn non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be a non-negative number, got {value}")))
    }
}

fn positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("must be a positive number, got {value}")))
    }
}

fn in_range(
    field: &str,
    value: f64,
    range: std::ops::RangeInclusive<f64>,
) -> Result<(), ConfigError> {
    if value.is_finite() && range.contains(&value) {
        Ok(())
    } else {
        Err(invalid(
            field,
            &format!(
                "must be between {} and {}, got {value}",
                range.start(),
                range.end()
            ),
        ))
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;
    use crate::domain::PropertyType;

    const SAMPLE: &str = r#"
family:
  total_assets: 200000
  contribution_threshold: 50000
  monthly_expenses: 4000
  monthly_parking_fee: 120
current_property:
  surface: 50
  monthly_rental_income: 1500
  monthly_charges: 100
  management_fee_rate: 0.07
  annual_property_tax: 1200
mortgages:
  - bank: Banque A
    amount: 350000
    interest_rate: 0.035
    duration_years: 25
    monthly_cost: 1200
    monthly_insurance: 50
city_stats:
  - zip_code: "75010"
    city: Paris
    house_price_per_m2: 6000
    apartment_price_per_m2: 4500
goods:
  - id: seloger-1
    price: 400000
    living_space: 85
    carrez_living_space: 80
    property_type: Apartment
    zip_code: 75010
    has_garage: true
    renovation:
      cost: 20000
      description: new kitchen
"#;

    fn sample() -> Config {
        parse_config(SAMPLE).unwrap()
    }

    #[test]
    fn parses_sample_with_defaults() {
        let config = sample();

        assert_eq!(config.assumptions, Assumptions::default());
        assert_eq!(config.family.monthly_electricity_cost, 0.0);
        assert_eq!(config.mortgages[0].monthly_cost, Some(1_200.0));
        let good = &config.goods[0];
        assert_eq!(good.property_type, PropertyType::Apartment);
        assert_eq!(good.zip_code, "75010");
        assert_eq!(good.renovation_cost(), 20_000.0);
        assert!(good.has_garage);
    }

    #[test]
    fn rejects_unknown_property_type() {
        let yaml = SAMPLE.replace("property_type: Apartment", "property_type: castle");
        assert!(matches!(parse_config(&yaml), Err(ConfigError::Yaml(_))));
    }

    #[test]
    fn rejects_zero_carrez_space() {
        let yaml = SAMPLE.replace("carrez_living_space: 80", "carrez_living_space: 0");
        match parse_config(&yaml) {
            Err(ConfigError::Invalid { field, .. }) => {
                assert_eq!(field, "goods.seloger-1.carrez_living_space")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_money() {
        let mut config = sample();
        config.family.monthly_expenses = -1.0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Invalid { field, .. }) if field == "family.monthly_expenses"
        ));
    }

    #[test]
    fn rejects_percent_interest_rate() {
        let yaml = SAMPLE.replace("interest_rate: 0.035", "interest_rate: 3.5");
        assert!(matches!(
            parse_config(&yaml),
            Err(ConfigError::Invalid { field, .. }) if field == "mortgages[0].interest_rate"
        ));
    }

    #[test]
    fn rejects_out_of_range_duration() {
        for years in ["0", "51", "400000000"] {
            let yaml = SAMPLE.replace("duration_years: 25", &format!("duration_years: {years}"));
            match parse_config(&yaml) {
                Err(ConfigError::Invalid { field, reason }) => {
                    assert_eq!(field, "mortgages[0].duration_years");
                    assert!(reason.contains(years), "{reason}");
                }
                other => panic!("{years}: expected invalid duration, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_management_rate_above_one() {
        let mut config = sample();
        config.current_property.management_fee_rate = 1.5;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rating_requires_consumption_figures() {
        let yaml = SAMPLE.replace(
            "      description: new kitchen",
            "      description: new kitchen\n      energy_rating: B",
        );
        match parse_config(&yaml) {
            Err(ConfigError::Invalid { field, reason }) => {
                assert_eq!(field, "goods.seloger-1.renovation.energy_consumption");
                assert!(reason.contains("required"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn rejects_duplicate_ids_and_zip_codes() {
        let mut config = sample();
        config.goods.push(config.goods[0].clone());
        assert!(validate(&config).is_err());

        let mut config = sample();
        config.city_stats.push(config.city_stats[0].clone());
        assert!(validate(&config).is_err());
    }

    #[test]
    fn requires_goods_and_mortgages() {
        let mut config = sample();
        config.mortgages.clear();
        assert!(validate(&config).is_err());

        let mut config = sample();
        config.goods.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, SAMPLE).unwrap();

        let config = load_config(&path).unwrap();

        assert_eq!(config, sample());
    }

    #[test]
    fn missing_file_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = load_config(&path).unwrap_err();

        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.yaml"));
    }
}
