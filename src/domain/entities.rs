use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Regulatory acquisition fees ("frais de notaire") as a share of the price.
/// Approximation: the real rate depends on price brackets and old/new builds.
pub const DEFAULT_NOTARY_FEE_RATE: f64 = 0.08;

/// Family situation. Shared by all evaluations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FamilyContext {
    /// Cash, stocks, commodities, etc.
    pub total_assets: f64,
    /// Mortgages, car loans, etc.
    #[serde(default)]
    pub total_liabilities: f64,
    /// Personal contribution above which an alert is raised.
    pub contribution_threshold: f64,
    /// Current monthly spending, used as the baseline for comparisons.
    pub monthly_expenses: f64,
    #[serde(default)]
    pub monthly_parking_fee: f64,
    #[serde(default)]
    pub secondary_residence_monthly_cost: f64,
    /// Electricity already counted in `monthly_expenses`.
    #[serde(default)]
    pub monthly_electricity_cost: f64,
}

/// The property currently owned by the family, rented out after the move.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CurrentProperty {
    #[serde(default)]
    pub monthly_mortgage: f64,
    /// Surface in m².
    pub surface: f64,
    pub monthly_rental_income: f64,
    #[serde(default)]
    pub monthly_charges: f64,
    /// Share of the net rent kept by the management agency, between 0 and 1.
    #[serde(default)]
    pub management_fee_rate: f64,
    #[serde(default)]
    pub annual_property_tax: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MortgageOffer {
    pub bank: String,
    /// Borrowed principal.
    pub amount: f64,
    /// Nominal annual rate as a fraction (0.035 for 3.5%).
    pub interest_rate: f64,
    pub duration_years: u32,
    /// Monthly cost excluding insurance. Derived from the rate when absent.
    #[serde(default)]
    pub monthly_cost: Option<f64>,
    #[serde(default)]
    pub monthly_insurance: f64,
}

impl MortgageOffer {
    pub fn months(&self) -> u64 {
        u64::from(self.duration_years) * 12
    }

    /// Monthly cost excluding insurance, either quoted by the bank or
    /// computed as a constant annuity.
    pub fn monthly_cost_excluding_insurance(&self) -> f64 {
        if let Some(cost) = self.monthly_cost {
            return cost;
        }

        let months = self.months() as f64;
        if months <= 0.0 {
            return 0.0;
        }

        let rate = self.interest_rate / 12.0;
        if rate == 0.0 {
            self.amount / months
        } else {
            self.amount * rate / (1.0 - (1.0 + rate).powf(-months))
        }
    }

    /// What leaves the bank account every month: cost plus insurance.
    pub fn monthly_payment(&self) -> f64 {
        self.monthly_cost_excluding_insurance() + self.monthly_insurance
    }

    /// Interests and insurance paid over the whole duration.
    pub fn total_cost_of_loan(&self) -> f64 {
        self.monthly_payment() * self.months() as f64 - self.amount
    }
}

/// Average prices for one zip code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityStats {
    #[serde(deserialize_with = "zip_code")]
    pub zip_code: String,
    #[serde(default)]
    pub city: Option<String>,
    pub house_price_per_m2: f64,
    pub apartment_price_per_m2: f64,
}

impl CityStats {
    pub fn average_price_per_m2(&self, kind: PropertyType) -> f64 {
        match kind {
            PropertyType::House => self.house_price_per_m2,
            PropertyType::Apartment => self.apartment_price_per_m2,
        }
    }
}

/// City statistics keyed by zip code.
pub type CityIndex = HashMap<String, CityStats>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    #[serde(alias = "House", alias = "HOUSE", alias = "maison")]
    House,
    #[serde(
        alias = "Apartment",
        alias = "APARTMENT",
        alias = "appartement",
        alias = "flat"
    )]
    Apartment,
}

impl PropertyType {
    pub fn label(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
        }
    }
}

/// Planned works on a candidate property.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Renovation {
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// Energy rating (DPE letter) expected after the works.
    #[serde(default)]
    pub energy_rating: Option<String>,
    /// Expected consumption after the works, same unit as `Good::energy_consumption`.
    #[serde(default)]
    pub energy_consumption: Option<f64>,
}

/// A candidate property ("good") found in a listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Good {
    /// Listing identifier, also used to name analysis reports.
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    pub price: f64,
    /// Total living space in m².
    pub living_space: f64,
    /// Living space under the Carrez law in m². Authoritative for valuation.
    pub carrez_living_space: f64,
    #[serde(default)]
    pub land_area: f64,
    #[serde(default)]
    pub rooms: u32,
    #[serde(default)]
    pub bedrooms: u32,
    pub property_type: PropertyType,
    #[serde(deserialize_with = "zip_code")]
    #[schemars(with = "String")]
    pub zip_code: String,
    #[serde(default)]
    pub annual_property_tax: f64,
    #[serde(default)]
    pub furniture_cost: f64,
    #[serde(default)]
    pub renovation: Option<Renovation>,
    #[serde(default)]
    pub has_garage: bool,
    /// Annual cost of the current energy consumption.
    #[serde(default)]
    pub energy_consumption_cost: f64,
    /// Current energy consumption (kWh/m²/year as printed on the DPE).
    #[serde(default)]
    pub energy_consumption: f64,
}

impl Good {
    pub fn renovation_cost(&self) -> f64 {
        self.renovation.as_ref().map(|r| r.cost).unwrap_or(0.0)
    }

    /// Post-renovation energy rating, if a non-blank one was recorded.
    pub fn post_renovation_rating(&self) -> Option<&str> {
        self.renovation
            .as_ref()
            .and_then(|r| r.energy_rating.as_deref())
            .map(str::trim)
            .filter(|rating| !rating.is_empty())
    }

    pub fn post_renovation_consumption(&self) -> Option<f64> {
        self.renovation.as_ref().and_then(|r| r.energy_consumption)
    }
}

/// Tunable approximations used by the evaluation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assumptions {
    #[serde(default = "default_notary_fee_rate")]
    pub notary_fee_rate: f64,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            notary_fee_rate: DEFAULT_NOTARY_FEE_RATE,
        }
    }
}

fn default_notary_fee_rate() -> f64 {
    DEFAULT_NOTARY_FEE_RATE
}

/// Accepts zip codes written as strings or as bare YAML integers.
/// Integers are padded back to five digits ("01000" parses as 1000).
fn zip_code<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(u32),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text.trim().to_string(),
        Raw::Number(number) => format!("{number:05}"),
    })
}
