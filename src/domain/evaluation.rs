//! Financial evaluation of one candidate property against one mortgage offer.
//!
//! `evaluate` is pure: it reads the household context and the good, and
//! returns a fresh `EvaluationResult`. Monetary figures are rounded to the
//! nearest euro when a section is built; rates and ratios keep full precision.

use serde::Serialize;
use thiserror::Error;

use super::entities::{
    Assumptions, CityIndex, CurrentProperty, FamilyContext, Good, MortgageOffer,
};

pub const CITY_STATS_NOT_FOUND: &str = "City stats not found";

#[derive(Clone, Debug, PartialEq, Error)]
pub enum EvaluationError {
    #[error("{good}: {quantity} must be a positive number, got {value}")]
    Degenerate {
        good: String,
        quantity: &'static str,
        value: f64,
    },
    #[error("{good}: energy rating {rating:?} has no post-renovation consumption")]
    MissingConsumption { good: String, rating: String },
}

/// Everything an evaluation needs besides the good itself.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    pub family: &'a FamilyContext,
    pub current_property: &'a CurrentProperty,
    pub mortgage: &'a MortgageOffer,
    pub city_stats: &'a CityIndex,
    pub assumptions: &'a Assumptions,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub purchase_cost: PurchaseCost,
    pub mortgage: MortgageSummary,
    pub operational_cost: OperationalCost,
    pub performance: Performance,
    pub renting_performance: RentingPerformance,
    pub cost_summary: CostSummary,
    pub alerts: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PurchaseCost {
    pub price: f64,
    pub notary_fees: f64,
    pub renovation_cost: f64,
    pub furniture_cost: f64,
    /// Price + fees + works + furniture.
    pub total_purchase_cost: f64,
    pub mortgage_amount: f64,
    pub contribution: f64,
    /// Family assets left after the contribution.
    pub remaining_assets: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MortgageSummary {
    pub bank: String,
    pub amount: f64,
    pub interest_rate: f64,
    pub duration_years: u32,
    pub monthly_cost: f64,
    pub monthly_insurance: f64,
    pub monthly_payment: f64,
    pub total_cost_of_loan: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyCostSource {
    /// Current energy bill scaled by the post-renovation consumption ratio.
    RenovationProjection,
    /// Charges of the current property scaled by living space.
    ScaledCurrentCharges,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OperationalCost {
    pub monthly_property_tax: f64,
    pub monthly_energy_cost: f64,
    pub energy_cost_source: EnergyCostSource,
    /// Property tax and energy, per month.
    pub monthly_housing_charge: f64,
    pub mortgage_monthly_cost: f64,
    pub monthly_total_expenses: f64,
    /// Difference with the current monthly expenses, e.g. "350 (8%)".
    pub monthly_expenses_delta: String,
    pub annual_housing_cost: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Performance {
    pub price_per_m2: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_average_price_per_m2: Option<f64>,
    /// Distance to the city average in percent, positive when above.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deviation_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RentingPerformance {
    pub monthly_income: f64,
    pub monthly_charges: f64,
    pub management_fee_rate: f64,
    pub management_fee: f64,
    pub net_monthly_gain: f64,
    /// Rent left after the agency fee, offsetting the family expenses.
    pub additional_rental_income: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CostSummary {
    pub current_property_tax: f64,
    pub candidate_property_tax: f64,
    pub total_annual_property_tax: f64,
}

pub fn evaluate(
    ctx: &EvaluationContext<'_>,
    good: &Good,
) -> Result<EvaluationResult, EvaluationError> {
    let mut alerts = Vec::new();

    let purchase_cost = purchase_cost(ctx, good, &mut alerts);
    let performance = performance(ctx, good, &mut alerts)?;
    let rental = RentalFigures::of(ctx.current_property);
    let operational_cost = operational_cost(ctx, good, &rental)?;

    let current_tax = ctx.current_property.annual_property_tax;
    let cost_summary = CostSummary {
        current_property_tax: money(current_tax),
        candidate_property_tax: money(good.annual_property_tax),
        total_annual_property_tax: money(current_tax + good.annual_property_tax),
    };

    Ok(EvaluationResult {
        purchase_cost,
        mortgage: mortgage_summary(ctx.mortgage),
        operational_cost,
        performance,
        renting_performance: rental.section(ctx.current_property),
        cost_summary,
        alerts,
    })
}

fn purchase_cost(
    ctx: &EvaluationContext<'_>,
    good: &Good,
    alerts: &mut Vec<String>,
) -> PurchaseCost {
    let notary_fees = good.price * ctx.assumptions.notary_fee_rate;
    let renovation_cost = good.renovation_cost();
    let total = good.price + notary_fees + renovation_cost + good.furniture_cost;
    let contribution = total - ctx.mortgage.amount;
    let threshold = ctx.family.contribution_threshold;

    if contribution > threshold {
        alerts.push(format!(
            "Contribution is above threshold ({}k > {}k)",
            whole(contribution / 1000.0),
            whole(threshold / 1000.0)
        ));
    }

    PurchaseCost {
        price: money(good.price),
        notary_fees: money(notary_fees),
        renovation_cost: money(renovation_cost),
        furniture_cost: money(good.furniture_cost),
        total_purchase_cost: money(total),
        mortgage_amount: money(ctx.mortgage.amount),
        contribution: money(contribution),
        remaining_assets: money(ctx.family.total_assets - contribution),
    }
}

fn performance(
    ctx: &EvaluationContext<'_>,
    good: &Good,
    alerts: &mut Vec<String>,
) -> Result<Performance, EvaluationError> {
    let carrez = positive(good, "Carrez living space", good.carrez_living_space)?;
    let price_per_m2 = good.price / carrez;

    let mut performance = Performance {
        price_per_m2: money(price_per_m2),
        city_average_price_per_m2: None,
        deviation_percent: None,
        comment: None,
    };

    let Some(stats) = ctx.city_stats.get(&good.zip_code) else {
        alerts.push(CITY_STATS_NOT_FOUND.to_string());
        return Ok(performance);
    };

    let average = stats.average_price_per_m2(good.property_type);
    if !(average.is_finite() && average > 0.0) {
        alerts.push(format!(
            "City average {} price is not usable for {} ({average})",
            good.property_type.label(),
            good.zip_code
        ));
        return Ok(performance);
    }

    let (deviation, comment) = if price_per_m2 > average {
        let pct = (price_per_m2 - average) / average * 100.0;
        (pct, format!("{}% above the average", whole(pct)))
    } else {
        let pct = (average - price_per_m2) / average * 100.0;
        // Subtracting from zero keeps an exact match at +0.0.
        (0.0 - pct, format!("{}% below the average", whole(pct)))
    };

    performance.city_average_price_per_m2 = Some(money(average));
    performance.deviation_percent = Some(deviation);
    performance.comment = Some(format!(
        "{comment} ({} vs {} per m²)",
        whole(price_per_m2),
        whole(average)
    ));
    Ok(performance)
}

/// Monthly energy cost of the good and how it was obtained.
fn monthly_energy_cost(
    ctx: &EvaluationContext<'_>,
    good: &Good,
) -> Result<(f64, EnergyCostSource), EvaluationError> {
    if let Some(rating) = good.post_renovation_rating() {
        let target = good.post_renovation_consumption().ok_or_else(|| {
            EvaluationError::MissingConsumption {
                good: good.id.clone(),
                rating: rating.to_string(),
            }
        })?;
        let current = positive(good, "current energy consumption", good.energy_consumption)?;
        let monthly = good.energy_consumption_cost * (target / current) / 12.0;
        return Ok((monthly, EnergyCostSource::RenovationProjection));
    }

    // No energy data for the good: assume charges grow with the floor area.
    let current = ctx.current_property;
    let surface = positive(good, "current property surface", current.surface)?;
    let monthly = current.monthly_charges * (good.living_space / surface);
    Ok((monthly, EnergyCostSource::ScaledCurrentCharges))
}

fn operational_cost(
    ctx: &EvaluationContext<'_>,
    good: &Good,
    rental: &RentalFigures,
) -> Result<OperationalCost, EvaluationError> {
    let family = ctx.family;
    let (energy, energy_cost_source) = monthly_energy_cost(ctx, good)?;
    let monthly_tax = good.annual_property_tax / 12.0;
    let housing_charge = monthly_tax + energy;
    let mortgage_cost = ctx.mortgage.monthly_payment();

    let mut total =
        family.monthly_expenses - rental.additional_income + housing_charge + mortgage_cost;
    // A garage replaces the rented parking spot.
    if good.has_garage {
        total -= family.monthly_parking_fee;
    }
    // Both are no longer needed once the family has moved.
    total -= family.secondary_residence_monthly_cost;
    total -= family.monthly_electricity_cost;

    Ok(OperationalCost {
        monthly_property_tax: money(monthly_tax),
        monthly_energy_cost: money(energy),
        energy_cost_source,
        monthly_housing_charge: money(housing_charge),
        mortgage_monthly_cost: money(mortgage_cost),
        monthly_total_expenses: money(total),
        monthly_expenses_delta: expenses_delta(total, family.monthly_expenses),
        annual_housing_cost: money(
            (housing_charge + mortgage_cost) * 12.0 + good.annual_property_tax,
        ),
    })
}

fn expenses_delta(total: f64, baseline: f64) -> String {
    let delta = total - baseline;
    if baseline > 0.0 {
        format!("{} ({}%)", whole(delta), whole(delta / baseline * 100.0))
    } else {
        format!("{} (n/a)", whole(delta))
    }
}

/// Unrounded rental figures of the current property. They feed both the
/// renting section and the monthly expenses of the candidate.
struct RentalFigures {
    management_fee: f64,
    net_monthly_gain: f64,
    additional_income: f64,
}

impl RentalFigures {
    fn of(current: &CurrentProperty) -> Self {
        let net_rent = current.monthly_rental_income - current.monthly_charges;
        let rate = current.management_fee_rate;
        let management_fee = net_rent * rate;

        Self {
            management_fee,
            net_monthly_gain: net_rent * (1.0 - rate)
                - current.annual_property_tax / 12.0
                - current.monthly_mortgage,
            additional_income: current.monthly_rental_income - management_fee,
        }
    }

    fn section(&self, current: &CurrentProperty) -> RentingPerformance {
        RentingPerformance {
            monthly_income: money(current.monthly_rental_income),
            monthly_charges: money(current.monthly_charges),
            management_fee_rate: current.management_fee_rate,
            management_fee: money(self.management_fee),
            net_monthly_gain: money(self.net_monthly_gain),
            additional_rental_income: money(self.additional_income),
        }
    }
}

fn mortgage_summary(offer: &MortgageOffer) -> MortgageSummary {
    MortgageSummary {
        bank: offer.bank.clone(),
        amount: money(offer.amount),
        interest_rate: offer.interest_rate,
        duration_years: offer.duration_years,
        monthly_cost: money(offer.monthly_cost_excluding_insurance()),
        monthly_insurance: money(offer.monthly_insurance),
        monthly_payment: money(offer.monthly_payment()),
        total_cost_of_loan: money(offer.total_cost_of_loan()),
    }
}

fn positive(good: &Good, quantity: &'static str, value: f64) -> Result<f64, EvaluationError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EvaluationError::Degenerate {
            good: good.id.clone(),
            quantity,
            value,
        })
    }
}

fn money(value: f64) -> f64 {
    value.round()
}

/// Integer rendering for messages. Halves round away from zero.
fn whole(value: f64) -> i64 {
    value.round() as i64
}
