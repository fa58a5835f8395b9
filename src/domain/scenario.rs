//! Scenario enumeration: every candidate property against every mortgage offer.

use serde::Serialize;

use super::entities::{
    Assumptions, CityIndex, CityStats, CurrentProperty, FamilyContext, Good, MortgageOffer,
};
use super::evaluation::{evaluate, EvaluationContext, EvaluationError, EvaluationResult};

/// Household inputs shared by all scenarios.
#[derive(Clone, Copy, Debug)]
pub struct Household<'a> {
    pub family: &'a FamilyContext,
    pub current_property: &'a CurrentProperty,
    pub assumptions: &'a Assumptions,
}

/// Restricts the scenarios to one good and/or one bank.
#[derive(Clone, Debug, Default)]
pub struct ScenarioFilter {
    pub good_id: Option<String>,
    pub bank: Option<String>,
}

impl ScenarioFilter {
    pub fn matches(&self, good: &Good, mortgage: &MortgageOffer) -> bool {
        if let Some(ref id) = self.good_id {
            if &good.id != id {
                return false;
            }
        }
        if let Some(ref bank) = self.bank {
            if !mortgage.bank.eq_ignore_ascii_case(bank) {
                return false;
            }
        }

        true
    }
}

/// One evaluated (good, mortgage) pair, ready for printing.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub good: String,
    pub bank: String,
    pub evaluation: EvaluationResult,
}

/// Index city statistics by zip code. Later entries win on duplicates.
pub fn city_index(stats: &[CityStats]) -> CityIndex {
    stats
        .iter()
        .map(|entry| (entry.zip_code.clone(), entry.clone()))
        .collect()
}

/// Evaluate the pairs selected by `filter`, goods in the outer loop.
pub fn evaluate_scenarios(
    household: Household<'_>,
    goods: &[Good],
    mortgages: &[MortgageOffer],
    city_stats: &CityIndex,
    filter: &ScenarioFilter,
) -> Result<Vec<ScenarioReport>, EvaluationError> {
    let mut reports = Vec::with_capacity(goods.len() * mortgages.len());

    for good in goods {
        for mortgage in mortgages {
            if !filter.matches(good, mortgage) {
                continue;
            }

            let ctx = EvaluationContext {
                family: household.family,
                current_property: household.current_property,
                mortgage,
                city_stats,
                assumptions: household.assumptions,
            };
            tracing::debug!(good = %good.id, bank = %mortgage.bank, "evaluating scenario");
            let evaluation = evaluate(&ctx, good)?;

            reports.push(ScenarioReport {
                good: good.id.clone(),
                bank: mortgage.bank.clone(),
                evaluation,
            });
        }
    }

    Ok(reports)
}
