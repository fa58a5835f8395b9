//! Domain logic for real-estate evaluation lives here.

pub mod entities;
pub mod evaluation;
pub mod scenario;

#[allow(unused_imports)]
pub use entities::{
    Assumptions, CityIndex, CityStats, CurrentProperty, FamilyContext, Good, MortgageOffer,
    PropertyType, Renovation,
};
#[allow(unused_imports)]
pub use evaluation::{evaluate, EvaluationContext, EvaluationError, EvaluationResult};
#[allow(unused_imports)]
pub use scenario::{city_index, evaluate_scenarios, Household, ScenarioFilter, ScenarioReport};
