//! Pure footprint estimation.
//!
//! Every function in this module is deterministic and total: well-typed input
//! always yields a value, identical input always yields an identical value,
//! and nothing here touches shared state or performs I/O. Range validation
//! (slider bounds and the like) is the presentation layer's job; the engine
//! itself never clamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::factors;

/// Weekly travel habits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportInput {
    pub car_miles_per_week: f64,
    pub transit_rides_per_week: f64,
    pub flights_per_year: f64,
}

/// Primary heating fuel for the home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeatingType {
    NaturalGas,
    Oil,
    Electric,
    Renewable,
}

impl HeatingType {
    /// Flat annual adder in tons CO₂e for the heating fuel.
    pub fn annual_tons(self) -> f64 {
        match self {
            HeatingType::NaturalGas => factors::HEATING_NATURAL_GAS_TONS,
            HeatingType::Oil => factors::HEATING_OIL_TONS,
            HeatingType::Electric => factors::HEATING_ELECTRIC_TONS,
            HeatingType::Renewable => factors::HEATING_RENEWABLE_TONS,
        }
    }
}

/// Household energy habits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyInput {
    pub kwh_per_month: f64,
    pub heating_type: HeatingType,
}

/// Diet category. Unrecognized wire values read as [`DietType::Average`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum DietType {
    MeatLover,
    Average,
    Vegetarian,
    Vegan,
}

impl From<String> for DietType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "meat_lover" => DietType::MeatLover,
            "vegetarian" => DietType::Vegetarian,
            "vegan" => DietType::Vegan,
            _ => DietType::Average,
        }
    }
}

impl DietType {
    /// Annual footprint in tons CO₂e for the diet.
    pub fn annual_tons(self) -> f64 {
        match self {
            DietType::MeatLover => factors::DIET_MEAT_LOVER_TONS,
            DietType::Average => factors::DIET_AVERAGE_TONS,
            DietType::Vegetarian => factors::DIET_VEGETARIAN_TONS,
            DietType::Vegan => factors::DIET_VEGAN_TONS,
        }
    }
}

/// Diet habits. Wrapped so the wire form matches `{"type": "vegan"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietInput {
    #[serde(rename = "type")]
    pub diet_type: DietType,
}

/// How often the household recycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecyclingFrequency {
    Always,
    Sometimes,
    Never,
}

impl RecyclingFrequency {
    /// Annual waste footprint in tons CO₂e before the composting credit.
    pub fn annual_tons(self) -> f64 {
        match self {
            RecyclingFrequency::Always => factors::RECYCLING_ALWAYS_TONS,
            RecyclingFrequency::Sometimes => factors::RECYCLING_SOMETIMES_TONS,
            RecyclingFrequency::Never => factors::RECYCLING_NEVER_TONS,
        }
    }
}

/// Waste habits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WasteInput {
    pub recycling_frequency: RecyclingFrequency,
    pub composting: bool,
}

/// Raw habit data collected by the wizard, one block per category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FootprintInput {
    pub transport: TransportInput,
    pub energy: EnergyInput,
    pub diet: DietInput,
    pub waste: WasteInput,
}

/// Annual transport emissions in tons CO₂e.
pub fn estimate_transport(input: &TransportInput) -> f64 {
    let car =
        input.car_miles_per_week * factors::WEEKS_PER_YEAR * factors::CAR_KG_PER_MILE
            / factors::KG_PER_TON;
    let transit = input.transit_rides_per_week
        * factors::WEEKS_PER_YEAR
        * factors::TRANSIT_MILES_PER_RIDE
        * factors::TRANSIT_KG_PER_MILE
        / factors::KG_PER_TON;
    let flights = input.flights_per_year * factors::FLIGHT_KG_PER_FLIGHT / factors::KG_PER_TON;
    car + transit + flights
}

/// Annual home-energy emissions in tons CO₂e: metered electricity plus a
/// flat heating adder.
pub fn estimate_energy(input: &EnergyInput) -> f64 {
    let electricity = input.kwh_per_month
        * factors::MONTHS_PER_YEAR
        * factors::ELECTRICITY_KG_PER_KWH
        / factors::KG_PER_TON;
    electricity + input.heating_type.annual_tons()
}

/// Annual diet emissions in tons CO₂e, a direct table lookup.
pub fn estimate_diet(input: &DietInput) -> f64 {
    input.diet_type.annual_tons()
}

/// Annual waste emissions in tons CO₂e. The composting credit can bring the
/// value as low as 0.15; the base table keeps it above zero.
pub fn estimate_waste(input: &WasteInput) -> f64 {
    let credit = if input.composting {
        factors::COMPOSTING_CREDIT_TONS
    } else {
        0.0
    };
    input.recycling_frequency.annual_tons() + credit
}

/// Total annual emissions in tons CO₂e, the sum of the four categories.
pub fn estimate_total(input: &FootprintInput) -> f64 {
    estimate_transport(&input.transport)
        + estimate_energy(&input.energy)
        + estimate_diet(&input.diet)
        + estimate_waste(&input.waste)
}

/// A computed footprint. Immutable once created: each wizard submission
/// produces a fresh record, never an update to a prior one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootprintResult {
    pub transport: f64,
    pub energy: f64,
    pub diet: f64,
    pub waste: f64,
    /// Always the exact sum of the four category values.
    pub total: f64,
    pub timestamp: DateTime<Utc>,
}

impl FootprintResult {
    /// Evaluate all four category formulas over `input` and stamp the result.
    pub fn compute(input: &FootprintInput) -> Self {
        let transport = estimate_transport(&input.transport);
        let energy = estimate_energy(&input.energy);
        let diet = estimate_diet(&input.diet);
        let waste = estimate_waste(&input.waste);
        Self {
            transport,
            energy,
            diet,
            waste,
            total: transport + energy + diet + waste,
            timestamp: Utc::now(),
        }
    }
}
