//! Emission factors used by the estimation engine.
//!
//! All factors are process-wide constants in kg CO₂e per unit unless noted
//! otherwise. They are loaded once at compile time and never mutated.

/// kg CO₂e per mile driven.
pub const CAR_KG_PER_MILE: f64 = 0.4;

/// kg CO₂e per passenger-mile of public transit.
pub const TRANSIT_KG_PER_MILE: f64 = 0.089;

/// Miles attributed to one weekly transit ride (five one-way legs).
pub const TRANSIT_MILES_PER_RIDE: f64 = 5.0;

/// kg CO₂e per round-trip flight.
pub const FLIGHT_KG_PER_FLIGHT: f64 = 1100.0;

/// kg CO₂e per kWh of grid electricity.
pub const ELECTRICITY_KG_PER_KWH: f64 = 0.386;

pub const WEEKS_PER_YEAR: f64 = 52.0;
pub const MONTHS_PER_YEAR: f64 = 12.0;
pub const KG_PER_TON: f64 = 1000.0;

/// Flat annual heating adders, tons CO₂e per year. These are deliberate
/// simplifications rather than metered values.
pub const HEATING_NATURAL_GAS_TONS: f64 = 2.0;
pub const HEATING_OIL_TONS: f64 = 2.5;
pub const HEATING_ELECTRIC_TONS: f64 = 0.5;
pub const HEATING_RENEWABLE_TONS: f64 = 0.1;

/// Annual diet footprints, tons CO₂e per year.
pub const DIET_MEAT_LOVER_TONS: f64 = 3.3;
pub const DIET_AVERAGE_TONS: f64 = 2.5;
pub const DIET_VEGETARIAN_TONS: f64 = 1.7;
pub const DIET_VEGAN_TONS: f64 = 1.5;

/// Annual waste footprints by recycling habit, tons CO₂e per year.
pub const RECYCLING_ALWAYS_TONS: f64 = 0.2;
pub const RECYCLING_SOMETIMES_TONS: f64 = 0.4;
pub const RECYCLING_NEVER_TONS: f64 = 0.8;

/// Credit applied when the household composts.
pub const COMPOSTING_CREDIT_TONS: f64 = -0.05;
