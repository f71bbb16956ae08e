use greenprint::estimate::{
    DietInput, DietType, EnergyInput, FootprintInput, FootprintResult, HeatingType,
    RecyclingFrequency, TransportInput, WasteInput, estimate_total,
};

fn input(
    car: f64,
    transit: f64,
    flights: f64,
    kwh: f64,
    heating: HeatingType,
    diet: DietType,
    recycling: RecyclingFrequency,
    composting: bool,
) -> FootprintInput {
    FootprintInput {
        transport: TransportInput {
            car_miles_per_week: car,
            transit_rides_per_week: transit,
            flights_per_year: flights,
        },
        energy: EnergyInput {
            kwh_per_month: kwh,
            heating_type: heating,
        },
        diet: DietInput { diet_type: diet },
        waste: WasteInput {
            recycling_frequency: recycling,
            composting,
        },
    }
}

#[test]
fn total_equals_category_sum_across_a_grid_of_inputs() {
    let heatings = [
        HeatingType::NaturalGas,
        HeatingType::Oil,
        HeatingType::Electric,
        HeatingType::Renewable,
    ];
    let diets = [
        DietType::MeatLover,
        DietType::Average,
        DietType::Vegetarian,
        DietType::Vegan,
    ];
    for (i, heating) in heatings.into_iter().enumerate() {
        for (j, diet) in diets.into_iter().enumerate() {
            let input = input(
                25.0 * i as f64,
                j as f64,
                i as f64,
                150.0 * j as f64,
                heating,
                diet,
                RecyclingFrequency::Sometimes,
                i % 2 == 0,
            );
            let result = FootprintResult::compute(&input);
            let sum = result.transport + result.energy + result.diet + result.waste;
            assert!((result.total - sum).abs() < 1e-9);
            assert!((result.total - estimate_total(&input)).abs() < 1e-9);
            assert!(result.transport >= 0.0 && result.waste >= 0.0);
        }
    }
}

#[test]
fn result_timestamp_serializes_as_iso8601() {
    let input = input(
        0.0,
        0.0,
        0.0,
        0.0,
        HeatingType::Renewable,
        DietType::Vegan,
        RecyclingFrequency::Always,
        true,
    );
    let result = FootprintResult::compute(&input);
    let value = serde_json::to_value(&result).unwrap();
    let stamp = value["timestamp"].as_str().unwrap();
    assert!(stamp.contains('T'), "not ISO-8601: {stamp}");
    // Minimal footprint: renewable heat + vegan diet + diligent recycling.
    assert!((result.total - (0.1 + 1.5 + 0.15)).abs() < 1e-9);
}

#[test]
fn identical_inputs_produce_identical_category_values() {
    let a = input(
        123.4,
        5.0,
        3.0,
        512.5,
        HeatingType::Oil,
        DietType::MeatLover,
        RecyclingFrequency::Never,
        false,
    );
    let b = a;
    let ra = FootprintResult::compute(&a);
    let rb = FootprintResult::compute(&b);
    assert_eq!(ra.transport, rb.transport);
    assert_eq!(ra.energy, rb.energy);
    assert_eq!(ra.diet, rb.diet);
    assert_eq!(ra.waste, rb.waste);
    assert_eq!(ra.total, rb.total);
}
