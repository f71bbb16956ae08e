//! Everyday equivalents for a CO₂e figure, used in footprint responses.

struct Equivalent {
    factor: f64,
    text: &'static str,
}

const EQUIVALENTS: [Equivalent; 5] = [
    Equivalent {
        factor: 11.4,
        text: "charging your phone {n} million times",
    },
    Equivalent {
        factor: 0.5,
        text: "{n} round-trip flights from NYC to London",
    },
    Equivalent {
        factor: 4.6,
        text: "{n} months of average driving",
    },
    Equivalent {
        factor: 50.0,
        text: "planting {n} trees",
    },
    Equivalent {
        factor: 21.0,
        text: "diverting {n} trash bags from landfill",
    },
];

/// Human-scale comparisons for a footprint of `tons` CO₂e per year.
pub fn equivalents(tons: f64) -> Vec<String> {
    EQUIVALENTS
        .iter()
        .map(|e| e.text.replace("{n}", &format!("{:.1}", e.factor * tons)))
        .collect()
}
