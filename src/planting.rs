//! Quick planting estimate for a parcel, independent of the block layout.

use serde::{Deserialize, Serialize};

const M2_PER_HECTARE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantingEstimate {
    /// Total length of planting rows covering the area.
    pub linear_meters: u64,
    pub plants: u64,
}

pub fn hectares_to_m2(hectares: f64) -> f64 {
    hectares * M2_PER_HECTARE
}

/// Rows every `row_spacing_cm`, one plant every `plant_spacing_cm` along a row.
/// Both figures are floored independently from the exact row length.
pub fn estimate(area_m2: f64, row_spacing_cm: f64, plant_spacing_cm: f64) -> Option<PlantingEstimate> {
    let positive = |v: f64| v.is_finite() && v > 0.0;
    if !(positive(area_m2) && positive(row_spacing_cm) && positive(plant_spacing_cm)) {
        return None;
    }

    let linear_meters = area_m2 / (row_spacing_cm / 100.0);
    let plants = (linear_meters * (100.0 / plant_spacing_cm)).floor();
    Some(PlantingEstimate {
        linear_meters: linear_meters.floor() as u64,
        plants: plants as u64,
    })
}

/// Hectares above one hectare, square meters below.
pub fn format_area(area_m2: f64) -> String {
    if area_m2 > M2_PER_HECTARE {
        format!("{:.2} ha", area_m2 / M2_PER_HECTARE)
    } else {
        format!("{:.2} m²", area_m2)
    }
}
