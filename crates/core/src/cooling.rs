//! Cooling power calculation.
//!
//! The required cooling capacity of a room is derived from the heat output
//! of the equipment placed in it and the room's air volume:
//!
//! ```text
//! P = Σ(TDP_W × quantity) / 1000        heat load, kW
//! V = area × height                     room volume, m³
//! Q = P × (1.3 + 15 / V)                required cooling, kW
//! ```
//!
//! `V` must be strictly positive. [`RoomGeometry`] can only be built from
//! finite, positive dimensions, so the division is always defined.

/// Base safety multiplier applied to the heat load.
pub const BASE_FACTOR: f64 = 1.3;

/// Volume-dependent correction numerator (m³).
pub const VOLUME_CORRECTION: f64 = 15.0;

/// Watts per kilowatt.
const WATTS_PER_KW: f64 = 1000.0;

/// A room's area and height, both known to be finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomGeometry {
    area_m2: f64,
    height_m: f64,
}

impl RoomGeometry {
    /// Build a geometry, returning `None` if either dimension is not a finite
    /// positive number.
    pub fn new(area_m2: f64, height_m: f64) -> Option<Self> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(area_m2) && valid(height_m) {
            Some(Self { area_m2, height_m })
        } else {
            None
        }
    }

    /// Build a geometry from the nullable columns of a request row.
    pub fn from_optional(area_m2: Option<f64>, height_m: Option<f64>) -> Option<Self> {
        Self::new(area_m2?, height_m?)
    }

    pub fn area_m2(&self) -> f64 {
        self.area_m2
    }

    pub fn height_m(&self) -> f64 {
        self.height_m
    }

    /// Room volume in cubic metres.
    pub fn volume_m3(&self) -> f64 {
        self.area_m2 * self.height_m
    }
}

/// One ledger line as seen by the calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatSource {
    /// Thermal design power of a single unit, in watts.
    pub tdp_watts: i32,
    /// Number of units.
    pub quantity: i32,
}

/// Total heat load in kilowatts.
pub fn heat_load_kw(sources: &[HeatSource]) -> f64 {
    let watts: f64 = sources
        .iter()
        .map(|s| f64::from(s.tdp_watts) * f64::from(s.quantity))
        .sum();
    watts / WATTS_PER_KW
}

/// Required cooling capacity in kilowatts.
pub fn required_cooling_kw(sources: &[HeatSource], room: RoomGeometry) -> f64 {
    heat_load_kw(sources) * (BASE_FACTOR + VOLUME_CORRECTION / room.volume_m3())
}
