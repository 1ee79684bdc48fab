//! Stateless International Standard Atmosphere, seven layers.
//!
//! All functions are pure; the model is indexed by geopotential altitude and
//! clamps to the edge layers outside the tabulated range.

use crate::utils::constants::*;
use crate::utils::math::{search_ordered, Bracket};

// geopotential altitude breakpoints (m)
const GEOPOT_ALT: [f32; 7] = [0.0, 11_000.0, 20_000.0, 32_000.0, 47_000.0, 51_000.0, 71_000.0];
// base temperature per layer (K)
const STD_TEMP: [f32; 7] = [288.15, 216.65, 216.65, 228.65, 270.65, 270.65, 214.65];
// temperature lapse rate per layer (K/m)
const LAPSE_RATE: [f32; 7] = [-0.0065, 0.0, 0.001, 0.0028, 0.0, -0.0028, -0.002];
// base static pressure per layer (Pa)
const PRESSURE: [f32; 7] = [
    101_325.0, 22_632.1, 5_474.89, 868.019, 110.906, 66.9389, 3.95642,
];

/// Geopotential altitude from geometric altitude.
pub fn potential_altitude(geometric_alt: f32) -> f32 {
    (geometric_alt * EARTH_RADIUS) / (EARTH_RADIUS + geometric_alt)
}

/// Static pressure (Pa) and temperature (K) at a geometric altitude.
pub fn pressure_temperature(altitude: f32) -> (f32, f32) {
    let geopot_alt = potential_altitude(altitude);
    let i = match search_ordered(&GEOPOT_ALT, geopot_alt) {
        Bracket::Below => return (PRESSURE[0], STD_TEMP[0]),
        Bracket::Above => {
            let last = PRESSURE.len() - 1;
            return (PRESSURE[last], STD_TEMP[last]);
        }
        Bracket::Within(i) => i,
    };

    let delta_h = geopot_alt - GEOPOT_ALT[i];
    let t0 = STD_TEMP[i];
    let p0 = PRESSURE[i];
    let lapse_rate = LAPSE_RATE[i];
    let temperature = t0 + lapse_rate * delta_h;
    let pressure = if lapse_rate != 0.0 {
        let exp = GRAVITY / (R_SPECIFIC * lapse_rate);
        p0 * (t0 / temperature).powf(exp)
    } else {
        // isothermal layer
        p0 * (-GRAVITY * delta_h / (R_SPECIFIC * t0)).exp()
    };
    (pressure, temperature)
}

/// Air density (kg/m^3) from static pressure and temperature.
pub fn density(pressure: f32, temperature: f32) -> f32 {
    pressure / (R_SPECIFIC * temperature)
}

/// Air density at a geometric altitude.
pub fn density_at(altitude: f32) -> f32 {
    let (p, t) = pressure_temperature(altitude);
    density(p, t)
}

/// Speed of sound (m/s).
pub fn sound_speed(temperature: f32) -> f32 {
    (GAMMA_AIR * R_SPECIFIC * temperature).sqrt()
}

/// Dynamic viscosity (Pa·s) via Sutherland's formula.
pub fn viscosity(temperature: f32) -> f32 {
    SUTHERLAND_BETA * temperature.powf(1.5) / (SUTHERLAND_CONSTANT + temperature)
}
