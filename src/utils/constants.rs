pub const GRAVITY: f32 = 9.80665; // m/s^2
pub const EARTH_RADIUS: f32 = 6_356_766.0; // m, polar radius used for geopotential altitude
pub const R_SPECIFIC: f32 = 287.058; // specific gas constant of air, J/(kg·K)
pub const GAMMA_AIR: f32 = 1.4; // heat capacity ratio
pub const SUTHERLAND_CONSTANT: f32 = 111.0; // K
pub const SUTHERLAND_BETA: f32 = 1.460846e-6; // kg/(m·s·K^0.5)

pub const ISA_SEA_LEVEL_TEMP: f32 = 288.15; // K
pub const ISA_SEA_LEVEL_PRESSURE: f32 = 101_325.0; // Pa
