//! Unit tags and their SI scale factors.
//!
//! Document sections carry typed unit tags (serde enums below); property
//! identifiers carry free-form suffix tags resolved by [`tag_scale`].

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::utils::constants::GRAVITY;

const FT: f32 = 0.30480;
const IN: f32 = 0.025400;
const FT2: f32 = 0.092903;
const SLUG_FT2: f32 = 14.5939 * FT2;
const LBS: f32 = 0.453592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AreaUnit {
    #[serde(rename = "FT2")]
    SquareFeet,
    #[serde(rename = "M2")]
    SquareMetres,
}

impl AreaUnit {
    pub fn to_si(self) -> f32 {
        match self {
            AreaUnit::SquareFeet => FT2,
            AreaUnit::SquareMetres => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LengthUnit {
    #[serde(rename = "FT")]
    Feet,
    #[serde(rename = "IN")]
    Inches,
    #[serde(rename = "M")]
    Metres,
}

impl LengthUnit {
    pub fn to_si(self) -> f32 {
        match self {
            LengthUnit::Feet => FT,
            LengthUnit::Inches => IN,
            LengthUnit::Metres => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngleUnit {
    #[serde(rename = "DEG")]
    Degrees,
    #[serde(rename = "RAD")]
    Radians,
}

impl AngleUnit {
    pub fn to_si(self) -> f32 {
        match self {
            AngleUnit::Degrees => PI / 180.0,
            AngleUnit::Radians => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InertiaUnit {
    #[serde(rename = "SLUG*FT2")]
    SlugSquareFeet,
    #[serde(rename = "KG*M2")]
    KilogramSquareMetres,
}

impl InertiaUnit {
    pub fn to_si(self) -> f32 {
        match self {
            InertiaUnit::SlugSquareFeet => SLUG_FT2,
            InertiaUnit::KilogramSquareMetres => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[serde(rename = "LBS")]
    Pounds,
    #[serde(rename = "KG")]
    Kilograms,
}

impl WeightUnit {
    pub fn to_si(self) -> f32 {
        match self {
            WeightUnit::Pounds => LBS,
            WeightUnit::Kilograms => 1.0,
        }
    }
}

/// SI scale for a property-identifier unit suffix. Unknown tags and the
/// metric default `1?` scale by 1.
pub fn tag_scale(tag: &str) -> f32 {
    match tag {
        "ft" => FT,
        "in" => IN,
        "sqft" => FT2,
        "deg" => PI / 180.0,
        "psf" => LBS / FT2 * GRAVITY,
        "slugs_ft3" => SLUG_FT2 / FT,
        _ => 1.0, // "rad", "norm", "rad-sec", "1?" and anything unrecognized
    }
}
