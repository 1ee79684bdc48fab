//! Serde types for the hierarchical vehicle-description document.
//!
//! The function-expression grammar is a closed, externally tagged enum: an
//! operator the engine does not know is a deserialization failure and aborts
//! the load instead of silently corrupting the graph.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer};

use super::units::{AngleUnit, AreaUnit, InertiaUnit, LengthUnit, WeightUnit};

/// A scalar with an optional typed unit tag.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Valued<U> {
    pub value: f32,
    #[serde(default = "none")]
    pub unit: Option<U>,
}

fn none<U>() -> Option<U> {
    None
}

impl<U: Copy> Valued<U> {
    pub fn si(&self, to_si: impl Fn(U) -> f32) -> f32 {
        self.value * self.unit.map_or(1.0, to_si)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleDocument {
    #[serde(default)]
    pub name: Option<String>,
    pub metrics: MetricsDoc,
    pub mass_balance: MassBalanceDoc,
    pub aerodynamics: AerodynamicsDoc,
    /// Optional sub-documents (engine, flight-control systems) that may
    /// contribute further unbound functions. Entries with a `file` field are
    /// resolved against the document root before parsing.
    #[serde(default)]
    pub systems: Vec<SystemDoc>,
    #[serde(default)]
    pub engine: Option<SystemDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsDoc {
    #[serde(default)]
    pub wing_area: Option<Valued<AreaUnit>>,
    #[serde(default)]
    pub wing_span: Option<Valued<LengthUnit>>,
    #[serde(default)]
    pub wing_incidence: Option<Valued<AngleUnit>>,
    #[serde(default)]
    pub chord: Option<Valued<LengthUnit>>,
    #[serde(default)]
    pub htail_area: Option<Valued<AreaUnit>>,
    #[serde(default)]
    pub htail_arm: Option<Valued<LengthUnit>>,
    #[serde(default)]
    pub vtail_area: Option<Valued<AreaUnit>>,
    #[serde(default)]
    pub vtail_arm: Option<Valued<LengthUnit>>,
    #[serde(default)]
    pub locations: Vec<LocationDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocationDoc {
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default)]
    pub unit: Option<LengthUnit>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MassBalanceDoc {
    pub ixx: Valued<InertiaUnit>,
    pub iyy: Valued<InertiaUnit>,
    pub izz: Valued<InertiaUnit>,
    #[serde(default)]
    pub ixy: Option<Valued<InertiaUnit>>,
    #[serde(default)]
    pub ixz: Option<Valued<InertiaUnit>>,
    #[serde(default)]
    pub iyz: Option<Valued<InertiaUnit>>,
    /// Sign convention for the products of inertia.
    #[serde(default)]
    pub negated_crossproduct_inertia: bool,
    pub empty_weight: Valued<WeightUnit>,
    /// Centre of mass.
    pub location: LocationDoc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AerodynamicsDoc {
    /// External aerodynamics sub-document replacing this section.
    #[serde(default)]
    pub file: Option<String>,
    /// Functions not bound to any axis; they land in the dummy bucket and
    /// stay referenceable by name (e.g. a ground-effect coefficient table).
    #[serde(default)]
    pub functions: Vec<NamedFunctionDoc>,
    #[serde(default)]
    pub axes: Vec<AxisDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxisDoc {
    pub name: String,
    #[serde(default)]
    pub functions: Vec<NamedFunctionDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemDoc {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub functions: Vec<NamedFunctionDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedFunctionDoc {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub function: FunctionDoc,
}

/// One function expression, written as a single-key map whose key names the
/// operator (`value: 2.5`, `product: [...]`, `table: {...}`). Variants mirror
/// the closed operator set of the evaluator.
#[derive(Debug, Clone)]
pub enum FunctionDoc {
    Value(f32),
    Property(PropertyDoc),
    Product(Vec<FunctionDoc>),
    Sum(Vec<FunctionDoc>),
    Avg(Vec<FunctionDoc>),
    Difference(Vec<FunctionDoc>),
    Quotient(Vec<FunctionDoc>),
    Pow(Vec<FunctionDoc>),
    Abs(Box<FunctionDoc>),
    Sin(Box<FunctionDoc>),
    Cos(Box<FunctionDoc>),
    Tan(Box<FunctionDoc>),
    Asin(Box<FunctionDoc>),
    Acos(Box<FunctionDoc>),
    Atan(Box<FunctionDoc>),
    Fraction(Box<FunctionDoc>),
    Integer(Box<FunctionDoc>),
    Lt(Vec<FunctionDoc>),
    Le(Vec<FunctionDoc>),
    Gt(Vec<FunctionDoc>),
    Ge(Vec<FunctionDoc>),
    Eq(Vec<FunctionDoc>),
    Not(Box<FunctionDoc>),
    Ifthen(Vec<FunctionDoc>),
    Table(TableDoc),
}

const OPERATORS: &[&str] = &[
    "value",
    "property",
    "product",
    "sum",
    "avg",
    "difference",
    "quotient",
    "pow",
    "abs",
    "sin",
    "cos",
    "tan",
    "asin",
    "acos",
    "atan",
    "fraction",
    "integer",
    "lt",
    "le",
    "gt",
    "ge",
    "eq",
    "not",
    "ifthen",
    "table",
];

// Hand-written so the operator key can stay an ordinary map key in the
// document; derived external tagging would demand YAML `!` tags instead. An
// unrecognized key is still a hard deserialization failure.
impl<'de> Deserialize<'de> for FunctionDoc {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FunctionDocVisitor;

        impl<'de> Visitor<'de> for FunctionDocVisitor {
            type Value = FunctionDoc;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key map naming a function operator")
            }

            fn visit_map<A>(self, mut map: A) -> Result<FunctionDoc, A::Error>
            where
                A: MapAccess<'de>,
            {
                let key: String = map
                    .next_key()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let doc = match key.as_str() {
                    "value" => FunctionDoc::Value(map.next_value()?),
                    "property" => FunctionDoc::Property(map.next_value()?),
                    "product" => FunctionDoc::Product(map.next_value()?),
                    "sum" => FunctionDoc::Sum(map.next_value()?),
                    "avg" => FunctionDoc::Avg(map.next_value()?),
                    "difference" => FunctionDoc::Difference(map.next_value()?),
                    "quotient" => FunctionDoc::Quotient(map.next_value()?),
                    "pow" => FunctionDoc::Pow(map.next_value()?),
                    "abs" => FunctionDoc::Abs(map.next_value()?),
                    "sin" => FunctionDoc::Sin(map.next_value()?),
                    "cos" => FunctionDoc::Cos(map.next_value()?),
                    "tan" => FunctionDoc::Tan(map.next_value()?),
                    "asin" => FunctionDoc::Asin(map.next_value()?),
                    "acos" => FunctionDoc::Acos(map.next_value()?),
                    "atan" => FunctionDoc::Atan(map.next_value()?),
                    "fraction" => FunctionDoc::Fraction(map.next_value()?),
                    "integer" => FunctionDoc::Integer(map.next_value()?),
                    "lt" => FunctionDoc::Lt(map.next_value()?),
                    "le" => FunctionDoc::Le(map.next_value()?),
                    "gt" => FunctionDoc::Gt(map.next_value()?),
                    "ge" => FunctionDoc::Ge(map.next_value()?),
                    "eq" => FunctionDoc::Eq(map.next_value()?),
                    "not" => FunctionDoc::Not(map.next_value()?),
                    "ifthen" => FunctionDoc::Ifthen(map.next_value()?),
                    "table" => FunctionDoc::Table(map.next_value()?),
                    other => return Err(de::Error::unknown_variant(other, OPERATORS)),
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::custom(
                        "function map must hold exactly one operator",
                    ));
                }
                Ok(doc)
            }
        }

        deserializer.deserialize_map(FunctionDocVisitor)
    }
}

/// A property reference, optionally pre-seeding a literal value.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyDoc {
    Name(String),
    Seeded { name: String, value: f32 },
}

impl PropertyDoc {
    pub fn name(&self) -> &str {
        match self {
            PropertyDoc::Name(n) => n,
            PropertyDoc::Seeded { name, .. } => name,
        }
    }

    pub fn seed(&self) -> Option<f32> {
        match self {
            PropertyDoc::Name(_) => None,
            PropertyDoc::Seeded { value, .. } => Some(*value),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableDoc {
    pub independent_var: Vec<IndependentVarDoc>,
    /// Newline-separated rows of whitespace-separated floats; the first row
    /// of a 2-D table holds the column breakpoints.
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndependentVarDoc {
    #[serde(default)]
    pub lookup: Option<LookupKind>,
    pub property: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Row,
    Column,
}
