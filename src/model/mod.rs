//! The assembled dynamics model: property store, named function graph, axis
//! bindings and the physics components, evaluated together once per tick.

pub mod snapshot;

use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::components::{Aero, FlightControlSys, Motion, Vehicle};
use crate::functions::Function;
use crate::properties::PropertyStore;
use crate::utils::ModelError;

pub use snapshot::ModelSnapshot;

/// Name under which a document may register a ground-effect lift factor; the
/// air-data update evaluates it each tick if present.
pub const GROUND_EFFECT_FUNCTION: &str = "aero/function/kCLge";

/// Aggregation bucket for a function. The six force/moment axes feed the
/// output wrench; `Dummy` holds functions that are only referenced by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisDimension {
    Drag,
    Side,
    Lift,
    Roll,
    Pitch,
    Yaw,
    Dummy,
}

pub const AXIS_COUNT: usize = 7;

impl AxisDimension {
    /// Maps a document axis name; anything unrecognized lands in `Dummy`
    /// with an error log, so one bad axis never aborts a load.
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "DRAG" => AxisDimension::Drag,
            "SIDE" => AxisDimension::Side,
            "LIFT" => AxisDimension::Lift,
            "ROLL" => AxisDimension::Roll,
            "PITCH" => AxisDimension::Pitch,
            "YAW" => AxisDimension::Yaw,
            other => {
                error!(axis = other, "unknown axis name, functions parked on dummy axis");
                AxisDimension::Dummy
            }
        }
    }

    pub fn index(self) -> usize {
        match self {
            AxisDimension::Drag => 0,
            AxisDimension::Side => 1,
            AxisDimension::Lift => 2,
            AxisDimension::Roll => 3,
            AxisDimension::Pitch => 4,
            AxisDimension::Yaw => 5,
            AxisDimension::Dummy => 6,
        }
    }
}

/// A named root of the expression graph.
#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub description: Option<String>,
    pub root: Function,
}

/// Host kinematic inputs for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct Kinematics {
    /// Body-relative airflow velocity, m/s.
    pub velocity: Vector3<f32>,
    /// Body-frame acceleration of `velocity`; enables closed-form flow-angle
    /// rates when supplied.
    pub velocity_dot: Option<Vector3<f32>>,
    /// Body angular rates (p, q, r), rad/s.
    pub angular: Vector3<f32>,
    /// Geometric altitude above sea level, m.
    pub altitude: f32,
    /// Terrain elevation above sea level, m.
    pub terrain_altitude: f32,
    /// Roll attitude, rad.
    pub roll: f32,
}

/// Everything needed to evaluate the airframe: the single-owner property
/// store, the function definitions with their axis bindings and the physics
/// components that refresh derived properties each tick.
#[derive(Debug)]
pub struct DynamicsModel {
    pub properties: PropertyStore,
    pub vehicle: Vehicle,
    pub motion: Motion,
    pub aero: Aero,
    pub fcs: FlightControlSys,

    defs: Vec<FunctionDef>,
    by_name: BTreeMap<String, usize>,
    axes: [Vec<usize>; AXIS_COUNT],
    ground_effect: Option<usize>,
}

impl DynamicsModel {
    pub fn new(mut properties: PropertyStore, vehicle: Vehicle) -> Self {
        let motion = Motion::new(&mut properties);
        let aero = Aero::new(&mut properties);
        let fcs = FlightControlSys::new(&mut properties);
        DynamicsModel {
            properties,
            vehicle,
            motion,
            aero,
            fcs,
            defs: Vec::new(),
            by_name: BTreeMap::new(),
            axes: Default::default(),
            ground_effect: None,
        }
    }

    /// Register a function root under `axis`. A redefinition of an existing
    /// name replaces the definition but keeps the earlier axis binding alive,
    /// so documents should use unique names.
    pub fn add_function(&mut self, def: FunctionDef, axis: AxisDimension) -> usize {
        let index = self.defs.len();
        if def.name == GROUND_EFFECT_FUNCTION {
            self.ground_effect = Some(index);
        }
        self.by_name.insert(def.name.clone(), index);
        self.axes[axis.index()].push(index);
        self.defs.push(def);
        index
    }

    pub fn function(&self, name: &str) -> Option<&FunctionDef> {
        self.by_name.get(name).map(|&i| &self.defs[i])
    }

    pub fn try_function(&self, name: &str) -> Result<&FunctionDef, ModelError> {
        self.function(name)
            .ok_or_else(|| ModelError::UnknownFunction(name.to_owned()))
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.defs.iter()
    }

    /// Evaluate one function by name against the current property state.
    pub fn eval_function(&self, name: &str) -> Result<f32, ModelError> {
        Ok(self.try_function(name)?.root.eval(&self.properties))
    }

    /// Sum of all function roots bound to `axis`.
    pub fn eval_axis(&self, axis: AxisDimension) -> f32 {
        self.axes[axis.index()]
            .iter()
            .map(|&i| self.defs[i].root.eval(&self.properties))
            .sum()
    }

    /// Aggregate the six force/moment axes into a body-frame wrench. Drag
    /// and lift are negated into the +x-forward, +z-down body convention.
    pub fn eval(&self) -> (Vector3<f32>, Vector3<f32>) {
        let force = Vector3::new(
            -self.eval_axis(AxisDimension::Drag),
            self.eval_axis(AxisDimension::Side),
            -self.eval_axis(AxisDimension::Lift),
        );
        let torque = Vector3::new(
            self.eval_axis(AxisDimension::Roll),
            self.eval_axis(AxisDimension::Pitch),
            self.eval_axis(AxisDimension::Yaw),
        );
        (force, torque)
    }

    /// Stage this tick's host kinematics. Takes effect on the next
    /// [`step`](DynamicsModel::step).
    pub fn set_kinematics(&mut self, kin: &Kinematics) {
        self.aero.vel = kin.velocity;
        self.aero.vel_dot = kin.velocity_dot;
        self.motion.angular = kin.angular;
        self.properties.set_value(self.motion.alt, kin.altitude);
        self.properties
            .set_value(self.motion.terrain_alt, kin.terrain_altitude);
        self.properties.set_value(self.motion.roll, kin.roll);
    }

    /// Advance one tick: refresh the derived properties, evaluate the axes
    /// and return the body-frame (force, torque) pair. The force is retained
    /// for the next tick's lift-coefficient feedback.
    pub fn step(&mut self, delta_t: f32) -> (Vector3<f32>, Vector3<f32>) {
        self.motion.update_property(&mut self.properties);
        let ground_effect = {
            let defs = &self.defs;
            self.ground_effect.map(|i| &defs[i].root)
        };
        self.aero.update_property(
            &mut self.properties,
            &self.vehicle,
            &self.motion,
            ground_effect,
            delta_t,
        );
        let (force, torque) = self.eval();
        self.aero.force = force;
        (force, torque)
    }

    /// Indicated airspeed derived from the last tick's dynamic pressure.
    pub fn ias(&self) -> f32 {
        self.aero.ias(&self.properties)
    }

    pub fn get(&self, identifier: &str) -> Option<f32> {
        self.properties.get(identifier)
    }

    /// Lenient property write; unknown identifiers log and no-op.
    pub fn set(&mut self, identifier: &str, value: f32) {
        self.properties.set(identifier, value);
    }

    pub fn try_set(&mut self, identifier: &str, value: f32) -> Result<(), ModelError> {
        self.properties.try_set(identifier, value)
    }
}
