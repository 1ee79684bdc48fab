//! Flat, self-describing serialization of an assembled model.
//!
//! The expression graph is emitted as a post-order node table with integer
//! child references instead of a nested tree, so the on-disk schema has no
//! recursion and every reference is checkable on load. Property references
//! are indices into the property record list, which preserves creation
//! order.

use nalgebra::{DMatrix, Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::{AxisDimension, DynamicsModel, FunctionDef, AXIS_COUNT};
use crate::components::{Aero, FlightControlSys, Location, Motion, Vehicle};
use crate::functions::{
    BinaryOp, Commutative, CommutativeOp, CompareOp, Function, Table1, Table2, UnaryOp,
};
use crate::properties::{PropertyId, PropertyStore};
use crate::utils::ModelError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSnapshot {
    pub properties: Vec<PropertyRecord>,
    pub nodes: Vec<NodeRecord>,
    pub functions: Vec<FunctionRecord>,
    pub vehicle: VehicleRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub key: String,
    pub unit: String,
    pub value: f32,
}

/// One expression node. `usize` fields are indices: `property` into the
/// property records, everything else into the node table. Children always
/// precede their parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRecord {
    Constant {
        value: f32,
    },
    Property {
        property: usize,
    },
    Commutative {
        op: CommutativeOp,
        initial: f32,
        count: usize,
        children: Vec<usize>,
    },
    Binary {
        op: BinaryOp,
        left: usize,
        right: usize,
    },
    Unary {
        op: UnaryOp,
        operand: usize,
    },
    Compare {
        op: CompareOp,
        left: usize,
        right: usize,
    },
    Conditional {
        condition: usize,
        then_branch: usize,
        else_branch: usize,
    },
    Table1 {
        var: usize,
        rows: Vec<f32>,
        values: Vec<f32>,
    },
    Table2 {
        var_row: usize,
        var_col: usize,
        rows: Vec<f32>,
        cols: Vec<f32>,
        /// Row-major.
        values: Vec<Vec<f32>>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub root: usize,
    pub axis: AxisDimension,
}

/// Vehicle state not derivable from the property records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub locations: Vec<Location>,
    pub inertia_tensor: [f32; 3],
    /// Principal-axis quaternion as (w, x, y, z).
    pub mass_frame: [f32; 4],
    pub center_of_mass: [f32; 3],
}

fn emit(f: &Function, nodes: &mut Vec<NodeRecord>) -> usize {
    let record = match f {
        Function::Constant(v) => NodeRecord::Constant { value: *v },
        Function::Property(id) => NodeRecord::Property { property: id.0 },
        Function::Commutative(c) => {
            let children = c.children.iter().map(|ch| emit(ch, nodes)).collect();
            NodeRecord::Commutative {
                op: c.op,
                initial: c.initial,
                count: c.count,
                children,
            }
        }
        Function::Binary { op, left, right } => NodeRecord::Binary {
            op: *op,
            left: emit(left, nodes),
            right: emit(right, nodes),
        },
        Function::Unary { op, operand } => NodeRecord::Unary {
            op: *op,
            operand: emit(operand, nodes),
        },
        Function::Compare { op, left, right } => NodeRecord::Compare {
            op: *op,
            left: emit(left, nodes),
            right: emit(right, nodes),
        },
        Function::Conditional {
            condition,
            then_branch,
            else_branch,
        } => NodeRecord::Conditional {
            condition: emit(condition, nodes),
            then_branch: emit(then_branch, nodes),
            else_branch: emit(else_branch, nodes),
        },
        Function::Table1(t) => NodeRecord::Table1 {
            var: t.var.0,
            rows: t.rows().to_vec(),
            values: t.values().to_vec(),
        },
        Function::Table2(t) => NodeRecord::Table2 {
            var_row: t.var_row.0,
            var_col: t.var_col.0,
            rows: t.rows().to_vec(),
            cols: t.cols().to_vec(),
            values: t
                .values()
                .row_iter()
                .map(|r| r.iter().copied().collect())
                .collect(),
        },
    };
    nodes.push(record);
    nodes.len() - 1
}

fn node_ref(built: &[Function], index: usize) -> Result<Box<Function>, ModelError> {
    built
        .get(index)
        .cloned()
        .map(Box::new)
        .ok_or_else(|| ModelError::Snapshot(format!("node reference {index} out of range")))
}

fn property_ref(props: &PropertyStore, index: usize) -> Result<PropertyId, ModelError> {
    if index < props.len() {
        Ok(PropertyId(index))
    } else {
        Err(ModelError::Snapshot(format!(
            "property reference {index} out of range"
        )))
    }
}

fn rebuild(record: &NodeRecord, built: &[Function], props: &PropertyStore) -> Result<Function, ModelError> {
    Ok(match record {
        NodeRecord::Constant { value } => Function::Constant(*value),
        NodeRecord::Property { property } => Function::Property(property_ref(props, *property)?),
        NodeRecord::Commutative {
            op,
            initial,
            count,
            children,
        } => {
            let children = children
                .iter()
                .map(|&i| node_ref(built, i).map(|b| *b))
                .collect::<Result<Vec<_>, _>>()?;
            // constants were already folded into `initial` when the snapshot
            // was taken, so the node is rebuilt field-for-field
            Function::Commutative(Commutative {
                op: *op,
                initial: *initial,
                count: *count,
                children,
            })
        }
        NodeRecord::Binary { op, left, right } => Function::Binary {
            op: *op,
            left: node_ref(built, *left)?,
            right: node_ref(built, *right)?,
        },
        NodeRecord::Unary { op, operand } => Function::Unary {
            op: *op,
            operand: node_ref(built, *operand)?,
        },
        NodeRecord::Compare { op, left, right } => Function::Compare {
            op: *op,
            left: node_ref(built, *left)?,
            right: node_ref(built, *right)?,
        },
        NodeRecord::Conditional {
            condition,
            then_branch,
            else_branch,
        } => Function::Conditional {
            condition: node_ref(built, *condition)?,
            then_branch: node_ref(built, *then_branch)?,
            else_branch: node_ref(built, *else_branch)?,
        },
        NodeRecord::Table1 { var, rows, values } => {
            if rows.len() < 2 || rows.len() != values.len() {
                return Err(ModelError::Snapshot("malformed 1-D table record".into()));
            }
            // breakpoints were scaled to SI before the snapshot
            Function::Table1(Table1::new(
                property_ref(props, *var)?,
                rows.clone(),
                values.clone(),
                1.0,
            ))
        }
        NodeRecord::Table2 {
            var_row,
            var_col,
            rows,
            cols,
            values,
        } => {
            let well_formed = rows.len() >= 2
                && cols.len() >= 2
                && values.len() == rows.len()
                && values.iter().all(|r| r.len() == cols.len());
            if !well_formed {
                return Err(ModelError::Snapshot("malformed 2-D table record".into()));
            }
            let flat: Vec<f32> = values.iter().flatten().copied().collect();
            Function::Table2(Table2::new(
                property_ref(props, *var_row)?,
                property_ref(props, *var_col)?,
                rows.clone(),
                cols.clone(),
                DMatrix::from_row_slice(rows.len(), cols.len(), &flat),
                1.0,
                1.0,
            ))
        }
    })
}

impl DynamicsModel {
    pub fn snapshot(&self) -> ModelSnapshot {
        let properties = self
            .properties
            .records()
            .map(|(_, p)| PropertyRecord {
                key: p.key.clone(),
                unit: p.unit.clone(),
                value: p.value(),
            })
            .collect();

        let mut nodes = Vec::new();
        let mut functions = Vec::new();
        for (axis_index, members) in self.axes.iter().enumerate() {
            let axis = AXIS_ORDER[axis_index];
            for &def_index in members {
                let def = &self.defs[def_index];
                functions.push(FunctionRecord {
                    name: def.name.clone(),
                    description: def.description.clone(),
                    root: emit(&def.root, &mut nodes),
                    axis,
                });
            }
        }

        let q = self.vehicle.mass_frame.quaternion();
        let vehicle = VehicleRecord {
            locations: self.vehicle.locations.clone(),
            inertia_tensor: self.vehicle.inertia_tensor.into(),
            mass_frame: [q.w, q.i, q.j, q.k],
            center_of_mass: self.vehicle.center_of_mass.into(),
        };

        ModelSnapshot {
            properties,
            nodes,
            functions,
            vehicle,
        }
    }

    /// Rebuild a model from a snapshot. Property ids resolve by record order;
    /// any dangling node or property reference fails the whole restore.
    pub fn from_snapshot(snap: &ModelSnapshot) -> Result<Self, ModelError> {
        let mut properties = PropertyStore::new();
        for record in &snap.properties {
            properties.push_record(record.key.clone(), record.unit.clone(), record.value);
        }

        let mut built: Vec<Function> = Vec::with_capacity(snap.nodes.len());
        for record in &snap.nodes {
            let node = rebuild(record, &built, &properties)?;
            built.push(node);
        }

        let motion = Motion::new(&mut properties);
        let aero = Aero::new(&mut properties);
        let fcs = FlightControlSys::new(&mut properties);
        let v = &snap.vehicle;
        let vehicle = Vehicle {
            wing_area: properties.get_or_create("metrics/Sw-1?"),
            wing_span: properties.get_or_create("metrics/bw-1?"),
            wing_incidence: properties.get_or_create("metrics/iw-deg"),
            wing_chord: properties.get_or_create("metrics/cbarw-1?"),
            htail_area: properties.get_or_create("metrics/Sh-1?"),
            htail_arm: properties.get_or_create("metrics/lh-1?"),
            vtail_area: properties.get_or_create("metrics/Sv-1?"),
            vtail_arm: properties.get_or_create("metrics/lv-1?"),
            empty_weight: properties.get_or_create("inertia/empty-weight-1?"),
            locations: v.locations.clone(),
            inertia_tensor: Vector3::from(v.inertia_tensor),
            mass_frame: UnitQuaternion::from_quaternion(Quaternion::new(
                v.mass_frame[0],
                v.mass_frame[1],
                v.mass_frame[2],
                v.mass_frame[3],
            )),
            center_of_mass: Vector3::from(v.center_of_mass),
        };

        let mut model = DynamicsModel {
            properties,
            vehicle,
            motion,
            aero,
            fcs,
            defs: Vec::new(),
            by_name: Default::default(),
            axes: Default::default(),
            ground_effect: None,
        };
        for record in &snap.functions {
            let root = node_ref(&built, record.root).map(|b| *b)?;
            model.add_function(
                FunctionDef {
                    name: record.name.clone(),
                    description: record.description.clone(),
                    root,
                },
                record.axis,
            );
        }
        Ok(model)
    }
}

const AXIS_ORDER: [AxisDimension; AXIS_COUNT] = [
    AxisDimension::Drag,
    AxisDimension::Side,
    AxisDimension::Lift,
    AxisDimension::Roll,
    AxisDimension::Pitch,
    AxisDimension::Yaw,
    AxisDimension::Dummy,
];
