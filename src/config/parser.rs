//! Assembly of a deserialized vehicle document into a live model.
//!
//! Unknown operators never reach this stage (the document enum is closed);
//! what is validated here is arity and table shape, and both fail the load
//! outright.

use super::document::{
    FunctionDoc, IndependentVarDoc, LookupKind, NamedFunctionDoc, TableDoc, VehicleDocument,
};
use super::units::tag_scale;
use crate::components::Vehicle;
use crate::functions::{
    BinaryOp, Commutative, CommutativeOp, CompareOp, Function, Table1, Table2, UnaryOp,
};
use crate::model::{AxisDimension, DynamicsModel, FunctionDef};
use crate::properties::{PropName, PropertyId, PropertyStore};
use crate::utils::ConfigError;
use nalgebra::DMatrix;

/// Build a model from a fully resolved document (includes already inlined).
pub fn build_model(doc: &VehicleDocument) -> Result<DynamicsModel, ConfigError> {
    let mut props = PropertyStore::new();
    let vehicle = Vehicle::new(&mut props, &doc.metrics, &doc.mass_balance);
    let mut model = DynamicsModel::new(props, vehicle);

    for named in &doc.aerodynamics.functions {
        let def = build_def(named, &mut model.properties)?;
        model.add_function(def, AxisDimension::Dummy);
    }
    for axis_doc in &doc.aerodynamics.axes {
        let axis = AxisDimension::parse(&axis_doc.name);
        for named in &axis_doc.functions {
            let def = build_def(named, &mut model.properties)?;
            model.add_function(def, axis);
        }
    }
    for system in doc.systems.iter().chain(doc.engine.iter()) {
        for named in &system.functions {
            let def = build_def(named, &mut model.properties)?;
            model.add_function(def, AxisDimension::Dummy);
        }
    }
    Ok(model)
}

fn build_def(
    named: &NamedFunctionDoc,
    props: &mut PropertyStore,
) -> Result<FunctionDef, ConfigError> {
    Ok(FunctionDef {
        name: named.name.clone(),
        description: named.description.clone(),
        root: build_function(&named.function, props)?,
    })
}

fn build_function(doc: &FunctionDoc, props: &mut PropertyStore) -> Result<Function, ConfigError> {
    Ok(match doc {
        FunctionDoc::Value(v) => Function::Constant(*v),
        FunctionDoc::Property(p) => {
            let id = props.get_or_create(p.name());
            if let Some(seed) = p.seed() {
                props.set_value(id, seed);
            }
            Function::Property(id)
        }

        FunctionDoc::Product(ch) => commutative(CommutativeOp::Product, ch, props)?,
        FunctionDoc::Sum(ch) => commutative(CommutativeOp::Sum, ch, props)?,
        FunctionDoc::Avg(ch) => commutative(CommutativeOp::Avg, ch, props)?,

        FunctionDoc::Difference(ch) => binary(BinaryOp::Difference, "difference", ch, props)?,
        FunctionDoc::Quotient(ch) => binary(BinaryOp::Quotient, "quotient", ch, props)?,
        FunctionDoc::Pow(ch) => binary(BinaryOp::Pow, "pow", ch, props)?,

        FunctionDoc::Abs(b) => unary(UnaryOp::Abs, b, props)?,
        FunctionDoc::Sin(b) => unary(UnaryOp::Sin, b, props)?,
        FunctionDoc::Cos(b) => unary(UnaryOp::Cos, b, props)?,
        FunctionDoc::Tan(b) => unary(UnaryOp::Tan, b, props)?,
        FunctionDoc::Asin(b) => unary(UnaryOp::Asin, b, props)?,
        FunctionDoc::Acos(b) => unary(UnaryOp::Acos, b, props)?,
        FunctionDoc::Atan(b) => unary(UnaryOp::Atan, b, props)?,
        FunctionDoc::Fraction(b) => unary(UnaryOp::Fraction, b, props)?,
        FunctionDoc::Integer(b) => unary(UnaryOp::Integer, b, props)?,

        FunctionDoc::Lt(ch) => compare(CompareOp::Lt, "lt", ch, props)?,
        FunctionDoc::Le(ch) => compare(CompareOp::Le, "le", ch, props)?,
        FunctionDoc::Gt(ch) => compare(CompareOp::Gt, "gt", ch, props)?,
        FunctionDoc::Ge(ch) => compare(CompareOp::Ge, "ge", ch, props)?,
        FunctionDoc::Eq(ch) => compare(CompareOp::Eq, "eq", ch, props)?,
        // `not` tests its single operand against zero
        FunctionDoc::Not(b) => Function::Compare {
            op: CompareOp::Not,
            left: Box::new(build_function(b, props)?),
            right: Box::new(Function::Constant(0.0)),
        },

        FunctionDoc::Ifthen(ch) => {
            if ch.len() != 3 {
                return Err(ConfigError::Validation(format!(
                    "ifthen takes 3 operands, got {}",
                    ch.len()
                )));
            }
            Function::Conditional {
                condition: Box::new(build_function(&ch[0], props)?),
                then_branch: Box::new(build_function(&ch[1], props)?),
                else_branch: Box::new(build_function(&ch[2], props)?),
            }
        }

        FunctionDoc::Table(t) => build_table(t, props)?,
    })
}

fn commutative(
    op: CommutativeOp,
    children: &[FunctionDoc],
    props: &mut PropertyStore,
) -> Result<Function, ConfigError> {
    let built = children
        .iter()
        .map(|c| build_function(c, props))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Function::Commutative(Commutative::new(op, built)))
}

/// Two operands, or one with the operator's left identity substituted (so a
/// lone `difference` operand negates and a lone `quotient` operand inverts).
fn binary(
    op: BinaryOp,
    tag: &str,
    children: &[FunctionDoc],
    props: &mut PropertyStore,
) -> Result<Function, ConfigError> {
    let (left, right) = match children {
        [only] => (Function::Constant(op.identity()), build_function(only, props)?),
        [l, r] => (build_function(l, props)?, build_function(r, props)?),
        _ => {
            return Err(ConfigError::Validation(format!(
                "{tag} takes 1 or 2 operands, got {}",
                children.len()
            )))
        }
    };
    Ok(Function::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn unary(
    op: UnaryOp,
    operand: &FunctionDoc,
    props: &mut PropertyStore,
) -> Result<Function, ConfigError> {
    Ok(Function::Unary {
        op,
        operand: Box::new(build_function(operand, props)?),
    })
}

fn compare(
    op: CompareOp,
    tag: &str,
    children: &[FunctionDoc],
    props: &mut PropertyStore,
) -> Result<Function, ConfigError> {
    let [l, r] = children else {
        return Err(ConfigError::Validation(format!(
            "{tag} takes 2 operands, got {}",
            children.len()
        )));
    };
    Ok(Function::Compare {
        op,
        left: Box::new(build_function(l, props)?),
        right: Box::new(build_function(r, props)?),
    })
}

/// Independent-variable binding: property id plus the SI scale implied by the
/// identifier's unit suffix. Breakpoints are stored scaled so lookups run in
/// SI.
fn bind_var(var: &str, props: &mut PropertyStore) -> (PropertyId, f32) {
    let name = PropName::parse(var);
    (props.get_or_create_name(&name), tag_scale(&name.unit))
}

fn build_table(doc: &TableDoc, props: &mut PropertyStore) -> Result<Function, ConfigError> {
    match doc.independent_var.as_slice() {
        [var] => {
            let (id, scale) = bind_var(&var.property, props);
            let (rows, values) = parse_table_1d(&doc.data)?;
            Ok(Function::Table1(Table1::new(id, rows, values, scale)))
        }
        [a, b] => {
            let (row_var, col_var) = order_vars(a, b);
            let (row_id, row_scale) = bind_var(&row_var.property, props);
            let (col_id, col_scale) = bind_var(&col_var.property, props);
            let (rows, cols, values) = parse_table_2d(&doc.data)?;
            Ok(Function::Table2(Table2::new(
                row_id, col_id, rows, cols, values, row_scale, col_scale,
            )))
        }
        other => Err(ConfigError::TableDimension(other.len())),
    }
}

/// Row variable first; explicit `lookup` tags win over document order.
fn order_vars<'a>(
    a: &'a IndependentVarDoc,
    b: &'a IndependentVarDoc,
) -> (&'a IndependentVarDoc, &'a IndependentVarDoc) {
    if a.lookup == Some(LookupKind::Column) || b.lookup == Some(LookupKind::Row) {
        (b, a)
    } else {
        (a, b)
    }
}

fn parse_floats(line: &str) -> Result<Vec<f32>, ConfigError> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<f32>()
                .map_err(|_| ConfigError::TableData(format!("not a number: {tok:?}")))
        })
        .collect()
}

fn parse_table_1d(data: &str) -> Result<(Vec<f32>, Vec<f32>), ConfigError> {
    let mut rows = Vec::new();
    let mut values = Vec::new();
    for line in data.lines().filter(|l| !l.trim().is_empty()) {
        let nums = parse_floats(line)?;
        let [row, value] = nums.as_slice() else {
            return Err(ConfigError::TableData(format!(
                "expected 2 columns per row, got {} in {line:?}",
                nums.len()
            )));
        };
        rows.push(*row);
        values.push(*value);
    }
    if rows.len() < 2 {
        return Err(ConfigError::TableData(format!(
            "1-D table needs at least 2 rows, got {}",
            rows.len()
        )));
    }
    Ok((rows, values))
}

fn parse_table_2d(data: &str) -> Result<(Vec<f32>, Vec<f32>, DMatrix<f32>), ConfigError> {
    let mut lines = data.lines().filter(|l| !l.trim().is_empty());
    let cols = parse_floats(
        lines
            .next()
            .ok_or_else(|| ConfigError::TableData("empty 2-D table".into()))?,
    )?;

    let mut rows = Vec::new();
    let mut flat = Vec::new();
    for line in lines {
        let nums = parse_floats(line)?;
        if nums.len() != cols.len() + 1 {
            return Err(ConfigError::TableData(format!(
                "expected {} columns per row, got {} in {line:?}",
                cols.len() + 1,
                nums.len()
            )));
        }
        rows.push(nums[0]);
        flat.extend_from_slice(&nums[1..]);
    }
    if rows.len() < 2 || cols.len() < 2 {
        return Err(ConfigError::TableData(format!(
            "2-D table needs at least 2x2 entries, got {}x{}",
            rows.len(),
            cols.len()
        )));
    }
    Ok((
        rows.clone(),
        cols.clone(),
        DMatrix::from_row_slice(rows.len(), cols.len(), &flat),
    ))
}
