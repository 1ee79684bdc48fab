//! Polymorphic expression nodes over the property store.
//!
//! The operator set is fixed and closed, so the graph is a tagged sum type
//! with one exhaustive evaluation dispatcher rather than an open class
//! hierarchy. Evaluation is pure over the current property values and does
//! not allocate: child arrays are fixed at construction.

mod table;

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::properties::{PropertyId, PropertyStore};

pub use table::{Table1, Table2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommutativeOp {
    Sum,
    Product,
    Avg,
}

impl CommutativeOp {
    pub fn identity(self) -> f32 {
        match self {
            CommutativeOp::Product => 1.0,
            CommutativeOp::Sum | CommutativeOp::Avg => 0.0,
        }
    }

    /// Accumulation step. `n` is the original child count of the owning
    /// node; `avg` adds each term pre-divided by `n` instead of dividing the
    /// final sum, reproducing the source formula exactly.
    fn fold(self, acc: f32, v: f32, n: usize) -> f32 {
        match self {
            CommutativeOp::Product => acc * v,
            CommutativeOp::Sum => acc + v,
            CommutativeOp::Avg => acc + v / n as f32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Difference,
    Quotient,
    Pow,
}

impl BinaryOp {
    /// Left-operand identity used when the document supplies only one
    /// operand.
    pub fn identity(self) -> f32 {
        match self {
            BinaryOp::Quotient => 1.0,
            BinaryOp::Difference | BinaryOp::Pow => 0.0,
        }
    }

    fn apply(self, l: f32, r: f32) -> f32 {
        match self {
            BinaryOp::Difference => l - r,
            BinaryOp::Quotient => l / r,
            BinaryOp::Pow => l.powf(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Abs,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Fraction,
    Integer,
}

impl UnaryOp {
    fn apply(self, v: f32) -> f32 {
        match self {
            UnaryOp::Abs => v.abs(),
            UnaryOp::Sin => v.sin(),
            UnaryOp::Cos => v.cos(),
            UnaryOp::Tan => v.tan(),
            UnaryOp::Asin => v.asin(),
            UnaryOp::Acos => v.acos(),
            UnaryOp::Atan => v.atan(),
            UnaryOp::Fraction => v % 1.0,
            UnaryOp::Integer => v.trunc(),
        }
    }
}

const EQ_TOLERANCE: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Not,
}

impl CompareOp {
    fn test(self, l: f32, r: f32) -> bool {
        match self {
            CompareOp::Lt => l < r,
            CompareOp::Le => l <= r,
            CompareOp::Gt => l > r,
            CompareOp::Ge => l >= r,
            CompareOp::Eq => (l - r).abs() < EQ_TOLERANCE,
            // unary in spirit: the right operand is ignored
            CompareOp::Not => l <= 0.0,
        }
    }
}

/// N-ary operator with constant children folded into `initial` at
/// construction; only non-constant children remain for evaluation.
#[derive(Debug, Clone)]
pub struct Commutative {
    pub op: CommutativeOp,
    pub initial: f32,
    /// Original child count, before constant folding. `avg` divides by this.
    pub count: usize,
    pub children: Vec<Function>,
}

impl Commutative {
    pub fn new(op: CommutativeOp, children: Vec<Function>) -> Self {
        let count = children.len();
        let mut initial = op.identity();
        let mut kept = Vec::with_capacity(count);
        for child in children {
            match child {
                Function::Constant(v) => initial = op.fold(initial, v, count),
                other => kept.push(other),
            }
        }
        Commutative {
            op,
            initial,
            count,
            children: kept,
        }
    }
}

/// A node of the expression DAG. Graph structure is fixed after load; only
/// property values change between evaluations. Cycles are a caller error and
/// are not detected here.
#[derive(Debug, Clone)]
pub enum Function {
    Constant(f32),
    Property(PropertyId),
    Commutative(Commutative),
    Binary {
        op: BinaryOp,
        left: Box<Function>,
        right: Box<Function>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Function>,
    },
    Compare {
        op: CompareOp,
        left: Box<Function>,
        right: Box<Function>,
    },
    Conditional {
        condition: Box<Function>,
        then_branch: Box<Function>,
        else_branch: Box<Function>,
    },
    Table1(Table1),
    Table2(Table2),
}

impl Function {
    pub fn eval(&self, props: &PropertyStore) -> f32 {
        match self {
            Function::Constant(v) => *v,
            Function::Property(id) => props.value(*id),
            Function::Commutative(c) => {
                let mut v = c.initial;
                for child in &c.children {
                    v = c.op.fold(v, child.eval(props), c.count);
                }
                v
            }
            Function::Binary { op, left, right } => op.apply(left.eval(props), right.eval(props)),
            Function::Unary { op, operand } => op.apply(operand.eval(props)),
            Function::Compare { op, left, right } => {
                if op.test(left.eval(props), right.eval(props)) {
                    1.0
                } else {
                    0.0
                }
            }
            Function::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                // only the selected branch is evaluated
                if condition.eval(props) > 0.0 {
                    then_branch.eval(props)
                } else {
                    else_branch.eval(props)
                }
            }
            Function::Table1(t) => t.eval(props),
            Function::Table2(t) => t.eval(props),
        }
    }

    /// Direct child nodes; empty for leaves and tables.
    pub fn children(&self) -> Vec<&Function> {
        match self {
            Function::Constant(_)
            | Function::Property(_)
            | Function::Table1(_)
            | Function::Table2(_) => Vec::new(),
            Function::Commutative(c) => c.children.iter().collect(),
            Function::Binary { left, right, .. } | Function::Compare { left, right, .. } => {
                vec![left, right]
            }
            Function::Unary { operand, .. } => vec![operand],
            Function::Conditional {
                condition,
                then_branch,
                else_branch,
            } => vec![condition, then_branch, else_branch],
        }
    }

    /// All transitively referenced properties, breadth-first, constants
    /// skipped. Introspection only; not used on the evaluation path.
    pub fn dependent_properties(&self) -> Vec<PropertyId> {
        let mut out = Vec::new();
        let mut queue: VecDeque<&Function> = VecDeque::new();
        queue.push_back(self);
        while let Some(f) = queue.pop_front() {
            match f {
                Function::Property(id) => out.push(*id),
                Function::Table1(t) => out.push(t.var),
                Function::Table2(t) => {
                    out.push(t.var_row);
                    out.push(t.var_col);
                }
                _ => {}
            }
            for child in f.children() {
                queue.push_back(child);
            }
        }
        out
    }
}
