// ABOUTME: Typed filter expression AST and its row-by-row evaluation.
// ABOUTME: Column references are resolved to positions before any row is seen.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::error::FilterError;
use crate::table::{CellValue, Table};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn apply(self, left: &CellValue, right: &CellValue) -> bool {
        let ordering = left.compare(right);
        match self {
            Self::Eq => ordering == Some(Ordering::Equal),
            Self::Ne => ordering != Some(Ordering::Equal),
            Self::Lt => ordering == Some(Ordering::Less),
            Self::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            Self::Gt => ordering == Some(Ordering::Greater),
            Self::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

/// A parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(CellValue),
    Column(String),
    Compare {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    In {
        operand: Box<Expr>,
        values: Vec<CellValue>,
        negated: bool,
    },
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Names of all columns the expression references, in first-use order.
    pub fn columns(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_columns(&mut names);
        names
    }

    fn collect_columns<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Literal(_) => {}
            Self::Column(name) => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Compare { left, right, .. } => {
                left.collect_columns(names);
                right.collect_columns(names);
            }
            Self::In { operand, .. } => operand.collect_columns(names),
            Self::Not(inner) => inner.collect_columns(names),
            Self::And(a, b) | Self::Or(a, b) => {
                a.collect_columns(names);
                b.collect_columns(names);
            }
        }
    }

    /// Resolve column references against a table header.
    pub fn bind(&self, table: &Table) -> Result<BoundFilter<'_>, FilterError> {
        let mut positions = HashMap::new();
        for name in self.columns() {
            let index = table
                .column_index(name)
                .ok_or_else(|| FilterError::Reference(name.to_string()))?;
            positions.insert(name, index);
        }
        Ok(BoundFilter {
            expr: self,
            positions,
        })
    }
}

/// An expression whose column references all exist in a given header.
#[derive(Debug)]
pub struct BoundFilter<'a> {
    expr: &'a Expr,
    positions: HashMap<&'a str, usize>,
}

impl BoundFilter<'_> {
    /// Whether a row satisfies the expression. Only a boolean `true` keeps it.
    pub fn matches(&self, row: &[CellValue]) -> bool {
        truthy(&self.eval(self.expr, row))
    }

    fn eval<'r>(&self, expr: &'r Expr, row: &'r [CellValue]) -> Cow<'r, CellValue> {
        match expr {
            Expr::Literal(value) => Cow::Borrowed(value),
            Expr::Column(name) => match self.positions.get(name.as_str()) {
                Some(&index) => Cow::Borrowed(&row[index]),
                None => Cow::Owned(CellValue::Empty),
            },
            Expr::Compare { op, left, right } => {
                let left = self.eval(left, row);
                let right = self.eval(right, row);
                Cow::Owned(CellValue::Bool(op.apply(&left, &right)))
            }
            Expr::In {
                operand,
                values,
                negated,
            } => {
                let value = self.eval(operand, row);
                let found = values.iter().any(|v| value.loosely_equals(v));
                Cow::Owned(CellValue::Bool(found != *negated))
            }
            Expr::Not(inner) => Cow::Owned(CellValue::Bool(!truthy(&self.eval(inner, row)))),
            Expr::And(a, b) => Cow::Owned(CellValue::Bool(
                truthy(&self.eval(a, row)) && truthy(&self.eval(b, row)),
            )),
            Expr::Or(a, b) => Cow::Owned(CellValue::Bool(
                truthy(&self.eval(a, row)) || truthy(&self.eval(b, row)),
            )),
        }
    }
}

fn truthy(value: &CellValue) -> bool {
    matches!(value, CellValue::Bool(true))
}
