//! Compiled queries
//!
//! The executable output of the compiler. `Empty` is the null-object
//! query: no rows, stably exhausted. `Concat` composes an ordered list
//! of source queries; the engine drains them in list order, lazily.
//! `Plan` is a lowered set-algebra tree bound to the physical schema.

use crate::expr::ValueExpr;
use crate::store::AttributeFilter;

/// A lowered, executable plan node.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanNode {
    /// No rows
    Empty,
    /// A table scan with pushed filters and an in-process residual
    Scan {
        /// Logical type name
        type_name: String,
        /// Physical table name bound via the dialect
        table: String,
        /// Filters the store evaluates during the scan
        pushed: Vec<AttributeFilter>,
        /// Predicate remainder evaluated per row in-process
        residual: Option<ValueExpr>,
    },
    /// In-process filtering of a sub-plan
    Filter {
        input: Box<PlanNode>,
        predicate: ValueExpr,
    },
    /// Reference join: the items reached from the sub-plan's rows
    /// through a reference attribute
    Navigate {
        input: Box<PlanNode>,
        attribute: String,
    },
    /// Rows of both sub-plans, in order
    Union(Box<PlanNode>, Box<PlanNode>),
    /// Rows of the left sub-plan whose identity occurs in the right
    Intersection(Box<PlanNode>, Box<PlanNode>),
    /// Rows of the left sub-plan whose identity is absent from the right
    Substraction(Box<PlanNode>, Box<PlanNode>),
}

impl PlanNode {
    /// Returns the node kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PlanNode::Empty => "empty",
            PlanNode::Scan { .. } => "scan",
            PlanNode::Filter { .. } => "filter",
            PlanNode::Navigate { .. } => "navigate",
            PlanNode::Union(_, _) => "union",
            PlanNode::Intersection(_, _) => "intersection",
            PlanNode::Substraction(_, _) => "substraction",
        }
    }
}

/// An executable plan with its diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    /// The lowered plan tree
    pub root: PlanNode,
    /// Dialect rendering of every pushed filter, for EXPLAIN-style output
    pub pushed_sql: Vec<String>,
    /// Whether evaluation can mint identifiers or touch session state
    pub has_effects: bool,
}

/// An executable, pre-optimized query.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledQuery {
    /// The null-object query: no rows, stably exhausted
    Empty,
    /// An ordered composition of source queries
    Concat(Vec<CompiledQuery>),
    /// A lowered plan
    Plan(QueryPlan),
}

impl CompiledQuery {
    /// The empty query.
    pub fn empty() -> Self {
        CompiledQuery::Empty
    }

    /// Composes sources in list order. An empty list is a valid
    /// composition and yields no rows.
    pub fn concat(sources: Vec<CompiledQuery>) -> Self {
        CompiledQuery::Concat(sources)
    }

    /// Returns true if this query trivially yields no rows.
    pub fn is_trivially_empty(&self) -> bool {
        match self {
            CompiledQuery::Empty => true,
            CompiledQuery::Concat(sources) => {
                sources.iter().all(CompiledQuery::is_trivially_empty)
            }
            CompiledQuery::Plan(_) => false,
        }
    }
}
