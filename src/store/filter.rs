//! Attribute filters the store evaluates natively during a scan
//!
//! The compiler pushes attribute-vs-literal comparisons down to the scan;
//! everything else stays residual and is evaluated by the engine.

use std::cmp::Ordering;

use super::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl FilterOp {
    /// Returns the operator name for diagnostics and SQL rendering
    pub fn op_name(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Ne => "ne",
            FilterOp::Lt => "lt",
            FilterOp::Le => "le",
            FilterOp::Gt => "gt",
            FilterOp::Ge => "ge",
        }
    }

    /// Returns the SQL operator symbol
    pub fn sql_symbol(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Ne => "<>",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
        }
    }

    /// Applies the operator to an ordering.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            FilterOp::Eq => ordering == Ordering::Equal,
            FilterOp::Ne => ordering != Ordering::Equal,
            FilterOp::Lt => ordering == Ordering::Less,
            FilterOp::Le => ordering != Ordering::Greater,
            FilterOp::Gt => ordering == Ordering::Greater,
            FilterOp::Ge => ordering != Ordering::Less,
        }
    }
}

/// One pushed-down comparison: `attribute op literal`.
///
/// Kind mismatches and null-vs-value comparisons never match, the way a
/// SQL predicate over null is never true.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFilter {
    /// Attribute name
    pub attribute: String,
    /// Comparison operator
    pub op: FilterOp,
    /// Literal to compare against
    pub value: Value,
}

impl AttributeFilter {
    pub fn new(attribute: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self {
            attribute: attribute.into(),
            op,
            value,
        }
    }

    /// Evaluates the filter against one attribute value.
    pub fn matches(&self, actual: &Value) -> bool {
        match actual.compare(&self.value) {
            Some(ordering) => self.op.accepts(ordering),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equality_filter() {
        let filter = AttributeFilter::new("age", FilterOp::Eq, Value::from(30i64));
        assert!(filter.matches(&Value::from(30i64)));
        assert!(!filter.matches(&Value::from(31i64)));
    }

    #[test]
    fn test_range_filters() {
        let ge = AttributeFilter::new("age", FilterOp::Ge, Value::from(18i64));
        assert!(ge.matches(&Value::from(18i64)));
        assert!(ge.matches(&Value::from(40i64)));
        assert!(!ge.matches(&Value::from(17i64)));

        let lt = AttributeFilter::new("age", FilterOp::Lt, Value::from(18i64));
        assert!(lt.matches(&Value::from(17i64)));
        assert!(!lt.matches(&Value::from(18i64)));
    }

    #[test]
    fn test_null_never_matches_value() {
        let filter = AttributeFilter::new("age", FilterOp::Ne, Value::from(30i64));
        assert!(!filter.matches(&Value::Null));
    }

    #[test]
    fn test_kind_mismatch_never_matches() {
        let filter = AttributeFilter::new("age", FilterOp::Eq, Value::from(30i64));
        assert!(!filter.matches(&Value::from("30")));
    }

    #[test]
    fn test_null_equals_null() {
        let filter = AttributeFilter::new("age", FilterOp::Eq, Value::Null);
        assert!(filter.matches(&Value::Null));
    }

    #[test]
    fn test_sql_symbols() {
        assert_eq!(FilterOp::Eq.sql_symbol(), "=");
        assert_eq!(FilterOp::Ne.sql_symbol(), "<>");
        assert_eq!(FilterOp::Le.sql_symbol(), "<=");
    }
}
