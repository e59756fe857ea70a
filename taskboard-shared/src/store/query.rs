/// Query expression types
///
/// Caller-supplied `where`/`sort`/`select` documents are parsed into the
/// constrained types here before they reach a store backend. Field names are
/// checked against the document's known wire fields and only a fixed set of
/// comparison operators is accepted, so arbitrary operator documents can
/// never travel through to storage.
///
/// Values compare by type: numbers numerically, strings lexicographically
/// (RFC 3339 timestamps therefore order chronologically), booleans with
/// `false < true`. Comparisons across types are indeterminate: ordered
/// operators evaluate to false and sorting treats the pair as equal.

use serde_json::Value;
use std::cmp::Ordering;

/// Errors from parsing caller-supplied query documents
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("unknown field `{0}`")]
    UnknownField(String),

    #[error("unsupported operator `{0}`")]
    UnknownOperator(String),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("operator `$in` expects an array")]
    InExpectsArray,

    #[error("sort direction for `{0}` must be 1 or -1")]
    BadSortDirection(String),

    #[error("projection value for `{0}` must be 0 or 1")]
    BadProjectionValue(String),

    #[error("cannot mix included and excluded fields in one projection")]
    MixedProjection,
}

/// Comparison operators accepted inside a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl Operator {
    fn from_key(key: &str) -> Option<Self> {
        match key {
            "$ne" => Some(Operator::Ne),
            "$gt" => Some(Operator::Gt),
            "$gte" => Some(Operator::Gte),
            "$lt" => Some(Operator::Lt),
            "$lte" => Some(Operator::Lte),
            "$in" => Some(Operator::In),
            _ => None,
        }
    }
}

/// A single field condition: direct equality or an operator document
#[derive(Debug, Clone)]
pub enum Condition {
    Eq(Value),
    Ops(Vec<(Operator, Value)>),
}

/// Conjunction of per-field conditions, the store's filter argument
#[derive(Debug, Clone, Default)]
pub struct Filter(Vec<(String, Condition)>);

impl Filter {
    /// Parses a `where` document, validating field names against `fields`.
    ///
    /// An object value whose keys start with `$` is an operator document;
    /// any other value is an equality match.
    pub fn parse(value: &Value, fields: &[&str]) -> Result<Self, QueryError> {
        let map = value.as_object().ok_or(QueryError::NotAnObject)?;
        let mut conditions = Vec::with_capacity(map.len());

        for (field, condition) in map {
            if !fields.contains(&field.as_str()) {
                return Err(QueryError::UnknownField(field.clone()));
            }

            let parsed = match condition.as_object() {
                Some(ops) if ops.keys().any(|k| k.starts_with('$')) => {
                    let mut list = Vec::with_capacity(ops.len());
                    for (key, operand) in ops {
                        let op = Operator::from_key(key)
                            .ok_or_else(|| QueryError::UnknownOperator(key.clone()))?;
                        if op == Operator::In && !operand.is_array() {
                            return Err(QueryError::InExpectsArray);
                        }
                        list.push((op, operand.clone()));
                    }
                    Condition::Ops(list)
                }
                _ => Condition::Eq(condition.clone()),
            };
            conditions.push((field.clone(), parsed));
        }

        Ok(Self(conditions))
    }

    /// Builds a single-field equality filter for internal callers.
    pub fn field_eq(field: impl Into<String>, value: Value) -> Self {
        Self(vec![(field.into(), Condition::Eq(value))])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Evaluates the filter against a document's JSON serialization.
    ///
    /// Missing fields read as null.
    pub fn matches(&self, doc: &Value) -> bool {
        self.0.iter().all(|(field, condition)| {
            let actual = doc.get(field).unwrap_or(&Value::Null);
            match condition {
                Condition::Eq(expected) => values_equal(actual, expected),
                Condition::Ops(ops) => ops.iter().all(|(op, operand)| {
                    evaluate_operator(*op, actual, operand)
                }),
            }
        })
    }
}

fn evaluate_operator(op: Operator, actual: &Value, operand: &Value) -> bool {
    match op {
        Operator::Ne => !values_equal(actual, operand),
        Operator::Gt => matches!(compare_values(actual, operand), Some(Ordering::Greater)),
        Operator::Gte => matches!(
            compare_values(actual, operand),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => matches!(compare_values(actual, operand), Some(Ordering::Less)),
        Operator::Lte => matches!(
            compare_values(actual, operand),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::In => operand
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| values_equal(actual, c))),
    }
}

/// Equality that treats `1` and `1.0` as the same number
fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Typed comparison; None when the two values are not comparable
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Ascending,
    Descending,
}

/// Ordered list of sort keys, highest precedence first
#[derive(Debug, Clone, Default)]
pub struct Sort(Vec<(String, Order)>);

impl Sort {
    /// Parses a `{"field": 1|-1}` sort document, keys in caller order.
    pub fn parse(value: &Value, fields: &[&str]) -> Result<Self, QueryError> {
        let map = value.as_object().ok_or(QueryError::NotAnObject)?;
        let mut keys = Vec::with_capacity(map.len());

        for (field, direction) in map {
            if !fields.contains(&field.as_str()) {
                return Err(QueryError::UnknownField(field.clone()));
            }
            let order = match direction.as_i64() {
                Some(1) => Order::Ascending,
                Some(-1) => Order::Descending,
                _ => return Err(QueryError::BadSortDirection(field.clone())),
            };
            keys.push((field.clone(), order));
        }

        Ok(Self(keys))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares two documents under this sort specification
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, order) in &self.0 {
            let left = a.get(field).unwrap_or(&Value::Null);
            let right = b.get(field).unwrap_or(&Value::Null);
            let ordering = compare_values(left, right).unwrap_or(Ordering::Equal);
            let ordering = match order {
                Order::Ascending => ordering,
                Order::Descending => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

/// Field projection applied to serialized results.
///
/// Inclusion and exclusion cannot be mixed, with one exception: `id` may be
/// excluded from an otherwise-inclusive projection.
#[derive(Debug, Clone)]
pub enum Projection {
    Include { fields: Vec<String>, keep_id: bool },
    Exclude(Vec<String>),
}

impl Projection {
    /// Parses a `{"field": 0|1}` projection document.
    pub fn parse(value: &Value, fields: &[&str]) -> Result<Self, QueryError> {
        let map = value.as_object().ok_or(QueryError::NotAnObject)?;
        let mut included = Vec::new();
        let mut excluded = Vec::new();

        for (field, flag) in map {
            if !fields.contains(&field.as_str()) {
                return Err(QueryError::UnknownField(field.clone()));
            }
            let include = match (flag.as_i64(), flag.as_bool()) {
                (Some(1), _) | (_, Some(true)) => true,
                (Some(0), _) | (_, Some(false)) => false,
                _ => return Err(QueryError::BadProjectionValue(field.clone())),
            };
            if include {
                included.push(field.clone());
            } else {
                excluded.push(field.clone());
            }
        }

        if included.is_empty() {
            return Ok(Projection::Exclude(excluded));
        }
        if excluded.iter().any(|f| f != "id") {
            return Err(QueryError::MixedProjection);
        }
        Ok(Projection::Include {
            fields: included,
            keep_id: excluded.is_empty(),
        })
    }

    /// Strips fields from a serialized document in place
    pub fn apply(&self, doc: &mut Value) {
        let Some(map) = doc.as_object_mut() else {
            return;
        };
        match self {
            Projection::Include { fields, keep_id } => {
                map.retain(|key, _| fields.iter().any(|f| f == key) || (*keep_id && key == "id"));
            }
            Projection::Exclude(fields) => {
                map.retain(|key, _| !fields.iter().any(|f| f == key));
            }
        }
    }
}

/// Complete list-query argument: filter, sort, and pagination
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Filter,
    pub sort: Sort,
    pub skip: u64,
    /// None means unbounded
    pub limit: Option<u64>,
}

impl ListQuery {
    /// Query returning everything matching `filter`, unsorted and unbounded
    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }
}
