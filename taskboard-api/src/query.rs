/// Query translation for list endpoints
///
/// Turns the `where` / `sort` / `select` / `skip` / `limit` / `count`
/// request parameters into the store's typed query arguments. The three
/// JSON-valued parameters are parsed and validated against the resource's
/// known fields; malformed JSON, unknown fields, and unknown operators are
/// caller errors (400).
///
/// `skip` and `limit` keep the original service's lenient integer parsing:
/// a non-numeric value silently falls back to the default, and a limit of 0
/// re-defaults rather than meaning "nothing". Tasks default to a limit of
/// 100 while Users have no default limit; the asymmetry is deliberate.

use serde::Deserialize;
use serde_json::Value;
use taskboard_shared::store::query::{Filter, ListQuery, Projection, Sort};

use crate::error::{ApiError, ApiResult};

/// Raw list-endpoint query parameters, all optional
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(rename = "where")]
    pub r#where: Option<String>,
    pub sort: Option<String>,
    pub select: Option<String>,
    pub skip: Option<String>,
    pub limit: Option<String>,
    pub count: Option<String>,
}

/// Translated list request: store query, response projection, count flag
#[derive(Debug)]
pub struct ListRequest {
    pub query: ListQuery,
    pub projection: Option<Projection>,
    pub count: bool,
}

/// Translates raw parameters for a resource with the given schema fields.
///
/// `default_limit` is applied when the caller supplies no usable limit;
/// `None` leaves the query unbounded.
pub fn translate(
    params: &ListParams,
    fields: &[&str],
    default_limit: Option<u64>,
) -> ApiResult<ListRequest> {
    let filter = match params.r#where.as_deref() {
        Some(raw) => Filter::parse(&parse_json(raw, "where")?, fields)?,
        None => Filter::default(),
    };

    let sort = match params.sort.as_deref() {
        Some(raw) => Sort::parse(&parse_json(raw, "sort")?, fields)?,
        None => Sort::default(),
    };

    let projection = match params.select.as_deref() {
        Some(raw) => {
            let value = parse_json(raw, "select")?;
            // an empty select document means "no projection"
            if value.as_object().is_some_and(|map| map.is_empty()) {
                None
            } else {
                Some(Projection::parse(&value, fields)?)
            }
        }
        None => None,
    };

    let skip = parse_int(params.skip.as_deref()).filter(|n| *n > 0).unwrap_or(0) as u64;

    let limit = match parse_int(params.limit.as_deref()) {
        Some(n) if n != 0 => Some(n),
        _ => default_limit.map(|d| d as i64),
    };
    let limit = limit.and_then(|n| if n > 0 { Some(n as u64) } else { None });

    let count = params.count.as_deref() == Some("true");

    Ok(ListRequest {
        query: ListQuery {
            filter,
            sort,
            skip,
            limit,
        },
        projection,
        count,
    })
}

/// Applies a projection to every element of a serialized result list
pub fn project_list(data: &mut Value, projection: Option<&Projection>) {
    let Some(projection) = projection else {
        return;
    };
    if let Value::Array(items) = data {
        for item in items {
            projection.apply(item);
        }
    }
}

fn parse_json(raw: &str, name: &str) -> ApiResult<Value> {
    serde_json::from_str(raw)
        .map_err(|_| ApiError::Validation(format!("Malformed JSON in `{name}` parameter")))
}

fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const FIELDS: &[&str] = &["id", "name", "completed", "deadline"];

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        let mut out = ListParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "where" => out.r#where = value,
                "sort" => out.sort = value,
                "select" => out.select = value,
                "skip" => out.skip = value,
                "limit" => out.limit = value,
                "count" => out.count = value,
                other => panic!("unknown param {other}"),
            }
        }
        out
    }

    #[test]
    fn test_defaults_without_parameters() {
        let request = translate(&ListParams::default(), FIELDS, None).unwrap();

        assert!(request.query.filter.is_empty());
        assert!(request.query.sort.is_empty());
        assert_eq!(request.query.skip, 0);
        assert_eq!(request.query.limit, None);
        assert!(request.projection.is_none());
        assert!(!request.count);
    }

    #[test]
    fn test_default_limit_applies_when_absent_or_zero() {
        let request = translate(&ListParams::default(), FIELDS, Some(100)).unwrap();
        assert_eq!(request.query.limit, Some(100));

        // a limit of 0 re-defaults instead of meaning "no results"
        let request = translate(&params(&[("limit", "0")]), FIELDS, Some(100)).unwrap();
        assert_eq!(request.query.limit, Some(100));

        let request = translate(&params(&[("limit", "10")]), FIELDS, Some(100)).unwrap();
        assert_eq!(request.query.limit, Some(10));
    }

    #[test]
    fn test_negative_limit_means_unbounded() {
        let request = translate(&params(&[("limit", "-5")]), FIELDS, Some(100)).unwrap();
        assert_eq!(request.query.limit, None);
    }

    #[test]
    fn test_non_numeric_skip_and_limit_fall_back_silently() {
        let request = translate(
            &params(&[("skip", "abc"), ("limit", "xyz")]),
            FIELDS,
            Some(100),
        )
        .unwrap();

        assert_eq!(request.query.skip, 0);
        assert_eq!(request.query.limit, Some(100));
    }

    #[test]
    fn test_malformed_where_is_caller_error() {
        let err = translate(&params(&[("where", "{not json")]), FIELDS, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_unknown_filter_field_is_caller_error() {
        let err = translate(&params(&[("where", r#"{"nope":1}"#)]), FIELDS, None).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_count_flag_requires_literal_true() {
        let request = translate(&params(&[("count", "true")]), FIELDS, None).unwrap();
        assert!(request.count);

        let request = translate(&params(&[("count", "yes")]), FIELDS, None).unwrap();
        assert!(!request.count);
    }

    #[test]
    fn test_empty_select_means_no_projection() {
        let request = translate(&params(&[("select", "{}")]), FIELDS, None).unwrap();
        assert!(request.projection.is_none());
    }

    #[test]
    fn test_project_list_strips_fields() {
        let projection = Projection::parse(&json!({"name": 1}), FIELDS).unwrap();
        let mut data = json!([
            {"id": "a", "name": "x", "completed": true},
            {"id": "b", "name": "y", "completed": false},
        ]);

        project_list(&mut data, Some(&projection));

        assert_eq!(
            data,
            json!([{"id": "a", "name": "x"}, {"id": "b", "name": "y"}])
        );
    }
}
