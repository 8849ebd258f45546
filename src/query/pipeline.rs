//! # Query Pipeline Stages
//!
//! Builds a composed [`Query`] from a request's query-string
//! parameters. Four reserved keys (`page`, `sort`, `limit`, `fields`)
//! control the pipeline; every other key is a filter condition.
//!
//! Parsing is deliberately lenient: unknown field names are passed
//! through untouched (they match zero documents at execution time) and
//! non-numeric pagination values fall back to their defaults instead
//! of erroring.

use std::collections::HashMap;

use serde_json::Value;

use super::filter::{FilterCondition, FilterOperator};
use super::spec::{Projection, Query, SortKey};

/// Parameter names interpreted as pipeline controls, never as filters.
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// Records per page when `limit` is absent or unparseable.
pub const DEFAULT_LIMIT: usize = 100;

/// The schema-revision marker hidden by the default projection.
const REVISION_FIELD: &str = "__v";

/// Chainable pipeline over an unexecuted query and a parameter bag.
///
/// Constructed once per request, used once, discarded. Each stage
/// consumes the pipeline and returns a new one carrying the updated
/// query specification.
pub struct QueryPipeline<'a> {
    query: Query,
    params: &'a HashMap<String, String>,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(query: Query, params: &'a HashMap<String, String>) -> Self {
        Self { query, params }
    }

    /// Filter stage: every non-reserved key becomes a typed condition.
    ///
    /// Keys of the form `field[op]` with op in {gt, gte, lt, lte} parse
    /// to range comparisons; anything else is an equality constraint on
    /// the literal key. An empty remainder is a no-op (match all).
    pub fn filter(mut self) -> Self {
        let conditions: Vec<FilterCondition> = self
            .params
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
            .map(|(key, value)| {
                let (field, operator) = parse_filter_key(key);
                FilterCondition::new(field, operator, parse_value(value))
            })
            .collect();

        self.query = self.query.find(conditions);
        self
    }

    /// Sort stage: comma-separated field names, `-` prefix for
    /// descending. Defaults to newest-created first so pagination is
    /// deterministic across repeated calls.
    pub fn sort(mut self) -> Self {
        let keys = match self.params.get("sort") {
            Some(sort) => sort
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|token| match token.strip_prefix('-') {
                    Some(field) => SortKey::desc(field),
                    None => SortKey::asc(token),
                })
                .collect(),
            None => vec![SortKey::desc("created_at")],
        };

        self.query = self.query.sort(keys);
        self
    }

    /// Projection stage: comma-separated inclusion list. When absent,
    /// everything is returned except the revision marker.
    pub fn limit_fields(mut self) -> Self {
        let projection = match self.params.get("fields") {
            Some(fields) => Projection::Include(
                fields
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect(),
            ),
            None => Projection::Exclude(vec![REVISION_FIELD.to_string()]),
        };

        self.query = self.query.select(projection);
        self
    }

    /// Pagination stage: skip = (page - 1) * limit.
    ///
    /// No upper bound is enforced on `limit`, and a page beyond the
    /// available record count simply yields zero results.
    pub fn paginate(mut self) -> Self {
        let page = parse_positive(self.params.get("page")).unwrap_or(1);
        let limit = parse_positive(self.params.get("limit")).unwrap_or(DEFAULT_LIMIT);

        self.query = self.query.skip((page - 1) * limit).limit(limit);
        self
    }

    /// Finish the pipeline, yielding the composed, unexecuted query.
    pub fn into_query(self) -> Query {
        self.query
    }
}

/// Split `field[op]` into its parts. A key without a recognized
/// operator suffix is a plain equality field, brackets and all; a
/// nonsense field name matches nothing rather than erroring.
fn parse_filter_key(key: &str) -> (String, FilterOperator) {
    if let Some(open) = key.find('[') {
        if let Some(inner) = key[open + 1..].strip_suffix(']') {
            if let Some(op) = FilterOperator::from_token(inner) {
                return (key[..open].to_string(), op);
            }
        }
    }
    (key.to_string(), FilterOperator::Eq)
}

/// Lenient scalar parse: number, then boolean, then string.
fn parse_value(raw: &str) -> Value {
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = raw.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::String(raw.to_string()),
    }
}

/// Parse a positive integer; absent, non-numeric or zero all yield
/// `None` so callers fall back to the stage default.
fn parse_positive(raw: Option<&String>) -> Option<usize> {
    raw.and_then(|s| s.parse::<usize>().ok()).filter(|&n| n > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn run(pairs: &[(&str, &str)]) -> Query {
        QueryPipeline::new(Query::collection("tours"), &params(pairs))
            .filter()
            .sort()
            .limit_fields()
            .paginate()
            .into_query()
    }

    #[test]
    fn defaults_when_no_pagination_params() {
        let query = run(&[]);
        assert_eq!(query.spec.skip, 0);
        assert_eq!(query.spec.limit, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn page_and_limit_compose_into_skip() {
        let query = run(&[("page", "3"), ("limit", "20")]);
        assert_eq!(query.spec.skip, 40);
        assert_eq!(query.spec.limit, Some(20));
    }

    #[test]
    fn non_numeric_pagination_falls_back_to_defaults() {
        let query = run(&[("page", "abc"), ("limit", "-5")]);
        assert_eq!(query.spec.skip, 0);
        assert_eq!(query.spec.limit, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn zero_pagination_falls_back_to_defaults() {
        let query = run(&[("page", "0"), ("limit", "0")]);
        assert_eq!(query.spec.skip, 0);
        assert_eq!(query.spec.limit, Some(DEFAULT_LIMIT));
    }

    #[test]
    fn sort_parses_signed_field_list() {
        let query = run(&[("sort", "-price,name")]);
        assert_eq!(
            query.spec.sort,
            vec![SortKey::desc("price"), SortKey::asc("name")]
        );
    }

    #[test]
    fn missing_sort_defaults_to_newest_first() {
        let query = run(&[]);
        assert_eq!(query.spec.sort, vec![SortKey::desc("created_at")]);
    }

    #[test]
    fn bracketed_operator_becomes_typed_comparison() {
        let query = run(&[("price[gte]", "100")]);
        assert_eq!(
            query.spec.conditions,
            vec![FilterCondition::gte("price", json!(100))]
        );
    }

    #[test]
    fn plain_key_becomes_equality() {
        let query = run(&[("difficulty", "easy")]);
        assert_eq!(
            query.spec.conditions,
            vec![FilterCondition::eq("difficulty", json!("easy"))]
        );
    }

    #[test]
    fn unrecognized_operator_suffix_is_a_literal_field() {
        let query = run(&[("price[regex]", "100")]);
        assert_eq!(query.spec.conditions.len(), 1);
        assert_eq!(query.spec.conditions[0].field, "price[regex]");
        assert_eq!(query.spec.conditions[0].operator, FilterOperator::Eq);
    }

    #[test]
    fn reserved_keys_never_become_filters() {
        let query = run(&[
            ("page", "2"),
            ("sort", "name"),
            ("limit", "10"),
            ("fields", "name"),
        ]);
        assert!(query.spec.conditions.is_empty());
    }

    #[test]
    fn fields_param_builds_inclusion_projection() {
        let query = run(&[("fields", "name, price,ratings_average")]);
        assert_eq!(
            query.spec.projection,
            Projection::Include(vec![
                "name".to_string(),
                "price".to_string(),
                "ratings_average".to_string()
            ])
        );
    }

    #[test]
    fn missing_fields_param_excludes_revision_marker() {
        let query = run(&[]);
        assert_eq!(
            query.spec.projection,
            Projection::Exclude(vec![REVISION_FIELD.to_string()])
        );
    }

    #[test]
    fn pipeline_is_deterministic_for_identical_input() {
        let input = [("price[lte]", "500"), ("sort", "-price"), ("page", "2")];
        let first = run(&input);
        let second = run(&input);

        assert_eq!(first.spec.conditions, second.spec.conditions);
        assert_eq!(first.spec.sort, second.spec.sort);
        assert_eq!(first.spec.projection, second.spec.projection);
        assert_eq!(first.spec.skip, second.spec.skip);
        assert_eq!(first.spec.limit, second.spec.limit);
    }

    #[test]
    fn value_parsing_is_typed() {
        assert_eq!(parse_value("100"), json!(100));
        assert_eq!(parse_value("4.5"), json!(4.5));
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("easy"), json!("easy"));
    }
}
