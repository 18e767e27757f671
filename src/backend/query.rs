//! Filter builder for hosted table queries.
//!
//! A [`Query`] renders to the hosted REST dialect (`col=op.value` pairs) for
//! the HTTP client and can also be evaluated against JSON rows, which is how
//! the in-memory backend answers the same queries.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    In(String, Vec<Value>),
    NotIn(String, Vec<Value>),
    /// Array column contains every listed element.
    Contains(String, Vec<String>),
    Gte(String, Value),
    Lte(String, Value),
    /// Case-insensitive substring match.
    ILike(String, String),
    Or(Vec<Filter>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Eq(column.to_string(), value.into()))
    }

    pub fn is_in<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(Filter::In(column.to_string(), values))
    }

    pub fn not_in<V: Into<Value>>(self, column: &str, values: impl IntoIterator<Item = V>) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.filter(Filter::NotIn(column.to_string(), values))
    }

    pub fn contains(self, column: &str, values: &[String]) -> Self {
        self.filter(Filter::Contains(column.to_string(), values.to_vec()))
    }

    pub fn gte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Gte(column.to_string(), value.into()))
    }

    pub fn lte(self, column: &str, value: impl Into<Value>) -> Self {
        self.filter(Filter::Lte(column.to_string(), value.into()))
    }

    pub fn ilike(self, column: &str, needle: &str) -> Self {
        self.filter(Filter::ILike(column.to_string(), needle.to_string()))
    }

    pub fn or(self, filters: Vec<Filter>) -> Self {
        self.filter(Filter::Or(filters))
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn page(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Same filters with ordering and paging removed, for counting.
    pub fn unpaged(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            order: None,
            limit: None,
            offset: None,
        }
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self.filters.iter().map(Filter::to_param).collect();
        if let Some(order) = &self.order {
            let dir = if order.ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{dir}", order.column)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Applies filters, ordering and paging to an in-memory row set.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        let mut out: Vec<Value> = rows.into_iter().filter(|r| self.matches(r)).cloned().collect();
        if let Some(order) = &self.order {
            out.sort_by(|a, b| {
                compare_nulls_last(a.get(&order.column), b.get(&order.column), order.ascending)
            });
        }
        let offset = self.offset.unwrap_or(0) as usize;
        let limit = self.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        out.into_iter().skip(offset).take(limit).collect()
    }
}

impl Filter {
    fn to_param(&self) -> (String, String) {
        match self {
            Filter::Or(inner) => ("or".to_string(), format!("({})", render_list(inner))),
            Filter::Eq(col, _)
            | Filter::In(col, _)
            | Filter::NotIn(col, _)
            | Filter::Contains(col, _)
            | Filter::Gte(col, _)
            | Filter::Lte(col, _)
            | Filter::ILike(col, _) => (col.clone(), self.operator()),
        }
    }

    /// `op.value` part of a filter.
    fn operator(&self) -> String {
        match self {
            Filter::Eq(_, Value::Null) => "is.null".to_string(),
            Filter::Eq(_, v) => format!("eq.{}", scalar(v)),
            Filter::In(_, values) => format!("in.({})", render_values(values)),
            Filter::NotIn(_, values) => format!("not.in.({})", render_values(values)),
            Filter::Contains(_, values) => {
                let items: Vec<String> = values.iter().map(|v| quote(v)).collect();
                format!("cs.{{{}}}", items.join(","))
            }
            Filter::Gte(_, v) => format!("gte.{}", scalar(v)),
            Filter::Lte(_, v) => format!("lte.{}", scalar(v)),
            Filter::ILike(_, needle) => format!("ilike.*{}*", escape_like(needle)),
            Filter::Or(inner) => format!("({})", render_list(inner)),
        }
    }

    /// Nested form used inside `or=(...)`.
    fn render_nested(&self) -> String {
        match self {
            Filter::Or(inner) => format!("or({})", render_list(inner)),
            Filter::Eq(col, _)
            | Filter::In(col, _)
            | Filter::NotIn(col, _)
            | Filter::Contains(col, _)
            | Filter::Gte(col, _)
            | Filter::Lte(col, _)
            | Filter::ILike(col, _) => format!("{col}.{}", self.operator()),
        }
    }

    pub fn matches(&self, row: &Value) -> bool {
        match self {
            Filter::Eq(col, Value::Null) => row.get(col).is_none_or(Value::is_null),
            Filter::Eq(col, expected) => row.get(col).is_some_and(|v| loosely_equal(v, expected)),
            Filter::In(col, options) => row
                .get(col)
                .is_some_and(|v| options.iter().any(|o| loosely_equal(v, o))),
            Filter::NotIn(col, options) => !row
                .get(col)
                .is_some_and(|v| options.iter().any(|o| loosely_equal(v, o))),
            Filter::Contains(col, needles) => match row.get(col) {
                Some(Value::Array(items)) => needles
                    .iter()
                    .all(|n| items.iter().any(|i| i.as_str() == Some(n.as_str()))),
                _ => false,
            },
            Filter::Gte(col, bound) => {
                compare(row.get(col), Some(bound)).is_some_and(|o| o != Ordering::Less)
            }
            Filter::Lte(col, bound) => {
                compare(row.get(col), Some(bound)).is_some_and(|o| o != Ordering::Greater)
            }
            Filter::ILike(col, needle) => row
                .get(col)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(&literal_needle(needle).to_lowercase())),
            Filter::Or(inner) => inner.iter().any(|f| f.matches(row)),
        }
    }
}

fn render_list(filters: &[Filter]) -> String {
    filters
        .iter()
        .map(Filter::render_nested)
        .collect::<Vec<_>>()
        .join(",")
}

fn render_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| quote(&scalar(v)))
        .collect::<Vec<_>>()
        .join(",")
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Double-quotes list items that contain reserved characters.
/// Substring searches are literal. The hosted dialect has no way to
/// escape its `*` wildcard, so it is dropped from needles on both sides.
fn literal_needle(needle: &str) -> String {
    needle.replace('*', "")
}

fn escape_like(needle: &str) -> String {
    let mut out = String::with_capacity(needle.len());
    for c in literal_needle(needle).chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn quote(item: &str) -> String {
    if item.chars().any(|c| ",(){}\". ".contains(c)) {
        format!("\"{}\"", item.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        item.to_string()
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Number(x), Value::String(y)) | (Value::String(y), Value::Number(x)) => {
            y.parse::<f64>().ok() == x.as_f64()
        }
        (Value::Bool(x), Value::String(y)) | (Value::String(y), Value::Bool(x)) => {
            y.parse::<bool>().ok() == Some(*x)
        }
        _ => a == b,
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Option<Ordering> {
    match (a?, b?) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn compare_nulls_last(a: Option<&Value>, b: Option<&Value>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (a, b) => {
            let ord = compare(a, b).unwrap_or(Ordering::Equal);
            if ascending { ord } else { ord.reverse() }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn renders_listing_filters() {
        let query = Query::new()
            .eq("is_active", true)
            .contains("types", &["Party".to_string(), "Semi-Formal".to_string()])
            .is_in("size", ["S", "M"])
            .gte("price", 10.5)
            .lte("price", 80)
            .ilike("title", "gown")
            .order_by("created_at", false)
            .page(20, 40);
        let params = query.to_params();

        assert_eq!(param(&params, "is_active"), Some("eq.true"));
        assert_eq!(param(&params, "types"), Some("cs.{Party,Semi-Formal}"));
        assert_eq!(param(&params, "size"), Some("in.(S,M)"));
        assert_eq!(param(&params, "title"), Some("ilike.*gown*"));
        assert_eq!(param(&params, "order"), Some("created_at.desc"));
        assert_eq!(param(&params, "limit"), Some("20"));
        assert_eq!(param(&params, "offset"), Some("40"));
        let prices: Vec<&str> = params
            .iter()
            .filter(|(k, _)| k == "price")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(prices, vec!["gte.10.5", "lte.80"]);
    }

    #[test]
    fn search_wildcards_are_literal() {
        let query = Query::new().ilike("title", "50%_off*");
        assert_eq!(query.to_params()[0].1, r"ilike.*50\%\_off*");
        let row = json!({ "title": "Gown 50%_off today" });
        assert!(query.matches(&row));
        assert!(!Query::new().ilike("title", "50%").matches(&json!({ "title": "Gown 500" })));
    }

    #[test]
    fn quotes_reserved_characters_in_lists() {
        let query = Query::new().contains("colors", &["Navy Blue".to_string(), "a,b".to_string()]);
        assert_eq!(query.to_params()[0].1, r#"cs.{"Navy Blue","a,b"}"#);
    }

    #[test]
    fn renders_or_groups() {
        let query = Query::new().or(vec![
            Filter::Eq("is_available".into(), json!(false)),
            Filter::In("status".into(), vec![json!("reserved"), json!("rented")]),
        ]);
        assert_eq!(
            query.to_params(),
            vec![(
                "or".to_string(),
                "(is_available.eq.false,status.in.(reserved,rented))".to_string()
            )]
        );
    }

    #[test]
    fn evaluates_filters_against_rows() {
        let row = json!({
            "types": ["Party", "Formal"],
            "size": "M",
            "price": 45,
            "title": "Sparkly Party Dress",
            "start_date": "2024-03-15",
            "renter_id": null
        });

        assert!(Query::new().contains("types", &["Party".into()]).matches(&row));
        assert!(!Query::new().contains("types", &["Party".into(), "Work".into()]).matches(&row));
        assert!(Query::new().is_in("size", ["S", "M"]).matches(&row));
        assert!(!Query::new().not_in("size", ["S", "M"]).matches(&row));
        assert_eq!(
            Query::new().not_in("id", ["a", "b"]).to_params()[0].1,
            "not.in.(a,b)"
        );
        assert!(Query::new().gte("price", 45.0).lte("price", 45).matches(&row));
        assert!(!Query::new().gte("price", 46).matches(&row));
        assert!(Query::new().ilike("title", "PARTY").matches(&row));
        assert!(!Query::new().ilike("title", "p_rty").matches(&row));
        assert!(Query::new().lte("start_date", "2024-03-20").matches(&row));
        assert!(Query::new().eq("renter_id", Value::Null).matches(&row));
        assert!(!Query::new().gte("missing", 1).matches(&row));
    }

    #[test]
    fn apply_orders_and_pages() {
        let rows = vec![
            json!({"title": "b", "price": 30}),
            json!({"title": "a", "price": 50}),
            json!({"title": "c", "price": null}),
        ];
        let out = Query::new().order_by("price", false).apply(&rows);
        let titles: Vec<&str> = out.iter().filter_map(|r| r["title"].as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);

        let out = Query::new().order_by("title", true).page(1, 1).apply(&rows);
        assert_eq!(out, vec![json!({"title": "b", "price": 30})]);
    }
}
