use serde_json::{json, Value};

/// Filter / ordering / paging predicate for `list_documents`
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, Value),
    OrderAsc(String),
    OrderDesc(String),
    Limit(u32),
    Offset(u32),
}

impl Query {
    pub fn equal(attribute: &str, value: impl Into<Value>) -> Self {
        Query::Equal(attribute.to_string(), value.into())
    }

    pub fn order_asc(attribute: &str) -> Self {
        Query::OrderAsc(attribute.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    /// Appwrite JSON query syntax, one string per `queries[]` parameter
    pub fn to_query_string(&self) -> String {
        let value = match self {
            Query::Equal(attribute, value) => {
                json!({"method": "equal", "attribute": attribute, "values": [value]})
            }
            Query::OrderAsc(attribute) => json!({"method": "orderAsc", "attribute": attribute}),
            Query::OrderDesc(attribute) => json!({"method": "orderDesc", "attribute": attribute}),
            Query::Limit(limit) => json!({"method": "limit", "values": [limit]}),
            Query::Offset(offset) => json!({"method": "offset", "values": [offset]}),
        };
        value.to_string()
    }

    pub fn is_paging(&self) -> bool {
        matches!(self, Query::Limit(_) | Query::Offset(_))
    }
}

/// Floor / ceiling applied by an atomic increment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Bounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Bounds {
    pub const NONE: Bounds = Bounds { min: None, max: None };

    pub fn floor(min: i64) -> Self {
        Self { min: Some(min), max: None }
    }

    pub fn contains(&self, value: i64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}
