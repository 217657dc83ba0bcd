//! Query - AQL 形式の検索クエリの組み立て
//!
//! `items.find(<filter>)[.sort(<json>)][.offset(<n>)][.limit(<n>)]`
//!
//! # 設計原則
//! - 組み立ては純粋関数（サーバーなしでテストできる）
//! - 呼び出し側の term と必須 term（repo / type=folder / depth）を `$and` で結合する
//! - `offset` / `limit` の 0、空の sort は「未指定」と同じ扱い

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::errors::LavatoryError;

/// Item type every query in this crate is restricted to.
pub const FOLDER_TYPE: &str = "folder";

/// A single filter term: `{field: {operator: value}}`.
///
/// The shorthand `{field: value}` is also accepted; the server reads it as
/// equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Term(Map<String, Value>);

impl Term {
    /// `{field: {operator: value}}`
    pub fn op(field: impl Into<String>, operator: &str, value: impl Into<Value>) -> Self {
        let mut inner = Map::new();
        inner.insert(operator.to_string(), value.into());
        let mut map = Map::new();
        map.insert(field.into(), Value::Object(inner));
        Self(map)
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(field, "$eq", value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::op(field, "$lt", value)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl TryFrom<Value> for Term {
    type Error = LavatoryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) if !map.is_empty() => Ok(Self(map)),
            other => Err(LavatoryError::Query(format!(
                "term must be a non-empty JSON object, got {other}"
            ))),
        }
    }
}

impl From<Term> for Value {
    fn from(term: Term) -> Self {
        Value::Object(term.0)
    }
}

impl FromStr for Term {
    type Err = LavatoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: Value = serde_json::from_str(s)
            .map_err(|e| LavatoryError::Query(format!("term {s:?} is not JSON: {e}")))?;
        Self::try_from(value)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    fn keyword(self) -> &'static str {
        match self {
            Self::Asc => "$asc",
            Self::Desc => "$desc",
        }
    }
}

/// `{"$asc": [fields]}` / `{"$desc": [fields]}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub order: SortOrder,
    pub fields: Vec<String>,
}

impl Sort {
    pub fn asc<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            order: SortOrder::Asc,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn desc<S: Into<String>>(fields: impl IntoIterator<Item = S>) -> Self {
        Self {
            order: SortOrder::Desc,
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.order.keyword().to_string(), json!(self.fields));
        Value::Object(map)
    }
}

/// A folder query against one repository at a fixed depth.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemQuery {
    pub repo: String,
    pub terms: Vec<Term>,
    pub depth: u32,
    pub sort: Option<Sort>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl ItemQuery {
    pub fn new(repo: impl Into<String>, depth: u32) -> Self {
        Self {
            repo: repo.into(),
            terms: Vec::new(),
            depth,
            sort: None,
            offset: None,
            limit: None,
        }
    }

    pub fn with_terms(mut self, terms: impl IntoIterator<Item = Term>) -> Self {
        self.terms.extend(terms);
        self
    }

    pub fn with_sort(mut self, sort: Option<Sort>) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_offset(mut self, offset: Option<u32>) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: Option<u32>) -> Self {
        self.limit = limit;
        self
    }

    /// Caller terms followed by the three mandatory ones.
    pub fn all_terms(&self) -> Vec<Term> {
        let mut terms = self.terms.clone();
        terms.push(Term::eq("repo", self.repo.as_str()));
        terms.push(Term::eq("type", FOLDER_TYPE));
        terms.push(Term::eq("depth", self.depth));
        terms
    }

    /// `{"$and": [...]}`
    pub fn criteria(&self) -> Value {
        let terms: Vec<Value> = self.all_terms().into_iter().map(Value::from).collect();
        json!({ "$and": terms })
    }

    /// Textual query for the structured query endpoint.
    pub fn to_aql(&self) -> String {
        let mut aql = format!("items.find({})", self.criteria());

        if let Some(sort) = self.sort.as_ref().filter(|s| !s.is_empty()) {
            aql.push_str(&format!(".sort({})", sort.to_value()));
        }

        if let Some(offset) = self.offset.filter(|n| *n > 0) {
            aql.push_str(&format!(".offset({offset})"));
        }

        if let Some(limit) = self.limit.filter(|n| *n > 0) {
            aql.push_str(&format!(".limit({limit})"));
        }

        aql
    }
}

impl fmt::Display for ItemQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_aql())
    }
}
