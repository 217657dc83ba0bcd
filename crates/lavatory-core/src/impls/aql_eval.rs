//! AQL の部分集合を解釈する評価器（InMemoryRepositoryClient 用）
//!
//! 対応範囲: `items.find(<criteria>)` と `.sort()` / `.offset()` / `.limit()`。
//! criteria は `$and` / `$or`、フィールド条件は
//! `$eq` `$ne` `$lt` `$lte` `$gt` `$gte` `$match` `$nmatch` と `{field: value}` の省略形。

use std::cmp::Ordering;

use chrono::DateTime;
use serde_json::{Map, Value};

use crate::domain::{ItemRecord, LavatoryError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedAql {
    pub criteria: Value,
    pub sort: Option<Value>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

fn malformed(message: impl Into<String>) -> LavatoryError {
    LavatoryError::Query(message.into())
}

/// Reads one JSON value off the front of `input`.
fn take_json(input: &str) -> Result<(Value, &str), LavatoryError> {
    let mut stream = serde_json::Deserializer::from_str(input).into_iter::<Value>();
    let value = stream
        .next()
        .ok_or_else(|| malformed("expected a JSON value"))?
        .map_err(|e| malformed(format!("invalid JSON: {e}")))?;
    let consumed = stream.byte_offset();
    Ok((value, &input[consumed..]))
}

fn take_number(input: &str) -> Result<(usize, &str), LavatoryError> {
    let input = input.trim_start();
    let end = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let n = input[..end]
        .parse()
        .map_err(|_| malformed(format!("expected a number at {input:?}")))?;
    Ok((n, &input[end..]))
}

fn close_paren(input: &str) -> Result<&str, LavatoryError> {
    input
        .trim_start()
        .strip_prefix(')')
        .ok_or_else(|| malformed(format!("expected ')' at {input:?}")))
}

pub(crate) fn parse(text: &str) -> Result<ParsedAql, LavatoryError> {
    let rest = text
        .trim()
        .strip_prefix("items.find(")
        .ok_or_else(|| malformed(format!("unsupported query: {text}")))?;
    let (criteria, rest) = take_json(rest)?;
    let mut rest = close_paren(rest)?;

    let mut parsed = ParsedAql {
        criteria,
        sort: None,
        offset: None,
        limit: None,
    };

    while !rest.trim().is_empty() {
        let clause = rest.trim_start();
        if let Some(r) = clause.strip_prefix(".sort(") {
            let (sort, r) = take_json(r)?;
            parsed.sort = Some(sort);
            rest = close_paren(r)?;
        } else if let Some(r) = clause.strip_prefix(".offset(") {
            let (n, r) = take_number(r)?;
            parsed.offset = Some(n);
            rest = close_paren(r)?;
        } else if let Some(r) = clause.strip_prefix(".limit(") {
            let (n, r) = take_number(r)?;
            parsed.limit = Some(n);
            rest = close_paren(r)?;
        } else {
            return Err(malformed(format!("unsupported clause: {clause}")));
        }
    }

    Ok(parsed)
}

/// JSON view of an item with the computed `depth` field.
fn item_fields(item: &ItemRecord) -> Result<Map<String, Value>, LavatoryError> {
    let mut fields = match serde_json::to_value(item)? {
        Value::Object(map) => map,
        _ => return Err(malformed("item did not serialize to an object")),
    };
    fields.insert("depth".to_string(), Value::from(item.depth()));
    Ok(fields)
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => {
            match (DateTime::parse_from_rfc3339(x), DateTime::parse_from_rfc3339(y)) {
                (Ok(dx), Ok(dy)) => Some(dx.cmp(&dy)),
                _ => Some(x.cmp(y)),
            }
        }
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

pub(crate) fn glob_match(pattern: &str, text: &str) -> bool {
    fn go(p: &[char], t: &[char]) -> bool {
        match (p.first(), t.first()) {
            (None, None) => true,
            (Some('*'), _) => go(&p[1..], t) || (!t.is_empty() && go(p, &t[1..])),
            (Some('?'), Some(_)) => go(&p[1..], &t[1..]),
            (Some(pc), Some(tc)) if pc == tc => go(&p[1..], &t[1..]),
            _ => false,
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    go(&p, &t)
}

fn operator_matches(actual: Option<&Value>, op: &str, expected: &Value) -> Result<bool, LavatoryError> {
    let ordering = actual.and_then(|a| compare(a, expected));
    let matched = match op {
        "$eq" => ordering == Some(Ordering::Equal),
        "$ne" => ordering != Some(Ordering::Equal),
        "$lt" => ordering == Some(Ordering::Less),
        "$lte" => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        "$gt" => ordering == Some(Ordering::Greater),
        "$gte" => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        "$match" | "$nmatch" => {
            let (Some(Value::String(text)), Value::String(pattern)) = (actual, expected) else {
                return Ok(op == "$nmatch");
            };
            glob_match(pattern, text) == (op == "$match")
        }
        other => return Err(malformed(format!("unsupported operator {other}"))),
    };
    Ok(matched)
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> Result<bool, LavatoryError> {
    match condition {
        Value::Object(ops) if !ops.is_empty() && ops.keys().all(|k| k.starts_with('$')) => {
            for (op, expected) in ops {
                if !operator_matches(actual, op, expected)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        shorthand => operator_matches(actual, "$eq", shorthand),
    }
}

fn criteria_matches(fields: &Map<String, Value>, criteria: &Value) -> Result<bool, LavatoryError> {
    let Value::Object(clauses) = criteria else {
        return Err(malformed(format!("criteria must be an object, got {criteria}")));
    };

    for (key, value) in clauses {
        let matched = match key.as_str() {
            "$and" | "$or" => {
                let Value::Array(children) = value else {
                    return Err(malformed(format!("{key} expects an array")));
                };
                let mut results = Vec::with_capacity(children.len());
                for child in children {
                    results.push(criteria_matches(fields, child)?);
                }
                if key == "$and" {
                    results.iter().all(|r| *r)
                } else {
                    results.iter().any(|r| *r)
                }
            }
            field => field_matches(fields.get(field), value)?,
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

fn sort_keys(sort: &Value) -> Result<(bool, Vec<String>), LavatoryError> {
    let Value::Object(map) = sort else {
        return Err(malformed("sort expects an object"));
    };
    let (keyword, fields) = map
        .iter()
        .next()
        .ok_or_else(|| malformed("sort is empty"))?;
    let descending = match keyword.as_str() {
        "$asc" => false,
        "$desc" => true,
        other => return Err(malformed(format!("unsupported sort keyword {other}"))),
    };
    let fields = fields
        .as_array()
        .ok_or_else(|| malformed("sort fields must be an array"))?
        .iter()
        .filter_map(|f| f.as_str().map(ToString::to_string))
        .collect();
    Ok((descending, fields))
}

/// Runs a parsed query over `items`, returning matches in result order.
pub(crate) fn evaluate(query: &ParsedAql, items: &[ItemRecord]) -> Result<Vec<ItemRecord>, LavatoryError> {
    let mut matched = Vec::new();
    for item in items {
        let fields = item_fields(item)?;
        if criteria_matches(&fields, &query.criteria)? {
            matched.push((fields, item.clone()));
        }
    }

    if let Some(sort) = &query.sort {
        let (descending, keys) = sort_keys(sort)?;
        matched.sort_by(|(a, _), (b, _)| {
            for key in &keys {
                let ordering = match (a.get(key), b.get(key)) {
                    (Some(x), Some(y)) => compare(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                let ordering = if descending { ordering.reverse() } else { ordering };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });
    }

    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(usize::MAX);
    Ok(matched
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, item)| item)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemQuery, Sort, Term};
    use serde_json::json;

    fn folder(path: &str, name: &str, created: &str) -> ItemRecord {
        ItemRecord::new("yum-local", path, name)
            .with_type("folder")
            .with_created(created)
    }

    #[test]
    fn parses_all_clauses() {
        let text = ItemQuery::new("r", 2)
            .with_sort(Some(Sort::desc(["created"])))
            .with_offset(Some(3))
            .with_limit(Some(7))
            .to_aql();
        let parsed = parse(&text).unwrap();
        assert_eq!(parsed.sort, Some(json!({"$desc": ["created"]})));
        assert_eq!(parsed.offset, Some(3));
        assert_eq!(parsed.limit, Some(7));
        assert_eq!(parsed.criteria["$and"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn rejects_other_domains() {
        assert!(parse(r#"builds.find({"name":"x"})"#).is_err());
        assert!(parse(r#"items.find({"name":"x"}).include("name")"#).is_err());
    }

    #[test]
    fn evaluates_mandatory_terms_and_depth() {
        let items = vec![
            folder(".", "app", "2024-01-01T00:00:00.000Z"),
            folder("app", "1.0", "2024-01-02T00:00:00.000Z"),
            ItemRecord::new("yum-local", "app/1.0", "app.rpm").with_type("file"),
        ];
        let query = parse(&ItemQuery::new("yum-local", 2).to_aql()).unwrap();
        let found = evaluate(&query, &items).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_path(), "app/1.0");
    }

    #[test]
    fn compares_timestamps_across_formats() {
        let items = vec![
            folder("app", "old", "2024-01-01T00:00:00.000Z"),
            folder("app", "new", "2024-03-01T00:00:00.000Z"),
        ];
        let text = ItemQuery::new("yum-local", 2)
            .with_terms([Term::lt("created", "2024-02-01T00:00:00Z")])
            .to_aql();
        let found = evaluate(&parse(&text).unwrap(), &items).unwrap();
        let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["old"]);
    }

    #[test]
    fn shorthand_term_means_equality() {
        let items = vec![folder("app", "1.0", "2024-01-01T00:00:00Z"), folder("lib", "1.0", "2024-01-01T00:00:00Z")];
        let criteria = json!({"$and": [{"path": "lib"}]});
        let query = ParsedAql { criteria, sort: None, offset: None, limit: None };
        let found = evaluate(&query, &items).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].path, "lib");
    }

    #[test]
    fn match_operator_uses_globs() {
        assert!(glob_match("*-rc*", "1.0-rc2"));
        assert!(glob_match("app-?.rpm", "app-1.rpm"));
        assert!(!glob_match("*.jar", "app.rpm"));
        assert!(glob_match("*", ""));
    }
}
