//! # Document Normalizer
//!
//! ## Purpose
//! Converts one parsed JSON value of unknown shape, plus its source file name,
//! into zero or more uniform `LegalRecord`s.
//!
//! ## Recognized Shapes (checked in priority order)
//! 1. Top-level array: every element is a generic document
//! 2. Mapping with a `parts` key: constitution parts and their articles
//! 3. Mapping with a `sections` key: one generic document per element
//! 4. Plain mapping: a single generic document
//!
//! Anything else is an unrecognized shape, dropped with a logged warning.

use crate::errors::{Result, SearchError};
use crate::{default_doc_type, LegalRecord};
use serde_json::{Map, Value};

/// Closed set of document shapes the corpus may contain.
///
/// Classification borrows the value; emission happens against the same
/// borrowed JSON so a large corpus file is never cloned.
#[derive(Debug)]
pub enum DocumentShape<'a> {
    /// Top-level array of independent documents
    Collection(&'a Vec<Value>),
    /// Constitution layout: `parts` → part → `articles` → article
    Constitution(&'a Map<String, Value>),
    /// Mapping carrying a `sections` array of documents
    Sectioned(&'a Map<String, Value>),
    /// A single generic document
    Single(&'a Map<String, Value>),
    /// Not a shape we know how to index
    Unrecognized,
}

impl<'a> DocumentShape<'a> {
    /// Classify a parsed JSON value into one of the recognized shapes.
    pub fn classify(value: &'a Value) -> Self {
        match value {
            Value::Array(items) => DocumentShape::Collection(items),
            Value::Object(map) if map.contains_key("parts") => DocumentShape::Constitution(map),
            Value::Object(map) if map.contains_key("sections") => DocumentShape::Sectioned(map),
            Value::Object(map) => DocumentShape::Single(map),
            _ => DocumentShape::Unrecognized,
        }
    }
}

/// Normalize one corpus file's JSON value into records.
///
/// Returns `MalformedDocument` when the value (or a structural key like
/// `sections`) has the wrong JSON type; the caller skips the file and keeps
/// loading. Unrecognized elements inside arrays are dropped individually with
/// a warning instead of poisoning the rest of the file.
pub fn normalize_document(value: &Value, source_file: &str) -> Result<Vec<LegalRecord>> {
    match DocumentShape::classify(value) {
        DocumentShape::Collection(items) => Ok(collect_generic(items, source_file)),
        DocumentShape::Constitution(map) => normalize_constitution(map, source_file),
        DocumentShape::Sectioned(map) => {
            let sections = map
                .get("sections")
                .and_then(Value::as_array)
                .ok_or_else(|| SearchError::MalformedDocument {
                    file: source_file.to_string(),
                    details: "'sections' is not an array".to_string(),
                })?;
            Ok(collect_generic(sections, source_file))
        }
        DocumentShape::Single(map) => Ok(vec![normalize_generic(map, source_file)]),
        DocumentShape::Unrecognized => Err(SearchError::MalformedDocument {
            file: source_file.to_string(),
            details: "top-level value is neither an array nor an object".to_string(),
        }),
    }
}

/// Normalize every object element of an array; warn and skip anything else.
fn collect_generic(items: &[Value], source_file: &str) -> Vec<LegalRecord> {
    let mut records = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        match item.as_object() {
            Some(map) => records.push(normalize_generic(map, source_file)),
            None => {
                tracing::warn!(
                    "Skipping non-object element {} in {}",
                    position,
                    source_file
                );
            }
        }
    }
    records
}

/// Constitution layout: every part's `articles` mapping yields one record per
/// article, tagged with the part title.
fn normalize_constitution(map: &Map<String, Value>, source_file: &str) -> Result<Vec<LegalRecord>> {
    let parts = map
        .get("parts")
        .and_then(Value::as_object)
        .ok_or_else(|| SearchError::MalformedDocument {
            file: source_file.to_string(),
            details: "'parts' is not an object".to_string(),
        })?;

    let mut records = Vec::new();
    for part in parts.values() {
        let Some(part_obj) = part.as_object() else {
            continue;
        };
        let Some(articles) = part_obj.get("articles").and_then(Value::as_object) else {
            continue;
        };
        let part_title = string_field(part_obj, "title");

        for (article_key, article) in articles {
            let article_obj = article.as_object();
            records.push(LegalRecord {
                section: article_key.clone(),
                title: article_obj.map(|a| string_field(a, "title")).unwrap_or_default(),
                text: article_obj
                    .map(|a| string_field(a, "content"))
                    .unwrap_or_default(),
                part: Some(part_title.clone()),
                doc_type: "constitution".to_string(),
                source_file: source_file.to_string(),
                keywords: Vec::new(),
            });
        }
    }

    Ok(records)
}

/// Generic document: copy matching keys, default the rest, ignore the unknown.
fn normalize_generic(map: &Map<String, Value>, source_file: &str) -> LegalRecord {
    LegalRecord {
        section: string_field(map, "section"),
        title: string_field(map, "title"),
        text: string_field(map, "text"),
        part: map
            .get("part")
            .and_then(Value::as_str)
            .map(|s| s.to_string()),
        doc_type: map
            .get("type")
            .and_then(Value::as_str)
            .map(|s| s.to_string())
            .unwrap_or_else(default_doc_type),
        source_file: source_file.to_string(),
        keywords: keywords_field(map),
    }
}

fn string_field(map: &Map<String, Value>, key: &str) -> String {
    map.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Keywords may arrive as an array of strings or a single scalar; anything
/// non-string inside an array is dropped.
fn keywords_field(map: &Map<String, Value>) -> Vec<String> {
    match map.get("keywords") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.to_string())
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Number(n)) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn constitution_shape_emits_one_record_per_article() {
        let doc = json!({
            "parts": {
                "part3": {
                    "title": "Part III - Fundamental Rights",
                    "articles": {
                        "Article 14": {
                            "title": "Equality before law",
                            "content": "The State shall not deny to any person equality before the law."
                        },
                        "Article 21": {
                            "title": "Protection of life and personal liberty",
                            "content": "No person shall be deprived of his life or personal liberty."
                        }
                    }
                }
            }
        });

        let records = normalize_document(&doc, "constitution.json").unwrap();
        assert_eq!(records.len(), 2);

        let article21 = records.iter().find(|r| r.section == "Article 21").unwrap();
        assert_eq!(article21.title, "Protection of life and personal liberty");
        assert_eq!(article21.part.as_deref(), Some("Part III - Fundamental Rights"));
        assert_eq!(article21.doc_type, "constitution");
        assert_eq!(article21.source_file, "constitution.json");
    }

    #[test]
    fn constitution_article_missing_fields_default_to_empty() {
        let doc = json!({
            "parts": {
                "p": {
                    "articles": { "Article 1": {} }
                }
            }
        });

        let records = normalize_document(&doc, "constitution.json").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "");
        assert_eq!(records[0].text, "");
        assert_eq!(records[0].part.as_deref(), Some(""));
    }

    #[test]
    fn sectioned_shape_emits_generic_records() {
        let doc = json!({
            "act": "Indian Penal Code",
            "sections": [
                {"section": "Section 420", "title": "Cheating", "text": "Whoever cheats...", "type": "ipc"},
                {"section": "Section 302", "title": "Murder", "text": "Whoever commits murder...", "type": "ipc"}
            ]
        });

        let records = normalize_document(&doc, "ipc.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].section, "Section 420");
        assert_eq!(records[0].doc_type, "ipc");
        assert!(records[0].part.is_none());
    }

    #[test]
    fn array_shape_emits_generic_records() {
        let doc = json!([
            {"section": "Section 10", "title": "What agreements are contracts", "text": "All agreements...", "type": "contract_act"},
            {"section": "Section 11", "text": "Every person is competent to contract...", "keywords": ["capacity", "majority"]}
        ]);

        let records = normalize_document(&doc, "contract_act.json").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].doc_type, "contract_act");
        // Missing type defaults to the generic tag
        assert_eq!(records[1].doc_type, "legal");
        assert_eq!(records[1].keywords, vec!["capacity", "majority"]);
    }

    #[test]
    fn plain_mapping_is_a_single_document() {
        let doc = json!({"section": "Section 154", "title": "FIR", "text": "Every information...", "type": "crpc"});
        let records = normalize_document(&doc, "crpc.json").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].section, "Section 154");
    }

    #[test]
    fn scalar_keywords_become_a_single_entry() {
        let doc = json!({"section": "Section 1", "keywords": "preliminary"});
        let records = normalize_document(&doc, "x.json").unwrap();
        assert_eq!(records[0].keywords, vec!["preliminary"]);
    }

    #[test]
    fn non_object_array_elements_are_dropped() {
        let doc = json!([
            {"section": "Section 1", "text": "valid"},
            "stray string",
            42
        ]);
        let records = normalize_document(&doc, "mixed.json").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].section, "Section 1");
    }

    #[test]
    fn scalar_top_level_is_malformed() {
        let doc = json!("just a string");
        let err = normalize_document(&doc, "bad.json").unwrap_err();
        assert!(matches!(err, SearchError::MalformedDocument { .. }));
    }

    #[test]
    fn wrong_sections_type_is_malformed() {
        let doc = json!({"sections": "not an array"});
        let err = normalize_document(&doc, "bad.json").unwrap_err();
        assert!(matches!(err, SearchError::MalformedDocument { .. }));
    }
}
