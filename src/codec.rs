//! JSON codec for schema documents
//!
//! Reading interns every subobject of the JSON text as its own arena node, so
//! a freshly parsed document never contains aliasing; sharing only appears
//! after reference expansion. Writing rebuilds the inline JSON form by plain
//! recursion: aliased nodes are duplicated in the output, and a document with
//! a genuine cycle cannot be written back (the recursion would not terminate).

use std::collections::BTreeMap;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::document::SchemaArena;
use crate::errors::{DocumentError, DocumentResult};
use crate::schema::{AdditionalBranch, Items, Schema};

/// Inline serde representation of one schema object.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawSchema {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    schema_type: Option<RawTypes>,
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    reference: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    any_of: Vec<RawSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    all_of: Vec<RawSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    one_of: Vec<RawSchema>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, RawSchema>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pattern_properties: BTreeMap<String, RawSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_properties: Option<RawAdditional>,
    #[serde(skip_serializing_if = "Option::is_none")]
    additional_items: Option<RawAdditional>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<RawItems>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    definitions: BTreeMap<String, RawSchema>,
}

/// `"type"` accepts a single tag or a list of tags.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawTypes {
    One(String),
    Many(Vec<String>),
}

/// `additionalProperties` / `additionalItems`: boolean gate or subschema.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAdditional {
    Allowed(bool),
    Schema(Box<RawSchema>),
}

/// `items`: one subschema or an ordered list, never both.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RawItems {
    Single(Box<RawSchema>),
    List(Vec<RawSchema>),
}

/// Parses a JSON schema document into a fresh arena, rooted at the outermost
/// object.
#[instrument(level = "debug", skip(input))]
pub fn read_schema(input: &str) -> DocumentResult<SchemaArena> {
    let raw: RawSchema = serde_json::from_str(input)?;
    let mut doc = SchemaArena::new();
    let root = intern(raw, &mut doc);
    doc.set_root(Some(root));
    Ok(doc)
}

/// Serializes a document to compact JSON. Aliased nodes are written once per
/// edge; cyclic documents cannot be serialized.
#[instrument(level = "debug", skip(doc))]
pub fn write_schema(doc: &SchemaArena) -> DocumentResult<String> {
    let raw = extract_root(doc)?;
    Ok(serde_json::to_string(&raw)?)
}

/// Serializes a document to pretty-printed JSON.
#[instrument(level = "debug", skip(doc))]
pub fn write_schema_pretty(doc: &SchemaArena) -> DocumentResult<String> {
    let raw = extract_root(doc)?;
    Ok(serde_json::to_string_pretty(&raw)?)
}

fn intern(raw: RawSchema, doc: &mut SchemaArena) -> Index {
    let mut node = Schema::new();
    node.title = raw.title;
    node.description = raw.description;
    node.schema_type = match raw.schema_type {
        Some(RawTypes::One(tag)) => vec![tag],
        Some(RawTypes::Many(tags)) => tags,
        None => Vec::new(),
    };
    node.reference = raw.reference;

    node.any_of = raw.any_of.into_iter().map(|r| intern(r, doc)).collect();
    node.all_of = raw.all_of.into_iter().map(|r| intern(r, doc)).collect();
    node.one_of = raw.one_of.into_iter().map(|r| intern(r, doc)).collect();
    node.properties = raw
        .properties
        .into_iter()
        .map(|(k, r)| (k, intern(r, doc)))
        .collect();
    node.pattern_properties = raw
        .pattern_properties
        .into_iter()
        .map(|(k, r)| (k, intern(r, doc)))
        .collect();
    node.additional_properties = raw
        .additional_properties
        .map(|r| intern_additional(r, doc));
    node.additional_items = raw.additional_items.map(|r| intern_additional(r, doc));
    node.items = raw.items.map(|r| match r {
        RawItems::Single(inner) => Items::Single(intern(*inner, doc)),
        RawItems::List(list) => {
            Items::List(list.into_iter().map(|r| intern(r, doc)).collect())
        }
    });
    node.definitions = raw
        .definitions
        .into_iter()
        .map(|(k, r)| (k, intern(r, doc)))
        .collect();

    doc.insert(node)
}

fn intern_additional(raw: RawAdditional, doc: &mut SchemaArena) -> AdditionalBranch {
    match raw {
        RawAdditional::Allowed(allows) => AdditionalBranch::allowed(allows),
        RawAdditional::Schema(inner) => AdditionalBranch::schema(intern(*inner, doc)),
    }
}

fn extract_root(doc: &SchemaArena) -> DocumentResult<RawSchema> {
    let root = doc.root().ok_or(DocumentError::EmptyDocument)?;
    extract(doc, root)
}

fn extract(doc: &SchemaArena, idx: Index) -> DocumentResult<RawSchema> {
    let node = doc.get(idx).ok_or(DocumentError::DanglingEdge(idx))?;

    let mut raw = RawSchema {
        title: node.title.clone(),
        description: node.description.clone(),
        reference: node.reference.clone(),
        ..RawSchema::default()
    };
    raw.schema_type = match node.schema_type.as_slice() {
        [] => None,
        [tag] => Some(RawTypes::One(tag.clone())),
        tags => Some(RawTypes::Many(tags.to_vec())),
    };

    raw.any_of = extract_list(doc, &node.any_of)?;
    raw.all_of = extract_list(doc, &node.all_of)?;
    raw.one_of = extract_list(doc, &node.one_of)?;
    raw.properties = extract_map(doc, &node.properties)?;
    raw.pattern_properties = extract_map(doc, &node.pattern_properties)?;
    raw.additional_properties = node
        .additional_properties
        .as_ref()
        .map(|b| extract_additional(doc, b))
        .transpose()?;
    raw.additional_items = node
        .additional_items
        .as_ref()
        .map(|b| extract_additional(doc, b))
        .transpose()?;
    raw.items = match &node.items {
        Some(Items::Single(inner)) => Some(RawItems::Single(Box::new(extract(doc, *inner)?))),
        Some(Items::List(list)) => Some(RawItems::List(extract_list(doc, list)?)),
        None => None,
    };
    raw.definitions = extract_map(doc, &node.definitions)?;

    Ok(raw)
}

fn extract_list(doc: &SchemaArena, indices: &[Index]) -> DocumentResult<Vec<RawSchema>> {
    indices.iter().map(|&idx| extract(doc, idx)).collect()
}

fn extract_map(
    doc: &SchemaArena,
    entries: &BTreeMap<String, Index>,
) -> DocumentResult<BTreeMap<String, RawSchema>> {
    entries
        .iter()
        .map(|(k, &idx)| Ok((k.clone(), extract(doc, idx)?)))
        .collect()
}

fn extract_additional(doc: &SchemaArena, branch: &AdditionalBranch) -> DocumentResult<RawAdditional> {
    // JSON has no form for "disabled with an embedded schema"; the flag wins.
    match branch.traversable() {
        Some(idx) => Ok(RawAdditional::Schema(Box::new(extract(doc, idx)?))),
        None => Ok(RawAdditional::Allowed(branch.allows)),
    }
}
