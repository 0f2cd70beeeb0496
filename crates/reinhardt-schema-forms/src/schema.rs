//! Schema and model capability types consumed by the form builder
//!
//! The form builder never talks to a storage layer directly. Everything it
//! needs from a model is expressed by the [`SchemaModel`] trait: the ordered
//! property schemas, the required list, per-column storage metadata and
//! whether the model carries an identity/versioning column.
//!
//! [`ModelSchema`] is a plain, serde-deserializable implementation that is
//! sufficient for most callers and for tests.

use crate::error::{FormError, FormResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;

/// JSON schema `type` keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
	Single(String),
	Multiple(Vec<String>),
}

impl SchemaType {
	/// Returns true if `name` is (one of) the declared types
	pub fn is(&self, name: &str) -> bool {
		match self {
			Self::Single(t) => t == name,
			Self::Multiple(types) => types.iter().any(|t| t == name),
		}
	}
}

/// Schema for one property of a model
///
/// Only the keywords relevant to form generation are modelled; anything else
/// in the source document is ignored during deserialization.
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::PropertySchema;
/// use serde_json::json;
///
/// let schema: PropertySchema = serde_json::from_value(json!({
///     "type": "string",
///     "enum": ["AL", "AK", "AZ"],
///     "title": "State",
///     "errors": {"enum": "pick a state"},
/// }))
/// .unwrap();
///
/// assert!(schema.is_type("string"));
/// assert_eq!(schema.error_message("enum"), Some("pick a state"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySchema {
	#[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
	pub schema_type: Option<SchemaType>,
	#[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
	pub enum_values: Option<Vec<Value>>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Custom validation messages keyed by validator keyword
	#[serde(default, skip_serializing_if = "IndexMap::is_empty")]
	pub errors: IndexMap<String, String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub items: Option<ItemsSchema>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub properties: Option<IndexMap<String, PropertySchema>>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub required: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub min_items: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub max_items: Option<usize>,
}

impl PropertySchema {
	pub fn is_type(&self, name: &str) -> bool {
		self.schema_type.as_ref().is_some_and(|t| t.is(name))
	}

	/// Custom message declared for a validator keyword
	pub fn error_message(&self, keyword: &str) -> Option<&str> {
		self.errors.get(keyword).map(String::as_str)
	}

	/// The single object schema describing array elements, if any
	///
	/// Returns `None` when `items` is absent, is a tuple of schemas, or does
	/// not declare `properties`.
	pub fn item_object(&self) -> Option<&PropertySchema> {
		match self.items.as_ref()? {
			ItemsSchema::Single(item) if item.properties.is_some() => Some(item),
			_ => None,
		}
	}

	/// Schema of `property` inside the element object of an array schema
	pub fn item_property(&self, property: &str) -> Option<&PropertySchema> {
		self.item_object()?.properties.as_ref()?.get(property)
	}
}

/// JSON schema `items` keyword
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemsSchema {
	/// Positional schemas; not supported for nested form rows
	Tuple(Vec<PropertySchema>),
	Single(Box<PropertySchema>),
}

/// Storage metadata for one column
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
	/// The column cannot be changed once it holds a value
	#[serde(default)]
	pub immutable: bool,
}

/// Capabilities a model must provide for form generation
///
/// The trait is object safe; form specifications hold the model as
/// `Arc<dyn SchemaModel>` and may be shared across threads.
pub trait SchemaModel: Debug + Send + Sync {
	/// Model name, used as the namespace of generated field names
	fn name(&self) -> &str;

	/// Ordered property schemas, or `None` if the model has no data schema
	fn schema_properties(&self) -> Option<&IndexMap<String, PropertySchema>>;

	/// Names of the required top-level properties
	fn required_properties(&self) -> &[String];

	/// Storage metadata for the column backing `property`
	fn column_metadata(&self, property: &str) -> Option<ColumnMetadata>;

	/// Whether records carry an identity/versioning column that allows
	/// them to be updated
	fn has_identity_column(&self) -> bool;

	fn property_schema(&self, property: &str) -> Option<&PropertySchema> {
		self.schema_properties()?.get(property)
	}

	fn is_immutable(&self, property: &str) -> bool {
		self.column_metadata(property)
			.is_some_and(|column| column.immutable)
	}
}

/// Serializable model description implementing [`SchemaModel`]
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{ModelSchema, SchemaModel};
/// use serde_json::json;
///
/// let model = ModelSchema::from_json(json!({
///     "name": "address",
///     "properties": {
///         "firstName": {"type": "string"},
///         "lastName": {"type": "string"},
///     },
///     "required": ["firstName"],
/// }))
/// .unwrap()
/// .with_immutable_column("firstName");
///
/// assert_eq!(model.name(), "address");
/// assert!(model.is_immutable("firstName"));
/// assert!(!model.has_identity_column());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSchema {
	pub name: String,
	#[serde(default)]
	pub properties: Option<IndexMap<String, PropertySchema>>,
	#[serde(default)]
	pub required: Vec<String>,
	#[serde(default)]
	pub columns: HashMap<String, ColumnMetadata>,
	#[serde(default)]
	pub identity_column: bool,
}

impl ModelSchema {
	/// Create a model with an empty data schema
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			properties: Some(IndexMap::new()),
			..Default::default()
		}
	}

	pub fn from_json(value: Value) -> FormResult<Self> {
		serde_json::from_value(value)
			.map_err(|e| FormError::config(format!("invalid model schema: {}", e)))
	}

	pub fn with_property(mut self, name: impl Into<String>, schema: PropertySchema) -> Self {
		self.properties
			.get_or_insert_with(IndexMap::new)
			.insert(name.into(), schema);
		self
	}

	pub fn with_required(mut self, name: impl Into<String>) -> Self {
		self.required.push(name.into());
		self
	}

	pub fn with_column(mut self, name: impl Into<String>, column: ColumnMetadata) -> Self {
		self.columns.insert(name.into(), column);
		self
	}

	pub fn with_immutable_column(self, name: impl Into<String>) -> Self {
		self.with_column(name, ColumnMetadata { immutable: true })
	}

	pub fn with_identity_column(mut self, identity_column: bool) -> Self {
		self.identity_column = identity_column;
		self
	}
}

impl SchemaModel for ModelSchema {
	fn name(&self) -> &str {
		&self.name
	}

	fn schema_properties(&self) -> Option<&IndexMap<String, PropertySchema>> {
		self.properties.as_ref()
	}

	fn required_properties(&self) -> &[String] {
		&self.required
	}

	fn column_metadata(&self, property: &str) -> Option<ColumnMetadata> {
		self.columns.get(property).copied()
	}

	fn has_identity_column(&self) -> bool {
		self.identity_column
	}
}
