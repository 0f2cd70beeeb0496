//! Compile schema properties and caller overrides into field specifications
//!
//! Widget inference follows the property schema:
//!
//! | Schema | Widget |
//! |--------|--------|
//! | `type: "array"` | nested rows built from `items.properties` |
//! | `enum` present | `select`, one option per enum value |
//! | `type: "boolean"` | `checkbox` |
//! | anything else | `text` |
//!
//! Overrides are applied last and always win over computed values.

use crate::error::{FormError, FormResult};
use crate::field::{
	FieldEntry, FieldOverride, FieldSpec, FormItem, InputType, Legend, SelectOption, Toggle,
};
use crate::schema::{ItemsSchema, PropertySchema, SchemaModel};
use crate::units::assign_units;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// Lower-case letter or digit followed by an upper-case letter (camelCase boundary).
static CASE_BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"([a-z0-9])([A-Z])").expect("CASE_BOUNDARY: invalid regex pattern")
});

static WORD_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"[_\-\s]+").expect("WORD_SEPARATOR: invalid regex pattern")
});

/// Human-readable title for a property name
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::builder::humanize;
///
/// assert_eq!(humanize("businessName"), "Business Name");
/// assert_eq!(humanize("first_name"), "First Name");
/// assert_eq!(humanize("zip"), "Zip");
/// ```
pub fn humanize(property: &str) -> String {
	let spaced = CASE_BOUNDARY.replace_all(property, "$1 $2");
	WORD_SEPARATOR
		.split(&spaced)
		.filter(|word| !word.is_empty())
		.map(|word| {
			let mut chars = word.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}

/// Position of a field in the tree
#[derive(Debug, Clone, Copy)]
enum FieldScope<'a> {
	TopLevel,
	/// Sub-field of the repeating group `parent`, whose elements follow `item`
	ArrayItem {
		parent: &'a str,
		item: &'a PropertySchema,
	},
}

/// Builds [`FieldSpec`]s for one model and form configuration
pub struct SchemaFieldBuilder<'a> {
	model: &'a dyn SchemaModel,
	labels: bool,
	placeholders: bool,
}

impl<'a> SchemaFieldBuilder<'a> {
	/// Create a builder honouring the form-level label and placeholder settings
	pub fn new(model: &'a dyn SchemaModel, labels: bool, placeholders: bool) -> Self {
		Self {
			model,
			labels,
			placeholders,
		}
	}

	/// Build a single (non-row) entry of a field list
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_schema_forms::{FieldEntry, InputType, ModelSchema, SchemaFieldBuilder};
	/// use serde_json::json;
	///
	/// let model = ModelSchema::from_json(json!({
	///     "name": "address",
	///     "properties": {
	///         "addressRegion": {"type": "string", "enum": ["AL", "AK"], "title": "State"},
	///     },
	/// }))
	/// .unwrap();
	///
	/// let builder = SchemaFieldBuilder::new(&model, true, false);
	/// let item = builder.build(FieldEntry::from("addressRegion")).unwrap();
	/// let field = item.as_field().unwrap();
	///
	/// assert_eq!(field.input_type, InputType::Select);
	/// assert_eq!(field.name, "address[addressRegion]");
	/// assert_eq!(field.label.as_deref(), Some("State"));
	/// ```
	pub fn build(&self, entry: FieldEntry) -> FormResult<FormItem> {
		match entry {
			FieldEntry::Row(entries) => self.build_row(entries),
			entry => {
				let field = entry
					.into_override()
					.ok_or_else(|| FormError::config("invalid field entry"))?;
				if let Some(legend) = field.legend {
					return Ok(FormItem::Legend(Legend { legend }));
				}
				self.build_field(field, FieldScope::TopLevel)
					.map(FormItem::Field)
			}
		}
	}

	/// Build a row of sibling fields and assign their layout units
	pub fn build_row(&self, entries: Vec<FieldEntry>) -> FormResult<FormItem> {
		let mut row = Vec::with_capacity(entries.len());
		for entry in entries {
			let field = entry
				.into_override()
				.ok_or_else(|| FormError::config("field rows cannot be nested"))?;
			if field.legend.is_some() {
				return Err(FormError::config(
					"legend cannot be placed inside a field row",
				));
			}
			row.push(self.build_field(field, FieldScope::TopLevel)?);
		}
		assign_units(&mut row)?;
		Ok(FormItem::Row(row))
	}

	fn build_field(&self, field: FieldOverride, scope: FieldScope<'_>) -> FormResult<FieldSpec> {
		let property = field
			.property
			.clone()
			.filter(|property| !property.is_empty())
			.ok_or_else(|| FormError::config("field must have a property"))?;
		let model = self.model.name();

		let schema = match scope {
			FieldScope::TopLevel => self.model.property_schema(&property),
			FieldScope::ArrayItem { item, .. } => item
				.properties
				.as_ref()
				.and_then(|properties| properties.get(&property)),
		};

		let mut spec = FieldSpec {
			title: schema
				.and_then(|s| s.title.clone())
				.unwrap_or_else(|| humanize(&property)),
			..Default::default()
		};

		match scope {
			FieldScope::TopLevel => {
				spec.required = self.model.required_properties().contains(&property);
				spec.immutable = self.model.is_immutable(&property);
				spec.id = format!("{}-{}", model, property);
				spec.name = format!("{}[{}]", model, property);
			}
			FieldScope::ArrayItem { parent, item } => {
				spec.required = item.required.contains(&property);
				spec.id = format!("{}-{}-{}-0", model, parent, property);
				spec.name = format!("{}[{}][0][{}]", model, parent, property);
			}
		}
		spec.property = property;

		if field.fields.is_some() && !schema.is_some_and(|s| s.is_type("array")) {
			return Err(FormError::config(format!(
				"sub-fields given for non-array property: {}",
				spec.property
			)));
		}

		match schema {
			Some(schema) => {
				spec.pattern = schema.pattern.clone();
				spec.description = schema.description.clone();

				if schema.is_type("array") {
					if let FieldScope::ArrayItem { parent, .. } = scope {
						return Err(FormError::array_schema(format!(
							"array property {} cannot be nested inside array {}",
							spec.property, parent
						)));
					}
					self.build_array(&field, &mut spec, schema)?;
				} else if let Some(values) = &schema.enum_values {
					spec.input_type = InputType::Select;
					spec.default = schema.default.clone();
					spec.options = Some(
						values
							.iter()
							.cloned()
							.map(SelectOption::from_value)
							.collect(),
					);
				} else if schema.is_type("boolean") {
					spec.input_type = InputType::Checkbox;
					spec.default = schema.default.clone();
				} else {
					spec.input_type = InputType::Text;
					spec.default = schema.default.clone();
				}
			}
			None if field.input_type.is_none() => {
				return Err(FormError::config(format!(
					"field without schema must have inputType: {}",
					spec.property
				)));
			}
			None => {}
		}

		let (label, placeholder) = apply_override(&mut spec, field);

		spec.label = match label {
			Some(Toggle::Text(text)) => Some(text),
			Some(Toggle::Flag(false)) => None,
			_ if self.labels => Some(spec.title.clone()),
			_ => None,
		};
		spec.placeholder = match placeholder {
			Some(Toggle::Text(text)) => Some(text),
			Some(Toggle::Flag(false)) => None,
			Some(Toggle::Flag(true)) => Some(spec.title.clone()),
			None if self.placeholders => Some(spec.title.clone()),
			None => None,
		};
		spec.mark_selected();

		Ok(spec)
	}

	/// Turn `spec` into a repeating group built from the array's item schema
	fn build_array(
		&self,
		field: &FieldOverride,
		spec: &mut FieldSpec,
		schema: &PropertySchema,
	) -> FormResult<()> {
		let item = match &schema.items {
			Some(ItemsSchema::Single(item)) => item.as_ref(),
			Some(ItemsSchema::Tuple(_)) => {
				return Err(FormError::array_schema(format!(
					"items of {} must be a single object schema",
					spec.property
				)));
			}
			None => {
				return Err(FormError::array_schema(format!(
					"array property {} must define items",
					spec.property
				)));
			}
		};
		let properties = item.properties.as_ref().ok_or_else(|| {
			FormError::array_schema(format!(
				"items of {} must be an object schema with properties",
				spec.property
			))
		})?;

		spec.array = true;
		spec.nested = true;
		spec.min_items = schema.min_items;
		spec.max_items = schema.max_items;
		spec.fields = Vec::new();
		spec.values = Vec::new();

		let entries: Vec<FieldEntry> = match &field.fields {
			Some(entries) => entries.clone(),
			None => properties.keys().cloned().map(FieldEntry::Name).collect(),
		};

		let parent = spec.property.clone();
		let mut fields = Vec::with_capacity(entries.len());
		for entry in entries {
			let sub = entry
				.into_override()
				.filter(|sub| sub.legend.is_none())
				.ok_or_else(|| {
					FormError::config(format!("invalid property for nested array {}", parent))
				})?;
			let sub_property = sub.property.as_deref().unwrap_or_default();
			if !properties.contains_key(sub_property) {
				return Err(FormError::config(format!(
					"invalid property for nested array {}: {}",
					parent, sub_property
				)));
			}
			fields.push(self.build_field(
				sub,
				FieldScope::ArrayItem {
					parent: &parent,
					item,
				},
			)?);
		}
		ensure_unique_properties(&fields)?;
		spec.fields = fields;

		Ok(())
	}
}

/// Reject sibling fields that share a property
pub(crate) fn ensure_unique_properties<'f>(
	fields: impl IntoIterator<Item = &'f FieldSpec>,
) -> FormResult<()> {
	let mut seen = HashSet::new();
	for field in fields {
		if !seen.insert(field.property.as_str()) {
			return Err(FormError::config(format!(
				"duplicate field property: {}",
				field.property
			)));
		}
	}
	Ok(())
}

/// Overwrite computed values with every key the caller set
///
/// Label and placeholder toggles are handed back so they can be resolved
/// against the final title.
fn apply_override(spec: &mut FieldSpec, field: FieldOverride) -> (Option<Toggle>, Option<Toggle>) {
	let FieldOverride {
		title,
		label,
		placeholder,
		description,
		input_type,
		pattern,
		required,
		default,
		options,
		readonly,
		id,
		name,
		unit,
		..
	} = field;

	if let Some(title) = title {
		spec.title = title;
	}
	if let Some(description) = description {
		spec.description = Some(description);
	}
	if let Some(input_type) = input_type {
		spec.input_type = input_type;
	}
	if let Some(pattern) = pattern {
		spec.pattern = Some(pattern);
	}
	if let Some(required) = required {
		spec.required = required;
	}
	if let Some(default) = default {
		spec.default = Some(default);
	}
	if let Some(options) = options {
		spec.options = Some(options);
	}
	if let Some(readonly) = readonly {
		spec.readonly = readonly;
	}
	if let Some(id) = id {
		spec.id = id;
	}
	if let Some(name) = name {
		spec.name = name;
	}
	if let Some(unit) = unit {
		spec.unit = Some(unit);
	}

	(label, placeholder)
}
