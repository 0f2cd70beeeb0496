//! Form property-based tests
//!
//! Invariants of form building and binding over generated schemas.

use proptest::prelude::*;
use reinhardt_schema_forms::{
	BindArgs, FieldEntry, FieldOverride, FormError, FormSpec, ModelSchema, PropertySchema,
	SchemaType,
};
use serde_json::{Map, Value, json};

fn string_schema() -> PropertySchema {
	PropertySchema {
		schema_type: Some(SchemaType::Single("string".to_string())),
		..Default::default()
	}
}

fn model_with(properties: &[String]) -> ModelSchema {
	properties
		.iter()
		.fold(ModelSchema::new("item"), |model, property| {
			model.with_property(property.clone(), string_schema())
		})
}

/// Distinct property names in generation order
fn property_names(max: usize) -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec("[a-z][a-zA-Z0-9]{0,12}", 1..max).prop_map(|names| {
		let mut seen = std::collections::HashSet::new();
		names
			.into_iter()
			.filter(|name| seen.insert(name.clone()))
			.collect()
	})
}

proptest! {
	/// Without a field list, a form has one field per property in schema order
	#[test]
	fn prop_one_field_per_property(properties in property_names(16)) {
		let form = FormSpec::builder(model_with(&properties)).build().unwrap();

		let built: Vec<String> = form
			.fields()
			.iter()
			.filter_map(|item| item.as_field())
			.map(|field| field.property.clone())
			.collect();
		prop_assert_eq!(built, properties);
	}

	/// A row without explicit units splits its width evenly
	#[test]
	fn prop_row_units_even(properties in property_names(8)) {
		let form = FormSpec::builder(model_with(&properties))
			.field(FieldEntry::row(properties.iter().map(String::as_str)))
			.build()
			.unwrap();

		let row = form.fields()[0].as_row().unwrap();
		let expected = format!("1-{}", properties.len());
		prop_assert_eq!(row.len(), properties.len());
		for field in row {
			prop_assert_eq!(field.unit.as_deref(), Some(expected.as_str()));
		}
	}

	/// A row mixing explicit and implicit units is rejected
	#[test]
	fn prop_mixed_units_rejected(
		properties in property_names(8).prop_filter("need two fields", |p| p.len() >= 2),
		seed in any::<u64>(),
	) {
		let len = properties.len();
		let explicit = (seed as usize % (len - 1)) + 1;
		let entries: Vec<FieldEntry> = properties
			.iter()
			.enumerate()
			.map(|(index, property)| {
				let field = FieldOverride::new(property.as_str());
				if index < explicit {
					FieldEntry::from(field.unit(format!("1-{}", len)))
				} else {
					FieldEntry::from(field)
				}
			})
			.collect();

		let result = FormSpec::builder(model_with(&properties))
			.field(FieldEntry::Row(entries))
			.build();
		prop_assert!(matches!(result, Err(FormError::MixedUnit(_))));
	}

	/// Values bound on one instance never reach another instance or the template
	#[test]
	fn prop_instances_isolated(properties in property_names(8), text in "\\PC{0,24}") {
		let form = FormSpec::builder(model_with(&properties)).build().unwrap();
		let first_property = properties[0].clone();

		let mut input = Map::new();
		input.insert(first_property.clone(), json!(text.clone()));
		let first = form.new_instance(BindArgs::from_input(&input)).unwrap();
		prop_assert_eq!(
			first.field(&first_property).unwrap().value.clone(),
			Some(Value::String(text))
		);

		let record: Map<String, Value> = Map::new();
		let second = form.new_instance(BindArgs::from_record(&record)).unwrap();
		prop_assert!(second.field(&first_property).unwrap().value.is_none());
		prop_assert!(form.field(&first_property).unwrap().value.is_none());
	}
}
