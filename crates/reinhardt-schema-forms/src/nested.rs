//! Binding of repeating rows for nested-array fields

use crate::error::{FormError, FormResult};
use crate::field::{FieldSpec, InputType};
use serde_json::Value;

/// Source a form instance is being bound from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindMode {
	/// Values stored on a persisted record
	Record,
	/// Raw values submitted by a user
	Input,
}

/// Bind one scalar field using the rules of `mode`
///
/// Record values on immutable fields lock the field; a stored `null` counts
/// as unset and leaves the field editable. Submitted values are never copied
/// into password fields.
pub(crate) fn bind_scalar(field: &mut FieldSpec, value: Option<&Value>, mode: BindMode) {
	match mode {
		BindMode::Record => {
			field.value = value.cloned();
			if field.immutable && value.is_some_and(|v| !v.is_null()) {
				field.readonly = true;
			}
		}
		BindMode::Input => {
			if field.input_type != InputType::Password {
				field.value = value.cloned();
			}
		}
	}
	field.mark_selected();
}

/// Materializes bound rows of a nested-array field
pub struct NestedArrayBinder;

impl NestedArrayBinder {
	/// Append one bound row per element and advance the template to the
	/// next free row index
	///
	/// An absent or `null` value binds no rows.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_schema_forms::{BindMode, FieldSpec, NestedArrayBinder};
	/// use serde_json::json;
	///
	/// let mut field = FieldSpec {
	///     property: "tags".to_string(),
	///     array: true,
	///     nested: true,
	///     fields: vec![FieldSpec {
	///         property: "label".to_string(),
	///         name: "post[tags][0][label]".to_string(),
	///         ..Default::default()
	///     }],
	///     ..Default::default()
	/// };
	///
	/// let elements = json!([{"label": "rust"}, {"label": "forms"}]);
	/// NestedArrayBinder::bind(&mut field, Some(&elements), BindMode::Input).unwrap();
	///
	/// assert_eq!(field.values.len(), 2);
	/// assert_eq!(field.values[1][0].name, "post[tags][1][label]");
	/// assert_eq!(field.values[1][0].value, Some(json!("forms")));
	/// assert_eq!(field.fields[0].name, "post[tags][2][label]");
	/// ```
	pub fn bind(field: &mut FieldSpec, elements: Option<&Value>, mode: BindMode) -> FormResult<()> {
		let elements: &[Value] = match elements {
			None | Some(Value::Null) => &[],
			Some(Value::Array(elements)) => elements.as_slice(),
			Some(other) => {
				return Err(FormError::ArrayType(format!(
					"value of {} must be a list, got {}",
					field.property,
					value_kind(other)
				)));
			}
		};

		let property = field.property.clone();
		for (index, element) in elements.iter().enumerate() {
			let object = element.as_object();
			let mut row = field.fields.clone();
			for sub in row.iter_mut() {
				let value = object.and_then(|o| o.get(&sub.property));
				bind_scalar(sub, value, mode);
				sub.set_row_index(&property, index);
			}
			field.values.push(row);
		}

		for sub in field.fields.iter_mut() {
			sub.set_row_index(&property, elements.len());
		}

		Ok(())
	}
}

fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::SelectOption;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn credentials() -> FieldSpec {
		let sub = |property: &str, input_type: InputType| FieldSpec {
			property: property.to_string(),
			input_type,
			id: format!("user-credentials-{}-0", property),
			name: format!("user[credentials][0][{}]", property),
			..Default::default()
		};
		let mut kind = sub("kind", InputType::Select);
		kind.options = Some(vec![
			SelectOption::from_value(json!("api")),
			SelectOption::from_value(json!("ssh")),
		]);

		FieldSpec {
			property: "credentials".to_string(),
			array: true,
			nested: true,
			fields: vec![sub("login", InputType::Text), sub("secret", InputType::Password), kind],
			..Default::default()
		}
	}

	#[rstest]
	fn test_record_rows(mut credentials: FieldSpec) {
		let elements = json!([
			{"login": "alice", "secret": "s3cret", "kind": "ssh"},
			{"login": "bob"},
		]);
		NestedArrayBinder::bind(&mut credentials, Some(&elements), BindMode::Record).unwrap();

		assert_eq!(credentials.values.len(), 2);
		let first = &credentials.values[0];
		assert_eq!(first[0].value, Some(json!("alice")));
		assert_eq!(first[0].id, "user-credentials-login-0");
		assert_eq!(first[1].value, Some(json!("s3cret")));
		assert!(first[2].options.as_ref().unwrap()[1].selected);

		let second = &credentials.values[1];
		assert_eq!(second[0].name, "user[credentials][1][login]");
		assert_eq!(second[0].id, "user-credentials-login-1");
		assert_eq!(second[1].value, None);

		assert_eq!(credentials.fields[0].name, "user[credentials][2][login]");
		assert_eq!(credentials.fields[0].value, None);
		assert!(credentials.value.is_none());
	}

	#[rstest]
	fn test_input_rows_skip_passwords(mut credentials: FieldSpec) {
		let elements = json!([{"login": "alice", "secret": "s3cret"}]);
		NestedArrayBinder::bind(&mut credentials, Some(&elements), BindMode::Input).unwrap();

		let row = &credentials.values[0];
		assert_eq!(row[0].value, Some(json!("alice")));
		assert_eq!(row[1].value, None);
	}

	#[rstest]
	#[case(None)]
	#[case(Some(json!(null)))]
	#[case(Some(json!([])))]
	fn test_no_rows(mut credentials: FieldSpec, #[case] elements: Option<Value>) {
		NestedArrayBinder::bind(&mut credentials, elements.as_ref(), BindMode::Record).unwrap();
		assert!(credentials.values.is_empty());
		assert_eq!(credentials.fields[0].name, "user[credentials][0][login]");
	}

	#[rstest]
	#[case(json!("alice"), "string")]
	#[case(json!({"login": "alice"}), "object")]
	#[case(json!(3), "number")]
	fn test_not_a_list(mut credentials: FieldSpec, #[case] elements: Value, #[case] kind: &str) {
		let err = NestedArrayBinder::bind(&mut credentials, Some(&elements), BindMode::Input).unwrap_err();
		assert_eq!(
			err,
			FormError::ArrayType(format!("value of credentials must be a list, got {}", kind))
		);
	}

	#[test]
	fn test_immutable_record_value_locks_field() {
		let mut field = FieldSpec {
			immutable: true,
			..Default::default()
		};
		bind_scalar(&mut field, Some(&json!("fixed")), BindMode::Record);
		assert!(field.readonly);

		let mut field = FieldSpec {
			immutable: true,
			..Default::default()
		};
		bind_scalar(&mut field, Some(&json!(null)), BindMode::Record);
		assert!(!field.readonly);

		let mut field = FieldSpec {
			immutable: true,
			..Default::default()
		};
		bind_scalar(&mut field, Some(&json!("typed")), BindMode::Input);
		assert!(!field.readonly);
	}
}
