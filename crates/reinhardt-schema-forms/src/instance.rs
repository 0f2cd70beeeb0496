//! Per-request form instances
//!
//! [`InstanceBinder`] deep-copies a [`FormSpec`] and binds it to either a
//! stored record or a user submission, overlaying validator errors onto the
//! fields they address. The template is never modified.

use crate::error::{FormError, FormResult};
use crate::field::{FieldSpec, FormItem};
use crate::form::{FormMode, FormSpec, Submit};
use crate::locator::{
	ErrorTarget, ReportEntry, SubmissionError, ValidationError, resolve_locator,
};
use crate::nested::{BindMode, NestedArrayBinder, bind_scalar};
use crate::schema::SchemaModel;
use serde::Serialize;
use serde_json::{Map, Value};

/// Message used when a failed save carries no usable detail
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Read access to the stored values of a record
pub trait RecordAccessor: Send + Sync {
	/// Values keyed by property name
	fn data(&self) -> &Map<String, Value>;
}

impl RecordAccessor for Map<String, Value> {
	fn data(&self) -> &Map<String, Value> {
		self
	}
}

/// Sources for one binding
///
/// Exactly one of `record` or `input` must be set. `error` may only
/// accompany `input`.
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{BindArgs, SubmissionError};
/// use serde_json::{Map, Value, json};
///
/// let input: Map<String, Value> = json!({"firstName": "Ada"})
///     .as_object()
///     .cloned()
///     .unwrap();
/// let error = SubmissionError::from("save failed");
///
/// let args = BindArgs::from_input(&input).error(&error);
/// assert!(args.input.is_some());
/// assert!(args.record.is_none());
/// ```
#[derive(Clone, Copy, Default)]
pub struct BindArgs<'a> {
	pub record: Option<&'a dyn RecordAccessor>,
	pub input: Option<&'a Map<String, Value>>,
	pub error: Option<&'a SubmissionError>,
}

impl<'a> BindArgs<'a> {
	pub fn from_record<R: RecordAccessor + 'a>(record: &'a R) -> Self {
		Self::default().record(record)
	}

	pub fn from_input(input: &'a Map<String, Value>) -> Self {
		Self::default().input(input)
	}

	pub fn record<R: RecordAccessor + 'a>(mut self, record: &'a R) -> Self {
		self.record = Some(record);
		self
	}

	pub fn input(mut self, input: &'a Map<String, Value>) -> Self {
		self.input = Some(input);
		self
	}

	pub fn error(mut self, error: &'a SubmissionError) -> Self {
		self.error = Some(error);
		self
	}

	fn source(&self) -> FormResult<Source<'a>> {
		match (self.record, self.input, self.error) {
			(Some(record), None, None) => Ok(Source::Record(record.data())),
			(None, Some(values), error) => Ok(Source::Input { values, error }),
			_ => Err(FormError::config("need either record or input/error")),
		}
	}
}

enum Source<'a> {
	Record(&'a Map<String, Value>),
	Input {
		values: &'a Map<String, Value>,
		error: Option<&'a SubmissionError>,
	},
}

/// A form bound to one record or submission
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInstance {
	pub id: String,
	pub title: String,
	pub action: String,
	pub method: String,
	pub enctype: String,
	pub mode: FormMode,
	pub labels: bool,
	pub placeholders: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redirect: Option<String>,
	pub submit: Submit,
	pub fields: Vec<FormItem>,
	/// Messages not attributable to a visible field
	pub errors: Vec<String>,
}

impl FormInstance {
	/// Top-level field by property, including fields placed in rows
	pub fn field(&self, property: &str) -> Option<&FieldSpec> {
		self.fields
			.iter()
			.flat_map(FormItem::fields)
			.find(|field| field.property == property)
	}

	/// Whether any message was recorded on the form or on any field
	pub fn has_errors(&self) -> bool {
		fn any_errors(field: &FieldSpec) -> bool {
			field.has_errors()
				|| field.fields.iter().any(any_errors)
				|| field.values.iter().flatten().any(any_errors)
		}

		!self.errors.is_empty() || self.fields.iter().flat_map(FormItem::fields).any(any_errors)
	}
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Creates [`FormInstance`]s from a [`FormSpec`]
///
/// # Binding lifecycle
///
/// ```mermaid
/// stateDiagram-v2
///     [*] --> Uninitialized
///     Uninitialized --> Cloned: copy template
///     Cloned --> ValueBound: record or input values
///     ValueBound --> ErrorBound: failed save supplied
///     ValueBound --> PolicyApplied
///     ErrorBound --> PolicyApplied: mode policy
///     PolicyApplied --> [*]
/// ```
pub struct InstanceBinder;

impl InstanceBinder {
	/// Bind a copy of `form` to the sources in `args`
	///
	/// Record values lock immutable fields. Submitted values skip password
	/// fields and may be accompanied by a failed save whose errors are
	/// attached to the fields they address. Update forms of models without
	/// an identity column come back fully read-only with submit disabled.
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_schema_forms::{BindArgs, FormSpec, InstanceBinder, ModelSchema};
	/// use serde_json::{Map, Value, json};
	///
	/// let model = ModelSchema::from_json(json!({
	///     "name": "address",
	///     "properties": {"firstName": {"type": "string"}},
	/// }))
	/// .unwrap();
	/// let form = FormSpec::builder(model).build().unwrap();
	///
	/// let record: Map<String, Value> = json!({"firstName": "Ada"}).as_object().cloned().unwrap();
	/// let instance = InstanceBinder::bind(&form, BindArgs::from_record(&record)).unwrap();
	///
	/// assert_eq!(instance.field("firstName").unwrap().value, Some(json!("Ada")));
	/// assert_eq!(form.field("firstName").unwrap().value, None);
	/// ```
	pub fn bind(form: &FormSpec, args: BindArgs<'_>) -> FormResult<FormInstance> {
		let source = args.source()?;
		let model = form.model();

		let mut instance = FormInstance {
			id: form.id().to_string(),
			title: form.title().to_string(),
			action: form.action().to_string(),
			method: form.method().to_string(),
			enctype: form.enctype().to_string(),
			mode: form.mode(),
			labels: form.labels(),
			placeholders: form.placeholders(),
			redirect: form.redirect().map(str::to_string),
			submit: form.submit().clone(),
			fields: form.fields().to_vec(),
			errors: Vec::new(),
		};

		match source {
			Source::Record(values) => bind_values(&mut instance, values, BindMode::Record)?,
			Source::Input { values, error } => {
				bind_values(&mut instance, values, BindMode::Input)?;
				if let Some(error) = error {
					apply_error(&mut instance, model, error);
				}
			}
		}

		apply_policy(&mut instance, model);

		tracing::debug!(
			model = %model.name(),
			mode = ?instance.mode,
			errors = instance.errors.len(),
			"bound form instance"
		);
		Ok(instance)
	}
}

fn bind_values(
	instance: &mut FormInstance,
	values: &Map<String, Value>,
	mode: BindMode,
) -> FormResult<()> {
	for item in instance.fields.iter_mut() {
		for field in item.fields_mut() {
			let value = values.get(&field.property);
			if field.is_array() {
				NestedArrayBinder::bind(field, value, mode)?;
			} else {
				bind_scalar(field, value, mode);
			}
		}
	}
	Ok(())
}

fn apply_error(instance: &mut FormInstance, model: &dyn SchemaModel, error: &SubmissionError) {
	let entries = match error.report_entries() {
		Some(entries) => entries,
		None => {
			let message = match error {
				SubmissionError::Message(message) => message.clone(),
				SubmissionError::Report { message, .. } => message
					.clone()
					.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
			};
			instance.errors.push(message);
			return;
		}
	};

	for entry in entries {
		let error = match entry {
			ReportEntry::Validation(error) => error,
			ReportEntry::Malformed { message } => {
				tracing::debug!("report entry is not a validation error");
				instance
					.errors
					.push(message.unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()));
				continue;
			}
		};
		let target = resolve_locator(&error);
		let message = error_message(model, &error, target.as_ref());

		match target
			.as_ref()
			.and_then(|target| find_target_mut(&mut instance.fields, target))
		{
			Some(field) if !field.is_hidden() => {
				if !field.is_array() {
					field.value = field.default.clone();
				}
				field.add_error(message);
				field.mark_selected();
			}
			_ => {
				tracing::debug!(
					locator = %error.locator,
					keyword = %error.keyword,
					"validation error has no visible field"
				);
				instance.errors.push(message);
			}
		}
	}
}

/// Message to display for `error`
///
/// Custom messages come from the schema of the addressed property: the
/// array item's property schema for row fields, the model's property schema
/// otherwise.
fn error_message(
	model: &dyn SchemaModel,
	error: &ValidationError,
	target: Option<&ErrorTarget>,
) -> String {
	let custom = target.and_then(|target| {
		let schema = match target.base_property.as_deref() {
			Some(base) => model.property_schema(base)?.item_property(&target.property)?,
			None => model.property_schema(&target.property)?,
		};
		schema.error_message(&error.keyword)
	});

	if let Some(message) = custom {
		return message.to_string();
	}
	if let Some(missing) = error.missing_property() {
		return format!("{} required", missing);
	}
	error.message.clone()
}

fn find_target_mut<'f>(
	items: &'f mut [FormItem],
	target: &ErrorTarget,
) -> Option<&'f mut FieldSpec> {
	let mut top_level = items.iter_mut().flat_map(|item| item.fields_mut().iter_mut());

	let Some(base) = target.base_property.as_deref() else {
		return top_level.find(|field| field.property == target.property);
	};

	let parent = top_level.find(|field| field.property == base)?;
	let row_exists = target
		.index
		.is_some_and(|index| index < parent.values.len());
	let row = match target.index {
		Some(index) if row_exists => &mut parent.values[index],
		_ => &mut parent.fields,
	};
	row.iter_mut().find(|field| field.property == target.property)
}

/// Lock update forms whose records cannot be updated
fn apply_policy(instance: &mut FormInstance, model: &dyn SchemaModel) {
	if instance.mode != FormMode::Update || model.has_identity_column() {
		return;
	}

	for item in instance.fields.iter_mut() {
		for field in item.fields_mut() {
			field.lock();
		}
	}
	instance.submit.enabled = false;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::field::{FieldOverride, InputType};
	use crate::schema::ModelSchema;
	use rstest::{fixture, rstest};
	use serde_json::json;

	fn object(value: Value) -> Map<String, Value> {
		value.as_object().cloned().unwrap()
	}

	#[fixture]
	fn form() -> FormSpec {
		let model = ModelSchema::from_json(json!({
			"name": "account",
			"properties": {
				"email": {"type": "string", "errors": {"pattern": "enter a valid email"}},
				"password": {"type": "string"},
				"token": {"type": "string"},
			},
			"required": ["email"],
		}))
		.unwrap();

		FormSpec::builder(model)
			.field("email")
			.field(FieldOverride::new("password").input_type(InputType::Password))
			.field(FieldOverride::new("token").input_type(InputType::Hidden))
			.build()
			.unwrap()
	}

	#[rstest]
	#[case::nothing(false, false, false)]
	#[case::both(true, true, false)]
	#[case::record_and_error(true, false, true)]
	#[case::error_only(false, false, true)]
	fn test_invalid_sources(
		form: FormSpec,
		#[case] with_record: bool,
		#[case] with_input: bool,
		#[case] with_error: bool,
	) {
		let values = object(json!({"email": "a@b.c"}));
		let error = SubmissionError::from("boom");

		let mut args = BindArgs::default();
		if with_record {
			args = args.record(&values);
		}
		if with_input {
			args = args.input(&values);
		}
		if with_error {
			args = args.error(&error);
		}

		let err = InstanceBinder::bind(&form, args).unwrap_err();
		assert_eq!(
			err,
			FormError::Config("need either record or input/error".to_string())
		);
	}

	#[rstest]
	fn test_input_skips_password(form: FormSpec) {
		let input = object(json!({"email": "a@b.c", "password": "hunter2"}));
		let instance = form.new_instance(BindArgs::from_input(&input)).unwrap();

		assert_eq!(instance.field("email").unwrap().value, Some(json!("a@b.c")));
		assert_eq!(instance.field("password").unwrap().value, None);
		assert!(!instance.has_errors());
	}

	#[rstest]
	fn test_record_fills_password(form: FormSpec) {
		let record = object(json!({"password": "stored"}));
		let instance = form.new_instance(BindArgs::from_record(&record)).unwrap();
		assert_eq!(instance.field("password").unwrap().value, Some(json!("stored")));
	}

	#[rstest]
	fn test_custom_top_level_message(form: FormSpec) {
		let input = object(json!({"email": "nope"}));
		let error = SubmissionError::validation(
			"data validation failed",
			vec![ValidationError::new("pattern", ".data.email", "should match pattern")],
		);
		let instance = form
			.new_instance(BindArgs::from_input(&input).error(&error))
			.unwrap();

		let email = instance.field("email").unwrap();
		assert_eq!(email.error.as_deref(), Some("enter a valid email"));
		assert_eq!(email.value, None);
		assert!(instance.errors.is_empty());
		assert!(instance.has_errors());
	}

	#[rstest]
	fn test_hidden_field_error_is_generic(form: FormSpec) {
		let input = object(json!({"token": "abc"}));
		let error = SubmissionError::validation(
			"data validation failed",
			vec![ValidationError::required(".data", "token")],
		);
		let instance = form
			.new_instance(BindArgs::from_input(&input).error(&error))
			.unwrap();

		let token = instance.field("token").unwrap();
		assert!(token.error.is_none());
		assert_eq!(token.value, Some(json!("abc")));
		assert_eq!(instance.errors, vec!["token required"]);
	}

	#[rstest]
	#[case::message(SubmissionError::from("save failed"), "save failed")]
	#[case::report_without_list(
		SubmissionError::Report { message: Some("conflict".to_string()), data: Some(json!({"id": 3})) },
		"conflict"
	)]
	#[case::empty_report(SubmissionError::Report { message: None, data: None }, DEFAULT_ERROR_MESSAGE)]
	fn test_generic_errors(form: FormSpec, #[case] error: SubmissionError, #[case] expected: &str) {
		let input = object(json!({"email": "a@b.c"}));
		let instance = form
			.new_instance(BindArgs::from_input(&input).error(&error))
			.unwrap();

		assert_eq!(instance.errors, vec![expected.to_string()]);
		assert_eq!(instance.field("email").unwrap().value, Some(json!("a@b.c")));
	}

	#[rstest]
	fn test_malformed_entry_does_not_hide_field_errors(form: FormSpec) {
		let input = object(json!({"email": "nope"}));
		let error: SubmissionError = serde_json::from_value(json!({
			"message": "data validation failed",
			"data": [
				{"keyword": "pattern", "dataPath": ".data.email", "message": "should match pattern"},
				{"keyword": "type", "dataPath": ".data.password", "message": null},
				{"keyword": "type", "dataPath": false, "message": "should be string"},
			],
		}))
		.unwrap();

		let instance = form
			.new_instance(BindArgs::from_input(&input).error(&error))
			.unwrap();

		assert_eq!(
			instance.field("email").unwrap().error.as_deref(),
			Some("enter a valid email")
		);
		assert_eq!(
			instance.errors,
			vec![DEFAULT_ERROR_MESSAGE.to_string(), "should be string".to_string()]
		);
	}

	#[rstest]
	fn test_template_unchanged(form: FormSpec) {
		let before = form.fields().to_vec();
		let input = object(json!({"email": "a@b.c"}));
		let error = SubmissionError::validation(
			"failed",
			vec![ValidationError::new("pattern", ".data.email", "bad")],
		);
		form.new_instance(BindArgs::from_input(&input).error(&error))
			.unwrap();

		assert_eq!(form.fields(), before.as_slice());
	}
}
