//! Form specifications built once per model and configuration
//!
//! A [`FormSpec`] is an immutable template. It is compiled by
//! [`FormSpecBuilder`] from a [`SchemaModel`] and caller options, shared
//! freely (it is `Send + Sync`), and turned into per-request
//! [`FormInstance`]s by [`InstanceBinder`].

use crate::builder::{SchemaFieldBuilder, ensure_unique_properties};
use crate::error::{FormError, FormResult};
use crate::field::{FieldEntry, FieldSpec, FormItem};
use crate::instance::{BindArgs, FormInstance, InstanceBinder};
use crate::schema::SchemaModel;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

pub const DEFAULT_SUBMIT_TITLE: &str = "Submit";
pub const DEFAULT_FORM_TITLE: &str = "Form";
pub const DEFAULT_METHOD: &str = "post";
pub const DEFAULT_ENCTYPE: &str = "application/x-www-form-urlencoded";

/// Whether a form creates a new record or updates an existing one
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
	#[default]
	Create,
	Update,
}

/// Submit button settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submit {
	pub title: String,
	pub enabled: bool,
}

impl Default for Submit {
	fn default() -> Self {
		Self {
			title: DEFAULT_SUBMIT_TITLE.to_string(),
			enabled: true,
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitOptions {
	pub title: Option<String>,
	pub enabled: Option<bool>,
}

/// Caller configuration for a form; unset options fall back to defaults
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{FormMode, FormOptions};
/// use serde_json::json;
///
/// let options = FormOptions::from_json(json!({
///     "fields": ["firstName", ["city", "state"], {"legend": "Extra"}],
///     "placeholders": true,
///     "mode": "update",
///     "submit": {"title": "Save"},
/// }))
/// .unwrap();
///
/// assert_eq!(options.mode, Some(FormMode::Update));
/// assert_eq!(options.fields.unwrap().len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormOptions {
	/// Field list in display order; every schema property when absent
	pub fields: Option<Vec<FieldEntry>>,
	pub id: Option<String>,
	pub labels: Option<bool>,
	pub placeholders: Option<bool>,
	pub mode: Option<FormMode>,
	pub action: Option<String>,
	pub method: Option<String>,
	pub enctype: Option<String>,
	pub submit: Option<SubmitOptions>,
	pub title: Option<String>,
	pub redirect: Option<String>,
}

impl FormOptions {
	pub fn from_json(value: Value) -> FormResult<Self> {
		serde_json::from_value(value)
			.map_err(|e| FormError::config(format!("invalid form options: {}", e)))
	}
}

/// Immutable form template for one model and configuration
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
	#[serde(skip)]
	model: Arc<dyn SchemaModel>,
	id: String,
	title: String,
	action: String,
	method: String,
	enctype: String,
	mode: FormMode,
	labels: bool,
	placeholders: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	redirect: Option<String>,
	submit: Submit,
	fields: Vec<FormItem>,
}

impl FormSpec {
	/// Build a form from a model and options
	///
	/// # Examples
	///
	/// ```
	/// use reinhardt_schema_forms::{FormOptions, FormSpec, ModelSchema};
	/// use serde_json::json;
	/// use std::sync::Arc;
	///
	/// let model = ModelSchema::from_json(json!({
	///     "name": "address",
	///     "properties": {"firstName": {"type": "string"}, "lastName": {"type": "string"}},
	/// }))
	/// .unwrap();
	///
	/// let form = FormSpec::new(Arc::new(model), FormOptions::default()).unwrap();
	/// assert_eq!(form.fields().len(), 2);
	/// assert_eq!(form.title(), "Form");
	/// ```
	pub fn new(model: Arc<dyn SchemaModel>, options: FormOptions) -> FormResult<Self> {
		FormSpecBuilder::from_shared(model).options(options).build()
	}

	pub fn builder<M: SchemaModel + 'static>(model: M) -> FormSpecBuilder {
		FormSpecBuilder::new(model)
	}

	pub fn model(&self) -> &dyn SchemaModel {
		self.model.as_ref()
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn title(&self) -> &str {
		&self.title
	}

	pub fn action(&self) -> &str {
		&self.action
	}

	pub fn method(&self) -> &str {
		&self.method
	}

	pub fn enctype(&self) -> &str {
		&self.enctype
	}

	pub fn mode(&self) -> FormMode {
		self.mode
	}

	pub fn labels(&self) -> bool {
		self.labels
	}

	pub fn placeholders(&self) -> bool {
		self.placeholders
	}

	pub fn redirect(&self) -> Option<&str> {
		self.redirect.as_deref()
	}

	pub fn submit(&self) -> &Submit {
		&self.submit
	}

	pub fn fields(&self) -> &[FormItem] {
		&self.fields
	}

	/// Top-level field by property, including fields placed in rows
	pub fn field(&self, property: &str) -> Option<&FieldSpec> {
		self.fields
			.iter()
			.flat_map(FormItem::fields)
			.find(|field| field.property == property)
	}

	/// Bind a fresh instance of this form
	///
	/// The template is left untouched; see [`InstanceBinder::bind`].
	pub fn new_instance(&self, args: BindArgs<'_>) -> FormResult<FormInstance> {
		InstanceBinder::bind(self, args)
	}
}

/// Compiles a [`FormSpec`]
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{FieldEntry, FieldOverride, FormMode, FormSpec, ModelSchema};
/// use serde_json::json;
///
/// let model = ModelSchema::from_json(json!({
///     "name": "address",
///     "properties": {
///         "addressLocality": {"type": "string", "title": "City"},
///         "addressRegion": {"type": "string", "title": "State"},
///         "note": {"type": "string"},
///     },
/// }))
/// .unwrap();
///
/// let form = FormSpec::builder(model)
///     .field(FieldEntry::row(["addressLocality", "addressRegion"]))
///     .field(FieldOverride::legend("More"))
///     .field("note")
///     .placeholders(true)
///     .mode(FormMode::Update)
///     .build()
///     .unwrap();
///
/// let row = form.fields()[0].as_row().unwrap();
/// assert_eq!(row[0].unit.as_deref(), Some("1-2"));
/// assert_eq!(form.fields()[1].as_legend(), Some("More"));
/// assert_eq!(form.field("note").unwrap().placeholder.as_deref(), Some("Note"));
/// ```
#[derive(Debug, Clone)]
pub struct FormSpecBuilder {
	model: Arc<dyn SchemaModel>,
	options: FormOptions,
}

impl FormSpecBuilder {
	pub fn new<M: SchemaModel + 'static>(model: M) -> Self {
		Self::from_shared(Arc::new(model))
	}

	pub fn from_shared(model: Arc<dyn SchemaModel>) -> Self {
		Self {
			model,
			options: FormOptions::default(),
		}
	}

	/// Replace all options at once
	pub fn options(mut self, options: FormOptions) -> Self {
		self.options = options;
		self
	}

	pub fn fields<I, E>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<FieldEntry>,
	{
		self.options.fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}

	/// Append one entry to the field list
	pub fn field(mut self, entry: impl Into<FieldEntry>) -> Self {
		self.options
			.fields
			.get_or_insert_with(Vec::new)
			.push(entry.into());
		self
	}

	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.options.id = Some(id.into());
		self
	}

	pub fn labels(mut self, labels: bool) -> Self {
		self.options.labels = Some(labels);
		self
	}

	pub fn placeholders(mut self, placeholders: bool) -> Self {
		self.options.placeholders = Some(placeholders);
		self
	}

	pub fn mode(mut self, mode: FormMode) -> Self {
		self.options.mode = Some(mode);
		self
	}

	pub fn action(mut self, action: impl Into<String>) -> Self {
		self.options.action = Some(action.into());
		self
	}

	pub fn method(mut self, method: impl Into<String>) -> Self {
		self.options.method = Some(method.into());
		self
	}

	pub fn enctype(mut self, enctype: impl Into<String>) -> Self {
		self.options.enctype = Some(enctype.into());
		self
	}

	pub fn submit_title(mut self, title: impl Into<String>) -> Self {
		self.options
			.submit
			.get_or_insert_with(SubmitOptions::default)
			.title = Some(title.into());
		self
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.options.title = Some(title.into());
		self
	}

	pub fn redirect(mut self, redirect: impl Into<String>) -> Self {
		self.options.redirect = Some(redirect.into());
		self
	}

	pub fn build(self) -> FormResult<FormSpec> {
		let Self { model, mut options } = self;
		let entries = options.fields.take();

		let mut form = init_form(model, options)?;
		init_fields(&mut form, entries)?;

		tracing::debug!(
			model = %form.model.name(),
			fields = form.fields.len(),
			mode = ?form.mode,
			"built form specification"
		);
		Ok(form)
	}
}

/// Merge caller options over the form defaults
fn init_form(model: Arc<dyn SchemaModel>, options: FormOptions) -> FormResult<FormSpec> {
	if model.schema_properties().is_none() {
		return Err(FormError::config("model must have data schema"));
	}

	let FormOptions {
		id,
		labels,
		placeholders,
		mode,
		action,
		method,
		enctype,
		submit,
		title,
		redirect,
		..
	} = options;

	let mut submit_spec = Submit::default();
	if let Some(submit) = submit {
		if let Some(title) = submit.title {
			submit_spec.title = title;
		}
		if let Some(enabled) = submit.enabled {
			submit_spec.enabled = enabled;
		}
	}

	Ok(FormSpec {
		model,
		id: id.unwrap_or_default(),
		title: title.unwrap_or_else(|| DEFAULT_FORM_TITLE.to_string()),
		action: action.unwrap_or_default(),
		method: method.unwrap_or_else(|| DEFAULT_METHOD.to_string()),
		enctype: enctype.unwrap_or_else(|| DEFAULT_ENCTYPE.to_string()),
		mode: mode.unwrap_or_default(),
		labels: labels.unwrap_or(true),
		placeholders: placeholders.unwrap_or(false),
		redirect,
		submit: submit_spec,
		fields: Vec::new(),
	})
}

/// Compile the field list into the form's field tree
///
/// An absent or empty list means every schema property in declaration order.
fn init_fields(form: &mut FormSpec, entries: Option<Vec<FieldEntry>>) -> FormResult<()> {
	let entries = match entries {
		Some(entries) if !entries.is_empty() => entries,
		_ => form
			.model
			.schema_properties()
			.map(|properties| properties.keys().cloned().map(FieldEntry::Name).collect())
			.unwrap_or_default(),
	};

	let builder = SchemaFieldBuilder::new(form.model.as_ref(), form.labels, form.placeholders);
	let fields = entries
		.into_iter()
		.map(|entry| builder.build(entry))
		.collect::<FormResult<Vec<_>>>()?;
	ensure_unique_properties(fields.iter().flat_map(FormItem::fields))?;

	form.fields = fields;
	Ok(())
}
