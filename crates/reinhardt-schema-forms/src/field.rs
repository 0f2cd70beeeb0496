//! Field specifications, caller overrides and the compiled field tree

use crate::error::FormError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Supported input widgets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
	#[default]
	Text,
	Checkbox,
	Radio,
	Select,
	Hidden,
	Password,
}

impl InputType {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Text => "text",
			Self::Checkbox => "checkbox",
			Self::Radio => "radio",
			Self::Select => "select",
			Self::Hidden => "hidden",
			Self::Password => "password",
		}
	}

	/// Whether the widget renders a list of options
	pub fn has_options(&self) -> bool {
		matches!(self, Self::Select | Self::Radio)
	}
}

impl fmt::Display for InputType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for InputType {
	type Err = FormError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"text" => Ok(Self::Text),
			"checkbox" => Ok(Self::Checkbox),
			"radio" => Ok(Self::Radio),
			"select" => Ok(Self::Select),
			"hidden" => Ok(Self::Hidden),
			"password" => Ok(Self::Password),
			other => Err(FormError::config(format!(
				"unsupported inputType: {}",
				other
			))),
		}
	}
}

/// One entry of a select or radio widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectOption {
	pub title: String,
	pub value: Value,
	#[serde(default, skip_serializing_if = "std::ops::Not::not")]
	pub selected: bool,
}

impl SelectOption {
	/// Option whose title is the textual form of its value
	pub fn from_value(value: Value) -> Self {
		let title = match &value {
			Value::String(s) => s.clone(),
			other => other.to_string(),
		};
		Self {
			title,
			value,
			selected: false,
		}
	}
}

/// Tri-state override for label and placeholder inclusion
///
/// `false` suppresses, `true` requests the default text, a string requests
/// that exact text. An absent override (`None` on [`FieldOverride`]) leaves
/// the form-level setting in charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Toggle {
	Flag(bool),
	Text(String),
}

impl Toggle {
	pub fn is_suppressed(&self) -> bool {
		matches!(self, Self::Flag(false))
	}

	pub fn is_requested(&self) -> bool {
		!self.is_suppressed()
	}

	pub fn text(&self) -> Option<&str> {
		match self {
			Self::Text(text) => Some(text),
			Self::Flag(_) => None,
		}
	}
}

impl From<bool> for Toggle {
	fn from(flag: bool) -> Self {
		Self::Flag(flag)
	}
}

impl From<&str> for Toggle {
	fn from(text: &str) -> Self {
		Self::Text(text.to_string())
	}
}

impl From<String> for Toggle {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

/// Caller-provided settings for one field
///
/// Every key that is set overwrites the value computed from the schema.
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{FieldOverride, InputType};
///
/// let field = FieldOverride::new("secret")
///     .input_type(InputType::Password)
///     .label(false);
/// assert_eq!(field.property.as_deref(), Some("secret"));
/// assert!(field.label.unwrap().is_suppressed());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldOverride {
	pub property: Option<String>,
	/// Section divider text; an override carrying a legend is not a field
	pub legend: Option<String>,
	pub title: Option<String>,
	pub label: Option<Toggle>,
	pub placeholder: Option<Toggle>,
	pub description: Option<String>,
	pub input_type: Option<InputType>,
	pub pattern: Option<String>,
	pub required: Option<bool>,
	pub default: Option<Value>,
	pub options: Option<Vec<SelectOption>>,
	pub readonly: Option<bool>,
	pub id: Option<String>,
	pub name: Option<String>,
	pub unit: Option<String>,
	/// Sub-field selection for nested-array properties
	pub fields: Option<Vec<FieldEntry>>,
}

impl FieldOverride {
	pub fn new(property: impl Into<String>) -> Self {
		Self {
			property: Some(property.into()),
			..Default::default()
		}
	}

	/// Section divider marker
	pub fn legend(text: impl Into<String>) -> Self {
		Self {
			legend: Some(text.into()),
			..Default::default()
		}
	}

	pub fn title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}

	pub fn label(mut self, label: impl Into<Toggle>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn placeholder(mut self, placeholder: impl Into<Toggle>) -> Self {
		self.placeholder = Some(placeholder.into());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn input_type(mut self, input_type: InputType) -> Self {
		self.input_type = Some(input_type);
		self
	}

	pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
		self.pattern = Some(pattern.into());
		self
	}

	pub fn required(mut self, required: bool) -> Self {
		self.required = Some(required);
		self
	}

	pub fn default_value(mut self, value: Value) -> Self {
		self.default = Some(value);
		self
	}

	pub fn options(mut self, options: Vec<SelectOption>) -> Self {
		self.options = Some(options);
		self
	}

	pub fn readonly(mut self, readonly: bool) -> Self {
		self.readonly = Some(readonly);
		self
	}

	pub fn id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn unit(mut self, unit: impl Into<String>) -> Self {
		self.unit = Some(unit.into());
		self
	}

	pub fn fields<I, E>(mut self, fields: I) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<FieldEntry>,
	{
		self.fields = Some(fields.into_iter().map(Into::into).collect());
		self
	}
}

/// One entry of a form's field list as written by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldEntry {
	/// Property name without further settings
	Name(String),
	/// Fields laid out side by side
	Row(Vec<FieldEntry>),
	Field(FieldOverride),
}

impl FieldEntry {
	pub fn row<I, E>(entries: I) -> Self
	where
		I: IntoIterator<Item = E>,
		E: Into<FieldEntry>,
	{
		Self::Row(entries.into_iter().map(Into::into).collect())
	}

	/// Normalize a single entry into an override
	pub(crate) fn into_override(self) -> Option<FieldOverride> {
		match self {
			Self::Name(property) => Some(FieldOverride::new(property)),
			Self::Field(field) => Some(field),
			Self::Row(_) => None,
		}
	}
}

impl From<&str> for FieldEntry {
	fn from(property: &str) -> Self {
		Self::Name(property.to_string())
	}
}

impl From<String> for FieldEntry {
	fn from(property: String) -> Self {
		Self::Name(property)
	}
}

impl From<FieldOverride> for FieldEntry {
	fn from(field: FieldOverride) -> Self {
		Self::Field(field)
	}
}

impl From<Vec<FieldEntry>> for FieldEntry {
	fn from(entries: Vec<FieldEntry>) -> Self {
		Self::Row(entries)
	}
}

/// One compiled form control, or the template of a repeating group
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
	pub property: String,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub placeholder: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	pub input_type: InputType,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub pattern: Option<String>,
	pub required: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub options: Option<Vec<SelectOption>>,
	pub immutable: bool,
	pub readonly: bool,
	pub id: String,
	pub name: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub unit: Option<String>,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub array: bool,
	#[serde(skip_serializing_if = "std::ops::Not::not")]
	pub nested: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min_items: Option<usize>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_items: Option<usize>,
	/// Sub-field template of an array field
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub fields: Vec<FieldSpec>,
	/// Bound rows of an array field
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub values: Vec<Vec<FieldSpec>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub value: Option<Value>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub errors: Vec<String>,
}

impl FieldSpec {
	pub fn is_array(&self) -> bool {
		self.array
	}

	pub fn is_hidden(&self) -> bool {
		self.input_type == InputType::Hidden
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	/// Template sub-field of an array field
	pub fn sub_field(&self, property: &str) -> Option<&FieldSpec> {
		self.fields.iter().find(|f| f.property == property)
	}

	/// Bound row of an array field
	pub fn row(&self, index: usize) -> Option<&[FieldSpec]> {
		self.values.get(index).map(Vec::as_slice)
	}

	/// Record a validation message and refresh the joined display string
	pub fn add_error(&mut self, message: impl Into<String>) {
		self.errors.push(message.into());
		self.error = Some(self.errors.join(", "));
	}

	/// Mark the option matching the bound value, or the default when unbound
	pub(crate) fn mark_selected(&mut self) {
		let current = self.value.as_ref().or(self.default.as_ref());
		if let Some(options) = self.options.as_mut() {
			for option in options.iter_mut() {
				option.selected = current.is_some_and(|v| *v == option.value);
			}
		}
	}

	/// Rewrite the row marker embedded in `name` and `id`
	///
	/// Names follow `{model}[{array}][{index}][{sub}]` and ids end in
	/// `-{index}`; caller-supplied names or ids without a marker are kept.
	pub(crate) fn set_row_index(&mut self, array_property: &str, index: usize) {
		if let Some(name) = replace_row_index(&self.name, array_property, index) {
			self.name = name;
		}
		let id = match self.id.rsplit_once('-') {
			Some((prefix, suffix))
				if !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit()) =>
			{
				Some(format!("{}-{}", prefix, index))
			}
			_ => None,
		};
		if let Some(id) = id {
			self.id = id;
		}
	}

	/// Set `readonly` on this field and everything nested below it
	pub(crate) fn lock(&mut self) {
		self.readonly = true;
		for field in self.fields.iter_mut() {
			field.lock();
		}
		for row in self.values.iter_mut() {
			for field in row.iter_mut() {
				field.lock();
			}
		}
	}
}

fn replace_row_index(name: &str, array_property: &str, index: usize) -> Option<String> {
	let marker = format!("[{}][", array_property);
	let start = name.find(&marker)? + marker.len();
	let len = name[start..].find(']')?;
	let current = &name[start..start + len];
	if current.is_empty() || !current.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	Some(format!("{}{}{}", &name[..start], index, &name[start + len..]))
}

/// Section divider between fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Legend {
	pub legend: String,
}

/// One entry of a compiled field tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FormItem {
	Field(FieldSpec),
	Row(Vec<FieldSpec>),
	Legend(Legend),
}

impl FormItem {
	pub fn as_field(&self) -> Option<&FieldSpec> {
		match self {
			Self::Field(field) => Some(field),
			_ => None,
		}
	}

	pub fn as_row(&self) -> Option<&[FieldSpec]> {
		match self {
			Self::Row(row) => Some(row),
			_ => None,
		}
	}

	pub fn as_legend(&self) -> Option<&str> {
		match self {
			Self::Legend(legend) => Some(&legend.legend),
			_ => None,
		}
	}

	/// Top-level fields contained in this item
	pub fn fields(&self) -> &[FieldSpec] {
		match self {
			Self::Field(field) => std::slice::from_ref(field),
			Self::Row(row) => row,
			Self::Legend(_) => &[],
		}
	}

	pub(crate) fn fields_mut(&mut self) -> &mut [FieldSpec] {
		match self {
			Self::Field(field) => std::slice::from_mut(field),
			Self::Row(row) => row,
			Self::Legend(_) => &mut [],
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("text", InputType::Text)]
	#[case("checkbox", InputType::Checkbox)]
	#[case("radio", InputType::Radio)]
	#[case("select", InputType::Select)]
	#[case("hidden", InputType::Hidden)]
	#[case("password", InputType::Password)]
	fn test_input_type_from_str(#[case] raw: &str, #[case] expected: InputType) {
		assert_eq!(raw.parse::<InputType>().unwrap(), expected);
		assert_eq!(expected.to_string(), raw);
	}

	#[test]
	fn test_input_type_unsupported() {
		assert!(matches!(
			"textarea".parse::<InputType>(),
			Err(FormError::Config(_))
		));
	}

	#[test]
	fn test_toggle_deserialize() {
		let entry: FieldOverride = serde_json::from_value(json!({
			"property": "name",
			"label": false,
			"placeholder": "Your name",
		}))
		.unwrap();

		assert_eq!(entry.label, Some(Toggle::Flag(false)));
		assert!(entry.label.unwrap().is_suppressed());
		assert_eq!(entry.placeholder.unwrap().text(), Some("Your name"));
	}

	#[test]
	fn test_field_entry_deserialize() {
		let entries: Vec<FieldEntry> = serde_json::from_value(json!([
			"firstName",
			["city", {"property": "state", "unit": "1-3"}],
			{"legend": "Contact"},
		]))
		.unwrap();

		assert_eq!(entries[0], FieldEntry::Name("firstName".to_string()));
		match &entries[1] {
			FieldEntry::Row(row) => assert_eq!(row.len(), 2),
			other => panic!("expected row, got {:?}", other),
		}
		match &entries[2] {
			FieldEntry::Field(field) => assert_eq!(field.legend.as_deref(), Some("Contact")),
			other => panic!("expected legend override, got {:?}", other),
		}
	}

	#[rstest]
	#[case("business[hoursOfOperation][0][fromDay]", 3, "business[hoursOfOperation][3][fromDay]")]
	#[case("business[hoursOfOperation][12][fromDay]", 0, "business[hoursOfOperation][0][fromDay]")]
	#[case("custom-name", 4, "custom-name")]
	fn test_set_row_index_name(#[case] name: &str, #[case] index: usize, #[case] expected: &str) {
		let mut field = FieldSpec {
			name: name.to_string(),
			id: "business-hoursOfOperation-fromDay-0".to_string(),
			..Default::default()
		};
		field.set_row_index("hoursOfOperation", index);
		assert_eq!(field.name, expected);
		assert_eq!(field.id, format!("business-hoursOfOperation-fromDay-{}", index));
	}

	#[test]
	fn test_add_error_joins_messages() {
		let mut field = FieldSpec::default();
		field.add_error("too short");
		field.add_error("must be a number");

		assert_eq!(field.errors, vec!["too short", "must be a number"]);
		assert_eq!(field.error.as_deref(), Some("too short, must be a number"));
	}

	#[test]
	fn test_mark_selected_prefers_value_over_default() {
		let mut field = FieldSpec {
			input_type: InputType::Select,
			default: Some(json!("AK")),
			options: Some(vec![
				SelectOption::from_value(json!("AL")),
				SelectOption::from_value(json!("AK")),
			]),
			..Default::default()
		};

		field.mark_selected();
		let selected: Vec<bool> = field.options.as_ref().unwrap().iter().map(|o| o.selected).collect();
		assert_eq!(selected, vec![false, true]);

		field.value = Some(json!("AL"));
		field.mark_selected();
		let selected: Vec<bool> = field.options.as_ref().unwrap().iter().map(|o| o.selected).collect();
		assert_eq!(selected, vec![true, false]);
	}

	#[test]
	fn test_option_serialization_skips_unselected() {
		let option = SelectOption::from_value(json!("Sunday"));
		assert_eq!(
			serde_json::to_value(&option).unwrap(),
			json!({"title": "Sunday", "value": "Sunday"})
		);
	}

	#[test]
	fn test_form_item_fields() {
		let legend = FormItem::Legend(Legend {
			legend: "Address".to_string(),
		});
		assert!(legend.fields().is_empty());
		assert_eq!(legend.as_legend(), Some("Address"));

		let row = FormItem::Row(vec![FieldSpec::default(), FieldSpec::default()]);
		assert_eq!(row.fields().len(), 2);
		assert!(row.as_field().is_none());
	}
}
