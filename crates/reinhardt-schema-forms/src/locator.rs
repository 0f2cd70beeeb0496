//! Validator error payloads and locator resolution
//!
//! A validator reports where a violation occurred with a dotted locator such
//! as `.data.hoursOfOperation[0].fromDay`. The first two segments (the empty
//! root and the data marker) carry no field information. What follows names
//! either a top-level property or an indexed row of an array property plus
//! the sub-property inside that row.
//!
//! | Locator | `missingProperty` | Target |
//! |---------|-------------------|--------|
//! | `.data` | `businessName` | `businessName` |
//! | `.data.postalCode` | – | `postalCode` |
//! | `.data.hoursOfOperation[0].fromDay` | – | `hoursOfOperation[0].fromDay` |
//! | `.data.hoursOfOperation[0]` | `toDay` | `hoursOfOperation[0].toDay` |
//! | `.data.contact` | `phone` | `contact.phone` |

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub missing_property: Option<String>,
}

/// One violation reported by the external validator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
	#[serde(default)]
	pub keyword: String,
	#[serde(default, alias = "dataPath")]
	pub locator: String,
	#[serde(default)]
	pub message: String,
	#[serde(default)]
	pub params: ErrorParams,
}

impl ValidationError {
	pub fn new(
		keyword: impl Into<String>,
		locator: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self {
			keyword: keyword.into(),
			locator: locator.into(),
			message: message.into(),
			params: ErrorParams::default(),
		}
	}

	/// Error for a required property missing at `locator`
	pub fn required(locator: impl Into<String>, property: impl Into<String>) -> Self {
		let property = property.into();
		let mut error = Self::new(
			"required",
			locator,
			format!("should have required property '{}'", property),
		);
		error.params.missing_property = Some(property);
		error
	}

	/// Name of the missing property, without the leading `.` some
	/// validators prepend
	pub fn missing_property(&self) -> Option<&str> {
		self.params
			.missing_property
			.as_deref()
			.map(|property| property.strip_prefix('.').unwrap_or(property))
			.filter(|property| !property.is_empty())
	}

	/// Field this error refers to
	pub fn target(&self) -> Option<ErrorTarget> {
		resolve_locator(self)
	}
}

/// Field addressed by a validator error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorTarget {
	pub property: String,
	/// Array (or object) property containing `property`
	#[serde(skip_serializing_if = "Option::is_none")]
	pub base_property: Option<String>,
	/// Row of `base_property`
	#[serde(skip_serializing_if = "Option::is_none")]
	pub index: Option<usize>,
}

impl ErrorTarget {
	pub fn property(property: impl Into<String>) -> Self {
		Self {
			property: property.into(),
			base_property: None,
			index: None,
		}
	}

	pub fn nested(
		base_property: impl Into<String>,
		index: Option<usize>,
		property: impl Into<String>,
	) -> Self {
		Self {
			property: property.into(),
			base_property: Some(base_property.into()),
			index,
		}
	}
}

/// Resolve the locator of `error` to the field it refers to
///
/// Returns `None` when no property can be determined, in which case the
/// error is not attributable to a single field.
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{ErrorTarget, ValidationError, resolve_locator};
///
/// let error = ValidationError::new(
///     "enum",
///     ".data.hoursOfOperation[0].fromDay",
///     "should be equal to one of the allowed values",
/// );
/// assert_eq!(
///     resolve_locator(&error),
///     Some(ErrorTarget::nested("hoursOfOperation", Some(0), "fromDay"))
/// );
///
/// let error = ValidationError::required(".data", "businessName");
/// assert_eq!(resolve_locator(&error), Some(ErrorTarget::property("businessName")));
/// ```
pub fn resolve_locator(error: &ValidationError) -> Option<ErrorTarget> {
	let missing = error.missing_property();
	let segments: Vec<&str> = error.locator.split('.').collect();

	if segments.len() < 3 {
		return missing.map(ErrorTarget::property);
	}

	let candidate = segments[2];
	let parts: Vec<&str> = candidate.split(['[', ']']).collect();

	if parts.len() > 1 {
		let base = parts[0];
		let index = parts[1].parse::<usize>().ok()?;
		let property = match missing {
			Some(property) => property,
			None => segments.get(3).copied()?,
		};
		if base.is_empty() || property.is_empty() {
			return None;
		}
		return Some(ErrorTarget::nested(base, Some(index), property));
	}

	if candidate.is_empty() {
		return None;
	}
	match missing {
		Some(property) => Some(ErrorTarget::nested(candidate, None, property)),
		None => Some(ErrorTarget::property(candidate)),
	}
}

/// Error payload handed back by a failed save
///
/// Either a plain message or a report whose `data` should contain the
/// validator's error list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionError {
	Message(String),
	Report {
		#[serde(default)]
		message: Option<String>,
		#[serde(default)]
		data: Option<Value>,
	},
}

impl SubmissionError {
	/// Report carrying validator errors
	pub fn validation(message: impl Into<String>, errors: Vec<ValidationError>) -> Self {
		let data = errors
			.into_iter()
			.map(|error| serde_json::to_value(error).unwrap_or(Value::Null))
			.collect();
		Self::Report {
			message: Some(message.into()),
			data: Some(Value::Array(data)),
		}
	}

	/// Elements of a report's `data` list, each decoded on its own
	///
	/// Returns `None` unless this is a report whose `data` is a list.
	pub fn report_entries(&self) -> Option<Vec<ReportEntry>> {
		match self {
			Self::Report {
				data: Some(Value::Array(elements)),
				..
			} => Some(elements.iter().map(ReportEntry::decode).collect()),
			_ => None,
		}
	}

	/// Well-formed validator errors carried by a report
	pub fn validation_errors(&self) -> Option<Vec<ValidationError>> {
		self.report_entries().map(|entries| {
			entries
				.into_iter()
				.filter_map(|entry| match entry {
					ReportEntry::Validation(error) => Some(error),
					ReportEntry::Malformed { .. } => None,
				})
				.collect()
		})
	}
}

/// One element of a report's error list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
	Validation(ValidationError),
	/// Element that is not a validator error
	Malformed {
		/// The element's `message`, when it is a string
		message: Option<String>,
	},
}

impl ReportEntry {
	fn decode(element: &Value) -> Self {
		match serde_json::from_value(element.clone()) {
			Ok(error) => Self::Validation(error),
			Err(_) => Self::Malformed {
				message: element
					.get("message")
					.and_then(Value::as_str)
					.map(str::to_string),
			},
		}
	}
}

impl From<&str> for SubmissionError {
	fn from(message: &str) -> Self {
		Self::Message(message.to_string())
	}
}

impl From<String> for SubmissionError {
	fn from(message: String) -> Self {
		Self::Message(message)
	}
}
