//! Error types raised while building form specifications or binding instances
//!
//! Every variant signals a programming or configuration defect. Validation
//! failures reported by an external validator are never raised as errors;
//! they are attached to the bound [`FormInstance`](crate::FormInstance).

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
	/// Missing or contradictory construction arguments
	#[error("Configuration error: {0}")]
	Config(String),
	/// Array property whose `items` is not a single object schema, or an
	/// array nested inside another array
	#[error("Array schema error: {0}")]
	ArraySchema(String),
	/// A value bound to a nested-array field is not a sequence
	#[error("Array type error: {0}")]
	ArrayType(String),
	/// Some members of a field row carry an explicit unit and others do not
	#[error("Mixed unit error: {0}")]
	MixedUnit(String),
}

pub type FormResult<T> = Result<T, FormError>;

impl FormError {
	pub(crate) fn config(message: impl Into<String>) -> Self {
		Self::Config(message.into())
	}

	pub(crate) fn array_schema(message: impl Into<String>) -> Self {
		Self::ArraySchema(message.into())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_display() {
		let err = FormError::config("need either record or input/error");
		assert_eq!(
			err.to_string(),
			"Configuration error: need either record or input/error"
		);

		let err = FormError::MixedUnit("row [a, b]".to_string());
		assert_eq!(err.to_string(), "Mixed unit error: row [a, b]");
	}
}
