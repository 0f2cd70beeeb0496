//! Layout width units for rows of sibling fields

use crate::error::{FormError, FormResult};
use crate::field::FieldSpec;

/// Assign equal-width layout units to a row of fields
///
/// A row either specifies a unit on every member or on none of them. When
/// none is given each member receives `1-{n}` for a row of `n` fields.
///
/// # Examples
///
/// ```
/// use reinhardt_schema_forms::{FieldSpec, assign_units};
///
/// let mut row = vec![FieldSpec::default(), FieldSpec::default(), FieldSpec::default()];
/// assign_units(&mut row).unwrap();
/// assert!(row.iter().all(|f| f.unit.as_deref() == Some("1-3")));
/// ```
pub fn assign_units(row: &mut [FieldSpec]) -> FormResult<()> {
	let explicit = row.iter().filter(|field| field.unit.is_some()).count();

	if explicit == row.len() {
		return Ok(());
	}
	if explicit > 0 {
		let properties: Vec<&str> = row.iter().map(|f| f.property.as_str()).collect();
		return Err(FormError::MixedUnit(format!(
			"units must be set on all or none of the fields in row [{}]",
			properties.join(", ")
		)));
	}

	let unit = format!("1-{}", row.len());
	for field in row.iter_mut() {
		field.unit = Some(unit.clone());
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn field(property: &str, unit: Option<&str>) -> FieldSpec {
		FieldSpec {
			property: property.to_string(),
			unit: unit.map(str::to_string),
			..Default::default()
		}
	}

	#[test]
	fn test_equal_units() {
		let mut row = vec![field("city", None), field("state", None)];
		assign_units(&mut row).unwrap();
		assert_eq!(row[0].unit.as_deref(), Some("1-2"));
		assert_eq!(row[1].unit.as_deref(), Some("1-2"));
	}

	#[test]
	fn test_explicit_units_untouched() {
		let mut row = vec![field("city", Some("2-3")), field("state", Some("1-3"))];
		assign_units(&mut row).unwrap();
		assert_eq!(row[0].unit.as_deref(), Some("2-3"));
		assert_eq!(row[1].unit.as_deref(), Some("1-3"));
	}

	#[test]
	fn test_mixed_units() {
		let mut row = vec![field("city", Some("2-3")), field("state", None)];
		let err = assign_units(&mut row).unwrap_err();
		assert!(matches!(err, FormError::MixedUnit(_)));
		assert!(err.to_string().contains("[city, state]"));
	}
}
