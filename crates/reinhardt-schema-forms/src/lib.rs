//! Schema-driven form specifications for Reinhardt
//!
//! This crate compiles a model's data schema into a renderable form
//! description and binds per-request copies of it to stored records or to
//! user submissions:
//!
//! - [`FormSpecBuilder`] infers one [`FieldSpec`] per property (text, select,
//!   checkbox or a repeating group for arrays of objects), applies caller
//!   overrides, lays out rows and legends
//! - [`InstanceBinder`] copies the template, binds values, maps validator
//!   errors back onto the fields they address and applies the update policy
//! - [`resolve_locator`] turns validator error locators into field addresses
//!
//! ## Example
//!
//! ```
//! use reinhardt_schema_forms::{BindArgs, FieldEntry, FormSpec, ModelSchema, SubmissionError, ValidationError};
//! use serde_json::{Map, Value, json};
//!
//! let model = ModelSchema::from_json(json!({
//!     "name": "address",
//!     "properties": {
//!         "firstName": {"type": "string", "title": "First name"},
//!         "addressLocality": {"type": "string", "title": "City"},
//!         "addressRegion": {"type": "string", "title": "State", "enum": ["AL", "AK"]},
//!     },
//!     "required": ["firstName"],
//! }))
//! .unwrap();
//!
//! let form = FormSpec::builder(model)
//!     .field("firstName")
//!     .field(FieldEntry::row(["addressLocality", "addressRegion"]))
//!     .build()
//!     .unwrap();
//!
//! let input: Map<String, Value> = json!({"addressRegion": "AK"}).as_object().cloned().unwrap();
//! let error = SubmissionError::validation(
//!     "data validation failed",
//!     vec![ValidationError::required(".data", "firstName")],
//! );
//! let instance = form
//!     .new_instance(BindArgs::from_input(&input).error(&error))
//!     .unwrap();
//!
//! assert_eq!(instance.field("firstName").unwrap().error.as_deref(), Some("firstName required"));
//! assert!(instance.field("addressRegion").unwrap().options.as_ref().unwrap()[1].selected);
//! ```

pub mod builder;
pub mod error;
pub mod field;
pub mod form;
pub mod instance;
pub mod locator;
pub mod nested;
pub mod schema;
pub mod units;

pub use builder::SchemaFieldBuilder;
pub use error::{FormError, FormResult};
pub use field::{
	FieldEntry, FieldOverride, FieldSpec, FormItem, InputType, Legend, SelectOption, Toggle,
};
pub use form::{FormMode, FormOptions, FormSpec, FormSpecBuilder, Submit, SubmitOptions};
pub use instance::{BindArgs, FormInstance, InstanceBinder, RecordAccessor};
pub use locator::{
	ErrorParams, ErrorTarget, ReportEntry, SubmissionError, ValidationError, resolve_locator,
};
pub use nested::{BindMode, NestedArrayBinder};
pub use schema::{ColumnMetadata, ItemsSchema, ModelSchema, PropertySchema, SchemaModel, SchemaType};
pub use units::assign_units;
