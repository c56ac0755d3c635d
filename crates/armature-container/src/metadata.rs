//! Metadata store
//!
//! Arbitrary registration-attached data, held per class and per
//! `(class, property)` pair in lazily created nested maps. Two write
//! modes: `save` overwrites a single value, `attach` appends to a list
//! created on first use. Attach order is call order, which preserves the
//! source declaration order of the glue that writes here. Reads of
//! absent keys return `None` or an empty collection, never an error.
//!
//! Targets are always classes — an instance resolves through its class —
//! and metadata is keyed by the class's arena id, so it is dropped with
//! the class at `unregister` time.

use crate::registry::ComponentClass;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

#[derive(Default)]
struct ClassMetadata {
	/// kind → key → value (or list of values when attached)
	class_entries: HashMap<String, HashMap<String, Value>>,
	/// key → property → value (or list of values when attached)
	property_entries: HashMap<String, HashMap<String, Value>>,
}

/// Per-class and per-property metadata maps.
#[derive(Default)]
pub struct MetadataStore {
	classes: Mutex<HashMap<u64, ClassMetadata>>,
}

fn attach_to(slot: &mut HashMap<String, Value>, key: &str, value: Value) {
	match slot.get_mut(key) {
		Some(Value::Array(list)) => list.push(value),
		Some(existing) => {
			// A saved scalar becomes the first element once attach is used
			let first = existing.take();
			*existing = Value::Array(vec![first, value]);
		}
		None => {
			slot.insert(key.to_string(), Value::Array(vec![value]));
		}
	}
}

fn as_list(value: Option<Value>) -> Vec<Value> {
	match value {
		Some(Value::Array(list)) => list,
		Some(single) => vec![single],
		None => Vec::new(),
	}
}

impl MetadataStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Overwrite the value stored under `(kind, key)` for the class.
	pub fn save_class_metadata(&self, kind: &str, key: &str, value: Value, class: &ComponentClass) {
		let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.entry(class.class_id())
			.or_default()
			.class_entries
			.entry(kind.to_string())
			.or_default()
			.insert(key.to_string(), value);
	}

	/// Append a value to the list stored under `(kind, key)`, creating
	/// the list on first use.
	pub fn attach_class_metadata(
		&self,
		kind: &str,
		key: &str,
		value: Value,
		class: &ComponentClass,
	) {
		let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		let entries = classes
			.entry(class.class_id())
			.or_default()
			.class_entries
			.entry(kind.to_string())
			.or_default();
		attach_to(entries, key, value);
	}

	/// Read the value under `(kind, key)`. Attached keys read back as an
	/// array of the attached values in call order.
	pub fn get_class_metadata(&self, kind: &str, key: &str, class: &ComponentClass) -> Option<Value> {
		let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.get(&class.class_id())
			.and_then(|m| m.class_entries.get(kind))
			.and_then(|entries| entries.get(key))
			.cloned()
	}

	/// Read `(kind, key)` as a list: attached values in order, a saved
	/// scalar as a one-element list, an absent key as an empty list.
	pub fn list_class_metadata(&self, kind: &str, key: &str, class: &ComponentClass) -> Vec<Value> {
		as_list(self.get_class_metadata(kind, key, class))
	}

	/// Snapshot of every `key → value` pair stored under `kind` for the
	/// class.
	pub fn get_metadata_map(&self, kind: &str, class: &ComponentClass) -> HashMap<String, Value> {
		let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.get(&class.class_id())
			.and_then(|m| m.class_entries.get(kind))
			.cloned()
			.unwrap_or_default()
	}

	/// Overwrite the value stored under `key` for one property of the
	/// class.
	pub fn save_property_data(
		&self,
		key: &str,
		value: Value,
		class: &ComponentClass,
		property: &str,
	) {
		let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.entry(class.class_id())
			.or_default()
			.property_entries
			.entry(key.to_string())
			.or_default()
			.insert(property.to_string(), value);
	}

	/// Append a value under `key` for one property, creating the list on
	/// first use.
	pub fn attach_property_data(
		&self,
		key: &str,
		value: Value,
		class: &ComponentClass,
		property: &str,
	) {
		let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		let entries = classes
			.entry(class.class_id())
			.or_default()
			.property_entries
			.entry(key.to_string())
			.or_default();
		attach_to(entries, property, value);
	}

	/// Read the value stored under `key` for one property.
	pub fn get_property_data(
		&self,
		key: &str,
		class: &ComponentClass,
		property: &str,
	) -> Option<Value> {
		let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.get(&class.class_id())
			.and_then(|m| m.property_entries.get(key))
			.and_then(|props| props.get(property))
			.cloned()
	}

	/// Snapshot of `property → value` for every property that has data
	/// under `key`.
	pub fn list_property_data(&self, key: &str, class: &ComponentClass) -> HashMap<String, Value> {
		let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.get(&class.class_id())
			.and_then(|m| m.property_entries.get(key))
			.cloned()
			.unwrap_or_default()
	}

	/// Drop every map owned by the class.
	pub(crate) fn remove_class(&self, class_id: u64) {
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&class_id);
	}

	/// Drop everything.
	pub(crate) fn clear(&self) {
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Component;
	use rstest::rstest;
	use serde_json::json;
	use std::any::Any;

	struct Widget;

	impl Component for Widget {
		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn widget_class() -> ComponentClass {
		ComponentClass::new("Widget", |_ctx| Ok(Box::new(Widget)))
	}

	#[rstest]
	fn test_save_overwrites() {
		let store = MetadataStore::new();
		let class = widget_class();

		store.save_class_metadata("ROUTER", "path", json!("/a"), &class);
		store.save_class_metadata("ROUTER", "path", json!("/b"), &class);

		assert_eq!(
			store.get_class_metadata("ROUTER", "path", &class),
			Some(json!("/b"))
		);
	}

	#[rstest]
	fn test_attach_preserves_call_order() {
		let store = MetadataStore::new();
		let class = widget_class();

		store.attach_class_metadata("CATCHING", "matchers", json!("io"), &class);
		store.attach_class_metadata("CATCHING", "matchers", json!("timeout"), &class);
		store.attach_class_metadata("CATCHING", "matchers", json!("parse"), &class);

		assert_eq!(
			store.list_class_metadata("CATCHING", "matchers", &class),
			vec![json!("io"), json!("timeout"), json!("parse")]
		);
		assert_eq!(
			store.get_class_metadata("CATCHING", "matchers", &class),
			Some(json!(["io", "timeout", "parse"]))
		);
	}

	#[rstest]
	fn test_absent_keys_read_as_empty() {
		let store = MetadataStore::new();
		let class = widget_class();

		assert_eq!(store.get_class_metadata("NOPE", "missing", &class), None);
		assert!(store.list_class_metadata("NOPE", "missing", &class).is_empty());
		assert!(store.get_metadata_map("NOPE", &class).is_empty());
		assert!(store.list_property_data("NOPE", &class).is_empty());
	}

	#[rstest]
	fn test_property_data_is_keyed_per_property() {
		let store = MetadataStore::new();
		let class = widget_class();

		store.save_property_data("VALIDATE", json!({"min": 1}), &class, "age");
		store.save_property_data("VALIDATE", json!({"len": 8}), &class, "name");

		assert_eq!(
			store.get_property_data("VALIDATE", &class, "age"),
			Some(json!({"min": 1}))
		);
		let all = store.list_property_data("VALIDATE", &class);
		assert_eq!(all.len(), 2);
		assert_eq!(all.get("name"), Some(&json!({"len": 8})));
	}

	#[rstest]
	fn test_metadata_is_dropped_with_class() {
		let store = MetadataStore::new();
		let class = widget_class();

		store.save_class_metadata("ROUTER", "path", json!("/a"), &class);
		store.remove_class(class.class_id());

		assert_eq!(store.get_class_metadata("ROUTER", "path", &class), None);
	}

	#[rstest]
	fn test_classes_do_not_share_maps() {
		let store = MetadataStore::new();
		let first = widget_class();
		let second = widget_class();

		store.save_class_metadata("ROUTER", "path", json!("/a"), &first);

		assert_eq!(store.get_class_metadata("ROUTER", "path", &second), None);
	}
}
