//! Metadata API tests through the container surface
//!
//! Round-trips, attach ordering, absent-key behavior and snapshot
//! readers, the way decorator-style glue exercises them.

use armature_container::{
	Component, ComponentClass, ComponentType, Container, DefinitionOptions,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;

#[derive(Default)]
struct Endpoint;

impl Component for Endpoint {
	fn as_any(&self) -> &dyn Any {
		self
	}
}

fn endpoint_class(name: &str) -> Arc<ComponentClass> {
	Arc::new(ComponentClass::new(name, |_ctx| {
		Ok(Box::new(Endpoint::default()))
	}))
}

#[test]
fn test_attach_round_trip_preserves_order() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	for matcher in ["io", "timeout", "parse"] {
		container.attach_class_metadata("CATCHING", "matchers", json!(matcher), &class);
	}

	assert_eq!(
		container.list_class_metadata("CATCHING", "matchers", &class),
		vec![json!("io"), json!("timeout"), json!("parse")]
	);
	assert_eq!(
		container.get_class_metadata("CATCHING", "matchers", &class),
		Some(json!(["io", "timeout", "parse"]))
	);
}

#[test]
fn test_save_replaces_previous_value() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	container.save_class_metadata("ROUTER", "path", json!("/v1/users"), &class);
	container.save_class_metadata("ROUTER", "path", json!("/v2/users"), &class);

	assert_eq!(
		container.get_class_metadata("ROUTER", "path", &class),
		Some(json!("/v2/users"))
	);
}

#[test]
fn test_absent_keys_never_fail() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	assert_eq!(container.get_class_metadata("NOPE", "missing", &class), None);
	assert!(
		container
			.list_class_metadata("NOPE", "missing", &class)
			.is_empty()
	);
	assert!(container.get_metadata_map("NOPE", &class).is_empty());
	assert_eq!(container.get_property_data("NOPE", &class, "field"), None);
	assert!(container.list_property_data("NOPE", &class).is_empty());
}

#[test]
fn test_metadata_map_snapshots_one_kind() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	container.save_class_metadata("ROUTER", "path", json!("/users"), &class);
	container.save_class_metadata("ROUTER", "method", json!("GET"), &class);
	container.save_class_metadata("SCHEDULE", "cron", json!("0 * * * *"), &class);

	let map = container.get_metadata_map("ROUTER", &class);
	assert_eq!(map.len(), 2);
	assert_eq!(map.get("path"), Some(&json!("/users")));
	assert_eq!(map.get("method"), Some(&json!("GET")));
}

#[test]
fn test_property_data_round_trip() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	container.save_property_data("VALIDATE", json!({"min": 1}), &class, "age");
	container.attach_property_data("ALIASES", json!("user_age"), &class, "age");
	container.attach_property_data("ALIASES", json!("years"), &class, "age");

	assert_eq!(
		container.get_property_data("VALIDATE", &class, "age"),
		Some(json!({"min": 1}))
	);
	assert_eq!(
		container.get_property_data("ALIASES", &class, "age"),
		Some(json!(["user_age", "years"]))
	);

	let validated = container.list_property_data("VALIDATE", &class);
	assert_eq!(validated.len(), 1);
	assert!(validated.contains_key("age"));
}

#[test]
fn test_metadata_survives_registration_and_dies_with_unregister() {
	let container = Container::new();
	let class = endpoint_class("UserEndpoint");

	container.save_class_metadata("ROUTER", "path", json!("/users"), &class);
	container.reg(&class, DefinitionOptions::default()).unwrap();

	assert_eq!(
		container.get_class_metadata("ROUTER", "path", &class),
		Some(json!("/users"))
	);

	container.unregister("UserEndpoint", ComponentType::Component);
	assert_eq!(container.get_class_metadata("ROUTER", "path", &class), None);
}

#[test]
fn test_classes_have_independent_metadata() {
	let container = Container::new();
	let first = endpoint_class("UserEndpoint");
	let second = endpoint_class("PostEndpoint");

	container.save_class_metadata("ROUTER", "path", json!("/users"), &first);

	assert_eq!(container.get_class_metadata("ROUTER", "path", &second), None);
}
