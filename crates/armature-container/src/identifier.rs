//! Identifier and component-type resolution
//!
//! Some classes are registered without ever passing through the explicit
//! declaration glue (dynamically synthesized controllers, for one), so
//! identity must be recoverable structurally: from the stamped tag when
//! present, from the declared name otherwise.

use crate::component::ComponentType;
use crate::registry::ComponentClass;

/// Ordered suffix conventions; first match wins.
const TYPE_SUFFIXES: &[(&str, ComponentType)] = &[
	("Addon", ComponentType::Addon),
	("Capturer", ComponentType::Capturer),
	("Controller", ComponentType::Controller),
];

/// Infer a component type from a declared class name.
///
/// Anything unmatched is a [`ComponentType::Component`]; synthesized
/// classes whose names cannot be trusted must be registered with an
/// explicit type instead of relying on this heuristic.
pub fn infer_type(name: &str) -> ComponentType {
	for (suffix, component_type) in TYPE_SUFFIXES {
		if name.ends_with(suffix) {
			return *component_type;
		}
	}
	ComponentType::Component
}

/// Derive the stable identifier for a class: the stamped tag id when the
/// class has been saved, the declared name otherwise.
///
/// Returns an empty string when neither is available; callers treat an
/// empty identifier as an upstream configuration error, never a panic.
pub fn identifier_of(class: &ComponentClass) -> String {
	if let Some(tag) = class.tag() {
		return tag.id.clone();
	}
	class.name().to_string()
}

/// Derive the component type for a class: the stamped tag when present,
/// the naming heuristic over the declared name otherwise.
pub fn type_of(class: &ComponentClass) -> ComponentType {
	if let Some(tag) = class.tag() {
		return tag.component_type;
	}
	infer_type(class.name())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::component::Component;
	use crate::registry::ClassRegistry;
	use rstest::rstest;
	use std::any::Any;
	use std::sync::Arc;

	struct Widget;

	impl Component for Widget {
		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	#[rstest]
	#[case("MetricsAddon", ComponentType::Addon)]
	#[case("RequestCapturer", ComponentType::Capturer)]
	#[case("UserController", ComponentType::Controller)]
	#[case("UserService", ComponentType::Component)]
	#[case("", ComponentType::Component)]
	fn test_infer_type_from_name(#[case] name: &str, #[case] expected: ComponentType) {
		assert_eq!(infer_type(name), expected);
	}

	#[rstest]
	fn test_identifier_falls_back_to_declared_name() {
		let class = ComponentClass::new("UserService", |_ctx| Ok(Box::new(Widget)));
		assert_eq!(identifier_of(&class), "UserService");
	}

	#[rstest]
	fn test_stamped_tag_overrides_name() {
		let registry = ClassRegistry::new();
		let class = Arc::new(ComponentClass::new("UserController", |_ctx| {
			Ok(Box::new(Widget))
		}));

		// Saved under an alias and an explicit type; the tag wins over
		// both the declared name and the suffix heuristic afterwards.
		registry.save_class(ComponentType::Component, &class, "users");

		assert_eq!(identifier_of(&class), "users");
		assert_eq!(type_of(&class), ComponentType::Component);
	}

	#[rstest]
	fn test_untagged_type_uses_heuristic() {
		let class = ComponentClass::new("AuthCapturer", |_ctx| Ok(Box::new(Widget)));
		assert_eq!(type_of(&class), ComponentType::Capturer);
	}
}
