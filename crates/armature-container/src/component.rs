//! Component model: type tags, scopes, definition options and the
//! instance-side injection seam.

use crate::app::Application;
use crate::error::ContainerResult;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Coarse category tag used to namespace identifiers in the class
/// registry.
///
/// The set is extensible in spirit; these four cover the runtime's
/// managed roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
	Addon,
	Capturer,
	Controller,
	Component,
}

impl fmt::Display for ComponentType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ComponentType::Addon => write!(f, "ADDON"),
			ComponentType::Capturer => write!(f, "CAPTURER"),
			ComponentType::Controller => write!(f, "CONTROLLER"),
			ComponentType::Component => write!(f, "COMPONENT"),
		}
	}
}

/// Instantiation policy for a registered class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
	/// One shared instance, cached in the arena.
	Singleton,
	/// Cached once when constructed without arguments; explicit
	/// construction arguments always produce a fresh, uncached instance.
	Prototype,
	/// The class is registered and instrumented but never constructed by
	/// the container; instances are managed externally.
	Connect,
}

impl fmt::Display for Scope {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Scope::Singleton => write!(f, "Singleton"),
			Scope::Prototype => write!(f, "Prototype"),
			Scope::Connect => write!(f, "Connect"),
		}
	}
}

/// Per-registration configuration, attached to a class exactly once and
/// immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionOptions {
	pub scope: Scope,
	pub component_type: ComponentType,
	pub args: Vec<serde_json::Value>,
	/// Reserved; not enforced by the core.
	pub is_async: bool,
	/// Reserved; not enforced by the core.
	pub init_method: String,
	/// Reserved; not enforced by the core.
	pub destroy_method: String,
}

impl Default for DefinitionOptions {
	fn default() -> Self {
		Self {
			scope: Scope::Singleton,
			component_type: ComponentType::Component,
			args: Vec::new(),
			is_async: false,
			init_method: "constructor".to_string(),
			destroy_method: "distructor".to_string(),
		}
	}
}

impl DefinitionOptions {
	/// Options for a given scope, everything else defaulted.
	pub fn with_scope(scope: Scope) -> Self {
		Self {
			scope,
			..Self::default()
		}
	}

	/// Options for a given component type, everything else defaulted.
	pub fn with_type(component_type: ComponentType) -> Self {
		Self {
			component_type,
			..Self::default()
		}
	}

	/// Set construction arguments.
	pub fn args(mut self, args: Vec<serde_json::Value>) -> Self {
		self.args = args;
		self
	}
}

/// A managed instance. Aliased identifiers pointing at the same class
/// share one `InstanceRef`; the write lock exists so deferred injection
/// can complete after the instance has been published.
pub type InstanceRef = Arc<RwLock<Box<dyn Component>>>;

/// What the injector hands to [`Component::assign`].
#[derive(Clone)]
pub enum Injected {
	/// Another managed instance (autowired property).
	Instance(InstanceRef),
	/// A resolved literal or computed value (values property).
	Value(serde_json::Value),
}

impl fmt::Debug for Injected {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Injected::Instance(_) => f.write_str("Injected::Instance(..)"),
			Injected::Value(v) => write!(f, "Injected::Value({v})"),
		}
	}
}

/// The instance-side seam of the injection resolver.
///
/// Implementations route declared property names to their fields; the
/// container never touches fields directly. `assign` replaces the
/// prototype instrumentation of dynamic runtimes with an explicit,
/// compiler-checked dispatch written (or generated) next to the type.
pub trait Component: Any + Send + Sync {
	/// Upcast for typed reads; implementations return `self`.
	fn as_any(&self) -> &dyn Any;

	/// Receive one injected property. The default rejects everything, so
	/// components without injectable properties need not override it.
	fn assign(&mut self, property: &str, value: Injected) -> ContainerResult<()> {
		let _ = value;
		Err(crate::error::ContainerError::UnknownProperty {
			class: std::any::type_name::<Self>().to_string(),
			property: property.to_string(),
		})
	}
}

/// Context handed to component factories at construction time.
///
/// The application handle arrives here explicitly instead of through a
/// shared accessor on the instances themselves.
pub struct FactoryContext {
	pub app: Option<Arc<Application>>,
	pub args: Vec<serde_json::Value>,
}

impl FactoryContext {
	pub fn new(app: Option<Arc<Application>>, args: Vec<serde_json::Value>) -> Self {
		Self { app, args }
	}

	/// Positional construction argument, if supplied.
	pub fn arg(&self, index: usize) -> Option<&serde_json::Value> {
		self.args.get(index)
	}
}

/// Factory closure producing a component instance.
pub type ComponentFactory =
	Arc<dyn Fn(&FactoryContext) -> ContainerResult<Box<dyn Component>> + Send + Sync>;

/// Run `f` against the concrete component behind an [`InstanceRef`].
///
/// Returns `None` when the instance is not a `T`. Call sites use this to
/// do the lock-and-downcast dance once:
///
/// ```
/// use armature_container::{with_component, Component, InstanceRef};
/// use std::any::Any;
/// use std::sync::{Arc, RwLock};
///
/// struct Greeter {
/// 	greeting: String,
/// }
///
/// impl Component for Greeter {
/// 	fn as_any(&self) -> &dyn Any {
/// 		self
/// 	}
/// }
///
/// let instance: InstanceRef = Arc::new(RwLock::new(Box::new(Greeter {
/// 	greeting: "hello".to_string(),
/// })));
///
/// let greeting = with_component::<Greeter, _>(&instance, |g| g.greeting.clone());
/// assert_eq!(greeting.as_deref(), Some("hello"));
/// ```
pub fn with_component<T: Component, R>(
	instance: &InstanceRef,
	f: impl FnOnce(&T) -> R,
) -> Option<R> {
	let guard = instance.read().unwrap_or_else(PoisonError::into_inner);
	guard.as_any().downcast_ref::<T>().map(f)
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case(ComponentType::Addon, "ADDON")]
	#[case(ComponentType::Capturer, "CAPTURER")]
	#[case(ComponentType::Controller, "CONTROLLER")]
	#[case(ComponentType::Component, "COMPONENT")]
	fn test_component_type_display(#[case] ty: ComponentType, #[case] expected: &str) {
		assert_eq!(ty.to_string(), expected);
	}

	#[rstest]
	fn test_definition_options_defaults() {
		let options = DefinitionOptions::default();
		assert_eq!(options.scope, Scope::Singleton);
		assert_eq!(options.component_type, ComponentType::Component);
		assert!(options.args.is_empty());
		assert!(!options.is_async);
		assert_eq!(options.init_method, "constructor");
		assert_eq!(options.destroy_method, "distructor");
	}

	struct Bare;

	impl Component for Bare {
		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	#[rstest]
	fn test_default_assign_rejects_unknown_property() {
		let mut bare = Bare;
		let err = bare
			.assign("anything", Injected::Value(serde_json::Value::Null))
			.unwrap_err();
		assert!(matches!(
			err,
			crate::error::ContainerError::UnknownProperty { .. }
		));
	}
}
