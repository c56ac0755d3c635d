//! Class registry
//!
//! Maps the composite key `"<TYPE>:<identifier>"` to a registered class.
//! Registration is first-wins: decorator-style glue and manual
//! registration may both attempt to register the same class, and the
//! second attempt must be a silent no-op.

use crate::component::{ComponentFactory, ComponentType, DefinitionOptions, FactoryContext};
use crate::error::ContainerResult;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// Identity stamped onto a class by [`ClassRegistry::save_class`], so
/// later reflection can recover `{id, type}` from the bare class without
/// external bookkeeping. Stamped once; further stamps are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassTag {
	pub id: String,
	pub component_type: ComponentType,
}

/// A registrable class: declared name, construction factory, optional
/// parent link for metadata inheritance, and the slots the container
/// stamps exactly once (identity tag, definition options).
///
/// The numeric `class_id` is the arena key: instances and metadata are
/// keyed by it, so aliasing two identifiers to one class shares one
/// instance and one metadata map.
pub struct ComponentClass {
	class_id: u64,
	name: String,
	parent: Option<String>,
	factory: ComponentFactory,
	tag: OnceLock<ClassTag>,
	definition: OnceLock<DefinitionOptions>,
}

impl ComponentClass {
	/// Create a class from its declared type name and factory.
	///
	/// # Examples
	///
	/// ```
	/// use armature_container::{Component, ComponentClass};
	/// use std::any::Any;
	/// use std::sync::Arc;
	///
	/// #[derive(Default)]
	/// struct Clock;
	///
	/// impl Component for Clock {
	/// 	fn as_any(&self) -> &dyn Any {
	/// 		self
	/// 	}
	/// }
	///
	/// let class = Arc::new(ComponentClass::new("Clock", |_ctx| {
	/// 	Ok(Box::new(Clock::default()))
	/// }));
	/// assert_eq!(class.name(), "Clock");
	/// ```
	pub fn new<F>(name: impl Into<String>, factory: F) -> Self
	where
		F: Fn(&FactoryContext) -> ContainerResult<Box<dyn crate::component::Component>>
			+ Send
			+ Sync
			+ 'static,
	{
		Self {
			class_id: NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed),
			name: name.into(),
			parent: None,
			factory: Arc::new(factory),
			tag: OnceLock::new(),
			definition: OnceLock::new(),
		}
	}

	/// Declare an ancestor class by composite key (`"COMPONENT:Base"`).
	/// Injection metadata declared on the ancestor is inherited, with the
	/// nearest declaration winning per property.
	pub fn with_parent(mut self, parent_key: impl Into<String>) -> Self {
		self.parent = Some(parent_key.into());
		self
	}

	/// Declared type name, e.g. `"UserService"`.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Arena key; unique per class for the life of the process.
	pub fn class_id(&self) -> u64 {
		self.class_id
	}

	/// Composite key of the declared ancestor, if any.
	pub fn parent(&self) -> Option<&str> {
		self.parent.as_deref()
	}

	/// Identity tag, present once the class has been saved.
	pub fn tag(&self) -> Option<&ClassTag> {
		self.tag.get()
	}

	/// Definition options, present once the class has been registered.
	pub fn definition(&self) -> Option<&DefinitionOptions> {
		self.definition.get()
	}

	pub(crate) fn stamp(&self, id: &str, component_type: ComponentType) {
		let _ = self.tag.set(ClassTag {
			id: id.to_string(),
			component_type,
		});
	}

	/// Attach definition options, first caller wins. Returns the
	/// effective options.
	pub(crate) fn attach_definition(&self, options: DefinitionOptions) -> &DefinitionOptions {
		self.definition.get_or_init(|| options)
	}

	pub(crate) fn construct(
		&self,
		ctx: &FactoryContext,
	) -> ContainerResult<Box<dyn crate::component::Component>> {
		(self.factory)(ctx)
	}
}

impl std::fmt::Debug for ComponentClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ComponentClass")
			.field("class_id", &self.class_id)
			.field("name", &self.name)
			.field("parent", &self.parent)
			.field("tag", &self.tag.get())
			.finish_non_exhaustive()
	}
}

/// Build the composite registry key for a `(type, identifier)` pair.
pub fn composite_key(component_type: ComponentType, identifier: &str) -> String {
	format!("{component_type}:{identifier}")
}

/// The class registry.
#[derive(Default)]
pub struct ClassRegistry {
	classes: Mutex<HashMap<String, Arc<ComponentClass>>>,
}

impl ClassRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stamp the class with its identity and insert it under
	/// `"<TYPE>:<identifier>"`. Within one key the first registration
	/// wins; duplicates are a silent no-op.
	pub fn save_class(
		&self,
		component_type: ComponentType,
		class: &Arc<ComponentClass>,
		identifier: &str,
	) {
		class.stamp(identifier, component_type);

		let key = composite_key(component_type, identifier);
		let mut classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		if classes.contains_key(&key) {
			tracing::trace!(key = %key, "class already registered, keeping first");
			return;
		}
		classes.insert(key, Arc::clone(class));
	}

	/// Pure lookup; absent entries are `None`, callers decide whether
	/// absence is fatal.
	pub fn get_class(
		&self,
		identifier: &str,
		component_type: ComponentType,
	) -> Option<Arc<ComponentClass>> {
		let key = composite_key(component_type, identifier);
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&key)
			.cloned()
	}

	/// Lookup by full composite key (`"COMPONENT:Base"`), used when
	/// walking parent chains.
	pub fn get_by_key(&self, key: &str) -> Option<Arc<ComponentClass>> {
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(key)
			.cloned()
	}

	/// Snapshot of `{key, class}` pairs whose key matches the type
	/// prefix, or every entry when `component_type` is `None`.
	pub fn list_class(
		&self,
		component_type: Option<ComponentType>,
	) -> Vec<(String, Arc<ComponentClass>)> {
		let prefix = component_type.map(|ty| format!("{ty}:"));
		let classes = self.classes.lock().unwrap_or_else(PoisonError::into_inner);
		classes
			.iter()
			.filter(|(key, _)| match &prefix {
				Some(p) => key.starts_with(p.as_str()),
				None => true,
			})
			.map(|(key, class)| (key.clone(), Arc::clone(class)))
			.collect()
	}

	/// Remove one `(type, identifier)` mapping. Returns the class it
	/// pointed at, if any. Other aliases of the same class are untouched.
	pub fn remove(
		&self,
		identifier: &str,
		component_type: ComponentType,
	) -> Option<Arc<ComponentClass>> {
		let key = composite_key(component_type, identifier);
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&key)
	}

	/// Whether any registered key still points at the given class.
	pub fn references(&self, class_id: u64) -> bool {
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.values()
			.any(|class| class.class_id() == class_id)
	}

	/// Drop every entry.
	pub fn clear(&self) {
		self.classes
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}
}
