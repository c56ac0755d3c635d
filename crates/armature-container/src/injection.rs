//! Injection declarations
//!
//! Two independent mechanisms feed one instrumentation pass: values
//! injection (computed literals, type-checked against the declared
//! kind) and autowired injection (managed instances looked up by
//! identifier, optionally deferred to boot). Declarations are collected
//! across a class's parent chain with the nearest declaration winning
//! per property.

use crate::component::{Component, ComponentType};
use crate::error::ContainerResult;
use crate::registry::{ClassRegistry, ComponentClass};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

/// Runtime type a values-injected property must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
	String,
	Number,
	Bool,
	Array,
	Object,
}

impl ValueKind {
	/// Whether the resolved value has this kind.
	pub fn matches(&self, value: &Value) -> bool {
		matches!(
			(self, value),
			(ValueKind::String, Value::String(_))
				| (ValueKind::Number, Value::Number(_))
				| (ValueKind::Bool, Value::Bool(_))
				| (ValueKind::Array, Value::Array(_))
				| (ValueKind::Object, Value::Object(_))
		)
	}

	/// Kind name of an arbitrary value, for mismatch reports.
	pub fn name_of(value: &Value) -> &'static str {
		match value {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Number(_) => "number",
			Value::String(_) => "string",
			Value::Array(_) => "array",
			Value::Object(_) => "object",
		}
	}
}

impl std::fmt::Display for ValueKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			ValueKind::String => write!(f, "string"),
			ValueKind::Number => write!(f, "number"),
			ValueKind::Bool => write!(f, "bool"),
			ValueKind::Array => write!(f, "array"),
			ValueKind::Object => write!(f, "object"),
		}
	}
}

/// Declared autowired dependency for one property.
#[derive(Debug, Clone)]
pub struct PropertyInjection {
	/// Identifier to look up; must be non-empty.
	pub identifier: String,
	/// Registry namespace to look in.
	pub component_type: ComponentType,
	/// Defer resolution to boot, breaking dependency cycles.
	pub delay: bool,
	/// Construction arguments forwarded to the lookup.
	pub args: Vec<Value>,
}

impl PropertyInjection {
	pub fn new(identifier: impl Into<String>, component_type: ComponentType) -> Self {
		Self {
			identifier: identifier.into(),
			component_type,
			delay: false,
			args: Vec::new(),
		}
	}

	/// Mark the dependency for deferred resolution at boot.
	pub fn delayed(mut self) -> Self {
		self.delay = true;
		self
	}

	/// Forward construction arguments to the lookup.
	pub fn with_args(mut self, args: Vec<Value>) -> Self {
		self.args = args;
		self
	}
}

/// Resolver closure for a values-injected property. Invoked once at
/// instrumentation time, not per access.
pub type ValueResolver = Arc<dyn Fn() -> ContainerResult<Value> + Send + Sync>;

/// Declared computed value for one property.
#[derive(Clone)]
pub struct PropertyValue {
	/// Kind the resolved value must have.
	pub kind: ValueKind,
	/// Zero-argument resolver computing the value.
	pub resolver: ValueResolver,
}

impl PropertyValue {
	pub fn new<F>(kind: ValueKind, resolver: F) -> Self
	where
		F: Fn() -> ContainerResult<Value> + Send + Sync + 'static,
	{
		Self {
			kind,
			resolver: Arc::new(resolver),
		}
	}

	/// A value known at declaration time.
	pub fn literal(kind: ValueKind, value: Value) -> Self {
		Self::new(kind, move || Ok(value.clone()))
	}
}

impl std::fmt::Debug for PropertyValue {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PropertyValue")
			.field("kind", &self.kind)
			.finish_non_exhaustive()
	}
}

/// Declaration storage: per-class ordered lists of autowired and values
/// properties.
#[derive(Default)]
pub(crate) struct InjectionRegistry {
	autowired: Mutex<HashMap<u64, Vec<(String, PropertyInjection)>>>,
	values: Mutex<HashMap<u64, Vec<(String, PropertyValue)>>>,
}

fn upsert<T>(entries: &mut Vec<(String, T)>, property: &str, declaration: T) {
	if let Some(slot) = entries.iter_mut().find(|(name, _)| name == property) {
		slot.1 = declaration;
	} else {
		entries.push((property.to_string(), declaration));
	}
}

impl InjectionRegistry {
	pub(crate) fn declare_autowired(
		&self,
		class_id: u64,
		property: &str,
		injection: PropertyInjection,
	) {
		let mut autowired = self
			.autowired
			.lock()
			.unwrap_or_else(PoisonError::into_inner);
		upsert(autowired.entry(class_id).or_default(), property, injection);
	}

	pub(crate) fn declare_values(&self, class_id: u64, property: &str, value: PropertyValue) {
		let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
		upsert(values.entry(class_id).or_default(), property, value);
	}

	fn autowired_for(&self, class_id: u64) -> Vec<(String, PropertyInjection)> {
		self.autowired
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&class_id)
			.cloned()
			.unwrap_or_default()
	}

	fn values_for(&self, class_id: u64) -> Vec<(String, PropertyValue)> {
		self.values
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&class_id)
			.cloned()
			.unwrap_or_default()
	}

	pub(crate) fn remove_class(&self, class_id: u64) {
		self.autowired
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&class_id);
		self.values
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.remove(&class_id);
	}

	pub(crate) fn clear(&self) {
		self.autowired
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
		self.values
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
	}
}

pub(crate) fn collect_autowired(
	injections: &InjectionRegistry,
	classes: &ClassRegistry,
	class: &ComponentClass,
) -> Vec<(String, PropertyInjection)> {
	collect_with_ancestors(classes, class, |id| injections.autowired_for(id))
}

pub(crate) fn collect_values(
	injections: &InjectionRegistry,
	classes: &ClassRegistry,
	class: &ComponentClass,
) -> Vec<(String, PropertyValue)> {
	collect_with_ancestors(classes, class, |id| injections.values_for(id))
}

fn collect_with_ancestors<T: Clone>(
	classes: &ClassRegistry,
	class: &ComponentClass,
	read: impl Fn(u64) -> Vec<(String, T)>,
) -> Vec<(String, T)> {
	let mut collected: Vec<(String, T)> = read(class.class_id());
	let mut parent_key = class.parent().map(str::to_string);

	while let Some(key) = parent_key {
		let Some(ancestor) = classes.get_by_key(&key) else {
			// Dangling parent link: nothing to inherit beyond this point
			break;
		};
		for (property, declaration) in read(ancestor.class_id()) {
			if !collected.iter().any(|(name, _)| *name == property) {
				collected.push((property, declaration));
			}
		}
		parent_key = ancestor.parent().map(str::to_string);
	}

	collected
}

/// One autowired resolution postponed to boot. The instance is held
/// weakly: if it is gone by the time boot finishes, resolving it is
/// inert rather than an error.
pub(crate) struct DeferredInjection {
	pub class_name: String,
	pub instance: Weak<RwLock<Box<dyn Component>>>,
	pub property: String,
	pub identifier: String,
	pub component_type: ComponentType,
	pub args: Vec<Value>,
}
