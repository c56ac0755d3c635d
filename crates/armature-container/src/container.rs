//! Registration orchestrator
//!
//! `Container` ties the class registry, instance arena, metadata store
//! and injection resolver together. Registration is all-or-nothing: any
//! failure while constructing or injecting propagates to the caller and
//! the instance is never cached. Prior writes to the class registry and
//! the definition slot are deliberately not rolled back, so retrying
//! `reg` on a class whose registration failed is unsupported.
//!
//! Boot is two-phase. Phase 1 is the sequence of `reg` calls, during
//! which delayed autowired properties are queued instead of resolved.
//! Phase 2 is [`Container::finish_boot`], which drains the queue with
//! delay forced off, reports every still-unresolved dependency in one
//! error, and fires the application's boot-finished signal on success.

use crate::app::Application;
use crate::component::{
	Component, ComponentType, DefinitionOptions, FactoryContext, Injected, InstanceRef, Scope,
};
use crate::error::{ContainerError, ContainerResult, UnresolvedDependency};
use crate::identifier;
use crate::injection::{
	DeferredInjection, InjectionRegistry, PropertyInjection, PropertyValue, ValueKind,
	collect_autowired, collect_values,
};
use crate::metadata::MetadataStore;
use crate::registry::{ClassRegistry, ComponentClass};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

static GLOBAL: Lazy<Container> = Lazy::new(Container::new);

/// The process-wide default container.
///
/// Registration happens during a synchronous bootstrap phase with a
/// single logical writer; the locks inside exist for `Send + Sync`
/// soundness, not to arbitrate concurrent registration.
pub fn global() -> &'static Container {
	&GLOBAL
}

/// The inversion-of-control container.
pub struct Container {
	app: Mutex<Option<Arc<Application>>>,
	classes: ClassRegistry,
	instances: Mutex<HashMap<u64, InstanceRef>>,
	metadata: MetadataStore,
	injections: InjectionRegistry,
	deferred: Mutex<Vec<DeferredInjection>>,
	booted: AtomicBool,
}

impl Container {
	pub fn new() -> Self {
		Self {
			app: Mutex::new(None),
			classes: ClassRegistry::new(),
			instances: Mutex::new(HashMap::new()),
			metadata: MetadataStore::new(),
			injections: InjectionRegistry::default(),
			deferred: Mutex::new(Vec::new()),
			booted: AtomicBool::new(false),
		}
	}

	// ------------------------------------------------------------------
	// Application handle
	// ------------------------------------------------------------------

	/// Set the application handle. Called once at boot, before any `reg`.
	pub fn set_app(&self, app: Arc<Application>) -> ContainerResult<()> {
		let mut slot = self.app.lock().unwrap_or_else(PoisonError::into_inner);
		if slot.is_some() {
			return Err(ContainerError::AppAlreadySet);
		}
		*slot = Some(app);
		Ok(())
	}

	/// The application handle, if set.
	pub fn app(&self) -> Option<Arc<Application>> {
		self.app
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clone()
	}

	// ------------------------------------------------------------------
	// Class registry
	// ------------------------------------------------------------------

	/// Stamp and register a class under `(type, identifier)`. First
	/// registration wins; duplicates are a silent no-op.
	pub fn save_class(
		&self,
		component_type: ComponentType,
		class: &Arc<ComponentClass>,
		identifier: &str,
	) {
		self.classes.save_class(component_type, class, identifier);
	}

	/// Pure lookup; `None` when absent.
	pub fn get_class(
		&self,
		identifier: &str,
		component_type: ComponentType,
	) -> Option<Arc<ComponentClass>> {
		self.classes.get_class(identifier, component_type)
	}

	/// Snapshot of registered `{key, class}` pairs for a type, or all.
	pub fn list_class(
		&self,
		component_type: Option<ComponentType>,
	) -> Vec<(String, Arc<ComponentClass>)> {
		self.classes.list_class(component_type)
	}

	/// Stable identifier for a class: stamped tag id, else declared name.
	pub fn identifier_of(&self, class: &ComponentClass) -> String {
		identifier::identifier_of(class)
	}

	/// Component type for a class: stamped tag, else the naming heuristic
	/// over the declared name, then over each ancestor's name.
	pub fn type_of(&self, class: &ComponentClass) -> ComponentType {
		if let Some(tag) = class.tag() {
			return tag.component_type;
		}
		let own = identifier::infer_type(class.name());
		if own != ComponentType::Component {
			return own;
		}
		let mut parent_key = class.parent().map(str::to_string);
		while let Some(key) = parent_key {
			let Some(ancestor) = self.classes.get_by_key(&key) else {
				break;
			};
			let inferred = identifier::infer_type(ancestor.name());
			if inferred != ComponentType::Component {
				return inferred;
			}
			parent_key = ancestor.parent().map(str::to_string);
		}
		ComponentType::Component
	}

	// ------------------------------------------------------------------
	// Injection declarations
	// ------------------------------------------------------------------

	/// Declare an autowired property on a class.
	///
	/// Fails at declaration time — independent of whether the class is
	/// ever registered — when the identifier is empty or the class
	/// resolves to a controller.
	pub fn autowired(
		&self,
		class: &Arc<ComponentClass>,
		property: &str,
		injection: PropertyInjection,
	) -> ContainerResult<()> {
		if self.type_of(class) == ComponentType::Controller {
			return Err(ContainerError::UnsupportedInjectionTarget {
				class: class.name().to_string(),
			});
		}
		if injection.identifier.is_empty() {
			return Err(ContainerError::MissingIdentifier {
				class: class.name().to_string(),
				property: property.to_string(),
			});
		}
		tracing::trace!(
			class = class.name(),
			property,
			identifier = %injection.identifier,
			delay = injection.delay,
			"autowired declared"
		);
		self.injections
			.declare_autowired(class.class_id(), property, injection);
		Ok(())
	}

	/// Declare a values-injected property on a class. The resolver runs
	/// once per constructed instance, at instrumentation time.
	pub fn values(&self, class: &Arc<ComponentClass>, property: &str, value: PropertyValue) {
		self.injections
			.declare_values(class.class_id(), property, value);
	}

	// ------------------------------------------------------------------
	// Registration
	// ------------------------------------------------------------------

	/// Register a class, deriving its identifier from the stamped tag or
	/// declared name. Returns the managed instance, or `None` for
	/// Connect scope.
	pub fn reg(
		&self,
		class: &Arc<ComponentClass>,
		options: DefinitionOptions,
	) -> ContainerResult<Option<InstanceRef>> {
		self.reg_internal(None, class, options)
	}

	/// Register a class under an explicit identifier.
	pub fn reg_named(
		&self,
		identifier: &str,
		class: &Arc<ComponentClass>,
		options: DefinitionOptions,
	) -> ContainerResult<Option<InstanceRef>> {
		self.reg_internal(Some(identifier), class, options)
	}

	/// Plain constants register through the same API surface as classes
	/// and pass through unchanged.
	pub fn reg_value(&self, _identifier: &str, value: Value) -> Value {
		value
	}

	fn reg_internal(
		&self,
		identifier: Option<&str>,
		class: &Arc<ComponentClass>,
		options: DefinitionOptions,
	) -> ContainerResult<Option<InstanceRef>> {
		let identifier = match identifier {
			Some(explicit) if !explicit.is_empty() => explicit.to_string(),
			_ => identifier::identifier_of(class),
		};

		// First attachment wins; a re-registration keeps the original
		// definition untouched.
		let effective = class.attach_definition(options).clone();

		self.classes
			.save_class(effective.component_type, class, &identifier);

		if effective.scope == Scope::Connect {
			tracing::debug!(
				identifier = %identifier,
				class = class.name(),
				"registered with Connect scope, no instance constructed"
			);
			return Ok(None);
		}

		if let Some(existing) = self.instance_by_id(class.class_id()) {
			return Ok(Some(existing));
		}

		let ctx = FactoryContext::new(self.app(), effective.args.clone());
		let instance: InstanceRef = Arc::new(RwLock::new(class.construct(&ctx)?));

		// Values first: autowired resolution may read configuration the
		// values pass exposes.
		self.apply_values(class, &instance)?;
		self.apply_autowired(class, &instance)?;

		self.instances
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.insert(class.class_id(), Arc::clone(&instance));

		tracing::debug!(
			identifier = %identifier,
			class = class.name(),
			scope = %effective.scope,
			"registered"
		);
		Ok(Some(instance))
	}

	// ------------------------------------------------------------------
	// Lookup
	// ------------------------------------------------------------------

	/// Look up an instance by identifier.
	///
	/// Absent classes are `Ok(None)` — callers decide whether absence is
	/// fatal. Non-empty `args` construct and wire a brand-new instance
	/// that is never cached; empty `args` return whatever the arena
	/// holds (which is `None` for Connect scope or before `reg`).
	pub fn get(
		&self,
		identifier: &str,
		component_type: ComponentType,
		args: &[Value],
	) -> ContainerResult<Option<InstanceRef>> {
		let Some(class) = self.classes.get_class(identifier, component_type) else {
			return Ok(None);
		};
		self.instance_of(&class, args)
	}

	/// Look up (or construct, when `args` is non-empty) an instance
	/// directly by class.
	pub fn instance_of(
		&self,
		class: &Arc<ComponentClass>,
		args: &[Value],
	) -> ContainerResult<Option<InstanceRef>> {
		if !args.is_empty() {
			let ctx = FactoryContext::new(self.app(), args.to_vec());
			let instance: InstanceRef = Arc::new(RwLock::new(class.construct(&ctx)?));
			self.apply_values(class, &instance)?;
			self.apply_autowired(class, &instance)?;
			return Ok(Some(instance));
		}
		Ok(self.instance_by_id(class.class_id()))
	}

	fn instance_by_id(&self, class_id: u64) -> Option<InstanceRef> {
		self.instances
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.get(&class_id)
			.cloned()
	}

	// ------------------------------------------------------------------
	// Injection passes
	// ------------------------------------------------------------------

	fn apply_values(&self, class: &Arc<ComponentClass>, instance: &InstanceRef) -> ContainerResult<()> {
		for (property, declaration) in collect_values(&self.injections, &self.classes, class) {
			let resolved = (declaration.resolver)()?;
			if !declaration.kind.matches(&resolved) {
				return Err(ContainerError::ValueTypeMismatch {
					class: class.name().to_string(),
					property,
					expected: declaration.kind.to_string(),
					actual: ValueKind::name_of(&resolved).to_string(),
				});
			}
			let mut guard = instance.write().unwrap_or_else(PoisonError::into_inner);
			guard.assign(&property, Injected::Value(resolved))?;
		}
		Ok(())
	}

	fn apply_autowired(
		&self,
		class: &Arc<ComponentClass>,
		instance: &InstanceRef,
	) -> ContainerResult<()> {
		for (property, injection) in collect_autowired(&self.injections, &self.classes, class) {
			if injection.delay && !self.booted.load(Ordering::SeqCst) {
				tracing::trace!(
					class = class.name(),
					property = %property,
					identifier = %injection.identifier,
					"autowired resolution deferred to boot"
				);
				self.deferred
					.lock()
					.unwrap_or_else(PoisonError::into_inner)
					.push(DeferredInjection {
						class_name: class.name().to_string(),
						instance: Arc::downgrade(instance),
						property,
						identifier: injection.identifier,
						component_type: injection.component_type,
						args: injection.args,
					});
				continue;
			}

			let resolved = self.get(&injection.identifier, injection.component_type, &injection.args)?;
			match resolved {
				Some(dependency) => {
					let mut guard = instance.write().unwrap_or_else(PoisonError::into_inner);
					guard.assign(&property, Injected::Instance(dependency))?;
				}
				None => {
					return Err(ContainerError::DependencyNotFound {
						identifier: injection.identifier,
						class: class.name().to_string(),
					});
				}
			}
		}
		Ok(())
	}

	// ------------------------------------------------------------------
	// Boot
	// ------------------------------------------------------------------

	/// Phase 2 of the two-phase boot: resolve every deferred injection
	/// queued during registration, reporting all failures together.
	///
	/// Failures surface from this call, never from the `reg` that queued
	/// them. On success the application's boot-finished signal fires. An
	/// instance that has been dropped since its registration is skipped.
	pub fn finish_boot(&self) -> ContainerResult<()> {
		let drained: Vec<DeferredInjection> = std::mem::take(
			&mut *self
				.deferred
				.lock()
				.unwrap_or_else(PoisonError::into_inner),
		);
		let was_booted = self.booted.swap(true, Ordering::SeqCst);

		let mut failures: Vec<UnresolvedDependency> = Vec::new();
		let total = drained.len();
		for entry in drained {
			let Some(instance) = entry.instance.upgrade() else {
				tracing::trace!(
					class = %entry.class_name,
					property = %entry.property,
					"deferred injection target dropped, skipping"
				);
				continue;
			};

			let resolved = self.get(&entry.identifier, entry.component_type, &entry.args);
			let assigned = match resolved {
				Ok(Some(dependency)) => instance
					.write()
					.unwrap_or_else(PoisonError::into_inner)
					.assign(&entry.property, Injected::Instance(dependency))
					.is_ok(),
				_ => false,
			};
			if !assigned {
				failures.push(UnresolvedDependency {
					identifier: entry.identifier,
					class: entry.class_name,
					property: entry.property,
				});
			}
		}

		if !failures.is_empty() {
			return Err(ContainerError::UnresolvedDependencies(failures));
		}

		tracing::debug!(resolved = total, "deferred injection complete");
		if !was_booted {
			if let Some(app) = self.app() {
				app.emit_boot_finished(None);
			}
		}
		Ok(())
	}

	// ------------------------------------------------------------------
	// Metadata API
	// ------------------------------------------------------------------

	pub fn save_class_metadata(&self, kind: &str, key: &str, value: Value, class: &ComponentClass) {
		self.metadata.save_class_metadata(kind, key, value, class);
	}

	pub fn attach_class_metadata(&self, kind: &str, key: &str, value: Value, class: &ComponentClass) {
		self.metadata.attach_class_metadata(kind, key, value, class);
	}

	pub fn get_class_metadata(&self, kind: &str, key: &str, class: &ComponentClass) -> Option<Value> {
		self.metadata.get_class_metadata(kind, key, class)
	}

	pub fn list_class_metadata(&self, kind: &str, key: &str, class: &ComponentClass) -> Vec<Value> {
		self.metadata.list_class_metadata(kind, key, class)
	}

	pub fn get_metadata_map(&self, kind: &str, class: &ComponentClass) -> HashMap<String, Value> {
		self.metadata.get_metadata_map(kind, class)
	}

	pub fn save_property_data(&self, key: &str, value: Value, class: &ComponentClass, property: &str) {
		self.metadata.save_property_data(key, value, class, property);
	}

	pub fn attach_property_data(
		&self,
		key: &str,
		value: Value,
		class: &ComponentClass,
		property: &str,
	) {
		self.metadata.attach_property_data(key, value, class, property);
	}

	pub fn get_property_data(
		&self,
		key: &str,
		class: &ComponentClass,
		property: &str,
	) -> Option<Value> {
		self.metadata.get_property_data(key, class, property)
	}

	pub fn list_property_data(&self, key: &str, class: &ComponentClass) -> HashMap<String, Value> {
		self.metadata.list_property_data(key, class)
	}

	// ------------------------------------------------------------------
	// Teardown
	// ------------------------------------------------------------------

	/// Remove one `(type, identifier)` mapping. The instance, metadata
	/// and injection declarations are dropped with the last alias.
	pub fn unregister(&self, identifier: &str, component_type: ComponentType) {
		if let Some(class) = self.classes.remove(identifier, component_type) {
			if !self.classes.references(class.class_id()) {
				self.instances
					.lock()
					.unwrap_or_else(PoisonError::into_inner)
					.remove(&class.class_id());
				self.metadata.remove_class(class.class_id());
				self.injections.remove_class(class.class_id());
				tracing::debug!(class = class.name(), "unregistered");
			}
		}
	}

	/// Drop every registration, instance, metadata map and deferred
	/// entry, and release the application handle. Process teardown, and
	/// the reset point between test suites sharing the default container.
	pub fn shutdown(&self) {
		self.classes.clear();
		self.instances
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
		self.metadata.clear();
		self.injections.clear();
		self.deferred
			.lock()
			.unwrap_or_else(PoisonError::into_inner)
			.clear();
		self.booted.store(false, Ordering::SeqCst);
		*self.app.lock().unwrap_or_else(PoisonError::into_inner) = None;
	}
}

impl Default for Container {
	fn default() -> Self {
		Self::new()
	}
}
