//! # Armature Container
//!
//! Metadata-driven inversion-of-control container for application
//! runtimes. A registry turns registered classes into managed
//! singletons and prototypes, performs property-level dependency
//! injection — including deferred resolution for circular graphs — and
//! stores arbitrary registration-attached metadata per class and per
//! property.
//!
//! ## Overview
//!
//! - **[`ComponentClass`]**: a registrable class — declared name,
//!   construction factory, optional parent link for inherited injection
//!   metadata.
//! - **[`Container`]**: the orchestrator — `reg` instruments a class and
//!   produces an instance according to its [`Scope`]; `get` retrieves
//!   instances by `(identifier, type)`.
//! - **[`MetadataStore`]** (via the container's metadata API): nested
//!   per-class and per-property key/value maps written by explicit
//!   registration glue before boot.
//! - **Injection**: [`PropertyValue`] declarations resolve computed
//!   values with a runtime kind check; [`PropertyInjection`]
//!   declarations wire managed instances, optionally deferred to
//!   [`Container::finish_boot`] to break dependency cycles.
//! - **[`Application`]**: the process-wide handle components receive
//!   through their [`FactoryContext`], owner of the boot-finished
//!   signal.
//!
//! ## Two-phase boot
//!
//! Phase 1: glue code declares metadata and injection properties, the
//! loader calls [`Container::reg`] per discovered class in whatever
//! order it finds them — forward references are fine as long as they
//! are declared delayed. Phase 2: [`Container::finish_boot`] resolves
//! the deferred work-list, reports every dangling reference in a single
//! error, and fires the boot-finished signal.
//!
//! ## Quick start
//!
//! ```
//! use armature_container::{
//! 	Component, ComponentClass, ComponentType, Container, DefinitionOptions, with_component,
//! };
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Clock {
//! 	ticks: u64,
//! }
//!
//! impl Component for Clock {
//! 	fn as_any(&self) -> &dyn Any {
//! 		self
//! 	}
//! }
//!
//! let container = Container::new();
//! let class = Arc::new(ComponentClass::new("Clock", |_ctx| {
//! 	Ok(Box::new(Clock::default()))
//! }));
//!
//! container
//! 	.reg(&class, DefinitionOptions::default())
//! 	.unwrap();
//!
//! let clock = container
//! 	.get("Clock", ComponentType::Component, &[])
//! 	.unwrap()
//! 	.expect("registered");
//! assert_eq!(with_component::<Clock, _>(&clock, |c| c.ticks), Some(0));
//! ```

pub mod app;
pub mod component;
pub mod container;
pub mod error;
pub mod identifier;
pub mod injection;
pub mod metadata;
pub mod registry;

pub use app::Application;
pub use component::{
	Component, ComponentFactory, ComponentType, DefinitionOptions, FactoryContext, Injected,
	InstanceRef, Scope, with_component,
};
pub use container::{Container, global};
pub use error::{ContainerError, ContainerResult, UnresolvedDependency};
pub use identifier::{identifier_of, infer_type, type_of};
pub use injection::{PropertyInjection, PropertyValue, ValueKind, ValueResolver};
pub use metadata::MetadataStore;
pub use registry::{ClassRegistry, ClassTag, ComponentClass, composite_key};
