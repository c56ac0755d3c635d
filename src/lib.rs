//! # Armature
//!
//! A metadata-driven IoC container for application runtimes.
//!
//! Armature manages a single-process, in-memory object graph: registered
//! classes become managed singletons or prototypes, declared properties
//! are injected — with deferred resolution for circular graphs — and
//! arbitrary registration-attached metadata is stored per class and per
//! property for higher layers (routing, scheduling, caching, validation)
//! to consume.
//!
//! This crate is a facade over the workspace members:
//!
//! - [`armature_container`] — the container core: class registry,
//!   instance arena, metadata store, injection resolver, two-phase boot.
//! - [`armature_signals`] — synchronous lifecycle signals, including the
//!   boot-finished notification.
//!
//! ## Example
//!
//! ```
//! use armature::{
//! 	Component, ComponentClass, ComponentType, Container, DefinitionOptions,
//! 	PropertyInjection, with_component,
//! };
//! use std::any::Any;
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Repository;
//!
//! impl Component for Repository {
//! 	fn as_any(&self) -> &dyn Any {
//! 		self
//! 	}
//! }
//!
//! #[derive(Default)]
//! struct UserService {
//! 	repository: Option<armature::InstanceRef>,
//! }
//!
//! impl Component for UserService {
//! 	fn as_any(&self) -> &dyn Any {
//! 		self
//! 	}
//!
//! 	fn assign(
//! 		&mut self,
//! 		property: &str,
//! 		value: armature::Injected,
//! 	) -> armature::ContainerResult<()> {
//! 		match (property, value) {
//! 			("repository", armature::Injected::Instance(instance)) => {
//! 				self.repository = Some(instance);
//! 				Ok(())
//! 			}
//! 			_ => Err(armature::ContainerError::UnknownProperty {
//! 				class: "UserService".to_string(),
//! 				property: property.to_string(),
//! 			}),
//! 		}
//! 	}
//! }
//!
//! let container = Container::new();
//!
//! let repository = Arc::new(ComponentClass::new("Repository", |_ctx| {
//! 	Ok(Box::new(Repository::default()))
//! }));
//! let service = Arc::new(ComponentClass::new("UserService", |_ctx| {
//! 	Ok(Box::new(UserService::default()))
//! }));
//!
//! container
//! 	.autowired(
//! 		&service,
//! 		"repository",
//! 		PropertyInjection::new("Repository", ComponentType::Component),
//! 	)
//! 	.unwrap();
//!
//! container.reg(&repository, DefinitionOptions::default()).unwrap();
//! container.reg(&service, DefinitionOptions::default()).unwrap();
//! container.finish_boot().unwrap();
//!
//! let service = container
//! 	.get("UserService", ComponentType::Component, &[])
//! 	.unwrap()
//! 	.expect("registered");
//! assert!(with_component::<UserService, _>(&service, |s| s.repository.is_some()).unwrap());
//! ```

pub use armature_container::*;
pub use armature_signals as signals;
