//! Container failure taxonomy
//!
//! Every variant is a registration-time configuration failure: the
//! container never catches or downgrades them, they surface to whatever
//! orchestrates bootstrap so the process fails fast before accepting
//! traffic. The one exception is [`ContainerError::UnresolvedDependencies`],
//! which surfaces from [`finish_boot`](crate::Container::finish_boot)
//! rather than from the `reg` call that queued the deferred entries.

use std::fmt;
use thiserror::Error;

/// Errors raised by the container during registration and boot.
#[derive(Debug, Error)]
pub enum ContainerError {
	/// An autowired property was declared without a usable identifier.
	#[error("autowired property '{property}' on '{class}' has no identifier")]
	MissingIdentifier { class: String, property: String },

	/// A non-delayed (or retried) autowired lookup returned nothing.
	#[error("dependency '{identifier}' not found while injecting '{class}'")]
	DependencyNotFound { identifier: String, class: String },

	/// A values-injected property resolved to the wrong runtime type.
	#[error(
		"value for property '{property}' on '{class}' expected {expected}, got {actual}"
	)]
	ValueTypeMismatch {
		class: String,
		property: String,
		expected: String,
		actual: String,
	},

	/// Controllers are request-scoped by the router and must not receive
	/// injected dependencies.
	#[error("'{class}' resolves to a controller and cannot be an autowire target")]
	UnsupportedInjectionTarget { class: String },

	/// Aggregated report of every deferred injection still unresolved
	/// when boot finished.
	#[error("unresolved dependencies after boot: {}", format_unresolved(.0))]
	UnresolvedDependencies(Vec<UnresolvedDependency>),

	/// The application handle may only be set once, before registration.
	#[error("application handle already set")]
	AppAlreadySet,

	/// A component factory failed to construct its instance.
	#[error("factory for '{class}' failed: {message}")]
	Factory { class: String, message: String },

	/// The assign seam rejected a property it does not declare.
	#[error("'{class}' has no injectable property '{property}'")]
	UnknownProperty { class: String, property: String },
}

pub type ContainerResult<T> = Result<T, ContainerError>;

/// One deferred injection that could not be resolved at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
	/// Identifier that was looked up and not found.
	pub identifier: String,
	/// Class whose property was waiting on the dependency.
	pub class: String,
	/// Property that stays unset.
	pub property: String,
}

impl fmt::Display for UnresolvedDependency {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"'{}' for {}.{}",
			self.identifier, self.class, self.property
		)
	}
}

fn format_unresolved(entries: &[UnresolvedDependency]) -> String {
	entries
		.iter()
		.map(UnresolvedDependency::to_string)
		.collect::<Vec<_>>()
		.join(", ")
}
