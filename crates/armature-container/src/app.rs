//! Application handle
//!
//! The one external collaborator the container touches: a process-wide
//! handle set once before registration begins, passed explicitly to
//! component factories, and owning the boot-finished signal that fires
//! when deferred dependency resolution has completed.

use armature_signals::{ReceiverFn, Signal, SignalPayload};
use std::sync::Arc;

/// The running application, as seen by the container and by managed
/// components.
pub struct Application {
	name: String,
	env: String,
	boot_finished: Signal,
}

impl Application {
	/// Create an application handle with the default (`"production"`)
	/// environment.
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			env: "production".to_string(),
			boot_finished: Signal::new(),
		}
	}

	/// Set the environment label.
	pub fn with_env(mut self, env: impl Into<String>) -> Self {
		self.env = env.into();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn env(&self) -> &str {
		&self.env
	}

	/// The boot-finished signal. External subsystems subscribe here to
	/// learn when every registered class is observable.
	pub fn boot_finished(&self) -> &Signal {
		&self.boot_finished
	}

	/// Subscribe a one-shot receiver to boot completion.
	pub fn once_boot_finished(&self, receiver: ReceiverFn) {
		self.boot_finished.connect_once(receiver, None);
	}

	pub(crate) fn emit_boot_finished(&self, payload: SignalPayload) {
		let delivered = self.boot_finished.send(payload);
		tracing::debug!(
			app = %self.name,
			signal = armature_signals::BOOT_FINISHED,
			receivers = delivered,
			"boot finished"
		);
	}
}

impl std::fmt::Debug for Application {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Application")
			.field("name", &self.name)
			.field("env", &self.env)
			.finish_non_exhaustive()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	#[rstest]
	fn test_once_boot_finished_fires_once() {
		let app = Application::new("testapp");
		let hits = Arc::new(AtomicUsize::new(0));

		let counter = hits.clone();
		app.once_boot_finished(Arc::new(move |_payload| {
			counter.fetch_add(1, Ordering::SeqCst);
		}));

		app.emit_boot_finished(None);
		app.emit_boot_finished(None);

		assert_eq!(hits.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_env_defaults_to_production() {
		let app = Application::new("testapp");
		assert_eq!(app.env(), "production");

		let dev = Application::new("testapp").with_env("development");
		assert_eq!(dev.env(), "development");
	}
}
