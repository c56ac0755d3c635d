//! Synchronous signal dispatcher
//!
//! Receivers are stored as weak references: a receiver whose owning `Arc`
//! has been dropped is swept on the next send. When the caller transfers
//! ownership of the receiver to the signal (its `Arc` has no other strong
//! count at connect time), the signal keeps a strong reference so the
//! receiver stays alive for the lifetime of the signal.

use parking_lot::RwLock;
use std::any::Any;
use std::sync::{Arc, Weak};

/// Payload handed to every receiver on send.
pub type SignalPayload = Option<Arc<dyn Any + Send + Sync>>;

/// Receiver function type.
pub type ReceiverFn = Arc<dyn Fn(SignalPayload) + Send + Sync>;

struct SignalReceiver {
	receiver: Weak<dyn Fn(SignalPayload) + Send + Sync>,
	dispatch_uid: Option<String>,
	once: bool,
	// Strong reference held only when the caller transferred ownership
	_strong_ref: Option<ReceiverFn>,
}

/// A synchronous signal.
///
/// Cloning a `Signal` yields a handle to the same receiver list.
///
/// # Examples
///
/// ```
/// use armature_signals::Signal;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let signal = Signal::new();
/// let hits = Arc::new(AtomicUsize::new(0));
///
/// let counter = hits.clone();
/// signal.connect(
/// 	Arc::new(move |_payload| {
/// 		counter.fetch_add(1, Ordering::SeqCst);
/// 	}),
/// 	None,
/// );
///
/// signal.send(None);
/// signal.send(None);
/// assert_eq!(hits.load(Ordering::SeqCst), 2);
/// ```
#[derive(Clone)]
pub struct Signal {
	receivers: Arc<RwLock<Vec<SignalReceiver>>>,
}

impl Signal {
	/// Create a new signal with no receivers.
	pub fn new() -> Self {
		Self {
			receivers: Arc::new(RwLock::new(Vec::new())),
		}
	}

	/// Connect a receiver to this signal.
	///
	/// If `dispatch_uid` is given, any previously connected receiver with
	/// the same uid is replaced, so repeated connection of the same
	/// logical receiver stays idempotent.
	pub fn connect(&self, receiver: ReceiverFn, dispatch_uid: Option<String>) {
		self.connect_inner(receiver, dispatch_uid, false);
	}

	/// Connect a receiver that is disconnected after its first delivery.
	pub fn connect_once(&self, receiver: ReceiverFn, dispatch_uid: Option<String>) {
		self.connect_inner(receiver, dispatch_uid, true);
	}

	fn connect_inner(&self, receiver: ReceiverFn, dispatch_uid: Option<String>, once: bool) {
		// Ownership transfer: keep the receiver alive iff the caller holds
		// no other strong reference at connect time.
		let should_store_strong = Arc::strong_count(&receiver) == 1;

		let receiver_arc: ReceiverFn = receiver;
		let weak_receiver = Arc::downgrade(&receiver_arc);
		let mut receivers = self.receivers.write();

		if let Some(ref uid) = dispatch_uid {
			receivers.retain(|r| r.dispatch_uid.as_ref() != Some(uid));
		}

		// Prevent duplicate registrations of the same closure
		let receiver_ptr = weak_receiver.as_ptr();
		receivers.retain(|r| !std::ptr::addr_eq(r.receiver.as_ptr(), receiver_ptr));

		receivers.push(SignalReceiver {
			receiver: weak_receiver,
			dispatch_uid,
			once,
			_strong_ref: if should_store_strong {
				Some(receiver_arc)
			} else {
				None
			},
		});
	}

	/// Disconnect a receiver by dispatch_uid, or all receivers when `None`.
	///
	/// Returns `true` if any receiver was removed.
	pub fn disconnect(&self, dispatch_uid: Option<&str>) -> bool {
		let mut receivers = self.receivers.write();
		let original_len = receivers.len();

		if let Some(uid) = dispatch_uid {
			receivers.retain(|r| r.dispatch_uid.as_deref() != Some(uid));
		} else {
			receivers.clear();
		}

		receivers.len() < original_len
	}

	/// Send the payload to every live receiver, in connection order.
	///
	/// One-shot receivers are removed after delivery. Returns the number
	/// of receivers that were invoked.
	pub fn send(&self, payload: SignalPayload) -> usize {
		self.clear_dead_receivers();

		// Snapshot under the read lock; invoke outside it so a receiver
		// may connect or disconnect others without deadlocking.
		let live: Vec<(ReceiverFn, bool, *const ())> = {
			let receivers = self.receivers.read();
			receivers
				.iter()
				.filter_map(|r| {
					r.receiver
						.upgrade()
						.map(|cb| (cb, r.once, r.receiver.as_ptr() as *const ()))
				})
				.collect()
		};

		let mut delivered = 0;
		let mut spent: Vec<*const ()> = Vec::new();
		for (receiver, once, ptr) in live {
			receiver(payload.clone());
			delivered += 1;
			if once {
				spent.push(ptr);
			}
		}

		if !spent.is_empty() {
			let mut receivers = self.receivers.write();
			receivers.retain(|r| !spent.contains(&(r.receiver.as_ptr() as *const ())));
		}

		delivered
	}

	/// Check if the signal has any live receivers.
	pub fn has_listeners(&self) -> bool {
		self.clear_dead_receivers();
		!self.receivers.read().is_empty()
	}

	/// Number of currently connected receivers, dead ones included.
	pub fn receivers_count(&self) -> usize {
		self.receivers.read().len()
	}

	/// Drop receivers whose owning `Arc` has been released.
	pub fn clear_dead_receivers(&self) {
		let mut receivers = self.receivers.write();
		receivers.retain(|r| r.receiver.strong_count() > 0);
	}
}

impl Default for Signal {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use std::sync::atomic::{AtomicUsize, Ordering};

	fn counting_receiver(hits: Arc<AtomicUsize>) -> ReceiverFn {
		Arc::new(move |_payload| {
			hits.fetch_add(1, Ordering::SeqCst);
		})
	}

	#[rstest]
	fn test_send_reaches_all_receivers() {
		let signal = Signal::new();
		let hits = Arc::new(AtomicUsize::new(0));

		signal.connect(counting_receiver(hits.clone()), None);
		signal.connect(counting_receiver(hits.clone()), None);

		let delivered = signal.send(None);
		assert_eq!(delivered, 2);
		assert_eq!(hits.load(Ordering::SeqCst), 2);
	}

	#[rstest]
	fn test_once_receiver_fires_exactly_once() {
		let signal = Signal::new();
		let hits = Arc::new(AtomicUsize::new(0));

		signal.connect_once(counting_receiver(hits.clone()), None);

		signal.send(None);
		signal.send(None);

		assert_eq!(hits.load(Ordering::SeqCst), 1);
		assert!(!signal.has_listeners());
	}

	#[rstest]
	fn test_dispatch_uid_replaces_previous_receiver() {
		let signal = Signal::new();
		let first = Arc::new(AtomicUsize::new(0));
		let second = Arc::new(AtomicUsize::new(0));

		signal.connect(counting_receiver(first.clone()), Some("boot".to_string()));
		signal.connect(counting_receiver(second.clone()), Some("boot".to_string()));

		signal.send(None);

		assert_eq!(first.load(Ordering::SeqCst), 0);
		assert_eq!(second.load(Ordering::SeqCst), 1);
	}

	#[rstest]
	fn test_disconnect_by_uid() {
		let signal = Signal::new();
		let hits = Arc::new(AtomicUsize::new(0));

		signal.connect(counting_receiver(hits.clone()), Some("boot".to_string()));
		assert!(signal.disconnect(Some("boot")));
		assert!(!signal.disconnect(Some("boot")));

		signal.send(None);
		assert_eq!(hits.load(Ordering::SeqCst), 0);
	}

	#[rstest]
	fn test_dropped_receiver_is_swept() {
		let signal = Signal::new();
		let hits = Arc::new(AtomicUsize::new(0));

		let receiver = counting_receiver(hits.clone());
		// A second strong reference exists, so the signal stores only the
		// weak side and dropping ours kills the receiver.
		signal.connect(receiver.clone(), None);
		assert_eq!(signal.receivers_count(), 1);

		drop(receiver);
		signal.send(None);

		assert_eq!(hits.load(Ordering::SeqCst), 0);
		assert_eq!(signal.receivers_count(), 0);
	}

	#[rstest]
	fn test_payload_is_delivered() {
		let signal = Signal::new();
		let seen = Arc::new(AtomicUsize::new(0));

		let sink = seen.clone();
		signal.connect(
			Arc::new(move |payload: SignalPayload| {
				if let Some(value) = payload.as_ref().and_then(|p| p.downcast_ref::<usize>()) {
					sink.store(*value, Ordering::SeqCst);
				}
			}),
			None,
		);

		signal.send(Some(Arc::new(42usize)));
		assert_eq!(seen.load(Ordering::SeqCst), 42);
	}
}
