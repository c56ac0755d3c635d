//! # Armature Signals
//!
//! Synchronous lifecycle signal dispatcher for the Armature runtime.
//!
//! A [`Signal`] fans a payload out to its connected receivers, in
//! connection order, on the caller's thread. Receivers are held weakly so
//! that dropping the last strong reference to a receiver disconnects it;
//! one-shot receivers disconnect themselves after their first delivery.
//!
//! The container fires the [boot-finished](`BOOT_FINISHED`) signal once
//! deferred dependency resolution has completed, which is the point at
//! which every registered class is observable through the container.

pub mod dispatch;

pub use dispatch::{ReceiverFn, Signal, SignalPayload};

/// Well-known signal name: all classes registered and deferred
/// injection resolved.
pub const BOOT_FINISHED: &str = "boot_finished";
