//! Durable view state: zoom transform and dragged node positions.
//!
//! Keys are `"{namespace}.zoom"` and `"{namespace}.node.{name}"`; values are
//! JSON. Reads and writes are unsynchronised, so two windows sharing a
//! namespace race and the last write wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	#[error("storage is unavailable")]
	Unavailable,
	#[error("storage backend failed: {0}")]
	Backend(String),
	#[error("could not encode stored value: {0}")]
	Encode(#[from] serde_json::Error),
}

/// String key-value storage.
pub trait ViewStore {
	fn get(&self, key: &str) -> Option<String>;
	fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
	fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store, used when `localStorage` is unavailable and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

impl ViewStore for MemoryStore {
	fn get(&self, key: &str) -> Option<String> {
		self.entries.borrow().get(key).cloned()
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.entries
			.borrow_mut()
			.insert(key.to_string(), value.to_string());
		Ok(())
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.entries.borrow_mut().remove(key);
		Ok(())
	}
}

/// `window.localStorage`.
pub struct LocalStore {
	storage: web_sys::Storage,
}

impl LocalStore {
	pub fn open() -> Result<Self, StoreError> {
		let storage = web_sys::window()
			.and_then(|window| window.local_storage().ok().flatten())
			.ok_or(StoreError::Unavailable)?;
		Ok(Self { storage })
	}
}

impl ViewStore for LocalStore {
	fn get(&self, key: &str) -> Option<String> {
		self.storage.get_item(key).ok().flatten()
	}

	fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
		self.storage
			.set_item(key, value)
			.map_err(|e| StoreError::Backend(format!("{e:?}")))
	}

	fn remove(&self, key: &str) -> Result<(), StoreError> {
		self.storage
			.remove_item(key)
			.map_err(|e| StoreError::Backend(format!("{e:?}")))
	}
}

/// `localStorage` when the browser provides it, memory otherwise.
pub fn default_store() -> Rc<dyn ViewStore> {
	match LocalStore::open() {
		Ok(store) => Rc::new(store),
		Err(e) => {
			warn!("view state will not persist: {e}");
			Rc::new(MemoryStore::default())
		}
	}
}

/// Namespace-scoped typed access to a [`ViewStore`].
#[derive(Clone)]
pub struct ScopedStore {
	store: Rc<dyn ViewStore>,
	namespace: String,
}

impl ScopedStore {
	pub fn new(store: Rc<dyn ViewStore>, namespace: impl Into<String>) -> Self {
		Self {
			store,
			namespace: namespace.into(),
		}
	}

	pub fn zoom_key(&self) -> String {
		format!("{}.zoom", self.namespace)
	}

	pub fn node_key(&self, name: &str) -> String {
		format!("{}.node.{name}", self.namespace)
	}

	/// Missing or undecodable entries read as `None`.
	pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
		let raw = self.store.get(key)?;
		match serde_json::from_str(&raw) {
			Ok(value) => Some(value),
			Err(e) => {
				warn!("ignoring stored value under {key}: {e}");
				None
			}
		}
	}

	/// Failures are logged; persistence is never fatal to the view.
	pub fn save<T: Serialize>(&self, key: &str, value: &T) {
		let result = serde_json::to_string(value)
			.map_err(StoreError::from)
			.and_then(|raw| self.store.set(key, &raw));
		if let Err(e) = result {
			warn!("could not persist {key}: {e}");
		}
	}

	pub fn remove(&self, key: &str) {
		if let Err(e) = self.store.remove(key) {
			warn!("could not clear {key}: {e}");
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::dag::types::{Point, Transform};

	#[test]
	fn keys_are_namespaced() {
		let scoped = ScopedStore::new(Rc::new(MemoryStore::default()), "journeys");
		assert_eq!(scoped.zoom_key(), "journeys.zoom");
		assert_eq!(scoped.node_key("ingest"), "journeys.node.ingest");
	}

	#[test]
	fn values_round_trip_as_json() {
		let memory = Rc::new(MemoryStore::default());
		let scoped = ScopedStore::new(memory.clone(), "ns");
		let t = Transform {
			x: 12.5,
			y: -4.0,
			k: 1.25,
		};
		scoped.save(&scoped.zoom_key(), &t);
		assert_eq!(scoped.load::<Transform>("ns.zoom"), Some(t));
		assert!(memory.get("ns.zoom").unwrap().contains("\"k\":1.25"));
	}

	#[test]
	fn garbage_reads_as_missing() {
		let memory = Rc::new(MemoryStore::default());
		memory.set("ns.node.a", "not json").unwrap();
		let scoped = ScopedStore::new(memory, "ns");
		assert_eq!(scoped.load::<Point>("ns.node.a"), None);
	}

	#[test]
	fn remove_forgets_entry() {
		let memory = Rc::new(MemoryStore::default());
		let scoped = ScopedStore::new(memory.clone(), "ns");
		scoped.save("ns.node.a", &Point::new(1.0, 2.0));
		scoped.remove("ns.node.a");
		assert!(memory.is_empty());
	}
}
