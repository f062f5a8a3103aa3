use std::sync::{Mutex, MutexGuard};

use uuid::Uuid;

use crate::models::*;

/// A record that can live in a [`Registry`].
pub trait Record: Clone + Send {
    fn id(&self) -> Uuid;
}

/// In-memory record store keeping insertion order.
pub struct Registry<T> {
    records: Mutex<Vec<T>>,
}

impl<T: Record> Registry<T> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn insert(&self, record: T) {
        self.lock().push(record);
    }

    pub fn get(&self, id: Uuid) -> Option<T> {
        self.lock().iter().find(|r| r.id() == id).cloned()
    }

    pub fn list(&self) -> Vec<T> {
        self.lock().clone()
    }

    /// Apply `f` to the record with `id` and return the updated copy.
    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        let mut records = self.lock();
        let record = records.iter_mut().find(|r| r.id() == id)?;
        f(record);
        Some(record.clone())
    }

    pub fn remove(&self, id: Uuid) -> Option<T> {
        let mut records = self.lock();
        let index = records.iter().position(|r| r.id() == id)?;
        Some(records.remove(index))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T: Record> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

macro_rules! impl_record {
    ($($ty:ty),*) => {
        $(impl Record for $ty {
            fn id(&self) -> Uuid {
                self.id
            }
        })*
    };
}

impl_record!(Asset, FileRecord, Transaction, IotDevice, NetworkHost, ScheduleEvent);
