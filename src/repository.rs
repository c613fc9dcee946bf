//! Generic CRUD over one collection stored as a single JSON array.
//!
//! Every mutation reads the whole array, changes it in memory and writes the whole
//! array back. Records carry a generated `id` so callers can address them stably;
//! the position-based operations remain for callers that think in list rows.

use std::marker::PhantomData;
use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::model::Collection;
use crate::{Error, KeyValueStore, Result};

/// An entity together with its stable id.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub id: Uuid,
    #[serde(flatten)]
    pub data: T,
}

#[derive(Deserialize)]
struct StoredRecord<T> {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(flatten)]
    data: T,
}

/// A detached copy of a collection.
///
/// Edits stay local until the draft is handed to [`EntityRepository::commit`],
/// which overwrites whatever the collection holds at that moment.
#[derive(Debug, Clone)]
pub struct Draft<T> {
    label: &'static str,
    records: Vec<Record<T>>,
}

impl<T: Clone> Draft<T> {
    fn new(label: &'static str, records: Vec<Record<T>>) -> Self {
        Self { label, records }
    }

    fn out_of_range(&self, position: usize) -> Error {
        Error::PositionNotFound {
            collection: self.label,
            position,
            len: self.records.len(),
        }
    }

    pub fn records(&self) -> &[Record<T>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn push(&mut self, data: T) -> Uuid {
        let id = Uuid::new_v4();
        self.records.push(Record { id, data });
        id
    }

    /// Replaces the entity at `position`, keeping its id.
    pub fn replace_at(&mut self, position: usize, data: T) -> Result<Uuid> {
        let err = self.out_of_range(position);
        let record = self.records.get_mut(position).ok_or(err)?;
        record.data = data;
        Ok(record.id)
    }

    pub fn remove_at(&mut self, position: usize) -> Result<Record<T>> {
        if position >= self.records.len() {
            return Err(self.out_of_range(position));
        }
        Ok(self.records.remove(position))
    }

    pub fn position_of(&self, id: Uuid) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or(Error::RecordNotFound {
                collection: self.label,
                id,
            })
    }
}

/// CRUD and list operations over the collection of `T`.
///
/// Operations through one repository value are serialized by a per-collection
/// mutex. Share the repository (e.g. behind an `Arc`) rather than building a
/// second one for the same collection, or the two will overwrite each other.
pub struct EntityRepository<T: Collection> {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Collection> EntityRepository<T> {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
            _marker: PhantomData,
        }
    }

    /// Reads the collection. A missing key is an empty collection; anything that
    /// is not an array of `T` is an [`Error::Parse`]. The flag reports whether
    /// ids had to be generated for legacy records.
    async fn read(&self) -> Result<(Vec<Record<T>>, bool)> {
        let raw = match self.store.get(T::KEY).await? {
            Some(raw) => raw,
            None => return Ok((Vec::new(), false)),
        };
        let stored: Vec<StoredRecord<T>> =
            serde_json::from_str(&raw).map_err(|source| Error::Parse {
                collection: T::LABEL,
                source,
            })?;

        let mut backfilled = false;
        let records: Vec<Record<T>> = stored
            .into_iter()
            .map(|s| Record {
                id: s.id.unwrap_or_else(|| {
                    backfilled = true;
                    Uuid::new_v4()
                }),
                data: s.data,
            })
            .collect();
        Ok((records, backfilled))
    }

    async fn write(&self, records: &[Record<T>]) -> Result<()> {
        let raw = serde_json::to_string(records)?;
        self.store.set(T::KEY, raw).await
    }

    async fn snapshot(&self) -> Result<Vec<Record<T>>> {
        let _guard = self.lock.lock().await;
        let (records, backfilled) = self.read().await?;
        if backfilled {
            info!("Assigning ids to legacy records in {}", T::LABEL);
            self.write(&records).await?;
        }
        Ok(records)
    }

    async fn mutate<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut Draft<T>) -> Result<R> + Send,
    {
        let _guard = self.lock.lock().await;
        let (records, _) = self.read().await?;
        let mut draft = Draft::new(T::LABEL, records);
        let out = f(&mut draft)?;
        self.write(&draft.records).await?;
        Ok(out)
    }

    /// All entities in display order.
    pub async fn list(&self) -> Result<Vec<T>> {
        Ok(self.snapshot().await?.into_iter().map(|r| r.data).collect())
    }

    /// All entities with their ids, in display order.
    pub async fn records(&self) -> Result<Vec<Record<T>>> {
        self.snapshot().await
    }

    pub async fn len(&self) -> Result<usize> {
        Ok(self.snapshot().await?.len())
    }

    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    pub async fn record_at(&self, position: usize) -> Result<Record<T>> {
        let mut records = self.snapshot().await?;
        let len = records.len();
        if position >= len {
            return Err(Error::PositionNotFound {
                collection: T::LABEL,
                position,
                len,
            });
        }
        Ok(records.swap_remove(position))
    }

    pub async fn get_at(&self, position: usize) -> Result<T> {
        Ok(self.record_at(position).await?.data)
    }

    /// Translates a screen row into the stable id of the record shown there.
    pub async fn id_at(&self, position: usize) -> Result<Uuid> {
        Ok(self.record_at(position).await?.id)
    }

    /// Translates a stable id into the record's current row.
    pub async fn position_of(&self, id: Uuid) -> Result<usize> {
        let records = self.snapshot().await?;
        Draft::new(T::LABEL, records).position_of(id)
    }

    pub async fn get(&self, id: Uuid) -> Result<T> {
        self.snapshot()
            .await?
            .into_iter()
            .find(|r| r.id == id)
            .map(|r| r.data)
            .ok_or(Error::RecordNotFound {
                collection: T::LABEL,
                id,
            })
    }

    /// Appends `entity` when `position` is `None`, otherwise replaces the entity
    /// at `position`. Returns the id of the written record.
    pub async fn save(&self, entity: T, position: Option<usize>) -> Result<Uuid> {
        self.save_with(position, |_| entity).await
    }

    /// Like [`save`](Self::save), but the entity is built from the collection as
    /// read inside the same read-modify-write, so fields derived from other
    /// records cannot go stale between the read and the write.
    pub async fn save_with<F>(&self, position: Option<usize>, build: F) -> Result<Uuid>
    where
        F: FnOnce(&Draft<T>) -> T + Send,
    {
        let id = self
            .mutate(|draft| {
                let entity = build(&*draft);
                match position {
                    None => Ok(draft.push(entity)),
                    Some(p) => draft.replace_at(p, entity),
                }
            })
            .await?;
        debug!("Saved {} record {} (position {:?})", T::LABEL, id, position);
        Ok(id)
    }

    pub async fn insert(&self, entity: T) -> Result<Uuid> {
        self.save(entity, None).await
    }

    pub async fn update(&self, id: Uuid, entity: T) -> Result<()> {
        self.mutate(|draft| {
            let position = draft.position_of(id)?;
            draft.replace_at(position, entity).map(|_| ())
        })
        .await?;
        debug!("Updated {} record {}", T::LABEL, id);
        Ok(())
    }

    /// Removes the entity at `position`. Rows after it shift up by one, so any
    /// position captured before this call must be looked up again.
    pub async fn delete_at(&self, position: usize) -> Result<T> {
        let removed = self.mutate(|draft| draft.remove_at(position)).await?;
        debug!("Deleted {} record {} at position {}", T::LABEL, removed.id, position);
        Ok(removed.data)
    }

    pub async fn delete(&self, id: Uuid) -> Result<T> {
        let removed = self
            .mutate(|draft| {
                let position = draft.position_of(id)?;
                draft.remove_at(position)
            })
            .await?;
        debug!("Deleted {} record {}", T::LABEL, id);
        Ok(removed.data)
    }

    /// Takes a detached copy of the collection.
    pub async fn checkout(&self) -> Result<Draft<T>> {
        Ok(Draft::new(T::LABEL, self.snapshot().await?))
    }

    /// Writes `draft` back as the whole collection.
    ///
    /// Changes made since the draft was checked out, by anyone, are discarded:
    /// the last commit wins.
    pub async fn commit(&self, draft: Draft<T>) -> Result<()> {
        let _guard = self.lock.lock().await;
        self.write(&draft.records).await?;
        debug!("Committed {} {} records", draft.records.len(), T::LABEL);
        Ok(())
    }
}
