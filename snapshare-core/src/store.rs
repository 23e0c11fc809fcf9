//! Event persistence over a key-value backend.
//!
//! Each event is one JSON document under `event_<id>`. Every mutation is
//! written through immediately; there is no buffering and no transaction
//! spanning several keys. Concurrent writers to the same key are not
//! coordinated: the last write wins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::constants::EVENT_KEY_PREFIX;
use crate::error::{SnapError, SnapResult};
use crate::event::{Event, EventPatch, NewEvent, Photo, validate_name};
use crate::id::{IdGenerator, RandomIds};
use crate::links::LinkBuilder;
use crate::storage::KeyValueStorage;

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub fn event_key(id: &str) -> String {
    format!("{EVENT_KEY_PREFIX}{id}")
}

#[derive(Clone)]
pub struct EventStore {
    storage: Arc<dyn KeyValueStorage>,
    ids: Arc<dyn IdGenerator>,
    links: LinkBuilder,
    clock: Clock,
}

impl EventStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        EventStore {
            storage: Arc::new(storage),
            ids: Arc::new(RandomIds),
            links: LinkBuilder::default(),
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn with_links(mut self, links: LinkBuilder) -> Self {
        self.links = links;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> DateTime<Utc> + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn new_id(&self) -> String {
        self.ids.generate()
    }

    /// Validate, assign an id and creation time, and persist a new event.
    pub fn create(&self, new_event: NewEvent) -> SnapResult<Event> {
        validate_name(&new_event.name)?;

        let id = self.new_id();
        let event = Event {
            upload_link: self.links.upload_link(&id),
            gallery_link: self.links.gallery_link(&id),
            id,
            name: new_event.name,
            date: new_event.date,
            description: new_event.description.filter(|d| !d.trim().is_empty()),
            max_duration: new_event.max_duration,
            created_at: self.now(),
            photos: Vec::new(),
            extra: serde_json::Map::new(),
        };

        self.write(&event)?;
        debug!(event_id = %event.id, name = %event.name, "created event");
        Ok(event)
    }

    /// Load an event. Missing and unparseable records both read as `None`;
    /// only a failing backend is an error.
    pub fn read(&self, id: &str) -> SnapResult<Option<Event>> {
        let key = event_key(id);
        let Some(raw) = self.storage.get(&key)? else {
            return Ok(None);
        };

        match parse_event(&key, &raw) {
            Ok(event) => Ok(Some(event)),
            Err(err) => {
                warn!(%err, "treating unreadable event record as missing");
                Ok(None)
            }
        }
    }

    /// Like [`EventStore::read`], with absence reported as `NotFound`.
    pub fn get(&self, id: &str) -> SnapResult<Event> {
        self.read(id)?
            .ok_or_else(|| SnapError::NotFound(id.to_string()))
    }

    /// Merge `patch` into the stored event and write it back.
    pub fn update(&self, id: &str, patch: EventPatch) -> SnapResult<Event> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }

        let mut event = self.get(id)?;
        patch.apply(&mut event);
        self.write(&event)?;
        debug!(event_id = %id, "updated event");
        Ok(event)
    }

    /// Append one photo and persist immediately.
    pub fn append_photo(&self, id: &str, photo: Photo) -> SnapResult<Event> {
        let mut event = self.get(id)?;
        event.photos.push(photo);
        self.write(&event)?;
        debug!(event_id = %id, photos = event.photos.len(), "appended photo");
        Ok(event)
    }

    /// Remove an event. Deleting an absent event succeeds.
    pub fn delete(&self, id: &str) -> SnapResult<()> {
        self.storage.remove(&event_key(id))?;
        debug!(event_id = %id, "deleted event");
        Ok(())
    }

    /// Every readable event, oldest first. Unreadable records are skipped.
    pub fn list_all(&self) -> SnapResult<Vec<Event>> {
        let mut events = Vec::new();

        for key in self.storage.keys()? {
            if !key.starts_with(EVENT_KEY_PREFIX) {
                continue;
            }
            let Some(raw) = self.storage.get(&key)? else {
                continue;
            };
            match parse_event(&key, &raw) {
                Ok(event) => events.push(event),
                Err(err) => warn!(%err, "skipping unreadable event record"),
            }
        }

        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(events)
    }

    fn write(&self, event: &Event) -> SnapResult<()> {
        let json =
            serde_json::to_string(event).map_err(|e| SnapError::Serialization(e.to_string()))?;
        self.storage.set(&event_key(&event.id), &json)
    }
}

fn parse_event(key: &str, raw: &str) -> SnapResult<Event> {
    serde_json::from_str(raw).map_err(|e| SnapError::Malformed {
        key: key.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::RetentionDays;
    use crate::id::SequentialIds;
    use crate::storage::MemoryStorage;
    use chrono::{NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts backend reads.
    struct CountingReads {
        inner: MemoryStorage,
        reads: Arc<AtomicUsize>,
    }

    impl KeyValueStorage for CountingReads {
        fn get(&self, key: &str) -> SnapResult<Option<String>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> SnapResult<()> {
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> SnapResult<()> {
            self.inner.remove(key)
        }

        fn keys(&self) -> SnapResult<Vec<String>> {
            self.inner.keys()
        }
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn store_with(storage: MemoryStorage) -> EventStore {
        EventStore::new(storage)
            .with_ids(SequentialIds::new("evt"))
            .with_links(LinkBuilder::new("https://share.test"))
            .with_clock(fixed_now)
    }

    fn store() -> EventStore {
        store_with(MemoryStorage::new())
    }

    fn photo(id: &str) -> Photo {
        Photo {
            id: id.to_string(),
            name: format!("{id}.jpg"),
            uploaded_at: fixed_now(),
            url: format!("blob:test/{id}"),
            size: Some(1024),
            mime_type: Some("image/jpeg".into()),
        }
    }

    #[test]
    fn create_then_read_returns_same_record() {
        let store = store();
        let created = store
            .create(
                NewEvent::new("Wedding 2025")
                    .with_date(NaiveDate::from_ymd_opt(2025, 6, 14).unwrap())
                    .with_description("Barn dance")
                    .with_max_duration(RetentionDays::Seven),
            )
            .unwrap();

        assert_eq!(created.id, "evt1");
        assert_eq!(created.created_at, fixed_now());
        assert_eq!(created.upload_link, "https://share.test/upload/evt1");
        assert_eq!(created.gallery_link, "https://share.test/gallery/evt1");
        assert!(created.photos.is_empty());

        assert_eq!(store.read("evt1").unwrap(), Some(created));
    }

    #[test]
    fn blank_name_writes_nothing() {
        let store = store();
        let err = store.create(NewEvent::new("   ")).unwrap_err();

        assert!(matches!(err, SnapError::InvalidInput(_)));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn read_missing_is_none() {
        let store = store();
        assert_eq!(store.read("nope").unwrap(), None);
        assert!(store.get("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn malformed_record_reads_as_missing() {
        let storage = MemoryStorage::new();
        storage.set("event_bad", "{not json").unwrap();
        let store = store_with(storage);

        assert_eq!(store.read("bad").unwrap(), None);
        assert!(matches!(store.update("bad", EventPatch::default()), Err(SnapError::NotFound(_))));
    }

    #[test]
    fn update_merges_shallowly() {
        let store = store();
        let event = store.create(NewEvent::new("Party")).unwrap();

        let updated = store
            .update(
                &event.id,
                EventPatch {
                    name: Some("Garden Party".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.name, "Garden Party");
        assert_eq!(updated.created_at, event.created_at);
        assert_eq!(updated.max_duration, event.max_duration);
        assert_eq!(store.get(&event.id).unwrap(), updated);
    }

    #[test]
    fn update_rejects_blank_name() {
        let store = store();
        let event = store.create(NewEvent::new("Party")).unwrap();
        let patch = EventPatch {
            name: Some(String::new()),
            ..Default::default()
        };

        assert!(matches!(store.update(&event.id, patch), Err(SnapError::InvalidInput(_))));
        assert_eq!(store.get(&event.id).unwrap().name, "Party");
    }

    #[test]
    fn update_missing_is_not_found() {
        let store = store();
        assert!(matches!(
            store.update("ghost", EventPatch::default()),
            Err(SnapError::NotFound(id)) if id == "ghost"
        ));
    }

    #[test]
    fn update_keeps_unknown_fields() {
        let storage = MemoryStorage::new();
        storage
            .set(
                "event_old",
                r#"{"id":"old","name":"Old","date":"","description":"","maxDuration":3,
                    "uploadLink":"u","createdAt":"2025-01-01T00:00:00Z","photos":[],
                    "theme":"dark"}"#,
            )
            .unwrap();
        let store = store_with(storage);

        store.append_photo("old", photo("p1")).unwrap();

        let event = store.get("old").unwrap();
        assert_eq!(event.photos.len(), 1);
        assert_eq!(event.extra.get("theme"), Some(&serde_json::json!("dark")));
    }

    #[test]
    fn append_photo_preserves_order() {
        let store = store();
        let event = store.create(NewEvent::new("Party")).unwrap();

        store.append_photo(&event.id, photo("a")).unwrap();
        store.append_photo(&event.id, photo("b")).unwrap();
        let event = store.append_photo(&event.id, photo("c")).unwrap();

        let ids: Vec<_> = event.photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn append_photo_reads_once() {
        let reads = Arc::new(AtomicUsize::new(0));
        let store = EventStore::new(CountingReads {
            inner: MemoryStorage::new(),
            reads: reads.clone(),
        })
        .with_ids(SequentialIds::new("evt"));
        let event = store.create(NewEvent::new("Party")).unwrap();
        reads.store(0, Ordering::SeqCst);

        store.append_photo(&event.id, photo("a")).unwrap();

        assert_eq!(reads.load(Ordering::SeqCst), 1);
        assert_eq!(store.get(&event.id).unwrap().photos.len(), 1);
    }

    #[test]
    fn append_photo_to_missing_event_is_not_found() {
        let store = store();
        assert!(matches!(
            store.append_photo("ghost", photo("a")),
            Err(SnapError::NotFound(id)) if id == "ghost"
        ));
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let store = store();
        let event = store.create(NewEvent::new("Party")).unwrap();

        store.delete(&event.id).unwrap();
        assert_eq!(store.read(&event.id).unwrap(), None);
        store.delete(&event.id).unwrap();
        assert_eq!(store.read(&event.id).unwrap(), None);
    }

    #[test]
    fn list_all_skips_bad_and_foreign_keys() {
        let storage = MemoryStorage::new();
        storage.set("event_broken", "[]").unwrap();
        storage.set("theme", "dark").unwrap();
        let store = store_with(storage);

        let first = store.create(NewEvent::new("First")).unwrap();
        let second = store.create(NewEvent::new("Second")).unwrap();

        let names: Vec<_> = store
            .list_all()
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec![first.name, second.name]);
    }

    #[test]
    fn full_storage_is_reported() {
        let store = store_with(MemoryStorage::with_quota(64));
        let err = store.create(NewEvent::new("Party")).unwrap_err();
        assert!(matches!(err, SnapError::StorageUnavailable(_)));
    }
}
