//! In-memory [`DocumentStore`] and [`CallbackSender`] used by unit tests.

use std::collections::{BTreeMap, HashMap};
use std::future::{Future, ready};
use std::sync::Mutex;

use metacat_domain::error::MetacatError;
use metacat_domain::notification::ChangeNotice;
use serde_json::Value;

use crate::ports::{CallbackSender, Collection, DocumentStore, Filter, RawDocument, StoreError};

#[derive(Default)]
pub struct InMemoryStore {
    collections: Mutex<HashMap<Collection, BTreeMap<String, RawDocument>>>,
}

impl InMemoryStore {
    fn with<T>(&self, collection: Collection, f: impl FnOnce(&mut BTreeMap<String, RawDocument>) -> T) -> T {
        let mut collections = self.collections.lock().unwrap();
        f(collections.entry(collection).or_default())
    }

    fn sorted(&self, collection: Collection, filter: Option<&Filter>, limit: usize) -> Vec<Value> {
        self.with(collection, |docs| {
            let mut matching: Vec<&RawDocument> = docs
                .values()
                .filter(|doc| filter.is_none_or(|f| f.matches(&doc.body)))
                .collect();
            matching.sort_by(|a, b| a.name.cmp(&b.name));
            matching
                .into_iter()
                .take(limit)
                .map(|doc| doc.body.clone())
                .collect()
        })
    }
}

fn name_taken(
    docs: &BTreeMap<String, RawDocument>,
    collection: Collection,
    document: &RawDocument,
) -> Result<(), StoreError> {
    if docs
        .values()
        .any(|doc| doc.name == document.name && doc.id != document.id)
    {
        return Err(StoreError::DuplicateName {
            collection,
            name: document.name.clone(),
        });
    }
    Ok(())
}

impl DocumentStore for InMemoryStore {
    fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send {
        let body = self.with(collection, |docs| docs.get(id).map(|doc| doc.body.clone()));
        ready(Ok(body))
    }

    fn get_by_name(
        &self,
        collection: Collection,
        name: &str,
    ) -> impl Future<Output = Result<Option<Value>, StoreError>> + Send {
        let body = self.with(collection, |docs| {
            docs.values()
                .find(|doc| doc.name == name)
                .map(|doc| doc.body.clone())
        });
        ready(Ok(body))
    }

    fn list(
        &self,
        collection: Collection,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send {
        ready(Ok(self.sorted(collection, None, limit)))
    }

    fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Value>, StoreError>> + Send {
        ready(Ok(self.sorted(collection, Some(filter), limit)))
    }

    fn exists(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        let found = self.with(collection, |docs| {
            docs.values().any(|doc| filter.matches(&doc.body))
        });
        ready(Ok(found))
    }

    fn insert(
        &self,
        collection: Collection,
        document: RawDocument,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        let result = self.with(collection, |docs| {
            name_taken(docs, collection, &document)?;
            docs.insert(document.id.clone(), document);
            Ok(())
        });
        ready(result)
    }

    fn replace(
        &self,
        collection: Collection,
        document: RawDocument,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        let result = self.with(collection, |docs| {
            if !docs.contains_key(&document.id) {
                return Ok(false);
            }
            name_taken(docs, collection, &document)?;
            docs.insert(document.id.clone(), document);
            Ok(true)
        });
        ready(result)
    }

    fn delete(
        &self,
        collection: Collection,
        id: &str,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send {
        let removed = self.with(collection, |docs| docs.remove(id).is_some());
        ready(Ok(removed))
    }
}

/// Records every delivered notice; fails deliveries when `failing` is set.
#[derive(Default)]
pub struct RecordingSender {
    pub delivered: Mutex<Vec<ChangeNotice>>,
    pub failing: bool,
}

impl CallbackSender for RecordingSender {
    fn deliver(
        &self,
        notice: &ChangeNotice,
    ) -> impl Future<Output = Result<(), MetacatError>> + Send {
        self.delivered.lock().unwrap().push(notice.clone());
        let result = if self.failing {
            Err(MetacatError::service(std::io::Error::other("unreachable")))
        } else {
            Ok(())
        };
        ready(result)
    }
}

/// Ready-made catalog content for tests.
pub mod fixtures {
    use metacat_domain::addressable::Addressable;
    use metacat_domain::command::Command;
    use metacat_domain::device::DeviceRecord;
    use metacat_domain::device_profile::DeviceProfile;
    use metacat_domain::device_service::DeviceServiceRecord;
    use metacat_domain::reference::Reference;
    use metacat_domain::state::{AdminState, OperatingState};

    pub fn addressable(name: &str) -> Addressable {
        Addressable::builder()
            .name(name)
            .address("localhost")
            .port(49990)
            .path("/api/v1/callback")
            .build()
            .unwrap()
    }

    pub fn service(name: &str, addressable: &str) -> DeviceServiceRecord {
        DeviceServiceRecord {
            name: name.to_string(),
            addressable: Reference::by_name(addressable),
            operating_state: Some(OperatingState::Enabled),
            admin_state: Some(AdminState::Unlocked),
            ..DeviceServiceRecord::default()
        }
    }

    pub fn profile(name: &str, commands: &[&str]) -> DeviceProfile {
        let builder = DeviceProfile::builder()
            .name(name)
            .manufacturer("Acme")
            .model("T-1000")
            .label("thermostat");
        commands
            .iter()
            .fold(builder, |builder, command| builder.command(Command::named(*command)))
            .build()
            .unwrap()
    }

    pub fn device(name: &str, addressable: &str, service: &str, profile: &str) -> DeviceRecord {
        DeviceRecord {
            name: name.to_string(),
            addressable: Reference::by_name(addressable),
            service: Reference::by_name(service),
            profile: Reference::by_name(profile),
            operating_state: Some(OperatingState::Enabled),
            admin_state: Some(AdminState::Unlocked),
            ..DeviceRecord::default()
        }
    }
}
