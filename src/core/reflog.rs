//! Reflog of a single reference, kept in sync with the repository.
//!
//! Records carry a [`RecordId`] that survives refreshes, so a consumer holding an id
//! can still find "the same" record after new entries arrived. Changes are reported to
//! subscribers registered on this instance.

use crate::core::{
    accessor::{QueryReflogParameters, RepositoryAccessor},
    error::Result,
    executor::CommandExecutor,
    parsers::ReflogEntry,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RecordId(u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReflogRecord {
    pub id: RecordId,
    #[serde(flatten)]
    pub entry: ReflogEntry,
}

/// What a refresh does with a record whose position still exists but whose data changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Keep the record and its id, overwrite the data.
    #[default]
    UpdateInPlace,
    /// Drop the record and add a new one under a fresh id.
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReflogEvent<'a> {
    Added(&'a ReflogRecord),
    /// Same id, new data. Only fired under [`IdentityPolicy::UpdateInPlace`].
    Updated(&'a ReflogRecord),
    Removed(&'a ReflogRecord),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&ReflogEvent<'_>) + Send>;

pub struct Reflog {
    reference: String,
    policy: IdentityPolicy,
    records: Vec<ReflogRecord>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_record: u64,
    next_subscription: u64,
}

impl fmt::Debug for Reflog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reflog")
            .field("reference", &self.reference)
            .field("policy", &self.policy)
            .field("records", &self.records)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Reflog {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            policy: IdentityPolicy::default(),
            records: Vec::new(),
            observers: Vec::new(),
            next_record: 0,
            next_subscription: 0,
        }
    }

    pub fn with_policy(mut self, policy: IdentityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn policy(&self) -> IdentityPolicy {
        self.policy
    }

    /// Newest first.
    pub fn records(&self) -> &[ReflogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&ReflogRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&ReflogEvent<'_>) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(subscription, _)| *subscription != id);
        self.observers.len() != before
    }

    /// Re-reads the whole reflog.
    pub fn refresh<E: CommandExecutor>(&mut self, accessor: &RepositoryAccessor<E>) -> Result<()> {
        let entries = accessor.query_reflog(&QueryReflogParameters::new(&self.reference))?;
        self.apply(entries);
        Ok(())
    }

    /// Reconciles the records with `entries` (newest first).
    pub fn apply(&mut self, entries: Vec<ReflogEntry>) {
        log::debug!(
            "Applying {} reflog entries to {} ({} records)",
            entries.len(),
            self.reference,
            self.records.len()
        );

        while self.records.len() > entries.len() {
            if let Some(record) = self.records.pop() {
                notify(&mut self.observers, &ReflogEvent::Removed(&record));
            }
        }

        let overlap = self.records.len();
        let mut entries = entries.into_iter();
        for (position, entry) in entries.by_ref().take(overlap).enumerate() {
            if self.records[position].entry == entry {
                continue;
            }
            match self.policy {
                IdentityPolicy::UpdateInPlace => {
                    self.records[position].entry = entry;
                    notify(
                        &mut self.observers,
                        &ReflogEvent::Updated(&self.records[position]),
                    );
                }
                IdentityPolicy::Replace => {
                    let record = self.new_record(entry);
                    let old = std::mem::replace(&mut self.records[position], record);
                    notify(&mut self.observers, &ReflogEvent::Removed(&old));
                    notify(
                        &mut self.observers,
                        &ReflogEvent::Added(&self.records[position]),
                    );
                }
            }
        }

        for entry in entries {
            let record = self.new_record(entry);
            self.records.push(record);
            if let Some(record) = self.records.last() {
                notify(&mut self.observers, &ReflogEvent::Added(record));
            }
        }
    }

    /// Picks up a single new entry at the top without re-reading the whole reflog.
    pub fn notify_record_added<E: CommandExecutor>(
        &mut self,
        accessor: &RepositoryAccessor<E>,
    ) -> Result<()> {
        let newest = accessor
            .query_reflog(&QueryReflogParameters::new(&self.reference).with_max_count(1))?;
        if let Some(entry) = newest.into_iter().next() {
            self.insert_newest(entry);
        }
        Ok(())
    }

    /// Inserts `entry` at the front and shifts every other record down by one.
    /// Does nothing if the newest record already points at the same revision.
    pub fn insert_newest(&mut self, entry: ReflogEntry) {
        if self
            .records
            .first()
            .is_some_and(|record| record.entry.revision == entry.revision)
        {
            return;
        }

        let record = self.new_record(entry);
        self.records.insert(0, record);
        for (index, record) in self.records.iter_mut().enumerate() {
            reindex(&mut record.entry, index);
        }
        notify(&mut self.observers, &ReflogEvent::Added(&self.records[0]));
    }

    fn new_record(&mut self, entry: ReflogEntry) -> ReflogRecord {
        let id = RecordId(self.next_record);
        self.next_record += 1;
        ReflogRecord { id, entry }
    }
}

fn notify(observers: &mut [(SubscriptionId, Observer)], event: &ReflogEvent<'_>) {
    for (_, observer) in observers.iter_mut() {
        observer(event);
    }
}

fn reindex(entry: &mut ReflogEntry, index: usize) {
    entry.index = index;
    let name = match entry.selector.rfind("@{") {
        Some(at) => &entry.selector[..at],
        None => entry.selector.as_str(),
    };
    entry.selector = format!("{name}@{{{index}}}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accessor::tests::RecordingExecutor;
    use crate::core::parsers::REFLOG_FORMAT;
    use chrono::DateTime;
    use std::sync::{Arc, Mutex};

    fn sha(c: char) -> String {
        std::iter::repeat(c).take(40).collect()
    }

    fn entry(index: usize, revision: &str, message: &str) -> ReflogEntry {
        ReflogEntry {
            index,
            selector: format!("HEAD@{{{index}}}"),
            revision: revision.to_string(),
            message: message.to_string(),
            timestamp: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            commit_time: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            author_name: "Test User".to_string(),
            author_email: "test@example.com".to_string(),
            subject: message.to_string(),
        }
    }

    fn line(index: usize, revision: &str, message: &str) -> String {
        format!(
            "{revision}\u{1f}HEAD@{{{}}}\u{1f}{message}\u{1f}1700000000\u{1f}Test User\u{1f}test@example.com\u{1f}{message}\n",
            1_700_000_000 - index as i64
        )
    }

    fn record_events(reflog: &mut Reflog) -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        reflog.subscribe(move |event| {
            let text = match event {
                ReflogEvent::Added(record) => format!("+{}", record.entry.message),
                ReflogEvent::Updated(record) => format!("~{}", record.entry.message),
                ReflogEvent::Removed(record) => format!("-{}", record.entry.message),
            };
            sink.lock().unwrap().push(text);
        });
        events
    }

    #[test]
    fn test_apply_appends_and_trims() {
        let mut reflog = Reflog::new("HEAD");
        let events = record_events(&mut reflog);

        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('b'), "b")]);
        assert_eq!(reflog.len(), 2);

        reflog.apply(vec![entry(0, &sha('a'), "a")]);
        assert_eq!(reflog.len(), 1);
        assert_eq!(*events.lock().unwrap(), vec!["+a", "+b", "-b"]);
    }

    #[test]
    fn test_update_in_place_keeps_ids() {
        let mut reflog = Reflog::new("HEAD");
        reflog.apply(vec![entry(0, &sha('a'), "a")]);
        let id = reflog.records()[0].id;
        let events = record_events(&mut reflog);

        reflog.apply(vec![entry(0, &sha('c'), "c")]);
        let record = reflog.get(id).unwrap();
        assert_eq!(record.entry.revision, sha('c'));
        assert_eq!(*events.lock().unwrap(), vec!["~c"]);
    }

    #[test]
    fn test_updated_event_carries_kept_id() {
        let mut reflog = Reflog::new("HEAD");
        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('b'), "b")]);
        let second = reflog.records()[1].id;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        reflog.subscribe(move |event| {
            if let ReflogEvent::Updated(record) = event {
                sink.lock().unwrap().push(record.id);
            }
        });

        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('d'), "d")]);
        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('d'), "d")]);
        assert_eq!(*seen.lock().unwrap(), vec![second]);
    }

    #[test]
    fn test_replace_policy_swaps_records() {
        let mut reflog = Reflog::new("HEAD").with_policy(IdentityPolicy::Replace);
        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('b'), "b")]);
        let first = reflog.records()[0].id;
        let second = reflog.records()[1].id;
        let events = record_events(&mut reflog);

        reflog.apply(vec![entry(0, &sha('c'), "c"), entry(1, &sha('b'), "b")]);
        assert!(reflog.get(first).is_none());
        assert!(reflog.get(second).is_some());
        assert_eq!(*events.lock().unwrap(), vec!["-a", "+c"]);
    }

    #[test]
    fn test_insert_newest_reindexes() {
        let mut reflog = Reflog::new("HEAD");
        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('b'), "b")]);

        reflog.insert_newest(entry(0, &sha('c'), "c"));
        let selectors: Vec<&str> = reflog
            .records()
            .iter()
            .map(|r| r.entry.selector.as_str())
            .collect();
        assert_eq!(selectors, vec!["HEAD@{0}", "HEAD@{1}", "HEAD@{2}"]);
        assert_eq!(reflog.records()[2].entry.revision, sha('b'));
        assert_eq!(reflog.records()[2].entry.index, 2);
    }

    #[test]
    fn test_insert_newest_skips_known_revision() {
        let mut reflog = Reflog::new("HEAD");
        reflog.apply(vec![entry(0, &sha('a'), "a")]);
        let events = record_events(&mut reflog);

        reflog.insert_newest(entry(0, &sha('a'), "a again"));
        assert_eq!(reflog.len(), 1);
        assert!(events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_events() {
        let mut reflog = Reflog::new("HEAD");
        let count = Arc::new(Mutex::new(0));
        let sink = count.clone();
        let id = reflog.subscribe(move |_| *sink.lock().unwrap() += 1);

        reflog.apply(vec![entry(0, &sha('a'), "a")]);
        assert!(reflog.unsubscribe(id));
        assert!(!reflog.unsubscribe(id));
        reflog.apply(vec![entry(0, &sha('a'), "a"), entry(1, &sha('b'), "b")]);
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn test_refresh_and_notify_through_accessor() {
        let executor = RecordingExecutor::default()
            .respond(0, line(0, &sha('a'), "a").as_bytes(), "")
            .respond(0, line(0, &sha('b'), "b").as_bytes(), "");
        let accessor = RepositoryAccessor::new(executor);
        let mut reflog = Reflog::new("refs/heads/main");

        reflog.refresh(&accessor).unwrap();
        reflog.notify_record_added(&accessor).unwrap();

        assert_eq!(reflog.len(), 2);
        assert_eq!(reflog.records()[0].entry.revision, sha('b'));
        let calls = accessor.executor().calls();
        assert_eq!(
            calls[0],
            format!("log --walk-reflogs --date=unix --format={REFLOG_FORMAT} refs/heads/main --")
        );
        assert!(calls[1].contains("--max-count=1"));
    }
}
