//! Remote persistence seam.
//!
//! The sync controller talks to the record store through [`RecordStore`], so
//! the hosted client can be swapped for [`mocks::MockRecordStore`] in tests.

use crate::types::TodoId;
use std::future::Future;
use taskdeck_airtable::{AirtableClient, AirtableError, FieldsPatch, ListQuery, Record};

/// Remote table of todo records
pub trait RecordStore: Send + Sync + 'static {
    /// List records matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the store rejects it, or the
    /// response is malformed.
    fn list(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<Record>, AirtableError>> + Send;

    /// Create a record titled `title`, not completed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the store rejects it, or the
    /// response is malformed.
    fn create(&self, title: &str) -> impl Future<Output = Result<Record, AirtableError>> + Send;

    /// Apply a partial update to record `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the store rejects it, or the
    /// response is malformed.
    fn update(
        &self,
        id: &TodoId,
        fields: FieldsPatch,
    ) -> impl Future<Output = Result<Record, AirtableError>> + Send;

    /// Delete record `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the store rejects it.
    fn delete(&self, id: &TodoId) -> impl Future<Output = Result<(), AirtableError>> + Send;
}

impl RecordStore for AirtableClient {
    fn list(
        &self,
        query: &ListQuery,
    ) -> impl Future<Output = Result<Vec<Record>, AirtableError>> + Send {
        Self::list(self, query)
    }

    fn create(&self, title: &str) -> impl Future<Output = Result<Record, AirtableError>> + Send {
        Self::create(self, title)
    }

    fn update(
        &self,
        id: &TodoId,
        fields: FieldsPatch,
    ) -> impl Future<Output = Result<Record, AirtableError>> + Send {
        Self::update(self, id.as_str(), fields)
    }

    fn delete(&self, id: &TodoId) -> impl Future<Output = Result<(), AirtableError>> + Send {
        Self::delete(self, id.as_str())
    }
}

/// In-memory record store for tests
pub mod mocks {
    use super::{AirtableError, FieldsPatch, ListQuery, Record, RecordStore, TodoId};
    use chrono::{DateTime, Utc};
    use std::collections::VecDeque;
    use std::future::Future;
    use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
    use taskdeck_airtable::{Direction, RecordFields};
    use tokio::sync::Semaphore;

    /// Creation time of the first record the mock creates (2025-01-01T00:00:00Z)
    const FIRST_CREATED: i64 = 1_735_689_600;

    /// A call received by [`MockRecordStore`]
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Call {
        /// `list` with this query
        List(ListQuery),
        /// `create` with this title
        Create(String),
        /// `update` of this id with these fields
        Update(TodoId, FieldsPatch),
        /// `delete` of this id
        Delete(TodoId),
    }

    /// Which operation a scripted failure applies to
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum Operation {
        /// `list`
        List,
        /// `create`
        Create,
        /// `update`
        Update,
        /// `delete`
        Delete,
    }

    #[derive(Default)]
    struct Inner {
        records: Vec<Record>,
        calls: Vec<Call>,
        failures: Vec<(Operation, VecDeque<AirtableError>)>,
        created: i64,
        gate: Option<Arc<Semaphore>>,
    }

    /// Record store backed by a vector
    ///
    /// Records every call, applies search and sort to `list`, and returns
    /// scripted failures. Calls can be held in flight with [`Self::pause`].
    #[derive(Clone, Default)]
    pub struct MockRecordStore {
        inner: Arc<Mutex<Inner>>,
    }

    impl MockRecordStore {
        /// Creates an empty store
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store holding `records`
        #[must_use]
        pub fn with_records(records: Vec<Record>) -> Self {
            let store = Self::new();
            store.lock().records = records;
            store
        }

        /// Makes the next call of `operation` fail with `error`
        ///
        /// Failures queue up per operation and are consumed in order.
        pub fn fail_next(&self, operation: Operation, error: AirtableError) {
            let mut inner = self.lock();
            if let Some((_, queue)) = inner.failures.iter_mut().find(|(op, _)| *op == operation) {
                queue.push_back(error);
            } else {
                inner.failures.push((operation, VecDeque::from([error])));
            }
        }

        /// Holds every subsequent call until released with [`Self::release`]
        pub fn pause(&self) {
            self.lock().gate = Some(Arc::new(Semaphore::new(0)));
        }

        /// Lets `calls` held calls proceed
        pub fn release(&self, calls: usize) {
            if let Some(gate) = &self.lock().gate {
                gate.add_permits(calls);
            }
        }

        /// Calls received so far, in arrival order
        #[must_use]
        pub fn calls(&self) -> Vec<Call> {
            self.lock().calls.clone()
        }

        /// Records currently stored
        #[must_use]
        pub fn records(&self) -> Vec<Record> {
            self.lock().records.clone()
        }

        fn lock(&self) -> MutexGuard<'_, Inner> {
            self.inner.lock().unwrap_or_else(PoisonError::into_inner)
        }

        /// Records `call`, waits at the gate, then pops a scripted failure
        async fn enter(&self, call: Call, operation: Operation) -> Result<(), AirtableError> {
            let gate = {
                let mut inner = self.lock();
                inner.calls.push(call);
                inner.gate.clone()
            };
            if let Some(gate) = gate {
                if let Ok(permit) = gate.acquire().await {
                    permit.forget();
                }
            }

            let mut inner = self.lock();
            let failure = inner
                .failures
                .iter_mut()
                .find(|(op, _)| *op == operation)
                .and_then(|(_, queue)| queue.pop_front());
            failure.map_or(Ok(()), Err)
        }

        fn not_found(id: &TodoId) -> AirtableError {
            AirtableError::NotFound(format!("record {id} does not exist"))
        }
    }

    fn matches_search(record: &Record, search: &str) -> bool {
        search.is_empty()
            || record
                .fields
                .title
                .as_deref()
                .unwrap_or_default()
                .to_lowercase()
                .contains(&search.to_lowercase())
    }

    fn apply_patch(fields: &mut RecordFields, patch: FieldsPatch) {
        if let Some(title) = patch.title {
            fields.title = Some(title);
        }
        if let Some(is_completed) = patch.is_completed {
            fields.is_completed = Some(is_completed);
        }
    }

    impl RecordStore for MockRecordStore {
        fn list(
            &self,
            query: &ListQuery,
        ) -> impl Future<Output = Result<Vec<Record>, AirtableError>> + Send {
            let query = query.clone();
            async move {
                self.enter(Call::List(query.clone()), Operation::List).await?;

                let mut records: Vec<Record> = self
                    .lock()
                    .records
                    .iter()
                    .filter(|r| matches_search(r, &query.search))
                    .cloned()
                    .collect();
                if let Some(sort) = &query.sort {
                    records.sort_by(|a, b| {
                        let ordering = if sort.field == "title" {
                            a.fields.title.cmp(&b.fields.title)
                        } else {
                            a.created_time.cmp(&b.created_time)
                        };
                        if sort.direction == Direction::Desc {
                            ordering.reverse()
                        } else {
                            ordering
                        }
                    });
                }
                Ok(records)
            }
        }

        fn create(&self, title: &str) -> impl Future<Output = Result<Record, AirtableError>> + Send {
            let title = title.to_string();
            async move {
                self.enter(Call::Create(title.clone()), Operation::Create)
                    .await?;

                let mut inner = self.lock();
                inner.created += 1;
                let record = Record {
                    id: format!("rec{:04}", inner.created),
                    fields: RecordFields {
                        title: Some(title),
                        is_completed: None,
                    },
                    created_time: DateTime::<Utc>::from_timestamp(
                        FIRST_CREATED + inner.created,
                        0,
                    ),
                };
                inner.records.push(record.clone());
                Ok(record)
            }
        }

        fn update(
            &self,
            id: &TodoId,
            fields: FieldsPatch,
        ) -> impl Future<Output = Result<Record, AirtableError>> + Send {
            let id = id.clone();
            async move {
                self.enter(Call::Update(id.clone(), fields.clone()), Operation::Update)
                    .await?;

                let mut inner = self.lock();
                let record = inner
                    .records
                    .iter_mut()
                    .find(|r| r.id == id.as_str())
                    .ok_or_else(|| Self::not_found(&id))?;
                apply_patch(&mut record.fields, fields);
                Ok(record.clone())
            }
        }

        fn delete(&self, id: &TodoId) -> impl Future<Output = Result<(), AirtableError>> + Send {
            let id = id.clone();
            async move {
                self.enter(Call::Delete(id.clone()), Operation::Delete)
                    .await?;

                let mut inner = self.lock();
                let before = inner.records.len();
                inner.records.retain(|r| r.id != id.as_str());
                if inner.records.len() == before {
                    return Err(Self::not_found(&id));
                }
                Ok(())
            }
        }
    }

}
