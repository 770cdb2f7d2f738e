pub mod bookmark;
pub mod comment;
pub mod enums;
pub mod freet;
pub mod group;
pub mod like;
pub mod user;

use std::{fmt, sync::OnceLock};

use mongodb::{
    Client,
    Database,
    IndexModel,
    error::{ErrorKind, WriteFailure},
    options::IndexOptions
};
pub use mongodb::{
    bson::{DateTime, doc, oid::ObjectId},
    error::Error as MongoError
};
use opentelemetry::{
    global,
    trace::{FutureExt, Tracer}
};

use crate::env::env;

#[rustfmt::skip]
pub use bookmark::{Bookmark, Toggled};
pub use comment::{Comment, Parent};
pub use enums::{GroupRole, ParentKind};
pub use freet::Freet;
pub use group::{Group, GroupError, JoinLeave, RequestResponse};
pub use like::{Like, LikeAction, LikeToggled};
pub use user::User;


/// Attempts a versioned document gets before `modify` gives up.
pub const MAX_MODIFY_ATTEMPTS: usize = 5;

static MONGO: OnceLock<Database> = OnceLock::new();

#[derive(Debug)]
pub enum ModifyError<E> {
    /// the transition itself refused the change
    Rejected(E),
    /// every attempt lost the race to a concurrent writer
    Conflict,
    Mongo(MongoError)
}

impl<E> From<MongoError> for ModifyError<E> {
    fn from(error: MongoError) -> Self {
        ModifyError::Mongo(error)
    }
}

impl<E: fmt::Display> fmt::Display for ModifyError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifyError::Rejected(error) => error.fmt(f),
            ModifyError::Conflict => {
                write!(f, "document was modified concurrently")
            }
            ModifyError::Mongo(error) => error.fmt(f)
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ModifyError<E> {}

/// Documents written with a compare-and-swap on a `revision` counter.
/// Implemented by `#[document(versioned)]`.
pub trait Versioned {
    fn revision(&self) -> i64;

    fn set_revision(&mut self, revision: i64);
}

/// Reads a document, applies `apply` and writes it back only if the stored
/// revision is still the one that was read.
///
/// `write` receives the revision that was read and the updated document, and
/// hands the document back when the swap landed. A miss starts over from a
/// fresh read, up to `MAX_MODIFY_ATTEMPTS` times. `Ok(None)` means `read`
/// found nothing.
pub async fn compare_and_swap<D, T, E, RF, WF>(
    mut read: impl FnMut() -> RF,
    mut write: impl FnMut(i64, D) -> WF,
    mut apply: impl FnMut(&mut D) -> Result<T, E>
) -> Result<Option<(D, T)>, ModifyError<E>>
where
    D: Versioned,
    RF: Future<Output = Result<Option<D>, MongoError>>,
    WF: Future<Output = Result<Option<D>, MongoError>>
{
    for _ in 0..MAX_MODIFY_ATTEMPTS {
        let Some(mut document) = read().await? else {
            return Ok(None);
        };

        let revision = document.revision();

        let outcome = apply(&mut document).map_err(ModifyError::Rejected)?;

        document.set_revision(revision + 1);

        if let Some(document) = write(revision, document).await? {
            return Ok(Some((document, outcome)));
        }
    }

    Err(ModifyError::Conflict)
}

pub async fn init_mongo(ping: bool) -> Result<(), Box<dyn std::error::Error>> {
    let tracer = global::tracer("");

    let mongo = tracer
        .in_span("initializing mongo", |cx| {
            async {
                let mongo = Client::with_uri_str(&env().mongo_url)
                    .await?
                    .database(&env().mongo_database);

                // ? creating the client doesn't connect,
                // ? ping so a bad url fails at startup
                if ping {
                    mongo.run_command(doc! {"ping": 1}).await?;
                }

                Ok::<Database, MongoError>(mongo)
            }
            .with_context(cx)
        })
        .await?;

    MONGO.set(mongo).expect("Failed to set Mongo client");

    Ok(())
}

pub fn mongo() -> &'static Database {
    MONGO.get().expect("Mongo client not initialized")
}

fn unique_index(keys: mongodb::bson::Document) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
}

/// Creates the indexes that back the one-per-key guarantees.
pub async fn ensure_indexes() -> Result<(), MongoError> {
    let tracer = global::tracer("");

    tracer
        .in_span("ensuring indexes", |cx| {
            async {
                User::collection()
                    .create_index(unique_index(doc! {"username": 1}))
                    .await?;

                Group::collection()
                    .create_index(unique_index(doc! {"group_name": 1}))
                    .await?;

                Like::collection()
                    .create_index(unique_index(
                        doc! {"author_id": 1, "freet_id": 1}
                    ))
                    .await?;

                Bookmark::collection()
                    .create_index(unique_index(doc! {"user_id": 1, "folder": 1}))
                    .await?;

                Comment::collection()
                    .create_index(
                        IndexModel::builder()
                            .keys(doc! {"parent.kind": 1, "parent.id": 1})
                            .build()
                    )
                    .await?;

                Freet::collection()
                    .create_index(
                        IndexModel::builder()
                            .keys(doc! {"author_id": 1, "date_modified": -1})
                            .build()
                    )
                    .await?;

                Ok::<(), MongoError>(())
            }
            .with_context(cx)
        })
        .await
}

/// True when an insert collided with a unique index.
pub fn is_duplicate_key(error: &MongoError) -> bool {
    matches!(
        error.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == 11000
    )
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use futures::executor::block_on;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        value:    u32,
        revision: i64
    }

    impl Versioned for Counter {
        fn revision(&self) -> i64 {
            self.revision
        }

        fn set_revision(&mut self, revision: i64) {
            self.revision = revision;
        }
    }

    // ? a stored counter whose first `lost` writes are beaten by someone else
    struct Store {
        stored: RefCell<Option<Counter>>,
        lost:   Cell<usize>,
        reads:  Cell<usize>,
        writes: Cell<usize>
    }

    impl Store {
        fn new(stored: Option<Counter>, lost: usize) -> Self {
            Self {
                stored: RefCell::new(stored),
                lost:   Cell::new(lost),
                reads:  Cell::new(0),
                writes: Cell::new(0)
            }
        }

        fn increment(
            &self
        ) -> Result<Option<(Counter, u32)>, ModifyError<&'static str>> {
            block_on(compare_and_swap(
                || {
                    self.reads.set(self.reads.get() + 1);

                    let stored = self.stored.borrow().clone();

                    async move { Ok::<_, MongoError>(stored) }
                },
                |revision, counter: Counter| {
                    self.writes.set(self.writes.get() + 1);

                    let mut stored = self.stored.borrow_mut();

                    let landed = if self.lost.get() > 0 {
                        self.lost.set(self.lost.get() - 1);

                        // ? the concurrent writer bumps the revision
                        if let Some(stored) = stored.as_mut() {
                            stored.revision += 1;
                        }

                        None
                    } else if stored.as_ref().map(Versioned::revision) ==
                        Some(revision)
                    {
                        *stored = Some(counter.clone());

                        Some(counter)
                    } else {
                        None
                    };

                    async move { Ok::<_, MongoError>(landed) }
                },
                |counter| {
                    counter.value += 1;

                    Ok(counter.value)
                }
            ))
        }
    }

    #[test]
    fn lands_on_the_third_attempt() {
        let store = Store::new(Some(Counter { value: 0, revision: 7 }), 2);

        let (counter, value) = store.increment().unwrap().unwrap();

        assert_eq!(value, 1);
        assert_eq!(store.reads.get(), 3);
        assert_eq!(store.writes.get(), 3);
        assert_eq!(counter.revision, 10);
        assert_eq!(store.stored.borrow().as_ref(), Some(&counter));
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let store = Store::new(Some(Counter { value: 0, revision: 0 }), 100);

        assert!(matches!(store.increment(), Err(ModifyError::Conflict)));
        assert_eq!(store.writes.get(), MAX_MODIFY_ATTEMPTS);
        assert_eq!(store.stored.borrow().as_ref().unwrap().value, 0);
    }

    #[test]
    fn missing_document_is_none() {
        let store = Store::new(None, 0);

        assert!(matches!(store.increment(), Ok(None)));
        assert_eq!(store.reads.get(), 1);
        assert_eq!(store.writes.get(), 0);
    }

    #[test]
    fn rejected_transition_never_writes() {
        let store = Store::new(Some(Counter { value: 0, revision: 0 }), 0);

        let result = block_on(compare_and_swap(
            || {
                let stored = store.stored.borrow().clone();

                async move { Ok::<_, MongoError>(stored) }
            },
            |_, counter: Counter| {
                store.writes.set(store.writes.get() + 1);

                async move { Ok::<_, MongoError>(Some(counter)) }
            },
            |_| Err::<(), _>("no")
        ));

        assert!(matches!(result, Err(ModifyError::Rejected("no"))));
        assert_eq!(store.writes.get(), 0);
    }
}
