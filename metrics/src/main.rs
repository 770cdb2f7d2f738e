#![forbid(unsafe_code)]

use opentelemetry::global;
use fritter_core::{
    db::{Bookmark, Comment, Freet, Group, Like, User, doc},
    init_mongo,
    init_otel,
    shutdown_otel
};


#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ? init mongo before otel so mongo init isn't traced
    // ? we should only be sending metrics, not traces
    init_mongo(false).await?;

    init_otel("metrics", env!("CARGO_PKG_VERSION"))?;

    #[rustfmt::skip]
    let (
        users,
        freets,
        comments,
        public_likes,
        hidden_likes,
        folders,
        groups,
        pending_groups
    ) = tokio::join!(
        User::count_documents(doc! {}),
        Freet::count_documents(doc! {}),
        Comment::count_documents(doc! {}),
        Like::count_documents(doc! { "hidden": false }),
        Like::count_documents(doc! { "hidden": true }),
        Bookmark::count_documents(doc! {}),
        Group::count_documents(doc! {}),
        Group::count_documents(doc! {
            "requests.0": { "$exists": true }
        })
    );

    let meter = global::meter("metrics");

    for (name, value) in [
        ("users", users?),
        ("freets", freets?),
        ("comments", comments?),
        ("public_likes", public_likes?),
        ("hidden_likes", hidden_likes?),
        ("bookmark_folders", folders?),
        ("groups", groups?),
        ("groups_with_requests", pending_groups?)
    ] {
        meter
            .u64_observable_gauge(name)
            .with_callback(move |observer| {
                observer.observe(value, &[]);
            })
            .build();
    }

    shutdown_otel()
}
