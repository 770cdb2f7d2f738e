use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, parse_macro_input};

struct DocumentArgs {
    collection: Option<String>,
    versioned:  bool
}

fn parse_args(input: &DeriveInput) -> DocumentArgs {
    let mut args = DocumentArgs {
        collection: None,
        versioned:  false
    };

    let nested = input
        .attrs
        .iter()
        .filter(|attr| attr.path.is_ident("document"))
        .filter_map(|attr| attr.parse_meta().ok())
        .filter_map(|meta| match meta {
            syn::Meta::List(meta_list) => Some(meta_list.nested),
            _ => None
        })
        .flatten();

    for nested_meta in nested {
        match nested_meta {
            syn::NestedMeta::Meta(syn::Meta::NameValue(name_value))
                if name_value.path.is_ident("collection") =>
            {
                if let syn::Lit::Str(lit_str) = name_value.lit {
                    args.collection = Some(lit_str.value());
                }
            }
            syn::NestedMeta::Meta(syn::Meta::Path(path))
                if path.is_ident("versioned") =>
            {
                args.versioned = true;
            }
            _ => {}
        }
    }

    args
}

/// Generates collection accessors for a struct stored in mongo.
///
/// `#[document(collection = "...")]` is required. Adding `versioned` also
/// implements `crate::db::Versioned` and generates `modify`, which expects an
/// `id: ObjectId` and a `revision: i64` field and writes through
/// `crate::db::compare_and_swap`.
#[proc_macro_derive(Document, attributes(document))]
pub fn document_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let args = parse_args(&input);

    let collection_name = match args.collection {
        Some(name) => name,
        None => {
            return TokenStream::from(quote! {compile_error!(
                    "The #[derive(Document)] macro requires a \
                    #[document(collection = \"...\")] attribute."
            )});
        }
    };

    let (modify, versioned) = if args.versioned {
        (
            quote! {
                /// Re-reads the document matching `query`, applies `apply`
                /// and replaces it only if nobody else wrote in between.
                /// Returns `Ok(None)` when nothing matches `query`.
                pub async fn modify<T, E>(
                    query: mongodb::bson::Document,
                    apply: impl FnMut(&mut #name) -> Result<T, E>
                ) -> Result<Option<(#name, T)>, crate::db::ModifyError<E>> {
                    crate::db::compare_and_swap(
                        || #name::find_one(query.clone()),
                        |revision, document: #name| async move {
                            let result = #name::collection()
                                .replace_one(
                                    mongodb::bson::doc! {
                                        "_id": document.id,
                                        "revision": revision
                                    },
                                    &document
                                )
                                .await?;

                            Ok::<_, mongodb::error::Error>(
                                (result.matched_count == 1).then_some(document)
                            )
                        },
                        apply
                    )
                    .await
                }
            },
            quote! {
                impl crate::db::Versioned for #name {
                    fn revision(&self) -> i64 {
                        self.revision
                    }

                    fn set_revision(&mut self, revision: i64) {
                        self.revision = revision;
                    }
                }
            }
        )
    } else {
        (quote! {}, quote! {})
    };

    TokenStream::from(quote! {
        impl #name {
            pub fn collection() -> mongodb::Collection<#name> {
                crate::mongo().collection::<#name>(#collection_name)
            }

            pub async fn find_one(
                query: mongodb::bson::Document
            ) -> Result<Option<#name>, mongodb::error::Error>
            where #name: serde::de::DeserializeOwned {
                #name::collection().find_one(query).await
            }

            pub async fn find(
                query: mongodb::bson::Document
            ) -> Result<Vec<#name>, mongodb::error::Error> {
                let cursor = #name::collection().find(query).await?;

                futures::TryStreamExt::try_collect(cursor).await
            }

            // ? the builder can't be exposed through the macro,
            // ? so sorting gets its own method
            pub async fn find_sorted(
                query: mongodb::bson::Document,
                sort: mongodb::bson::Document
            ) -> Result<Vec<#name>, mongodb::error::Error> {
                let cursor =
                    #name::collection().find(query).sort(sort).await?;

                futures::TryStreamExt::try_collect(cursor).await
            }

            pub async fn count_documents(
                query: mongodb::bson::Document
            ) -> Result<u64, mongodb::error::Error> {
                #name::collection().count_documents(query).await
            }

            pub async fn insert(&self) -> Result<(), mongodb::error::Error> {
                #name::collection().insert_one(self).await.map(|_| ())
            }

            pub async fn update_one(
                query: mongodb::bson::Document,
                update: mongodb::bson::Document
            ) -> Result<u64, mongodb::error::Error> {
                Ok(#name::collection()
                    .update_one(query, update)
                    .await?
                    .matched_count)
            }

            pub async fn update_many(
                query: mongodb::bson::Document,
                update: mongodb::bson::Document
            ) -> Result<u64, mongodb::error::Error> {
                Ok(#name::collection()
                    .update_many(query, update)
                    .await?
                    .modified_count)
            }

            pub async fn delete_one(
                query: mongodb::bson::Document
            ) -> Result<u64, mongodb::error::Error> {
                Ok(#name::collection().delete_one(query).await?.deleted_count)
            }

            pub async fn delete_many(
                query: mongodb::bson::Document
            ) -> Result<u64, mongodb::error::Error> {
                Ok(#name::collection().delete_many(query).await?.deleted_count)
            }

            #modify
        }

        #versioned
    })
}
