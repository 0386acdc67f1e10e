use futures::future::join_all;
use log::{debug, warn};
use std::time::Duration;

use super::bounded;
use crate::compliance::error::CheckError;
use crate::compliance::types::{CheckCategory, RlsFinding};
use crate::platform::RelationInspector;

/// Inspects every user-facing relation of `schema`.
///
/// Read-only: only metadata listing calls are issued. A relation whose
/// policies cannot be read is reported as disabled with no policies, and a
/// failed relation listing yields a single failing finding named after the
/// schema, so errors never look like an empty schema.
pub async fn check<I>(
    inspector: &I,
    schema: &str,
    is_internal: impl Fn(&str) -> bool,
    limit: Duration,
) -> Vec<RlsFinding>
where
    I: RelationInspector + ?Sized,
{
    let relations = match bounded(limit, inspector.list_relations(schema)).await {
        Ok(relations) => relations,
        Err(err) => {
            warn!("{}", CheckError::provider(CheckCategory::Rls, schema, &err));
            return vec![RlsFinding::failed_closed(schema)];
        }
    };

    let relations: Vec<_> = relations
        .into_iter()
        .filter(|r| {
            let internal = is_internal(&r.name);
            if internal {
                debug!("Skipping internal relation {schema}.{}", r.name);
            }
            !internal
        })
        .collect();

    let lookups = relations.iter().map(|relation| async move {
        match bounded(limit, inspector.list_policies(schema, &relation.name)).await {
            Ok(policies) => RlsFinding::new(
                relation.name.clone(),
                relation.rls_enabled,
                u32::try_from(policies.len()).unwrap_or(u32::MAX),
            ),
            Err(err) => {
                let resource = format!("{schema}.{}", relation.name);
                warn!("{}", CheckError::provider(CheckCategory::Rls, &resource, &err));
                RlsFinding::failed_closed(relation.name.clone())
            }
        }
    });

    join_all(lookups).await
}
