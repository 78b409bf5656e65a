//! Resource Lifecycle
//!
//! Drives the engine for each lifecycle operation and maintains the persisted
//! outputs: `create_output` is captured once by create, `raw_output` follows
//! the most recent operation. [`apply`] ties an operation to a named entry of
//! a [`StateStore`].

use super::schema::ResourceSpec;
use crate::call::{CallEngine, CallResult, OperationKind, PathQuery};
use crate::error::CallError;
use crate::state::StateStore;
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State kept for a managed resource between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    pub id: String,
    pub create_output: String,
    pub raw_output: String,
    pub updated_at: DateTime<Utc>,
}

/// Create the resource, starting from the configured custom id (if any)
pub async fn create<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
) -> Result<ResourceState, CallError> {
    let custom_id = spec.custom_id()?;
    let result = run(engine, spec, OperationKind::Create, &custom_id).await?;

    tracing::info!("Created resource '{}' at {}", result.identifier, spec.endpoint);

    let output = result.output().to_string();
    Ok(ResourceState {
        id: result.identifier,
        create_output: output.clone(),
        raw_output: output,
        updated_at: Utc::now(),
    })
}

/// Re-read the resource, refreshing `raw_output` and the id
pub async fn read<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    state: &ResourceState,
) -> Result<ResourceState, CallError> {
    refresh(engine, spec, state, OperationKind::Read).await
}

/// Update the resource, refreshing `raw_output` and the id
pub async fn update<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    state: &ResourceState,
) -> Result<ResourceState, CallError> {
    refresh(engine, spec, state, OperationKind::Update).await
}

/// Delete the resource; the caller drops its state on success
pub async fn delete<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    state: &ResourceState,
) -> Result<CallResult, CallError> {
    let result = run(engine, spec, OperationKind::Delete, &state.id).await?;
    tracing::info!("Deleted resource '{}'", result.identifier);
    Ok(result)
}

/// Run `kind` for the resource recorded as `name` and persist the outcome.
///
/// Create refuses a name that already has state, before any request is sent.
/// The other operations require existing state. Create, read and update store
/// and return the new state; delete drops the entry and returns what was
/// removed. The store is saved only after a successful call.
pub async fn apply<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    kind: OperationKind,
    name: &str,
    store: &mut StateStore,
) -> anyhow::Result<ResourceState> {
    if kind == OperationKind::Create {
        if store.get(name).is_some() {
            bail!(
                "'{}' already exists in {:?}. Run update, or delete it first",
                name,
                store.path()
            );
        }
        let state = create(engine, spec)
            .await
            .with_context(|| format!("create of '{}' failed", name))?;
        store.insert(name, state.clone());
        store.save()?;
        return Ok(state);
    }

    let current = store
        .get(name)
        .cloned()
        .ok_or_else(|| anyhow!("No state recorded for '{}'. Run create first", name))?;

    let next = match kind {
        OperationKind::Delete => {
            delete(engine, spec, &current)
                .await
                .with_context(|| format!("delete of '{}' failed", name))?;
            store.remove(name);
            store.save()?;
            return Ok(current);
        }
        OperationKind::Read => read(engine, spec, &current).await,
        _ => update(engine, spec, &current).await,
    };

    let refreshed = next.with_context(|| format!("{} of '{}' failed", kind, name))?;
    store.insert(name, refreshed.clone());
    store.save()?;
    Ok(refreshed)
}

async fn refresh<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    state: &ResourceState,
    kind: OperationKind,
) -> Result<ResourceState, CallError> {
    let result = run(engine, spec, kind, &state.id).await?;

    if result.identifier != state.id {
        tracing::info!(
            "{} changed resource id from '{}' to '{}'",
            kind,
            state.id,
            result.identifier
        );
    }

    Ok(ResourceState {
        raw_output: result.output().to_string(),
        id: result.identifier,
        create_output: state.create_output.clone(),
        updated_at: Utc::now(),
    })
}

async fn run<Q: PathQuery>(
    engine: &CallEngine<Q>,
    spec: &ResourceSpec,
    kind: OperationKind,
    current_id: &str,
) -> Result<CallResult, CallError> {
    let description = spec.description(kind)?;
    engine
        .perform(kind, &spec.endpoint, current_id, description.as_ref())
        .await
}
