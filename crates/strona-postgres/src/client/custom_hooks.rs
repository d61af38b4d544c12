//! Connection setup and pool hooks.

use std::time::Instant;

use deadpool::managed::{HookError, HookResult, Metrics};
use diesel::ConnectionResult;
use diesel_async::pooled_connection::{PoolError, PoolableConnection};
use diesel_async::{AsyncConnection, AsyncPgConnection};
use futures::FutureExt;
use futures::future::BoxFuture;

use super::pg_config::mask_url;
use crate::TRACING_TARGET_CONNECTION;

/// Opens a physical connection, logging the masked address and how long the
/// handshake took.
pub fn setup_callback<C>(addr: &str) -> BoxFuture<'_, ConnectionResult<C>>
where
    C: AsyncConnection + 'static,
{
    async move {
        let started = Instant::now();
        let result = C::establish(addr).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        if let Err(error) = &result {
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                addr = %mask_url(addr),
                elapsed_ms,
                %error,
                "cannot open database connection"
            );
        } else {
            tracing::debug!(
                target: TRACING_TARGET_CONNECTION,
                addr = %mask_url(addr),
                elapsed_ms,
                "database connection opened"
            );
        }

        result
    }
    .boxed()
}

/// `post_create` hook: a fresh connection that is already broken never
/// enters the pool.
pub fn post_create(conn: &mut AsyncPgConnection, _: &Metrics) -> HookResult<PoolError> {
    reject_broken(conn, "post_create")
}

/// `pre_recycle` hook: a broken idle connection is dropped instead of being
/// handed out again.
pub fn pre_recycle(conn: &mut AsyncPgConnection, metrics: &Metrics) -> HookResult<PoolError> {
    tracing::trace!(
        target: TRACING_TARGET_CONNECTION,
        recycle_count = metrics.recycle_count,
        "recycling connection"
    );
    reject_broken(conn, "pre_recycle")
}

fn reject_broken(conn: &mut AsyncPgConnection, stage: &'static str) -> HookResult<PoolError> {
    if !conn.is_broken() {
        return Ok(());
    }

    tracing::warn!(
        target: TRACING_TARGET_CONNECTION,
        stage,
        "discarding broken connection"
    );
    Err(HookError::Message(format!("connection broken at {stage}").into()))
}
