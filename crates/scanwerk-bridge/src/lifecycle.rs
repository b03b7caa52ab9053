// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Load-once holder for vision backends.
//
// Model-backed line sources are expensive to construct. A `BackendCell` is
// typically a `static`; the first caller of `initialize` runs the loader and
// every concurrent caller awaits that same in-flight load.

use std::future::Future;
use std::sync::Arc;

use scanwerk_core::error::{Result, ScanError};
use tokio::sync::OnceCell;
use tracing::{info, warn};

/// Process-wide slot for a lazily initialised backend.
pub struct BackendCell<B> {
    cell: OnceCell<Arc<B>>,
}

impl<B> BackendCell<B> {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Initialise the backend once and return it.
    ///
    /// A failed load leaves the cell empty so a later call can retry.
    pub async fn initialize<F, Fut>(&self, init: F) -> Result<Arc<B>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<B>>,
    {
        let backend = self
            .cell
            .get_or_try_init(|| async {
                info!("initialising vision backend");
                match init().await {
                    Ok(backend) => {
                        info!("vision backend ready");
                        Ok(Arc::new(backend))
                    }
                    Err(err) => {
                        warn!(error = %err, "vision backend failed to initialise");
                        Err(err)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(backend))
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// The backend, if it has finished loading.
    pub fn get(&self) -> Result<Arc<B>> {
        self.cell.get().cloned().ok_or(ScanError::BackendNotReady)
    }
}

impl<B> Default for BackendCell<B> {
    fn default() -> Self {
        Self::new()
    }
}
