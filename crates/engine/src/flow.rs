// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for one running operation: whether it has changed anything
//! yet, and which cleanup steps failed along the way.

use ocisnap_adapters::AdapterError;
use std::fmt::Display;
use tokio::time::Instant;

use crate::error::OpError;
use crate::report::{Outcome, Report, Residue};
use crate::wait::WaitError;

pub(crate) struct Flow {
    operation: &'static str,
    started: Instant,
    mutated: bool,
    residue: Vec<Residue>,
}

impl Flow {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self { operation, started: Instant::now(), mutated: false, residue: Vec::new() }
    }

    /// From here on, a failure aborts instead of being a clean refusal.
    pub(crate) fn mutated(&mut self) {
        self.mutated = true;
    }

    /// Record a failed step the operation can live without.
    pub(crate) fn residue(&mut self, step: &'static str, resource: impl Display, error: impl Display) {
        let (resource, error) = (resource.to_string(), error.to_string());
        tracing::warn!(operation = self.operation, step, %resource, %error, "step failed, continuing");
        self.residue.push(Residue::new(step, resource, error));
    }

    /// Turn a fatal error into the operation's error.
    pub(crate) fn fail(&mut self, step: &'static str, error: OpError) -> OpError {
        if !self.mutated {
            return error;
        }
        tracing::error!(operation = self.operation, step, error = %error, "aborting");
        OpError::Aborted {
            step,
            source: Box::new(error),
            residue: std::mem::take(&mut self.residue),
        }
    }

    /// Attach residue recorded after `error` was raised to it.
    pub(crate) fn absorb(&mut self, mut error: OpError) -> OpError {
        if let OpError::Aborted { residue, .. } = &mut error {
            residue.append(&mut self.residue);
        }
        error
    }

    pub(crate) fn cloud(&mut self, step: &'static str, source: AdapterError) -> OpError {
        self.fail(step, OpError::Cloud { step, source })
    }

    pub(crate) fn wait(&mut self, step: &'static str, what: impl Display, error: WaitError) -> OpError {
        let error = match error {
            WaitError::Timeout(waited) => OpError::Timeout { what: what.to_string(), waited },
            WaitError::Cloud(source) => OpError::Cloud { step, source },
        };
        self.fail(step, error)
    }

    pub(crate) fn finish(self, outcome: Outcome) -> Report {
        let report = Report {
            operation: self.operation,
            outcome,
            residue: self.residue,
            elapsed: self.started.elapsed(),
        };
        tracing::info!(
            operation = report.operation,
            residue = report.residue.len(),
            elapsed_secs = report.elapsed.as_secs(),
            "completed"
        );
        report
    }
}
