//! Parallel execution of independent requests.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::EngineResult;
use crate::request::{Request, Response, execute};

/// Executes every request in parallel; results keep the input order.
pub fn execute_batch(requests: &[Request]) -> Vec<EngineResult<Response>> {
    debug!(requests = requests.len(), "executing batch");
    requests.par_iter().map(execute).collect()
}

/// Serializable outcome of one batch entry.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchEntry {
    Ok { response: Response },
    Error { message: String },
}

impl From<EngineResult<Response>> for BatchEntry {
    fn from(result: EngineResult<Response>) -> Self {
        match result {
            Ok(response) => BatchEntry::Ok { response },
            Err(err) => BatchEntry::Error {
                message: err.to_string(),
            },
        }
    }
}
