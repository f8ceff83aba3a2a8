//! In-memory store for hosted mock documents.
//!
//! Mocks live for the lifetime of the process. Ids are 6 random bytes from
//! the OS generator, hex encoded.

use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;

/// Number of random bytes in a mock id (12 hex characters).
pub const MOCK_ID_BYTES: usize = 6;

/// Draws allowed before giving up on finding an unused id.
const MAX_ID_DRAWS: usize = 8;

#[derive(Error, Debug)]
pub enum MockStoreError {
    #[error("secure random source failed: {0}")]
    Random(#[from] rand::Error),

    #[error("could not find an unused mock id after {0} attempts")]
    IdSpaceExhausted(usize),
}

#[derive(Debug, Default)]
pub struct MockStore {
    mocks: RwLock<HashMap<String, String>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `body` under a fresh id and return the id.
    ///
    /// An id that is already taken is drawn again rather than overwritten.
    pub fn create_mock(&self, body: String) -> Result<String, MockStoreError> {
        let mut mocks = self.mocks.write().unwrap_or_else(PoisonError::into_inner);
        for _ in 0..MAX_ID_DRAWS {
            let id = generate_id()?;
            if mocks.contains_key(&id) {
                tracing::warn!(id = %id, "mock id collision, drawing again");
                continue;
            }
            mocks.insert(id.clone(), body);
            return Ok(id);
        }
        Err(MockStoreError::IdSpaceExhausted(MAX_ID_DRAWS))
    }

    pub fn get_mock(&self, id: &str) -> Option<String> {
        let mocks = self.mocks.read().unwrap_or_else(PoisonError::into_inner);
        mocks.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.mocks
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_id() -> Result<String, MockStoreError> {
    let mut buf = [0u8; MOCK_ID_BYTES];
    OsRng.try_fill_bytes(&mut buf)?;
    Ok(hex::encode(buf))
}
