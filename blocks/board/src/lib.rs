//! The browser-facing task board.
//!
//! Form posts come in, the mutation goes through a [`MutationGateway`]
//! (in-process or via the REST API), and the three task columns are re-read
//! and rendered back as an HTML fragment.

pub mod api_client;
pub mod dashboard;
pub mod error;
pub mod forms;
pub mod gateway;
pub mod render;
pub mod views;

use std::sync::Arc;
use taskboard_atoms::tasks::TaskStore;

pub use api_client::TaskApiClient;
pub use error::{FailurePolicy, MutationError};
pub use gateway::{AdapterMode, MutationGateway};
pub use render::Renderer;

/// Everything a board view needs
#[derive(Clone, Debug)]
pub struct Board {
    /// Read side; columns are always re-read from here after a mutation
    pub store: TaskStore,
    pub gateway: MutationGateway,
    pub renderer: Arc<Renderer>,
    pub policy: FailurePolicy,
}

impl Board {
    pub fn new(
        store: TaskStore,
        gateway: MutationGateway,
        policy: FailurePolicy,
    ) -> Result<Self, tera::Error> {
        Ok(Self {
            store,
            gateway,
            renderer: Arc::new(Renderer::new()?),
            policy,
        })
    }

    pub fn direct(store: TaskStore, policy: FailurePolicy) -> Result<Self, tera::Error> {
        let gateway = MutationGateway::Direct(store.clone());
        Self::new(store, gateway, policy)
    }
}
