//! Background execution of async catalog calls
//!
//! Native builds drive futures on a tokio runtime; the browser build hands them
//! to `wasm_bindgen_futures`. Results come back through `Arc<Mutex<..>>` slots
//! that systems poll.

use bevy::prelude::*;
use std::future::Future;

#[derive(Resource, Clone)]
pub struct TaskSpawner {
    #[cfg(not(target_arch = "wasm32"))]
    runtime: std::sync::Arc<tokio::runtime::Runtime>,
}

#[cfg(not(target_arch = "wasm32"))]
impl TaskSpawner {
    pub fn new() -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .thread_name("vitrina-io")
            .enable_all()
            .build()?;
        Ok(Self {
            runtime: std::sync::Arc::new(runtime),
        })
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.runtime.spawn(future);
    }
}

#[cfg(target_arch = "wasm32")]
impl TaskSpawner {
    pub fn new() -> std::io::Result<Self> {
        Ok(Self {})
    }

    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = ()> + 'static,
    {
        wasm_bindgen_futures::spawn_local(future);
    }
}
