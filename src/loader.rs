use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use bevy_ecs::prelude::*;
use log::{debug, error, info};

use crate::assets;
use crate::device::Device;
use crate::texture::{self, Texture};


/// Handle to a cube texture requested from the [`CubeTextureLoader`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CubeTextureHandle(u64);

impl CubeTextureHandle {
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Queued,
    Fetching,
    Ready,
    Failed,
}

// Written once by the fetch task, taken by the upload system
type FetchSlot = Arc<Mutex<Option<anyhow::Result<Vec<Vec<u8>>>>>>;

enum LoadState {
    Queued,
    Fetching(FetchSlot),
    Uploading,
    Ready(Texture),
    Failed,
}

struct Entry {
    urls: [String; 6],
    state: LoadState,
}

/// Loads the six faces of cube textures.
///
/// `load` never blocks: it records the request and hands back a handle that
/// resolves once `fetch_requested` and `upload_fetched` have run and the
/// faces arrived. A failed load is logged and leaves the handle without a
/// texture.
#[derive(Resource, Default)]
pub struct CubeTextureLoader {
    next_id: u64,
    entries: HashMap<CubeTextureHandle, Entry>,
}

impl CubeTextureLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a cube texture from six face urls, in `CUBE_ORDER`.
    pub fn load(&mut self, urls: [String; 6]) -> CubeTextureHandle {
        self.next_id += 1;
        let handle = CubeTextureHandle(self.next_id);
        debug!("cube texture {} requested: {:?}", handle.0, urls);
        self.entries.insert(handle, Entry { urls, state: LoadState::Queued });
        handle
    }

    /// Forget a texture. Returns false for unknown handles.
    pub fn release(&mut self, handle: CubeTextureHandle) -> bool {
        let released = self.entries.remove(&handle).is_some();
        if released {
            debug!("cube texture {} released", handle.0);
        }
        released
    }

    pub fn contains(&self, handle: CubeTextureHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn urls(&self, handle: CubeTextureHandle) -> Option<&[String; 6]> {
        self.entries.get(&handle).map(|e| &e.urls)
    }

    pub fn status(&self, handle: CubeTextureHandle) -> Option<LoadStatus> {
        self.entries.get(&handle).map(|e| match e.state {
            LoadState::Queued => LoadStatus::Queued,
            LoadState::Fetching(_) | LoadState::Uploading => LoadStatus::Fetching,
            LoadState::Ready(_) => LoadStatus::Ready,
            LoadState::Failed => LoadStatus::Failed,
        })
    }

    pub fn texture(&self, handle: CubeTextureHandle) -> Option<&Texture> {
        match self.entries.get(&handle) {
            Some(Entry { state: LoadState::Ready(texture), .. }) => Some(texture),
            _ => None,
        }
    }

    /// Start fetching every queued request.
    pub fn start_fetches(&mut self) {
        for (handle, entry) in self.entries.iter_mut() {
            if !matches!(entry.state, LoadState::Queued) {
                continue;
            }
            let slot: FetchSlot = Arc::new(Mutex::new(None));
            entry.state = match spawn_fetch(entry.urls.to_vec(), slot.clone()) {
                Ok(()) => LoadState::Fetching(slot),
                Err(e) => {
                    error!("cube texture {}: could not start fetch: {e:#}", handle.0);
                    LoadState::Failed
                }
            };
        }
    }

    /// Take the face bytes of every fetch that completed since the last call.
    pub fn take_fetched(&mut self) -> Vec<(CubeTextureHandle, anyhow::Result<Vec<Vec<u8>>>)> {
        let mut fetched = vec![];
        for (handle, entry) in self.entries.iter_mut() {
            let LoadState::Fetching(slot) = &entry.state else {
                continue;
            };
            let result = match slot.lock() {
                Ok(mut guard) => guard.take(),
                Err(_) => Some(Err(anyhow::anyhow!("fetch task panicked"))),
            };
            if let Some(result) = result {
                entry.state = LoadState::Uploading;
                fetched.push((*handle, result));
            }
        }
        fetched
    }

    pub fn finish(&mut self, handle: CubeTextureHandle, texture: Texture) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.state = LoadState::Ready(texture);
        }
    }

    pub fn fail(&mut self, handle: CubeTextureHandle) {
        if let Some(entry) = self.entries.get_mut(&handle) {
            entry.state = LoadState::Failed;
        }
    }

    pub fn fetch_requested(mut loader: ResMut<CubeTextureLoader>) {
        loader.start_fetches();
    }

    pub fn upload_fetched(device: Res<Device>, mut loader: ResMut<CubeTextureLoader>) {
        for (handle, fetched) in loader.take_fetched() {
            let label = format!("cube_texture_{}", handle.0);
            let uploaded = fetched
                .and_then(|bytes| texture::decode_faces(&bytes))
                .and_then(|faces| {
                    Texture::from_cube_faces(&device, device.queue(), &faces, Some(&label))
                });
            match uploaded {
                Ok(texture) => {
                    info!("cube texture {} ready", handle.0);
                    loader.finish(handle, texture);
                }
                Err(e) => {
                    error!("cube texture {} failed to load: {e:#}", handle.0);
                    loader.fail(handle);
                }
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_fetch(urls: Vec<String>, slot: FetchSlot) -> anyhow::Result<()> {
    std::thread::Builder::new()
        .name("cube-texture-fetch".to_string())
        .spawn(move || {
            let result = pollster::block_on(assets::load_binaries(&urls));
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(result);
            }
        })?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn spawn_fetch(urls: Vec<String>, slot: FetchSlot) -> anyhow::Result<()> {
    wasm_bindgen_futures::spawn_local(async move {
        let result = assets::load_binaries(&urls).await;
        if let Ok(mut guard) = slot.lock() {
            *guard = Some(result);
        }
    });
    Ok(())
}
