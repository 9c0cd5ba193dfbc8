// Host command protocol. The engine never touches the DOM: it emits explicit
// subscribe/unsubscribe and request/cancel-frame commands for JS to execute.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Document-level listener kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListenerKind {
    Scroll,
    Resize,
    PointerMove,
}

/// Handle for one registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u32);

impl SubscriptionId {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Handle for one scheduled animation frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameHandle(u32);

impl FrameHandle {
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

/// Which per-frame loop a frame request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "loop", content = "index")]
pub enum FrameLoop {
    /// Coalesced scroll update for the pinned track.
    Track,
    Reveal(u32),
    Counter(u32),
    Scramble(u32),
    Cursor,
}

/// Side effects for the JS host to perform, in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum HostCommand {
    Subscribe { id: SubscriptionId, kind: ListenerKind },
    Unsubscribe { id: SubscriptionId, kind: ListenerKind },
    RequestFrame { handle: FrameHandle, owner: FrameLoop },
    CancelFrame { handle: FrameHandle, owner: FrameLoop },
}

/// Tracks live document listeners. Each subscription is released at most once.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: u32,
    active: BTreeMap<SubscriptionId, ListenerKind>,
    released_total: u32,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        kind: ListenerKind,
        commands: &mut Vec<HostCommand>,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.active.insert(id, kind);
        commands.push(HostCommand::Subscribe { id, kind });
        id
    }

    /// Returns false, emitting nothing, if `id` was already released.
    pub fn unsubscribe(&mut self, id: SubscriptionId, commands: &mut Vec<HostCommand>) -> bool {
        match self.active.remove(&id) {
            Some(kind) => {
                self.released_total += 1;
                commands.push(HostCommand::Unsubscribe { id, kind });
                true
            }
            None => false,
        }
    }

    pub fn release_all(&mut self, commands: &mut Vec<HostCommand>) -> usize {
        let ids: Vec<SubscriptionId> = self.active.keys().copied().collect();
        ids.into_iter()
            .filter(|id| self.unsubscribe(*id, commands))
            .count()
    }

    pub fn active_count(&self, kind: ListenerKind) -> usize {
        self.active.values().filter(|k| **k == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn released_total(&self) -> u32 {
        self.released_total
    }
}

/// Tracks outstanding animation frame requests, at most one per loop.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_handle: u32,
    pending: BTreeMap<FrameLoop, FrameHandle>,
    started_total: u32,
    cancelled_total: u32,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a frame for `owner` unless one is already pending. Repeated calls
    /// within a frame coalesce onto the existing handle.
    pub fn request(&mut self, owner: FrameLoop, commands: &mut Vec<HostCommand>) -> FrameHandle {
        if let Some(handle) = self.pending.get(&owner) {
            return *handle;
        }
        let handle = FrameHandle(self.next_handle);
        self.next_handle += 1;
        self.started_total += 1;
        self.pending.insert(owner, handle);
        commands.push(HostCommand::RequestFrame { handle, owner });
        handle
    }

    /// The frame fired. The loop must request again to keep running.
    pub fn complete(&mut self, owner: FrameLoop) -> Option<FrameHandle> {
        self.pending.remove(&owner)
    }

    pub fn cancel(&mut self, owner: FrameLoop, commands: &mut Vec<HostCommand>) -> bool {
        match self.pending.remove(&owner) {
            Some(handle) => {
                self.cancelled_total += 1;
                commands.push(HostCommand::CancelFrame { handle, owner });
                true
            }
            None => false,
        }
    }

    pub fn cancel_all(&mut self, commands: &mut Vec<HostCommand>) -> usize {
        let owners: Vec<FrameLoop> = self.pending.keys().copied().collect();
        owners
            .into_iter()
            .filter(|owner| self.cancel(*owner, commands))
            .count()
    }

    pub fn is_pending(&self, owner: FrameLoop) -> bool {
        self.pending.contains_key(&owner)
    }

    pub fn pending_loops(&self) -> Vec<FrameLoop> {
        self.pending.keys().copied().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn started_total(&self) -> u32 {
        self.started_total
    }

    pub fn cancelled_total(&self) -> u32 {
        self.cancelled_total
    }
}

/// Listener and frame bookkeeping plus the command queue for one mounted scene.
#[derive(Debug, Default)]
pub struct Host {
    listeners: ListenerRegistry,
    frames: FrameScheduler,
    commands: Vec<HostCommand>,
}

/// What a teardown released.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeardownReport {
    pub listeners_released: usize,
    pub frames_cancelled: usize,
}

impl Host {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, kind: ListenerKind) -> SubscriptionId {
        self.listeners.subscribe(kind, &mut self.commands)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id, &mut self.commands)
    }

    pub fn request_frame(&mut self, owner: FrameLoop) -> FrameHandle {
        self.frames.request(owner, &mut self.commands)
    }

    pub fn complete_frame(&mut self, owner: FrameLoop) -> Option<FrameHandle> {
        self.frames.complete(owner)
    }

    pub fn cancel_frame(&mut self, owner: FrameLoop) -> bool {
        self.frames.cancel(owner, &mut self.commands)
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn frames(&self) -> &FrameScheduler {
        &self.frames
    }

    /// Commands emitted since the last drain, in emission order.
    pub fn drain_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Cancels every pending frame and releases every listener.
    pub fn teardown(&mut self) -> TeardownReport {
        let frames_cancelled = self.frames.cancel_all(&mut self.commands);
        let listeners_released = self.listeners.release_all(&mut self.commands);
        TeardownReport {
            listeners_released,
            frames_cancelled,
        }
    }
}
