use std::collections::HashMap;

use crate::core::{BodyHandle, EventHandle, PriorityQueueSet};
use crate::math::Vector2;

/// A predicted contact between two root bodies, scheduled within a tick.
///
/// `time` is absolute within the tick. The handles always refer to the
/// top-level roots of the colliding hierarchies; the leaf circles that
/// produced the contact only contribute the geometry and the recorded
/// point velocities.
#[derive(Debug, Clone)]
pub struct CollisionEvent {
    /// Absolute in-tick time of first contact
    pub time: f32,

    /// Root of the first colliding hierarchy
    pub body_a: BodyHandle,

    /// Root of the second colliding hierarchy
    pub body_b: BodyHandle,

    /// Contact location in world space
    pub point: Vector2,

    /// Unit vector from body B's surface toward the contact, the resolution axis
    pub normal: Vector2,

    /// World velocity of the colliding circle of body A at detection time
    pub point_velocity_a: Vector2,

    /// World velocity of the colliding circle of body B at detection time
    pub point_velocity_b: Vector2,
}

/// A collision that received an impulse during the last `update` call
#[derive(Debug, Clone)]
pub struct ResolvedCollision {
    /// Absolute in-tick time at which the contact was resolved
    pub time: f32,

    /// Root of the first colliding hierarchy
    pub body_a: BodyHandle,

    /// Root of the second colliding hierarchy
    pub body_b: BodyHandle,

    /// Contact location in world space
    pub point: Vector2,

    /// Resolution axis the impulse was applied along
    pub normal: Vector2,

    /// Magnitude of the applied impulse
    pub impulse: f32,
}

/// Pending-event store for one tick.
///
/// Four indices are kept mutually consistent through the paired
/// insert/remove methods below: the event table itself, the ascending time
/// queue, the time-to-events map and the body-to-events reverse index used
/// for invalidation. Times are keyed by their exact bit pattern, so a
/// lookup only ever matches a time that detection actually produced.
#[derive(Debug)]
pub struct EventRegistry {
    events: HashMap<EventHandle, CollisionEvent>,
    next_id: u32,
    times: PriorityQueueSet<f32>,
    time_index: HashMap<u32, Vec<EventHandle>>,
    body_index: HashMap<BodyHandle, Vec<EventHandle>>,
}

#[inline]
fn time_key(time: f32) -> u32 {
    time.to_bits()
}

impl EventRegistry {
    /// Creates a new empty registry
    pub fn new() -> Self {
        Self {
            events: HashMap::new(),
            next_id: 1,
            times: PriorityQueueSet::new(),
            time_index: HashMap::new(),
            body_index: HashMap::new(),
        }
    }

    /// Registers an event in all indices and returns its handle
    pub fn insert(&mut self, event: CollisionEvent) -> EventHandle {
        let handle = EventHandle(self.next_id);
        self.next_id += 1;

        self.times.insert(event.time);
        self.time_index.entry(time_key(event.time)).or_default().push(handle);
        self.body_index.entry(event.body_a).or_default().push(handle);
        self.body_index.entry(event.body_b).or_default().push(handle);
        self.events.insert(handle, event);

        handle
    }

    /// Removes and returns the events scheduled at exactly `time`, in
    /// insertion order
    pub fn take_events_at(&mut self, time: f32) -> Vec<CollisionEvent> {
        let handles = self.time_index.remove(&time_key(time)).unwrap_or_default();
        self.times.remove(time);

        handles
            .into_iter()
            .filter_map(|handle| self.events.remove(&handle))
            .collect()
    }

    /// Drops every pending event involving `body` from all indices.
    ///
    /// Events the other participant already removed are skipped; reverse
    /// index entries left behind by such removals resolve to nothing.
    pub fn remove_events_for(&mut self, body: BodyHandle) {
        let handles = self.body_index.remove(&body).unwrap_or_default();

        for handle in handles {
            let event = match self.events.remove(&handle) {
                Some(event) => event,
                None => continue,
            };

            let key = time_key(event.time);
            if let Some(list) = self.time_index.get_mut(&key) {
                list.retain(|current| *current != handle);
                if list.is_empty() {
                    self.time_index.remove(&key);
                    self.times.remove(event.time);
                }
            }
        }
    }

    /// Removes and returns the earliest queued time
    pub fn next_time(&mut self) -> Option<f32> {
        self.times.pop()
    }

    /// Returns the number of pending events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns whether any events are pending
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clears all events and indices
    pub fn clear(&mut self) {
        self.events.clear();
        self.times.clear();
        self.time_index.clear();
        self.body_index.clear();
    }
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self::new()
    }
}
