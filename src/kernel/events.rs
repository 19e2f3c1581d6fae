use serde::Serialize;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::rc::Rc;

use super::TraitValue;

/// The closed vocabulary of in-world notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    ItemPicked,
    ItemDropped,
    ItemUsed,
    RoomEntered,
    RoomExited,
    BarrierOpened,
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::ItemPicked => "item-picked",
            EventKind::ItemDropped => "item-dropped",
            EventKind::ItemUsed => "item-used",
            EventKind::RoomEntered => "room-entered",
            EventKind::RoomExited => "room-exited",
            EventKind::BarrierOpened => "barrier-opened",
        };
        write!(f, "{}", name)
    }
}

/// Who or what an event points at. Identifier-based, since entities are
/// owned by their containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Participant {
    Player,
    Item(String),
    Room(String),
    Nobody,
}

impl Participant {
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Participant::Item(name) => Some(name),
            _ => None,
        }
    }

    pub fn room_name(&self) -> Option<&str> {
        match self {
            Participant::Room(name) => Some(name),
            _ => None,
        }
    }
}

/// A notification record. Immutable except for the payload and the
/// `prevented` flag, which a handler sets to short-circuit the handlers
/// after it and tell the emitter to skip default behavior.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    kind: EventKind,
    source: Participant,
    target: Participant,
    payload: HashMap<String, TraitValue>,
    prevented: bool,
}

impl Event {
    pub fn new(kind: EventKind, source: Participant, target: Participant) -> Self {
        Self {
            kind,
            source,
            target,
            payload: HashMap::new(),
            prevented: false,
        }
    }

    pub fn with<V: Into<TraitValue>>(mut self, key: &str, value: V) -> Self {
        self.payload.insert(key.to_owned(), value.into());
        self
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn source(&self) -> &Participant {
        &self.source
    }

    pub fn target(&self) -> &Participant {
        &self.target
    }

    pub fn set_payload<V: Into<TraitValue>>(&mut self, key: &str, value: V) {
        self.payload.insert(key.to_owned(), value.into());
    }

    pub fn payload(&self, key: &str) -> Option<&TraitValue> {
        self.payload.get(key)
    }

    pub fn payload_text(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(TraitValue::as_text)
    }

    pub fn prevent(&mut self) {
        self.prevented = true;
    }

    pub fn is_prevented(&self) -> bool {
        self.prevented
    }
}

pub type EventHandler<C> = Rc<dyn Fn(&mut C, &mut Event) -> anyhow::Result<()>>;

/// Registration side of the publish/subscribe channel. Generic over the
/// context handed to handlers; delivery lives with the context owner, which
/// snapshots `handlers_for` before running the chain.
pub struct EventBus<C> {
    handlers: HashMap<EventKind, Vec<EventHandler<C>>>,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// No uniqueness check: subscribing twice fires twice.
    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&mut C, &mut Event) -> anyhow::Result<()> + 'static,
    {
        self.handlers.entry(kind).or_default().push(Rc::new(handler));
    }

    /// Registration-order snapshot for one delivery.
    pub fn handlers_for(&self, kind: EventKind) -> Vec<EventHandler<C>> {
        self.handlers.get(&kind).cloned().unwrap_or_default()
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}
