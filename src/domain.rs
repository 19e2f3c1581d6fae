use std::collections::HashMap;
use std::rc::Rc;
use tracing::{debug, info, warn};

use crate::interactions::InteractionRule;
use crate::kernel::{
    DomainError, Event, EventBus, EventKind, Item, Participant, Player, Room, DEFAULT_SURFACE,
    MAXIMUM_EVENT_DEPTH, MESSAGE_KEY,
};
use crate::library;
use crate::replies::{
    self, MSG_APPLIED, MSG_CANNOT_APPLY, MSG_CANNOT_ENTER, MSG_CANNOT_WEAR, MSG_EMPTY_ROOM,
    MSG_NOTHING_HAPPENS, MSG_NO_SUCH_THING, MSG_NOWHERE_TO_PUT, MSG_UNKNOWN_COMMAND,
};

/// Entry to this room is refused until the barrier flag is raised.
pub static BARRIER_ROOM: &str = "street";

pub type CommandHandler = Rc<dyn Fn(&mut WorldState, &[&str]) -> Result<String, DomainError>>;

/// The session context: room arena, player, event bus, verb registry,
/// interaction rules, and the cross-cutting flags no single entity owns.
/// One command is processed at a time; event handlers triggered along the
/// way run synchronously to completion before control returns here.
pub struct WorldState {
    rooms: HashMap<String, Room>,
    player: Player,
    bus: EventBus<WorldState>,
    commands: HashMap<String, CommandHandler>,
    rules: Vec<InteractionRule>,
    barrier_open: bool,
    last_verb: Option<String>,
    fallback_room: Option<String>,
    event_depth: usize,
}

impl WorldState {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            player: Player::default(),
            bus: EventBus::new(),
            commands: HashMap::new(),
            rules: Vec::new(),
            barrier_open: false,
            last_verb: None,
            fallback_room: None,
            event_depth: 0,
        }
    }

    pub fn register_command<F>(&mut self, verb: &str, handler: F)
    where
        F: Fn(&mut WorldState, &[&str]) -> Result<String, DomainError> + 'static,
    {
        self.commands.insert(verb.to_owned(), Rc::new(handler));
    }

    pub fn register_rule(&mut self, rule: InteractionRule) {
        self.rules.push(rule);
    }

    pub fn subscribe<F>(&mut self, kind: EventKind, handler: F)
    where
        F: Fn(&mut WorldState, &mut Event) -> anyhow::Result<()> + 'static,
    {
        self.bus.subscribe(kind, handler);
    }

    pub fn add_room(&mut self, room: Room) {
        self.rooms.insert(room.name().to_owned(), room);
    }

    /// Places the item and announces it, the same notification a drop makes.
    pub fn add_item(&mut self, room: &str, surface: &str, item: Item) -> Result<(), DomainError> {
        let name = item.name().to_owned();
        self.rooms
            .get_mut(room)
            .ok_or_else(|| DomainError::UnknownRoom(room.to_owned()))?
            .place(surface, item);
        self.publish(Event::new(
            EventKind::ItemDropped,
            Participant::Item(name),
            Participant::Room(room.to_owned()),
        ))?;
        Ok(())
    }

    /// Lifts the first matching item off the surface and announces it, the
    /// same notification a pickup makes. A miss is a quiet no-op.
    pub fn remove_item(
        &mut self,
        room: &str,
        surface: &str,
        name: &str,
    ) -> Result<Option<Item>, DomainError> {
        let Some(item) = self
            .rooms
            .get_mut(room)
            .ok_or_else(|| DomainError::UnknownRoom(room.to_owned()))?
            .remove_from(surface, name)
        else {
            return Ok(None);
        };
        self.publish(Event::new(
            EventKind::ItemPicked,
            Participant::Item(name.to_owned()),
            Participant::Room(room.to_owned()),
        ))?;
        Ok(Some(item))
    }

    /// One-way connection; call twice for a two-way passage.
    pub fn connect(&mut self, from: &str, direction: &str, to: &str) -> Result<(), DomainError> {
        if !self.rooms.contains_key(to) {
            return Err(DomainError::UnknownRoom(to.to_owned()));
        }
        self.rooms
            .get_mut(from)
            .ok_or_else(|| DomainError::UnknownRoom(from.to_owned()))?
            .connect(direction, to);
        Ok(())
    }

    pub fn place_player(&mut self, room: &str) -> Result<(), DomainError> {
        if !self.rooms.contains_key(room) {
            return Err(DomainError::UnknownRoom(room.to_owned()));
        }
        self.player.set_room(room);
        Ok(())
    }

    pub fn set_fallback_room(&mut self, room: &str) {
        self.fallback_room = Some(room.to_owned());
    }

    pub fn fallback_room(&self) -> Option<&str> {
        self.fallback_room.as_deref()
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn room(&self, name: &str) -> Option<&Room> {
        self.rooms.get(name)
    }

    pub fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        self.rooms.get_mut(name)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn barrier_open(&self) -> bool {
        self.barrier_open
    }

    pub fn set_barrier_open(&mut self, open: bool) {
        self.barrier_open = open;
    }

    pub fn last_verb(&self) -> Option<&str> {
        self.last_verb.as_deref()
    }

    pub fn set_last_verb(&mut self, verb: &str) {
        self.last_verb = Some(verb.to_owned());
    }

    /// First hit over inventory, worn items, then the rooms. Item names are
    /// unique world-wide, so the room scan order cannot change the answer.
    pub fn find_item(&self, name: &str) -> Option<&Item> {
        self.player
            .get_item(name)
            .or_else(|| self.player.worn_item(name))
            .or_else(|| self.rooms.values().find_map(|room| room.get_item(name)))
    }

    pub fn find_item_mut(&mut self, name: &str) -> Option<&mut Item> {
        if self.player.has_item(name) {
            return self.player.get_item_mut(name);
        }
        if self.player.worn_item(name).is_some() {
            return self.player.worn_item_mut(name);
        }
        self.rooms
            .values_mut()
            .find_map(|room| room.get_item_mut(name))
    }

    /// Runs every handler registered for the event's kind in registration
    /// order. A handler error aborts the rest of the chain; a prevented
    /// event stops delivery and is returned to the emitter to inspect.
    pub fn publish(&mut self, event: Event) -> Result<Event, DomainError> {
        if self.event_depth >= MAXIMUM_EVENT_DEPTH {
            return Err(DomainError::EventOverflow);
        }
        if let Ok(serialized) = serde_json::to_string(&event) {
            debug!(%serialized, "publish");
        }
        self.event_depth += 1;
        let delivered = self.deliver(event);
        self.event_depth -= 1;
        delivered
    }

    fn deliver(&mut self, mut event: Event) -> Result<Event, DomainError> {
        for handler in self.bus.handlers_for(event.kind()) {
            handler(self, &mut event).map_err(|source| DomainError::HandlerFailed {
                kind: event.kind(),
                source,
            })?;
            if event.is_prevented() {
                debug!(kind = %event.kind(), "prevented");
                break;
            }
        }
        Ok(event)
    }

    /// Exits the current room when there is one, then enters the new one.
    pub fn move_player(&mut self, to: &str) -> Result<String, DomainError> {
        if !self.rooms.contains_key(to) {
            return Err(DomainError::UnknownRoom(to.to_owned()));
        }
        if let Some(current) = self.player.room().map(str::to_owned) {
            self.exit_room(&current)?;
        }
        self.player.set_room(to);
        self.enter_room(to)
    }

    /// Notification-only hook; never contributes to the reply.
    pub fn exit_room(&mut self, name: &str) -> Result<(), DomainError> {
        self.publish(Event::new(
            EventKind::RoomExited,
            Participant::Player,
            Participant::Room(name.to_owned()),
        ))?;
        Ok(())
    }

    /// Publishes room-entered. A preventing handler answers through the
    /// payload message; otherwise the room's precomputed enter message or a
    /// fresh overview is the reply.
    pub fn enter_room(&mut self, name: &str) -> Result<String, DomainError> {
        let event = self.publish(Event::new(
            EventKind::RoomEntered,
            Participant::Player,
            Participant::Room(name.to_owned()),
        ))?;
        if event.is_prevented() {
            return Ok(event
                .payload_text(MESSAGE_KEY)
                .unwrap_or(MSG_CANNOT_ENTER)
                .to_owned());
        }
        let room = self
            .rooms
            .get_mut(name)
            .ok_or_else(|| DomainError::UnknownRoom(name.to_owned()))?;
        room.mark_visited();
        if let Some(message) = room.enter_message() {
            return Ok(message.to_owned());
        }
        self.room_overview(name)
    }

    /// What `look` shows: description, occupied surfaces, the hint line
    /// when the room carries one, then exits.
    pub fn room_overview(&self, name: &str) -> Result<String, DomainError> {
        let room = self
            .rooms
            .get(name)
            .ok_or_else(|| DomainError::UnknownRoom(name.to_owned()))?;
        let mut parts = Vec::new();
        if !room.description().is_empty() {
            parts.push(room.description().to_owned());
        }
        parts.extend(room.surface_clauses());
        if room.has_hint() {
            if let Some(hint) = room.hint() {
                parts.push(hint.to_owned());
            }
        }
        if let Some(exits) = room.exits_clause() {
            parts.push(exits);
        }
        Ok(parts.join(", "))
    }

    fn current_room_name(&self) -> Result<String, DomainError> {
        self.player
            .room()
            .map(str::to_owned)
            .ok_or(DomainError::PlayerNowhere)
    }

    /// Room → inventory. The item must be somewhere to reach, and carrying
    /// takes a worn backpack unless the item can be worn on its own.
    pub fn take(&mut self, name: &str) -> Result<String, DomainError> {
        let current = self.current_room_name()?;
        let room = self
            .rooms
            .get(&current)
            .ok_or_else(|| DomainError::UnknownRoom(current.clone()))?;
        let Some(item) = room.get_item(name) else {
            return Ok(MSG_NO_SUCH_THING.to_owned());
        };
        if !self.player.has_backpack() && !item.is_wearable() {
            return Ok(MSG_NOWHERE_TO_PUT.to_owned());
        }
        let room = self
            .rooms
            .get_mut(&current)
            .ok_or_else(|| DomainError::UnknownRoom(current.clone()))?;
        let Some((_, item)) = room.remove_named(name) else {
            return Ok(MSG_NO_SUCH_THING.to_owned());
        };
        self.player.carry(item);
        self.refresh_cleared_room(&current);
        self.publish(Event::new(
            EventKind::ItemPicked,
            Participant::Item(name.to_owned()),
            Participant::Room(current),
        ))?;
        Ok(replies::added_to_inventory(name))
    }

    /// Inventory → the default surface of the current room.
    pub fn drop_item(&mut self, name: &str) -> Result<String, DomainError> {
        let current = self.current_room_name()?;
        let Some(item) = self.player.remove_item(name) else {
            return Ok(MSG_NO_SUCH_THING.to_owned());
        };
        self.rooms
            .get_mut(&current)
            .ok_or_else(|| DomainError::UnknownRoom(current.clone()))?
            .place(DEFAULT_SURFACE, item);
        self.publish(Event::new(
            EventKind::ItemDropped,
            Participant::Item(name.to_owned()),
            Participant::Room(current),
        ))?;
        Ok(replies::dropped(name))
    }

    /// From the current room or the inventory onto the player.
    pub fn wear(&mut self, name: &str) -> Result<String, DomainError> {
        let current = self.current_room_name()?;
        let room = self
            .rooms
            .get_mut(&current)
            .ok_or_else(|| DomainError::UnknownRoom(current.clone()))?;
        if let Some(item) = room.get_item(name) {
            if !item.is_wearable() {
                return Ok(MSG_CANNOT_WEAR.to_owned());
            }
            let Some((_, item)) = room.remove_named(name) else {
                return Ok(MSG_NO_SUCH_THING.to_owned());
            };
            self.player.put_on(item);
            self.refresh_cleared_room(&current);
            self.publish(Event::new(
                EventKind::ItemPicked,
                Participant::Item(name.to_owned()),
                Participant::Room(current),
            ))?;
            return Ok(replies::now_wearing(name));
        }
        if let Some(item) = self.player.get_item(name) {
            if !item.is_wearable() {
                return Ok(MSG_CANNOT_WEAR.to_owned());
            }
            let Some(item) = self.player.remove_item(name) else {
                return Ok(MSG_NO_SUCH_THING.to_owned());
            };
            self.player.put_on(item);
            return Ok(replies::now_wearing(name));
        }
        Ok(MSG_NO_SUCH_THING.to_owned())
    }

    /// Publishes item-used and answers with the item's description. The
    /// description is returned even when a handler prevented the event.
    pub fn use_item(&mut self, name: &str, target: Participant) -> Result<String, DomainError> {
        let Some(item) = self.player.get_item(name) else {
            return Ok(replies::not_in_inventory(name));
        };
        let description = item.describe().to_owned();
        self.publish(Event::new(
            EventKind::ItemUsed,
            Participant::Item(name.to_owned()),
            target,
        ))?;
        Ok(description)
    }

    /// First rule whose source and target predicates are both fully
    /// satisfied, in registration order.
    pub fn check_interaction(&self, source: &Item, target: &Item) -> Option<&InteractionRule> {
        self.rules.iter().find(|rule| rule.matches(source, target))
    }

    /// Runs the matched rule's mutation, then its emission, then renders
    /// its message.
    pub fn apply_interaction(&mut self, source: &str, target: &str) -> Result<String, DomainError> {
        let index = match (self.find_item(source), self.find_item(target)) {
            (Some(source), Some(target)) => {
                self.rules.iter().position(|rule| rule.matches(source, target))
            }
            _ => None,
        };
        let Some(index) = index else {
            return Ok(MSG_CANNOT_APPLY.to_owned());
        };
        debug!(%source, %target, rule = index, "interaction");
        let rule = &self.rules[index];
        let (mutation, emission, reply) = (rule.mutation(), rule.emission(), rule.reply());
        if let Some(action) = mutation {
            action(self, source, target)?;
        }
        if let Some(action) = emission {
            action(self, source, target)?;
        }
        match reply {
            Some(render) => Ok(render(self, source, target)),
            None => Ok(MSG_APPLIED.to_owned()),
        }
    }

    /// The runtime entry point: one line in, one reply out, never an error
    /// outward. User mistakes come back as short messages; internal
    /// failures are logged and surfaced as a generic reply, kept distinct
    /// from a legitimate empty result.
    pub fn handle_command(&mut self, line: &str) -> String {
        let line = line.trim();
        let tokens = match library::tokens(line) {
            Ok(("", tokens)) => tokens,
            _ => return MSG_UNKNOWN_COMMAND.to_owned(),
        };
        let Some((&verb, args)) = tokens.split_first() else {
            return MSG_UNKNOWN_COMMAND.to_owned();
        };
        let Some(handler) = self.commands.get(verb).cloned() else {
            return MSG_UNKNOWN_COMMAND.to_owned();
        };
        debug!(%verb, "dispatch");
        match handler(self, args) {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, %verb, "command failed");
                MSG_NOTHING_HAPPENS.to_owned()
            }
        }
    }

    fn refresh_cleared_room(&mut self, name: &str) {
        if let Some(room) = self.rooms.get_mut(name) {
            if room.is_cleared() {
                info!(room = %name, "cleared");
                room.set_description(MSG_EMPTY_ROOM);
            }
        }
    }
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::Cell;

    fn two_rooms() -> WorldState {
        let mut world = WorldState::new();
        world.add_room(Room::new("kitchen", "you are in the kitchen"));
        world.add_room(Room::new("hallway", "nothing interesting"));
        world.connect("kitchen", "hallway", "hallway").unwrap();
        world.connect("hallway", "kitchen", "kitchen").unwrap();
        world.place_player("kitchen").unwrap();
        world
    }

    #[test]
    fn it_answers_unknown_commands_without_touching_state() {
        let mut world = two_rooms();
        world
            .add_item("kitchen", "table", Item::new("tea", ""))
            .unwrap();
        assert_eq!(world.handle_command("dance"), MSG_UNKNOWN_COMMAND);
        assert_eq!(world.handle_command(""), MSG_UNKNOWN_COMMAND);
        assert_eq!(world.handle_command("   "), MSG_UNKNOWN_COMMAND);
        assert_eq!(world.player().room(), Some("kitchen"));
        assert!(world.room("kitchen").unwrap().has_item("tea"));
        assert!(world.player().inventory().is_empty());
    }

    #[test]
    fn it_hands_remaining_tokens_to_the_handler() {
        let mut world = WorldState::new();
        world.register_command("echo", |_, args| Ok(args.join("/")));
        assert_eq!(world.handle_command("echo one  two"), "one/two");
        assert_eq!(world.handle_command("  echo  "), "");
    }

    #[test]
    fn it_stops_delivery_when_a_handler_prevents() {
        let mut world = WorldState::new();
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        world.subscribe(EventKind::ItemUsed, |_, event| {
            event.prevent();
            Ok(())
        });
        world.subscribe(EventKind::ItemUsed, move |_, _| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        let event = world
            .publish(Event::new(
                EventKind::ItemUsed,
                Participant::Player,
                Participant::Nobody,
            ))
            .unwrap();
        assert!(event.is_prevented());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn it_aborts_the_chain_when_a_handler_fails() {
        let mut world = WorldState::new();
        let fired = Rc::new(Cell::new(0));
        let seen = fired.clone();
        world.subscribe(EventKind::ItemDropped, |_, _| Err(anyhow!("boom")));
        world.subscribe(EventKind::ItemDropped, move |_, _| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        let outcome = world.publish(Event::new(
            EventKind::ItemDropped,
            Participant::Nobody,
            Participant::Nobody,
        ));
        assert!(matches!(
            outcome,
            Err(DomainError::HandlerFailed {
                kind: EventKind::ItemDropped,
                ..
            })
        ));
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn it_surfaces_internal_failures_as_a_generic_reply() {
        let mut world = WorldState::new();
        world.subscribe(EventKind::BarrierOpened, |_, _| Err(anyhow!("boom")));
        world.register_command("pry", |world, _| {
            world.publish(Event::new(
                EventKind::BarrierOpened,
                Participant::Player,
                Participant::Nobody,
            ))?;
            Ok("pried".to_owned())
        });
        assert_eq!(world.handle_command("pry"), MSG_NOTHING_HAPPENS);
    }

    #[test]
    fn it_tolerates_emission_without_subscribers() {
        let mut world = WorldState::new();
        let event = world
            .publish(Event::new(
                EventKind::RoomExited,
                Participant::Player,
                Participant::Nobody,
            ))
            .unwrap();
        assert!(!event.is_prevented());
    }

    #[test]
    fn it_bounds_event_recursion() {
        let mut world = WorldState::new();
        world.subscribe(EventKind::BarrierOpened, |world, _| {
            world.publish(Event::new(
                EventKind::BarrierOpened,
                Participant::Nobody,
                Participant::Nobody,
            ))?;
            Ok(())
        });
        let outcome = world.publish(Event::new(
            EventKind::BarrierOpened,
            Participant::Nobody,
            Participant::Nobody,
        ));
        assert!(outcome.is_err());
    }

    #[test]
    fn it_recovers_depth_after_a_failed_emission() {
        let mut world = WorldState::new();
        world.subscribe(EventKind::ItemUsed, |_, _| Err(anyhow!("boom")));
        let failed = world.publish(Event::new(
            EventKind::ItemUsed,
            Participant::Nobody,
            Participant::Nobody,
        ));
        assert!(failed.is_err());
        let healthy = world.publish(Event::new(
            EventKind::RoomExited,
            Participant::Nobody,
            Participant::Nobody,
        ));
        assert!(healthy.is_ok());
    }

    #[test]
    fn it_uses_the_payload_message_when_entry_is_prevented() {
        let mut world = two_rooms();
        world.subscribe(EventKind::RoomEntered, |_, event| {
            if event.target().room_name() == Some("hallway") {
                event.set_payload(MESSAGE_KEY, "a cold draft pushes you back");
                event.prevent();
            }
            Ok(())
        });
        let reply = world.move_player("hallway").unwrap();
        assert_eq!(reply, "a cold draft pushes you back");
        assert!(!world.room("hallway").unwrap().was_visited());
    }

    #[test]
    fn it_falls_back_when_prevention_carries_no_message() {
        let mut world = two_rooms();
        world.subscribe(EventKind::RoomEntered, |_, event| {
            event.prevent();
            Ok(())
        });
        let reply = world.move_player("hallway").unwrap();
        assert_eq!(reply, MSG_CANNOT_ENTER);
    }

    #[test]
    fn it_marks_rooms_visited_on_entry() {
        let mut world = two_rooms();
        assert!(!world.room("hallway").unwrap().was_visited());
        world.move_player("hallway").unwrap();
        assert!(world.room("hallway").unwrap().was_visited());
    }

    #[test]
    fn it_exits_the_previous_room_on_move() {
        let mut world = two_rooms();
        let exited = Rc::new(Cell::new(false));
        let seen = exited.clone();
        world.subscribe(EventKind::RoomExited, move |_, event| {
            if event.target().room_name() == Some("kitchen") {
                seen.set(true);
            }
            Ok(())
        });
        world.move_player("hallway").unwrap();
        assert!(exited.get());
    }

    #[test]
    fn it_announces_additions_and_removals() {
        let mut world = two_rooms();
        let noted = Rc::new(Cell::new(0));
        let seen = noted.clone();
        world.subscribe(EventKind::ItemDropped, move |_, _| {
            seen.set(seen.get() + 1);
            Ok(())
        });
        let lifted = noted.clone();
        world.subscribe(EventKind::ItemPicked, move |_, _| {
            lifted.set(lifted.get() + 10);
            Ok(())
        });

        world
            .add_item("kitchen", "table", Item::new("tea", ""))
            .unwrap();
        assert_eq!(noted.get(), 1);

        let missing = world.remove_item("kitchen", "chair", "tea").unwrap();
        assert!(missing.is_none());
        assert_eq!(noted.get(), 1);

        let item = world.remove_item("kitchen", "table", "tea").unwrap();
        assert_eq!(item.map(|item| item.name().to_owned()), Some("tea".to_owned()));
        assert_eq!(noted.get(), 11);
    }

    #[test]
    fn it_rejects_connections_to_unknown_rooms() {
        let mut world = WorldState::new();
        world.add_room(Room::new("kitchen", ""));
        assert!(matches!(
            world.connect("kitchen", "cellar", "cellar"),
            Err(DomainError::UnknownRoom(_))
        ));
    }

    #[test]
    fn it_returns_the_description_even_when_use_is_prevented() {
        let mut world = two_rooms();
        world.player_mut().carry(Item::new("tea", "still warm"));
        world.subscribe(EventKind::ItemUsed, |_, event| {
            event.prevent();
            Ok(())
        });
        let reply = world.use_item("tea", Participant::Nobody).unwrap();
        assert_eq!(reply, "still warm");
    }
}
