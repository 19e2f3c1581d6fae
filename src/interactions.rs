use std::fmt::{self, Debug};
use std::rc::Rc;

use crate::domain::WorldState;
use crate::kernel::{DomainError, Item, TraitValue};

pub type StateAction = Rc<dyn Fn(&mut WorldState, &str, &str) -> Result<(), DomainError>>;

pub type MessageAction = Rc<dyn Fn(&WorldState, &str, &str) -> String>;

/// A declarative interaction: required trait values on the source and the
/// target, plus up to three effects. World-specific behavior (a key opening
/// a door) is declared as one of these instead of special-cased in the
/// dispatcher, so arbitrary future trait combinations reuse the mechanism.
pub struct InteractionRule {
    source_traits: Vec<(String, TraitValue)>,
    target_traits: Vec<(String, TraitValue)>,
    mutate: Option<StateAction>,
    emit: Option<StateAction>,
    message: Option<MessageAction>,
}

impl InteractionRule {
    pub fn new() -> Self {
        Self {
            source_traits: Vec::new(),
            target_traits: Vec::new(),
            mutate: None,
            emit: None,
            message: None,
        }
    }

    pub fn when_source<V: Into<TraitValue>>(mut self, name: &str, value: V) -> Self {
        self.source_traits.push((name.to_owned(), value.into()));
        self
    }

    pub fn when_target<V: Into<TraitValue>>(mut self, name: &str, value: V) -> Self {
        self.target_traits.push((name.to_owned(), value.into()));
        self
    }

    pub fn mutate<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut WorldState, &str, &str) -> Result<(), DomainError> + 'static,
    {
        self.mutate = Some(Rc::new(action));
        self
    }

    pub fn emit<F>(mut self, action: F) -> Self
    where
        F: Fn(&mut WorldState, &str, &str) -> Result<(), DomainError> + 'static,
    {
        self.emit = Some(Rc::new(action));
        self
    }

    pub fn message<F>(mut self, action: F) -> Self
    where
        F: Fn(&WorldState, &str, &str) -> String + 'static,
    {
        self.message = Some(Rc::new(action));
        self
    }

    /// Exact equality on every required trait; an absent trait matches
    /// nothing.
    pub fn matches(&self, source: &Item, target: &Item) -> bool {
        let satisfied = |item: &Item, required: &[(String, TraitValue)]| {
            required
                .iter()
                .all(|(name, expected)| item.trait_value(name) == Some(expected))
        };
        satisfied(source, &self.source_traits) && satisfied(target, &self.target_traits)
    }

    pub(crate) fn mutation(&self) -> Option<StateAction> {
        self.mutate.clone()
    }

    pub(crate) fn emission(&self) -> Option<StateAction> {
        self.emit.clone()
    }

    pub(crate) fn reply(&self) -> Option<MessageAction> {
        self.message.clone()
    }
}

impl Default for InteractionRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for InteractionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionRule")
            .field("source_traits", &self.source_traits)
            .field("target_traits", &self.target_traits)
            .field("mutate", &self.mutate.is_some())
            .field("emit", &self.emit.is_some())
            .field("message", &self.message.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{CAN_OPEN_TRAIT, IS_OPEN_TRAIT, OPENABLE_TRAIT};

    fn keys_and_door() -> (Item, Item) {
        let mut keys = Item::new("keys", "");
        keys.set_trait(CAN_OPEN_TRAIT, true);
        let mut door = Item::new("door", "a closed door");
        door.set_trait(OPENABLE_TRAIT, true);
        door.set_trait(IS_OPEN_TRAIT, false);
        (keys, door)
    }

    #[test]
    fn it_matches_on_exact_trait_values() {
        let (keys, door) = keys_and_door();
        let rule = InteractionRule::new()
            .when_source(CAN_OPEN_TRAIT, true)
            .when_target(OPENABLE_TRAIT, true)
            .when_target(IS_OPEN_TRAIT, false);
        assert!(rule.matches(&keys, &door));
    }

    #[test]
    fn it_rejects_a_differing_value() {
        let (keys, mut door) = keys_and_door();
        door.set_trait(IS_OPEN_TRAIT, true);
        let rule = InteractionRule::new()
            .when_source(CAN_OPEN_TRAIT, true)
            .when_target(IS_OPEN_TRAIT, false);
        assert!(!rule.matches(&keys, &door));
    }

    #[test]
    fn it_rejects_an_absent_trait() {
        let (keys, door) = keys_and_door();
        let rule = InteractionRule::new()
            .when_source("sharpened", true)
            .when_target(OPENABLE_TRAIT, true);
        assert!(!rule.matches(&keys, &door));
    }

    #[test]
    fn it_compares_value_and_type() {
        let mut lantern = Item::new("lantern", "");
        lantern.set_trait("lit", "yes");
        let rule = InteractionRule::new().when_source("lit", true);
        assert!(!rule.matches(&lantern, &Item::new("wall", "")));
    }

    mod applying {
        use super::*;
        use crate::domain::WorldState;
        use crate::kernel::{Event, EventKind, Participant, Room, TraitValue};
        use crate::replies::{MSG_APPLIED, MSG_CANNOT_APPLY};
        use std::cell::Cell;
        use std::rc::Rc;

        fn world_with(rule: InteractionRule) -> WorldState {
            let mut world = WorldState::new();
            let mut hallway = Room::new("hallway", "");
            let (keys, door) = keys_and_door();
            hallway.place("wall", door);
            world.add_room(hallway);
            world.place_player("hallway").expect("player");
            world.player_mut().carry(keys);
            world.register_rule(rule);
            world
        }

        fn opening_rule() -> InteractionRule {
            InteractionRule::new()
                .when_source(CAN_OPEN_TRAIT, true)
                .when_target(OPENABLE_TRAIT, true)
                .when_target(IS_OPEN_TRAIT, false)
        }

        #[test]
        fn it_runs_mutation_emission_and_message_in_order() {
            let order = Rc::new(Cell::new(0));
            let at_mutate = order.clone();
            let at_emit = order.clone();
            let rule = opening_rule()
                .mutate(move |world, _, target| {
                    at_mutate.set(at_mutate.get() * 10 + 1);
                    world.set_barrier_open(true);
                    if let Some(item) = world.find_item_mut(target) {
                        item.set_trait(IS_OPEN_TRAIT, true);
                    }
                    Ok(())
                })
                .emit(move |world, source, target| {
                    at_emit.set(at_emit.get() * 10 + 2);
                    world.publish(Event::new(
                        EventKind::BarrierOpened,
                        Participant::Item(source.to_owned()),
                        Participant::Item(target.to_owned()),
                    ))?;
                    Ok(())
                })
                .message(|_, _, _| "the door is open".to_owned());
            let mut world = world_with(rule);

            let fired = Rc::new(Cell::new(false));
            let seen = fired.clone();
            world.subscribe(EventKind::BarrierOpened, move |_, _| {
                seen.set(true);
                Ok(())
            });

            let reply = world.apply_interaction("keys", "door").expect("apply");
            assert_eq!(reply, "the door is open");
            assert_eq!(order.get(), 12);
            assert!(world.barrier_open());
            assert!(fired.get());
            assert_eq!(
                world
                    .find_item("door")
                    .and_then(|item| item.trait_value(IS_OPEN_TRAIT))
                    .and_then(TraitValue::as_bool),
                Some(true)
            );
        }

        #[test]
        fn it_answers_cannot_apply_without_a_match() {
            let mut world = world_with(opening_rule().message(|_, _, _| "opened".to_owned()));
            assert_eq!(
                world.apply_interaction("door", "keys").expect("apply"),
                MSG_CANNOT_APPLY
            );
        }

        #[test]
        fn it_answers_applied_when_the_rule_has_no_message() {
            let mut world = world_with(opening_rule());
            assert_eq!(
                world.apply_interaction("keys", "door").expect("apply"),
                MSG_APPLIED
            );
        }

        #[test]
        fn it_checks_the_first_match_in_registration_order() {
            let mut world = world_with(opening_rule().message(|_, _, _| "first".to_owned()));
            world.register_rule(
                InteractionRule::new()
                    .when_source(CAN_OPEN_TRAIT, true)
                    .message(|_, _, _| "second".to_owned()),
            );
            let (keys, door) = keys_and_door();
            assert!(world.check_interaction(&keys, &door).is_some());
            assert_eq!(world.apply_interaction("keys", "door").expect("apply"), "first");
        }
    }
}
