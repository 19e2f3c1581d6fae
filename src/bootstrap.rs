//! The stock world: a small morning-before-class scenario wired entirely
//! through the public setup API, including the reactive listeners that keep
//! room descriptions honest.

use tracing::info;

use crate::domain::{WorldState, BARRIER_ROOM};
use crate::interactions::InteractionRule;
use crate::kernel::{
    DomainError, Event, EventKind, Item, Participant, Room, BACKPACK_NAME, CAN_OPEN_TRAIT,
    IS_OPEN_TRAIT, OPENABLE_TRAIT, WEARABLE_TRAIT,
};
use crate::plugins;
use crate::replies::MSG_EMPTY_ROOM;

static KITCHEN: &str = "kitchen";
static HALLWAY: &str = "hallway";
static BEDROOM: &str = "bedroom";
static HOME: &str = "home";

static HINT_PACK: &str = "pack your backpack and head to the university";
static HINT_GO: &str = "time to head to the university";

pub fn new_game() -> Result<WorldState, DomainError> {
    let mut world = WorldState::new();
    plugins::register_defaults(&mut world);
    register_interaction_rules(&mut world);
    register_listeners(&mut world);
    build_world(&mut world)?;
    info!(rooms = 5, "world ready");
    Ok(world)
}

fn register_interaction_rules(world: &mut WorldState) {
    // Anything that can open applied to anything still closed: raise the
    // barrier flag, flip the target open, and announce it.
    world.register_rule(
        InteractionRule::new()
            .when_source(CAN_OPEN_TRAIT, true)
            .when_target(OPENABLE_TRAIT, true)
            .when_target(IS_OPEN_TRAIT, false)
            .mutate(|world, _, target| {
                world.set_barrier_open(true);
                if let Some(item) = world.find_item_mut(target) {
                    item.set_trait(IS_OPEN_TRAIT, true);
                }
                Ok(())
            })
            .emit(|world, source, target| {
                world.publish(Event::new(
                    EventKind::BarrierOpened,
                    Participant::Item(source.to_owned()),
                    Participant::Item(target.to_owned()),
                ))?;
                Ok(())
            })
            .message(|_, _, _| "the door is open".to_owned()),
    );
}

fn register_listeners(world: &mut WorldState) {
    world.subscribe(EventKind::RoomEntered, |world, event| {
        let Some(entered) = event.target().room_name().map(str::to_owned) else {
            return Ok(());
        };
        if entered == KITCHEN {
            if world.last_verb() == Some("go") {
                if let Some(kitchen) = world.room_mut(KITCHEN) {
                    kitchen.set_description("nothing interesting");
                }
            }
            let table_occupied = world
                .room(KITCHEN)
                .map(|kitchen| !kitchen.items_on("table").is_empty())
                .unwrap_or(false);
            let hint = if world.player().has_backpack() {
                HINT_GO
            } else {
                HINT_PACK
            };
            if let Some(kitchen) = world.room_mut(KITCHEN) {
                if table_occupied {
                    kitchen.set_has_hint(true);
                }
                kitchen.set_hint(hint);
            }
        } else if entered == BEDROOM {
            let cleared = world
                .room(BEDROOM)
                .map(Room::is_cleared)
                .unwrap_or(false);
            if cleared {
                if let Some(bedroom) = world.room_mut(BEDROOM) {
                    bedroom.set_description(MSG_EMPTY_ROOM);
                }
            }
        }
        Ok(())
    });

    world.subscribe(EventKind::BarrierOpened, |world, _| {
        if let Some(door) = world.find_item_mut("door") {
            door.set_description("an open door to the street");
        }
        Ok(())
    });
}

fn build_world(world: &mut WorldState) -> Result<(), DomainError> {
    let mut kitchen = Room::new(KITCHEN, "you are in the kitchen")
        .with_enter_message("kitchen, nothing interesting. you can go - hallway");
    kitchen.set_has_hint(true);
    kitchen.set_hint(HINT_PACK);
    world.add_room(kitchen);
    world.add_room(
        Room::new(HALLWAY, "nothing interesting")
            .with_enter_message("nothing interesting. you can go - kitchen, bedroom, street"),
    );
    world.add_room(
        Room::new(BEDROOM, "you are in your bedroom")
            .with_enter_message("you are in your bedroom. you can go - hallway"),
    );
    world.add_room(
        Room::new(BARRIER_ROOM, "it is spring outside")
            .with_enter_message("it is spring outside. you can go - home"),
    );
    world.add_room(
        Room::new(HOME, "you are home").with_enter_message("you are home. you can go - street"),
    );

    world.connect(KITCHEN, HALLWAY, HALLWAY)?;
    world.connect(HALLWAY, KITCHEN, KITCHEN)?;
    world.connect(HALLWAY, BEDROOM, BEDROOM)?;
    world.connect(HALLWAY, BARRIER_ROOM, BARRIER_ROOM)?;
    world.connect(BEDROOM, HALLWAY, HALLWAY)?;
    world.connect(BARRIER_ROOM, HOME, HOME)?;
    world.connect(HOME, BARRIER_ROOM, BARRIER_ROOM)?;

    world.add_item(KITCHEN, "table", Item::new("tea", ""))?;
    let mut keys = Item::new("keys", "");
    keys.set_trait(CAN_OPEN_TRAIT, true);
    world.add_item(BEDROOM, "table", keys)?;
    world.add_item(BEDROOM, "table", Item::new("notes", ""))?;
    let mut backpack = Item::new(BACKPACK_NAME, "");
    backpack.set_trait(WEARABLE_TRAIT, true);
    world.add_item(BEDROOM, "chair", backpack)?;
    let mut door = Item::new("door", "a closed door to the street");
    door.set_trait(OPENABLE_TRAIT, true);
    door.set_trait(IS_OPEN_TRAIT, false);
    world.add_item(HALLWAY, "wall", door)?;

    world.place_player(KITCHEN)?;
    world.set_fallback_room(HALLWAY);
    Ok(())
}

/// The scripted tour the `eval` subcommand replays.
pub fn walkthrough() -> &'static [&'static str] {
    &[
        "look",
        "go hallway",
        "go bedroom",
        "wear backpack",
        "take keys",
        "take notes",
        "use keys door",
        "go hallway",
        "go street",
    ]
}
