use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{BACKPACK_NAME, WEARABLE_TRAIT};

/// A dynamically typed trait value. Traits are the capability flags the
/// interaction rules match on, so equality is exact, including the type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitValue {
    Bool(bool),
    Number(i64),
    Text(String),
}

impl TraitValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TraitValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self {
            TraitValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            TraitValue::Text(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for TraitValue {
    fn from(value: bool) -> Self {
        TraitValue::Bool(value)
    }
}

impl From<i64> for TraitValue {
    fn from(value: i64) -> Self {
        TraitValue::Number(value)
    }
}

impl From<&str> for TraitValue {
    fn from(value: &str) -> Self {
        TraitValue::Text(value.to_owned())
    }
}

impl From<String> for TraitValue {
    fn from(value: String) -> Self {
        TraitValue::Text(value)
    }
}

/// Open-ended trait mapping. Typed access tolerates absence, never fails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Traits(HashMap<String, TraitValue>);

impl Traits {
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TraitValue> {
        self.0.get(name)
    }

    pub fn set<V: Into<TraitValue>>(&mut self, name: &str, value: V) {
        self.0.insert(name.to_owned(), value.into());
    }

    pub fn bool_trait(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(TraitValue::as_bool)
    }
}

#[derive(Debug, Clone)]
pub struct Item {
    name: String,
    description: String,
    traits: Traits,
}

impl Item {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            traits: Traits::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn describe(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.has(name)
    }

    pub fn trait_value(&self, name: &str) -> Option<&TraitValue> {
        self.traits.get(name)
    }

    pub fn set_trait<V: Into<TraitValue>>(&mut self, name: &str, value: V) {
        self.traits.set(name, value);
    }

    pub fn is_wearable(&self) -> bool {
        self.has_trait(WEARABLE_TRAIT)
    }
}

/// A location owning item placements by named surface and exits by
/// direction. Surfaces and exits keep first-insertion order so every
/// composed description is deterministic.
#[derive(Debug, Clone, Default)]
pub struct Room {
    name: String,
    description: String,
    enter_message: Option<String>,
    surfaces: Vec<(String, Vec<Item>)>,
    exits: Vec<(String, String)>,
    traits: Traits,
    has_hint: bool,
    hint: Option<String>,
    visited: bool,
}

impl Room {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_owned(),
            description: description.to_owned(),
            ..Default::default()
        }
    }

    pub fn with_enter_message(mut self, message: &str) -> Self {
        self.enter_message = Some(message.to_owned());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
    }

    pub fn enter_message(&self) -> Option<&str> {
        self.enter_message.as_deref()
    }

    pub fn has_trait(&self, name: &str) -> bool {
        self.traits.has(name)
    }

    pub fn trait_value(&self, name: &str) -> Option<&TraitValue> {
        self.traits.get(name)
    }

    pub fn set_trait<V: Into<TraitValue>>(&mut self, name: &str, value: V) {
        self.traits.set(name, value);
    }

    pub fn has_hint(&self) -> bool {
        self.has_hint
    }

    pub fn set_has_hint(&mut self, has_hint: bool) {
        self.has_hint = has_hint;
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    pub fn set_hint(&mut self, hint: &str) {
        self.hint = Some(hint.to_owned());
    }

    pub fn was_visited(&self) -> bool {
        self.visited
    }

    pub fn mark_visited(&mut self) {
        self.visited = true;
    }

    /// Appends to the surface, creating its slot on first use.
    pub fn place(&mut self, surface: &str, item: Item) {
        if let Some((_, items)) = self.surfaces.iter_mut().find(|(name, _)| name == surface) {
            items.push(item);
        } else {
            self.surfaces.push((surface.to_owned(), vec![item]));
        }
    }

    /// Removes the first item with this name, scanning surfaces in
    /// insertion order. Returns the surface it was lifted from.
    pub fn remove_named(&mut self, name: &str) -> Option<(String, Item)> {
        for (surface, items) in self.surfaces.iter_mut() {
            if let Some(index) = items.iter().position(|item| item.name() == name) {
                return Some((surface.clone(), items.remove(index)));
            }
        }
        None
    }

    /// Removes the first item with this name from the given surface only.
    pub fn remove_from(&mut self, surface: &str, name: &str) -> Option<Item> {
        let (_, items) = self.surfaces.iter_mut().find(|(s, _)| s == surface)?;
        let index = items.iter().position(|item| item.name() == name)?;
        Some(items.remove(index))
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.get_item(name).is_some()
    }

    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.all_items().into_iter().find(|item| item.name() == name)
    }

    pub fn get_item_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.surfaces
            .iter_mut()
            .flat_map(|(_, items)| items.iter_mut())
            .find(|item| item.name() == name)
    }

    pub fn items_on(&self, surface: &str) -> &[Item] {
        self.surfaces
            .iter()
            .find(|(name, _)| name == surface)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    pub fn all_items(&self) -> Vec<&Item> {
        self.surfaces
            .iter()
            .flat_map(|(_, items)| items.iter())
            .collect()
    }

    pub fn is_cleared(&self) -> bool {
        self.surfaces.iter().all(|(_, items)| items.is_empty())
    }

    pub fn connect(&mut self, direction: &str, to: &str) {
        self.exits.push((direction.to_owned(), to.to_owned()));
    }

    pub fn can_go(&self, direction: &str) -> bool {
        self.exit_to(direction).is_some()
    }

    pub fn exit_to(&self, direction: &str) -> Option<&str> {
        self.exits
            .iter()
            .find(|(dir, _)| dir == direction)
            .map(|(_, to)| to.as_str())
    }

    pub fn neighbor_list(&self) -> Vec<&str> {
        self.exits.iter().map(|(dir, _)| dir.as_str()).collect()
    }

    /// One clause per occupied surface, in surface insertion order.
    pub fn surface_clauses(&self) -> Vec<String> {
        self.surfaces
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(surface, items)| {
                format!(
                    "on the {}: {}",
                    surface,
                    items.iter().map(|item| item.name()).join(", ")
                )
            })
            .collect()
    }

    pub fn exits_clause(&self) -> Option<String> {
        if self.exits.is_empty() {
            return None;
        }
        Some(format!("you can go - {}", self.neighbor_list().iter().join(", ")))
    }

    /// Base description, occupied surfaces, then exits, joined with ", ".
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.description.is_empty() {
            parts.push(self.description.clone());
        }
        parts.extend(self.surface_clauses());
        if let Some(exits) = self.exits_clause() {
            parts.push(exits);
        }
        parts.join(", ")
    }
}

/// The one player of a session. Pure holder and queries; relocation is
/// mediated by the world so events fire on the session bus.
#[derive(Debug, Default)]
pub struct Player {
    current_room: Option<String>,
    inventory: Vec<Item>,
    worn: Vec<Item>,
}

impl Player {
    pub fn room(&self) -> Option<&str> {
        self.current_room.as_deref()
    }

    pub fn set_room(&mut self, room: &str) {
        self.current_room = Some(room.to_owned());
    }

    pub fn has_backpack(&self) -> bool {
        self.worn.iter().any(|item| item.name() == BACKPACK_NAME)
    }

    pub fn has_item(&self, name: &str) -> bool {
        self.get_item(name).is_some()
    }

    pub fn get_item(&self, name: &str) -> Option<&Item> {
        self.inventory.iter().find(|item| item.name() == name)
    }

    pub fn get_item_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.inventory.iter_mut().find(|item| item.name() == name)
    }

    pub fn carry(&mut self, item: Item) {
        self.inventory.push(item);
    }

    pub fn remove_item(&mut self, name: &str) -> Option<Item> {
        let index = self.inventory.iter().position(|item| item.name() == name)?;
        Some(self.inventory.remove(index))
    }

    pub fn put_on(&mut self, item: Item) {
        self.worn.push(item);
    }

    pub fn inventory(&self) -> &[Item] {
        &self.inventory
    }

    pub fn worn(&self) -> &[Item] {
        &self.worn
    }

    pub fn worn_item(&self, name: &str) -> Option<&Item> {
        self.worn.iter().find(|item| item.name() == name)
    }

    pub fn worn_item_mut(&mut self, name: &str) -> Option<&mut Item> {
        self.worn.iter_mut().find(|item| item.name() == name)
    }
}
