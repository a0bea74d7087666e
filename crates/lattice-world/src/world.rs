//! Immutable registry of every named category used by a grid.

use lattice_core::collections::{FixedHandleMap, HandleNames};
use lattice_core::{Contact, Group, Hit, Layer, Sprite, State, Update, WorldArgs};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

/// Resolved description of a state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateData {
    pub layer: Layer,
    pub sprite: Sprite,
    /// Sorted and unique
    pub groups: Vec<Group>,
    pub contact: Contact,
}

/// Resolved description of a hit type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HitData {
    pub layer: Layer,
    pub sprite: Sprite,
}

/// Name registries plus the per-state and per-hit records built from them.
///
/// Layers are ordered so that the first `num_render_layers` are exactly the
/// render order; any other layer is occupancy-only.
#[derive(Debug, Clone)]
pub struct World {
    states: HandleNames<State>,
    state_data: FixedHandleMap<State, StateData>,
    hits: HandleNames<Hit>,
    hit_data: FixedHandleMap<Hit, HitData>,
    layers: HandleNames<Layer>,
    sprites: HandleNames<Sprite>,
    groups: HandleNames<Group>,
    contacts: HandleNames<Contact>,
    updates: HandleNames<Update>,
    update_functions: FixedHandleMap<Update, String>,
    out_of_bounds_sprite: Sprite,
    out_of_view_sprite: Sprite,
    num_render_layers: usize,
    empty_state: StateData,
}

fn non_empty(name: &Option<String>) -> Option<&str> {
    name.as_deref().filter(|n| !n.is_empty())
}

fn ordered_unique(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}

impl World {
    pub fn new(args: &WorldArgs) -> Self {
        let mut sprite_names = args.custom_sprites.clone();
        let mut referenced_layers = BTreeSet::new();
        let mut group_names = Vec::new();
        let mut contact_names = Vec::new();

        for name in [&args.out_of_bounds_sprite, &args.out_of_view_sprite] {
            if let Some(sprite) = non_empty(name) {
                sprite_names.push(sprite.to_string());
            }
        }
        for hit in args.hits.values() {
            if let Some(sprite) = non_empty(&hit.sprite) {
                sprite_names.push(sprite.to_string());
            }
            if let Some(layer) = non_empty(&hit.layer) {
                referenced_layers.insert(layer.to_string());
            }
        }
        for state in args.states.values() {
            group_names.extend(state.groups.iter().cloned());
            if let Some(sprite) = non_empty(&state.sprite) {
                sprite_names.push(sprite.to_string());
            }
            if let Some(layer) = non_empty(&state.layer) {
                referenced_layers.insert(layer.to_string());
            }
            if let Some(contact) = non_empty(&state.contact) {
                contact_names.push(contact.to_string());
            }
        }

        let mut layer_names = Vec::with_capacity(referenced_layers.len());
        for name in &args.render_order {
            referenced_layers.remove(name);
            layer_names.push(name.clone());
        }
        layer_names.extend(referenced_layers);

        let layers = HandleNames::new(layer_names);
        let sprites = HandleNames::new(ordered_unique(sprite_names));
        let groups = HandleNames::new(ordered_unique(group_names));
        let contacts = HandleNames::new(ordered_unique(contact_names));
        let states = HandleNames::new(args.states.keys().cloned().collect());
        let hits = HandleNames::new(args.hits.keys().cloned().collect());
        let updates = HandleNames::new(
            args.update_order
                .iter()
                .map(|order| order.name.clone())
                .collect(),
        );
        let update_functions = args
            .update_order
            .iter()
            .map(|order| {
                if order.function.is_empty() {
                    order.name.clone()
                } else {
                    order.function.clone()
                }
            })
            .collect();

        let resolve_layer = |name: &Option<String>| {
            non_empty(name).map_or(Layer::EMPTY, |n| layers.to_handle(n))
        };
        let resolve_sprite = |name: &Option<String>| {
            non_empty(name).map_or(Sprite::EMPTY, |n| sprites.to_handle(n))
        };

        let state_data = args
            .states
            .values()
            .map(|state| StateData {
                layer: resolve_layer(&state.layer),
                sprite: resolve_sprite(&state.sprite),
                groups: groups.to_handles(&state.groups),
                contact: non_empty(&state.contact).map_or(Contact::EMPTY, |n| contacts.to_handle(n)),
            })
            .collect();
        let hit_data = args
            .hits
            .values()
            .map(|hit| HitData {
                layer: resolve_layer(&hit.layer),
                sprite: resolve_sprite(&hit.sprite),
            })
            .collect();

        let out_of_bounds_sprite = resolve_sprite(&args.out_of_bounds_sprite);
        let out_of_view_sprite = resolve_sprite(&args.out_of_view_sprite);

        let world = Self {
            states,
            state_data,
            hits,
            hit_data,
            layers,
            sprites,
            groups,
            contacts,
            updates,
            update_functions,
            out_of_bounds_sprite,
            out_of_view_sprite,
            num_render_layers: args.render_order.len(),
            empty_state: StateData::default(),
        };
        debug!(
            states = world.states.len(),
            layers = world.layers.len(),
            render_layers = world.num_render_layers,
            sprites = world.sprites.len(),
            groups = world.groups.len(),
            "World registry built"
        );
        world
    }

    pub fn states(&self) -> &HandleNames<State> {
        &self.states
    }

    /// Resolved record for `state`. Unknown or empty states resolve to a
    /// record with no layer, sprite, groups or contact.
    pub fn state_data(&self, state: State) -> &StateData {
        self.state_data.get(state).unwrap_or(&self.empty_state)
    }

    pub fn hits(&self) -> &HandleNames<Hit> {
        &self.hits
    }

    pub fn hit_data(&self, hit: Hit) -> HitData {
        self.hit_data.get(hit).copied().unwrap_or_default()
    }

    pub fn layers(&self) -> &HandleNames<Layer> {
        &self.layers
    }

    pub fn sprites(&self) -> &HandleNames<Sprite> {
        &self.sprites
    }

    pub fn groups(&self) -> &HandleNames<Group> {
        &self.groups
    }

    pub fn contacts(&self) -> &HandleNames<Contact> {
        &self.contacts
    }

    pub fn updates(&self) -> &HandleNames<Update> {
        &self.updates
    }

    /// Name of the function bound to `update`.
    pub fn update_function(&self, update: Update) -> Option<&str> {
        self.update_functions.get(update).map(String::as_str)
    }

    pub fn out_of_bounds_sprite(&self) -> Sprite {
        self.out_of_bounds_sprite
    }

    pub fn out_of_view_sprite(&self) -> Sprite {
        self.out_of_view_sprite
    }

    pub fn num_render_layers(&self) -> usize {
        self.num_render_layers
    }
}
