//! Handle-addressed containers shared by the engine.

mod fixed_handle_map;
mod handle_names;
mod object_pool;
mod set_difference;
mod shuffled_membership;
mod shuffled_set;

pub use fixed_handle_map::FixedHandleMap;
pub use handle_names::HandleNames;
pub use object_pool::ObjectPool;
pub use set_difference::{visit_set_difference, SetSide};
pub use shuffled_membership::ShuffledMembership;
pub use shuffled_set::ShuffledSet;
