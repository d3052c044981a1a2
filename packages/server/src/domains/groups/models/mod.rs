mod group;
mod membership;

pub use group::*;
pub use membership::*;
