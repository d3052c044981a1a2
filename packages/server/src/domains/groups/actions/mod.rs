mod change_member_role;
mod create_group;
mod join_group;
mod queries;

pub use change_member_role::change_member_role;
pub use create_group::{create_group, CreateGroupParams};
pub use join_group::join_group;
pub use queries::{group_members, list_groups};
