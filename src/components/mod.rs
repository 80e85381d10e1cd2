pub mod files;
pub mod network_map;
pub mod session;
pub mod sidebar;
