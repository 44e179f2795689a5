// Utility modules

pub mod encode;
pub mod launch;
pub mod path;
