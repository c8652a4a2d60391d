pub mod ops;
pub mod paths;

pub use ops::FileOps;
pub use paths::PathAuthority;
