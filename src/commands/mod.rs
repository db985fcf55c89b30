pub mod builtins;
pub mod external;
pub mod registry;

pub use external::{spawn, wait};
pub use registry::{BuiltinCommand, BuiltinContext, Flow, BUILTINS};
