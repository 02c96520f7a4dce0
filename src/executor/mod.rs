mod frame;
mod prelude;
mod runner;
mod value;

pub use frame::ScriptFrame;
pub use prelude::PRELUDE_PATH;
pub use runner::{Interpreter, DEFAULT_MAX_DEPTH};
pub use value::Value;
