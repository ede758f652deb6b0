pub mod code;
pub mod compiler;
