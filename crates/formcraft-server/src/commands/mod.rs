//! Built-in commands of the `formcraft` binary.

pub mod check;
pub mod serve;
pub mod token;

pub use check::CheckCommand;
pub use serve::ServeCommand;
pub use token::TokenCommand;

use crate::command::CommandRegistry;

/// Registers every built-in command.
pub fn register_builtin_commands(registry: &mut CommandRegistry) {
    registry.register(Box::new(ServeCommand));
    registry.register(Box::new(TokenCommand));
    registry.register(Box::new(CheckCommand));
}
