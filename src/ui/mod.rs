pub mod step_bar;
pub mod terminal_guard;

pub use step_bar::{StepBar, StepStyle};
pub use terminal_guard::{install_panic_hook, TerminalGuard};
