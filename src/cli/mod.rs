mod ask;
mod export;
mod history;
mod root;

pub use ask::AskCommand;
pub use export::ExportCommand;
pub use history::{ClearCommand, ListCommand, ShowCommand};
pub use root::Cli;
