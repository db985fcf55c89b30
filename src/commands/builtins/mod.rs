mod exit;
mod ptime;

pub use exit::ExitCommand;
pub use ptime::PtimeCommand;
