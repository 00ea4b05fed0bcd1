pub mod completer;
pub mod progress;
