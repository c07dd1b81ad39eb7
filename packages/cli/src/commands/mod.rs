pub mod generate;
pub mod init;
pub mod serve;
pub mod slots;

pub use generate::{generate, reset, GenerateArgs, SlotArgs};
pub use init::{init, InitArgs};
pub use serve::{serve, ServeArgs};
pub use slots::{backups, delete, list_slots, show, SlotsArgs};
