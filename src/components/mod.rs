pub mod dialogs;
pub mod drop_zone;
