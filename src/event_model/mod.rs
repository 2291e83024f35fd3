pub mod decoder;
pub mod event;
pub mod slot;
