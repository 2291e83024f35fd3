pub mod capability;
pub mod device;
pub mod output;
