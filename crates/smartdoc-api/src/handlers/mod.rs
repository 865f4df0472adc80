pub mod download;
pub mod health;
pub mod preview;
pub mod process;
pub mod upload;
