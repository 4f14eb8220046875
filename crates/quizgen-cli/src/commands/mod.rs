pub mod init;
pub mod list_models;
pub mod play;
pub mod topics;
pub mod validate;
