pub mod cancel;
pub mod check_in;
pub mod create;
pub mod details;
pub mod init;
pub mod organizer;
pub mod query;
pub mod verify;
