pub mod active;
pub mod init;
pub mod score;
pub mod unlock;
pub mod validate;
