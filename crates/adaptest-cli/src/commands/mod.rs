pub mod domains;
pub mod exam;
pub mod init;
pub mod render;
pub mod validate;
