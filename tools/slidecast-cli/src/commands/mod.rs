pub mod check;
pub mod export;
pub mod info;
pub mod init;
pub mod render;
pub mod templates;
pub mod validate;
