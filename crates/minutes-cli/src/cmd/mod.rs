pub mod board;
pub mod extract;
pub mod init;
pub mod serve;
