pub mod document;
pub mod session;
pub mod sweep;
