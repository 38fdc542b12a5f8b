pub mod images;
pub mod staging;
pub mod webhook;
