pub mod booking;
pub mod conflict;
pub mod discovery;
pub mod lifecycle;
pub mod slots;
