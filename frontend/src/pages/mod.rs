pub mod about;
pub mod locations;
pub mod map;
pub mod poems;
