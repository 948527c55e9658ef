pub mod admin;
pub mod health;

pub use self::health::health;
