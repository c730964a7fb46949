pub mod dispatch;
pub mod health;

pub use self::dispatch::dispatch;
pub use self::health::health;
