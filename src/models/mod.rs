pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderDetail};
pub use product::Product;
pub use user::User;
