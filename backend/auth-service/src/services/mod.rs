pub mod auth;
pub mod events;
pub mod store;

pub use auth::AuthService;
pub use events::{EventPublisher, RabbitPublisher};
pub use store::{PgUserStore, UserStore};
