//! Domain models returned by repositories and serialized in API responses.

pub mod category;
pub mod plant;
pub mod session;
pub mod user;

pub use category::{Category, CategoryInput, CategoryWithCount};
pub use plant::{Plant, PlantInput, PlantSummary};
pub use session::{CurrentUser, session_keys};
pub use user::User;
