pub mod game;
pub mod identifier;
pub mod review;

pub use game::Game;
pub use identifier::{is_valid_id, string_to_id, Identifier, IdentifierError};
pub use review::Review;
