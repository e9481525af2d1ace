pub mod broadcast;
pub mod constants;
pub mod game;
pub mod session;
pub mod traits;
pub mod user;

pub use broadcast::{Broadcaster, Subscription};
pub use constants::*;
pub use game::{Game, GameRegistry, Seat};
pub use session::{Session, SessionRegistry};
pub use traits::{BroadcastService, GameService, PasswordService, SessionStore, UserStore};
pub use user::{User, UserDirectory, UsernameTaken};
