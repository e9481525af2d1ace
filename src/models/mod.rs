pub mod requests;
pub mod responses;

pub use requests::{Credentials, FindEmailRequest, ReLoginRequest, SubmitEmailRequest};
pub use responses::{game_updated_event, StatusResponse};
