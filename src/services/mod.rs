pub mod accounts;
pub mod maintenance;

pub use accounts::{find_email, login, logout, re_login, signup, status, submit_email};
pub use maintenance::{spawn_sweeper, sweep};
