pub mod caller;

pub use caller::{AdminCaller, USER_ID_HEADER};
