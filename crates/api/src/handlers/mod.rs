pub mod calls;
pub mod health;
pub mod hooks;
pub mod two_factor;
