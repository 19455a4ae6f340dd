pub mod event;
pub mod history;
pub mod session;
pub mod step;
pub mod timer;
