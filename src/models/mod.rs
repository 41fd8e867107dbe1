pub mod location;
pub mod member;
pub mod notification;
pub mod session;
pub mod trip;
pub mod user;
