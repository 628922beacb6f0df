pub mod avatar;
pub mod extract;
pub mod hash;
pub mod jwt;
pub mod ownership;
pub mod session;
pub mod text;
