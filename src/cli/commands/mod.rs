pub mod admins;
pub mod sign;
pub mod token;
