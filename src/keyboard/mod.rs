pub mod display;
pub mod finger;
pub mod layout;
