pub mod check;
pub mod compose;
pub mod configure;
pub mod doctor;
pub mod onboard;
