pub mod auth;
pub mod conversations;
pub mod dashboard;
pub mod drafts;
pub mod form;
pub mod health;
pub mod results;
pub mod simulations;
pub mod submissions;
