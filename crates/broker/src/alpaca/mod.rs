mod auth;
mod broker;
mod open_orders;

pub use auth::AlpacaAuthEnv;
pub use broker::AlpacaBroker;
