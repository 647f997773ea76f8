pub mod cli;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod parser;
pub mod services;
pub mod startup;
pub mod store;
pub mod validation;

pub use handlers::{
    create_engine_app, create_mmo_app, create_proxy_app, create_token_app, EngineState, MmoState,
    ProxyState, TokenState,
};
