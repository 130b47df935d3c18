pub mod client;
pub mod factory;
pub mod rest;
pub mod xmlrpc;
