#![allow(dead_code)]

pub mod connect_proxy;
pub mod scripted;
pub mod status_server;
