//! EnergySense: household energy billing for African tariffs, with
//! forecasting, live usage simulation and an LLM assistant.

pub mod analytics;
pub mod api;
pub mod assistant;
pub mod billing;
pub mod config;
pub mod controller;
pub mod domain;
pub mod forecast;
pub mod household;
pub mod physics;
pub mod simulation;
pub mod telemetry;
pub mod validation;
