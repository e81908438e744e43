pub mod dto;
pub mod engine;
pub mod scenario_service;
