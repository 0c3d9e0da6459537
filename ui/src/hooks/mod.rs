pub mod use_coordinator;
