pub mod write_service;
