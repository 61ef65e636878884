pub mod alert;
pub mod browse_use_case;
pub mod contribute_use_case;
pub mod ports;
