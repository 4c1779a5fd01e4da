pub mod findings_sink;
pub mod registry_client;
pub mod scan_driver;
pub mod scan_scheduler;

pub use findings_sink::*;
pub use registry_client::*;
pub use scan_driver::*;
pub use scan_scheduler::*;
