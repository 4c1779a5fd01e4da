pub mod default_route;
pub mod findings_route;
