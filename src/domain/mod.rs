pub mod company;
pub mod distress;
pub mod scan;
pub mod sic_code;
