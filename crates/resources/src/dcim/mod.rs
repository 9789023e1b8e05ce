//! DCIM resources (Regions)

pub mod region;
