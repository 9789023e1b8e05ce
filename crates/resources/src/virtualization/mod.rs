//! Virtualization resources (Cluster Types)

pub mod cluster_type;
