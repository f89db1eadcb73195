pub mod deployment;
pub mod disk;
pub mod group;
pub mod image;
pub mod nic;
pub mod providers;
pub mod role;
pub mod vm;
