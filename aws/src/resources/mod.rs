pub mod network_interface;
pub mod tags;

pub use network_interface::NetworkInterfaceResource;
