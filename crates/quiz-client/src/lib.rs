pub mod controller;
pub mod net_client;
pub mod transport;

#[cfg(feature = "native")]
pub mod reconnect;

#[cfg(feature = "native")]
pub mod ws_transport;

#[cfg(test)]
pub(crate) mod mock;
