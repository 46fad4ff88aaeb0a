//! Headless client core for the NearByAid map.
//!
//! A UI shell drives a [`MapSession`]: it locates the device, fetches help
//! points around it through [`AidClient`], and narrows what is shown with
//! the category/SOS overlay without going back to the network.

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod geolocation;
pub mod overlay;
pub mod session;

pub use api::{AidClient, RequestContext};
pub use config::ClientConfig;
pub use error::ClientError;
pub use overlay::OverlayState;
pub use session::MapSession;
