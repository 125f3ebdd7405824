//! Infrastructure layer - storage backends, services and logging

pub mod logging;
pub mod pix_key;
