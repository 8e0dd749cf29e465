//! Reader for MPQ game archives and the assets bundled inside them.
//!
//! The archive layer materialises the encrypted hash and block tables
//! once at open time and then serves read-only name lookups and file
//! extractions against any `Read + Seek` byte source. On top of it sit
//! decoders for two asset types commonly stored in these archives:
//! BLP2 textures (DXT1 encoding only) and binary glTF descriptors.

pub(crate) mod compression;
pub(crate) mod consts;
pub(crate) mod header;
pub(crate) mod seeker;
pub(crate) mod table;
pub(crate) mod util;

pub mod archive;
pub mod blp;
pub mod crypto;
pub mod dxt1;
pub mod error;
pub mod glb;

pub use archive::Archive;
pub use dxt1::Image;
pub use error::Error;
