//! # bytecraft-pe
//!
//! Windows Portable Executable header decoding on top of `bytecraft` schemas.
//!
//! [headers] declares the PE32 structures (DOS header, NT headers, section
//! header) as schemas; [image::PeImage] locates and decodes them in a complete
//! file buffer. Only x86 images are accepted; other architectures are reported
//! as [errors::PeError::UnsupportedMachine] rather than a format error.
//!
//! ```no_run
//! use bytecraft_pe::PeImage;
//!
//! let image = PeImage::from_readable("example.exe").unwrap();
//! println!("{}", image.render());
//! ```

pub mod errors;
pub mod headers;
pub mod image;
pub mod io;
pub mod machine;

pub use errors::{PeError, Result};
pub use image::PeImage;
pub use io::{Readable, Writable};
pub use machine::Machine;
