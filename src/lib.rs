//! Embed and recover invisible text stamps in images via LSB steganography.
//!
//! A stamp is a short UTF-8 text written into the least significant bit of
//! each RGB channel byte, prefixed by a 32-bit header holding its length in
//! bits. Changing only bit 0 alters a channel value by at most one, which is
//! invisible to the eye. The stamp survives lossless re-encoding (PNG) but
//! not lossy recompression, cropping or resizing.
//!
//! # Quick Start
//!
//! ```no_run
//! use hidden_stamp::{StampEngine, StampOptions};
//!
//! let engine = StampEngine::new(&StampOptions::default()).expect("valid stamp text");
//! let mut img = image::open("photo.jpg").unwrap().to_rgb8();
//! engine.stamp_image(&mut img).expect("image large enough");
//! img.save("photo_stamped.png").unwrap();
//! ```
//!
//! # Raw buffers
//!
//! The codec itself works on any raw RGB buffer:
//!
//! ```
//! let mut pixels = vec![0u8; 1000];
//! hidden_stamp::embed(&mut pixels, "HiddenStamp").unwrap();
//! assert_eq!(hidden_stamp::extract(&pixels).unwrap(), "HiddenStamp");
//! ```

#![deny(missing_docs)]

pub mod bits;
pub mod codec;
mod engine;
pub mod error;
pub mod validation;

pub use codec::{embed, embed_with_layout, extract, extract_with_layout, PixelLayout};
pub use engine::{
    batch_output_paths, decode_rgb, encode_png, is_stamped_output, stamped_output_path,
    ProcessResult, StampEngine, StampOptions, Verification, VerifyResult,
};
pub use error::{Error, Result};
