//! Stamp a single image, then read the stamp back.
//!
//! Usage:
//! ```sh
//! cargo run --example stamp_image -- input.jpg "my text"
//! ```

use std::env;
use std::path::Path;
use std::process;

use hidden_stamp::{stamped_output_path, StampEngine, StampOptions};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <input> [text]", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);
    let opts = StampOptions {
        text: args.get(2).cloned().unwrap_or_default(),
        ..StampOptions::default()
    };

    let engine = StampEngine::new(&opts).expect("stamp text within limits");
    let output = stamped_output_path(input, None);
    let result = engine.stamp_file(input, &output);
    if !result.success {
        eprintln!("Error: {}", result.message);
        process::exit(1);
    }

    let verified = engine.verify_file(&output);
    match verified.verification.text {
        Some(text) => println!("Stamped {} with {text:?}", output.display()),
        None => {
            eprintln!("Error: stamp not readable from {}", output.display());
            process::exit(1);
        }
    }
}
