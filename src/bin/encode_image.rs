//! Helper bin: print a file's Base64 for hand-testing the endpoint.
//!
//! ```text
//! encode_image face.jpg | jq -R '{image: .}' | curl -d @- \
//!     -H 'content-type: application/json' localhost:3000/api/analyze_emotion
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::process::exit;

fn main() {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: encode_image <image-file>");
        exit(1);
    };

    match std::fs::read(&path) {
        Ok(bytes) => println!("{}", STANDARD.encode(bytes)),
        Err(e) => {
            eprintln!("failed to read {}: {}", path, e);
            exit(1);
        }
    }
}
