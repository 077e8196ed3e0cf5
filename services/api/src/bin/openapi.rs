//! services/api/src/bin/openapi.rs
//!
//! This binary renders the OpenAPI 3.0 specification for the REST API to a
//! JSON file, for clients that want the contract without running the server.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

/// Written when no output path is given on the command line.
const DEFAULT_OUT_PATH: &str = "openapi.json";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let out_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_OUT_PATH.to_string());

    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(&out_path, spec_json)?;
    println!("✅ OpenAPI specification generated at {}", out_path);
    Ok(())
}
