//! Sheetmap API Server binary
//!
//! HTTP REST API for spreadsheet import with column mapping.

use clap::Parser;
use sheetmap::api::{run_api_server, ApiConfig};

#[derive(Parser, Debug)]
#[command(name = "sheetmap-server")]
#[command(version)]
#[command(about = "Sheetmap API Server - HTTP REST API for spreadsheet import")]
#[command(long_about = r#"
Sheetmap API Server - HTTP REST API

Endpoints:
  - POST /api/v1/inspect   - List sheets and columns of a spreadsheet
  - POST /api/v1/import    - Map columns onto attributes and return records

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Example usage:
  sheetmap-server                           # Start on localhost:8080
  sheetmap-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/import \
    -H "Content-Type: application/json" \
    -d '{"file_path": "people.xlsx", "attributes": [{"value_key": "name", "title": "Name"}]}'
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "SHEETMAP_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "SHEETMAP_PORT")]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config).await
}
