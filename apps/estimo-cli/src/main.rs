//! # estimo
//!
//! Entry point for the `estimo` binary. The setup lives in lib.rs so the
//! commands can be tested without a process.

#[tokio::main]
async fn main() {
    let code = estimo_cli::run().await;
    std::process::exit(code);
}
