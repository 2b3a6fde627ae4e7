//! `inkwell` binary entrypoint.

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = inkwell_cli::run().await;
    std::process::exit(code);
}
