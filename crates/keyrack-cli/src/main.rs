//! Binary entrypoint for the Keyrack CLI.

#[tokio::main]
async fn main() {
    let exit_code = keyrack_cli::run().await;
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}
