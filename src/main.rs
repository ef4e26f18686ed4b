#[tokio::main]
async fn main() {
    if let Err(e) = eyeclinic_lib::run().await {
        tracing::error!("{e}");
        eprintln!("eyeclinic: {e}");
        std::process::exit(1);
    }
}
