#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = examportal_rust::run().await {
        eprintln!("examportal-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
