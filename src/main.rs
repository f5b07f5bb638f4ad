#[tokio::main]
async fn main() {
    if let Err(error) = classboard::run().await {
        eprintln!("classboard: {error}");
        std::process::exit(1);
    }
}
