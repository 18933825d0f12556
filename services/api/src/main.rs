use praxis_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("praxis error: {err}");
        std::process::exit(1);
    }
}
