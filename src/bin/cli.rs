use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    reviewdb::cli::run().await
}
