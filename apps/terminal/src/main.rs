#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kr_en_drill::run().await
}
