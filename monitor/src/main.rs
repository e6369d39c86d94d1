mod client;
mod host;
mod poller;
mod reconciler;
mod render;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
