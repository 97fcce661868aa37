use anyhow::Result;

use crate::api;
use crate::core::AppConfig;

pub async fn run(host: String, port: String, config: AppConfig) -> Result<()> {
    println!("Serving mock chat backend on http://{}:{}/chat", host, port);
    api::serve(host, port, config).await
}
