use lambda_http::Error;
use log::info;

mod error;
mod handlers;
mod resource;
mod routes;
mod validation;

#[cfg(test)]
mod tests;

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("Starting wedding API service");

    let router = routes::create_router().await?;

    lambda_http::run(router).await
}
