use auth_server::{init_tracing, shutdown_tracing, AuthServerConfig, ServerBuilder};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = match AuthServerConfig::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.log_level, config.logging.log_path.as_deref());

    let server = match ServerBuilder::new(config).build().await {
        Ok(server) => server,
        Err(err) => {
            tracing::error!(error = %err, "failed to build server");
            std::process::exit(1);
        }
    };

    if let Err(err) = server.run().await {
        tracing::error!(error = %err, "server error");
    }

    shutdown_tracing();
}
