use tracing::{error, info};

use cloudstash::{Config, Gateway};
use cloudstash::web::WebServer;

#[tokio::main]
async fn main() {
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = cloudstash::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        cloudstash::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(1);
    }

    info!("Cloudstash starting");
    info!(
        backend = %config.backend.kind,
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    let gateway = match Gateway::from_config(&config.backend) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Failed to create backend client: {e}");
            std::process::exit(1);
        }
    };

    let server = match WebServer::new(&config, gateway) {
        Ok(server) => server,
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!("Web server error: {e}");
        std::process::exit(1);
    }
}
