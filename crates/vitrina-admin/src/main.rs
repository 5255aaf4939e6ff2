//! Vitrina Admin - Native entry point

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::{Context, Result};
    use clap::Parser;
    use std::path::PathBuf;
    use tracing::{info, Level};
    use tracing_subscriber::FmtSubscriber;
    use vitrina_admin::{app, config, file_picker};

    #[derive(Parser, Debug)]
    #[command(name = "vitrina")]
    #[command(about = "Bind catalog materials to 3D model meshes and publish presets")]
    #[command(version)]
    struct Args {
        /// Path to configuration file
        #[arg(short, long, default_value = "vitrina.toml")]
        config: PathBuf,

        /// Backend base URL (overrides [api] base_url)
        #[arg(short, long)]
        api: Option<String>,

        /// Local GLB to upload at start-up
        #[arg(short, long)]
        model: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber).context("Failed to install logger")?;

        info!("Vitrina v{}", env!("CARGO_PKG_VERSION"));

        let mut config = config::load_config(&args.config)?;
        if let Some(api) = args.api {
            config.api.base_url = api;
        }

        info!(
            api = %config.api.base_url,
            materials = %config.materials.base_path,
            "Configuration loaded"
        );

        let mut startup_files = Vec::new();
        if let Some(path) = &args.model {
            let picked = file_picker::read_local_file(path)
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("Cannot open model {}", path.display()))?;
            startup_files.push(Ok(picked));
        }

        app::run(config, startup_files);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

// The browser build starts from the library's wasm_bindgen entry point
#[cfg(target_arch = "wasm32")]
fn main() {}
