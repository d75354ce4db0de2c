use gestura_base::{init_file_logger, init_stdout_logger, log};
use gestura_camera::V4l2Probe;
use gestura_com::{GestureService, Server};
use gestura_core::SharedPrediction;
use gestura_web::{OnnxPipelineFactory, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    match &config.log_dir {
        Some(dir) => init_file_logger(dir)?,
        None => init_stdout_logger(),
    }

    for model in [
        &config.palm_model,
        &config.landmark_model,
        &config.classifier_model,
    ] {
        if !model.exists() {
            log::warn!("model {} not found, video sessions will fail", model.display());
        }
    }
    log::info!(
        "inference on {}, tie-break {}, probing {} cameras",
        config.device,
        config.tie_break,
        config.max_cameras
    );

    let service = GestureService::new(
        OnnxPipelineFactory::new(&config),
        V4l2Probe,
        SharedPrediction::new(),
    )
    .with_max_cameras(config.max_cameras)
    .with_max_sessions(config.max_sessions);
    let server = Server::bind(config.addr, service).await?;
    log::info!("serving on http://{}", server.local_addr());

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    Ok(())
}
