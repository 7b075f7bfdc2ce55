use log::error;
use pantry_chef::{AppConfig, PipelineResult, RecipeGenerator};
use std::env;
use std::process::ExitCode;

const USAGE: &str = "Usage: pantry-chef [serve | generate <image-path>]";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Get the command from command-line arguments
    let args: Vec<String> = env::args().skip(1).collect();
    let outcome = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["serve"] => pantry_chef::server::serve(&config)
            .await
            .map_err(|e| e.to_string()),
        ["generate", path] => generate(&config, path).await,
        _ => Err(USAGE.to_string()),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("{}", message);
            ExitCode::FAILURE
        }
    }
}

async fn generate(config: &AppConfig, path: &str) -> Result<(), String> {
    let result = RecipeGenerator::builder()
        .config(config.completion.clone())
        .image_file(path)
        .build()
        .await
        .map_err(|e| e.to_string())?;

    match result {
        PipelineResult::Recipes(recipes) => {
            let json = serde_json::to_string_pretty(&recipes).map_err(|e| e.to_string())?;
            println!("{}", json);
            Ok(())
        }
        PipelineResult::Message(text) => {
            println!("{}", text);
            Ok(())
        }
        PipelineResult::Failed(failure) => Err(format!("{} ({})", failure, failure.kind)),
    }
}
