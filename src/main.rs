use confluence_qa::{config, logging, pipeline::Pipeline};
use std::io;

#[tokio::main]
async fn main() {
    logging::init_tracing();

    let config = match config::load() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error}");
            eprintln!(
                "Please set: CONFLUENCE_URL, CONFLUENCE_USERNAME, CONFLUENCE_API_TOKEN, OPENAI_API_KEY"
            );
            return;
        }
    };

    let pipeline = match Pipeline::new(&config) {
        Ok(pipeline) => pipeline,
        Err(error) => {
            eprintln!("Error: {error}");
            return;
        }
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    if let Err(error) = pipeline.run(&mut input, &mut output).await {
        tracing::error!(error = %error, "Console I/O failed");
    }
}
