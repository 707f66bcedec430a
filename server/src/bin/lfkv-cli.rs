use std::process::ExitCode;

use lfkv_server::client::{self, ADDR_VAR};
use lfkv_server::ClientError;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args).await {
        Ok(response) => {
            println!("{response}");
            ExitCode::SUCCESS
        }
        Err(error @ ClientError::Usage { .. }) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("CLI error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &[String]) -> Result<String, ClientError> {
    let request = client::request_line(args)?;
    let addr = client::server_addr(std::env::var(ADDR_VAR).ok())?;
    client::send(addr, &request).await
}
