//! Interactive shell: stdin lines go to the session, output lines to stdout.

use color_eyre::eyre::Result;
use colored::Colorize;
use std::sync::Arc;
use tfd_client::{HttpApi, ShellController};
use tfd_protocol::shell_models::ShellMessage;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(api: Arc<HttpApi>, target: &str) -> Result<()> {
    let mut controller = ShellController::new(api);
    controller.open(target).await?;
    eprintln!("{}", format!("Connected to {target}. Ctrl-D to exit.").dimmed());

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            message = controller.next_message() => match message {
                Some(Ok(ShellMessage::Line(line))) => println!("{line}"),
                Some(Ok(ShellMessage::Close)) | None => {
                    eprintln!("{}", "Session closed".dimmed());
                    return Ok(());
                }
                Some(Err(e)) => {
                    controller.close().await;
                    return Err(e.into());
                }
            },
            line = stdin.next_line() => match line? {
                Some(line) => {
                    controller.send_line(&line).await?;
                }
                None => {
                    controller.close().await;
                    return Ok(());
                }
            },
        }
    }
}
