//! Console client: send a name, then relay stdin to the server and print
//! whatever comes back.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use chat_relay::error::ChatError;

const DEFAULT_ADDR: &str = "127.0.0.1:1234";

#[tokio::main]
async fn main() -> Result<(), ChatError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let addr = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    println!("enter your username");
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let Some(name) = stdin.next_line().await? else {
        return Ok(());
    };

    let stream = TcpStream::connect(&addr).await?;
    debug!(addr = %addr, "connected");
    let (reader, mut writer) = stream.into_split();
    writer.write_all(format!("{name}\n").as_bytes()).await?;

    let mut incoming = BufReader::new(reader).lines();
    loop {
        tokio::select! {
            line = incoming.next_line() => match line? {
                Some(line) => println!("{line}"),
                None => break, // server closed the connection
            },
            input = stdin.next_line() => match input? {
                Some(input) => writer.write_all(format!("{input}\n").as_bytes()).await?,
                None => break,
            },
        }
    }

    Ok(())
}
