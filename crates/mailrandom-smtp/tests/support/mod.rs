//! Scripted SMTP server for exercising the client over a real socket.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One exchange: the command the client must send and the raw reply.
pub enum Step {
    /// Expect a command line starting with the prefix, answer with `reply`.
    Command(&'static str, &'static str),
    /// Read message data up to the lone `.` line, answer with `reply`.
    Message(&'static str),
}

/// Binds a loopback listener and serves one scripted session.
///
/// The handle resolves to every line the client sent, in order.
pub async fn serve(greeting: &'static str, script: Vec<Step>) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        let mut received = Vec::new();

        write.write_all(greeting.as_bytes()).await.unwrap();
        for step in script {
            match step {
                Step::Command(prefix, reply) => {
                    let line = next_line(&mut reader).await;
                    assert!(
                        line.starts_with(prefix),
                        "expected {prefix:?}, client sent {line:?}"
                    );
                    received.push(line);
                    write.write_all(reply.as_bytes()).await.unwrap();
                }
                Step::Message(reply) => {
                    loop {
                        let line = next_line(&mut reader).await;
                        let done = line == ".";
                        received.push(line);
                        if done {
                            break;
                        }
                    }
                    write.write_all(reply.as_bytes()).await.unwrap();
                }
            }
        }
        received
    });

    (port, handle)
}

async fn next_line<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> String {
    let mut line = String::new();
    reader.read_line(&mut line).await.unwrap();
    line.trim_end_matches(['\r', '\n']).to_string()
}
