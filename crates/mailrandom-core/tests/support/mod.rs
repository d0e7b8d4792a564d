//! Canned loopback relay that answers by command verb.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// How the relay introduces itself and what it refuses.
pub struct Relay {
    /// Full EHLO reply, capabilities included.
    pub ehlo: &'static str,
    /// Command prefix to refuse, with the reply sent instead.
    pub reject: Option<(&'static str, &'static str)>,
}

impl Relay {
    /// Accepts one session on a loopback port.
    ///
    /// The handle resolves to every line the client sent, message data
    /// included, once the client quits or disconnects.
    pub async fn start(self) -> (u16, JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let handle = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            let (read, mut write) = socket.into_split();
            let mut reader = BufReader::new(read);
            let mut received = Vec::new();

            write.write_all(b"220 relay.test ESMTP\r\n").await.unwrap();
            while let Some(line) = next_line(&mut reader).await {
                let refused = self
                    .reject
                    .filter(|(prefix, _)| line.starts_with(prefix))
                    .map(|(_, reply)| reply);
                let verb = line.split(' ').next().unwrap_or_default().to_ascii_uppercase();
                received.push(line);

                let reply = match (refused, verb.as_str()) {
                    (Some(reply), _) => reply,
                    (None, "EHLO") => self.ehlo,
                    (None, "AUTH") => "235 accepted\r\n",
                    (None, "MAIL" | "RCPT") => "250 OK\r\n",
                    (None, "DATA") => {
                        write.write_all(b"354 end with .\r\n").await.unwrap();
                        while let Some(data) = next_line(&mut reader).await {
                            let done = data == ".";
                            received.push(data);
                            if done {
                                break;
                            }
                        }
                        "250 queued\r\n"
                    }
                    (None, "QUIT") => {
                        write.write_all(b"221 bye\r\n").await.unwrap();
                        break;
                    }
                    (None, _) => "500 unrecognized\r\n",
                };
                write.write_all(reply.as_bytes()).await.unwrap();
            }
            received
        });

        (port, handle)
    }
}

async fn next_line<R: tokio::io::AsyncBufRead + Unpin>(reader: &mut R) -> Option<String> {
    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}
